//! Autonomous play: scoring, planning and executing placements.

pub use self::{
    analysis::PlacementAnalysis,
    driver::{ActionOutcome, BotAction, BotDriver, BotView},
    planner::{Plan, plan, score},
    weights::BotWeights,
};

pub mod analysis;
pub mod driver;
pub mod planner;
pub mod weights;

//! Block-stacking puzzle engine with animated play and an autonomous player.
//!
//! - [`core`] - blocks, the grid arena, piece shapes and physics, the piece queue
//! - [`anim`] - the shared animation timeline and the effects scheduled on it
//! - [`bot`] - placement scoring, planning and step-by-step execution
//! - [`Board`] - the orchestrator and the only public game API
//! - [`config`] - numeric tuning
//!
//! Everything runs on the caller's thread. The host drives the board with
//! [`Board::tick`] and draws [`Board::scene`].

pub use self::{board::*, core::*};

pub mod anim;
mod board;
pub mod bot;
pub mod config;
pub mod core;

/// A freshly spawned piece overlaps the stack.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when spawning")]
pub struct PieceCollisionError;

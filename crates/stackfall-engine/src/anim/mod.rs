//! Animation group and the cosmetic effects scheduled on it.

pub use self::{
    effects::Effects,
    preview::{LabelDeck, PiecePreview, PreviewState},
    timeline::{AnimationHandle, Cancelled, Easing, Timeline},
    trail::{Particle, Trail, TrailLine},
};

pub mod effects;
pub mod preview;
pub mod timeline;
pub mod trail;

pub use self::{block::*, grid::*, piece_queue::*, shape::*, tetromino::*};

pub(crate) mod block;
pub(crate) mod grid;
pub(crate) mod piece_queue;
pub(crate) mod shape;
pub(crate) mod tetromino;

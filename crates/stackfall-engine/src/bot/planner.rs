//! Placement search for the active piece.
//!
//! Two strategies are combined:
//!
//! 1. **Rotate, then slide**: turn the piece at its spawn column, then try
//!    every column reachable by sliding left or right.
//! 2. **Slide, then rotate**: used only when some rotation is blocked at the
//!    spawn column. The unrotated piece slides to each reachable column and
//!    rotates there, which finds placements the first strategy cannot reach.
//!
//! Every candidate is dropped straight down and scored with [`BotWeights`].
//! The best candidate over both strategies wins; ties keep the first found.

use crate::core::{
    grid::Grid,
    shape::{Rotation, Shape},
    tetromino::{Direction, RotateOptions, Tetromino},
};

use super::{analysis::PlacementAnalysis, weights::BotWeights};

/// The chosen placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Clockwise quarter turns from the spawn state.
    pub rotations: u8,
    /// Target piece column (left edge of the shape matrix).
    pub column: i32,
    /// Column where the rotation has to happen, if it cannot happen at spawn.
    pub rotate_at: Option<i32>,
    /// Shape once all rotations are done.
    pub target: Shape,
    pub score: f64,
}

/// Scores `piece` dropped straight down from where it is.
#[must_use]
pub fn score(grid: &Grid, piece: &Tetromino, weights: &BotWeights) -> f64 {
    let mut landed = piece.detached();
    while landed.shift(Direction::Down, grid) {}
    weights.score(&PlacementAnalysis::from_grid(grid, &landed))
}

/// Finds the best placement for `piece` on `grid`.
///
/// Returns `None` only if the piece does not fit where it is.
#[must_use]
pub fn plan(grid: &Grid, piece: &Tetromino, weights: &BotWeights) -> Option<Plan> {
    if !piece.fits(grid) {
        return None;
    }
    let states = piece.kind().rotation_count().max(1);
    let mut best: Option<Plan> = None;
    let mut blocked_at_spawn = false;

    for rotations in 0..states {
        let Some(rotated) = rotate_times(piece, grid, rotations) else {
            blocked_at_spawn = true;
            continue;
        };
        for candidate in reachable(&rotated, grid) {
            consider(&mut best, grid, &candidate, rotations, None, weights);
        }
    }

    if blocked_at_spawn {
        for base in reachable(piece, grid) {
            let column = base.position().0;
            for rotations in 1..states {
                if let Some(rotated) = rotate_times(&base, grid, rotations) {
                    consider(&mut best, grid, &rotated, rotations, Some(column), weights);
                }
            }
        }
    }

    if let Some(plan) = &best {
        tracing::debug!(
            kind = ?piece.kind(),
            rotations = plan.rotations,
            column = plan.column,
            rotate_at = ?plan.rotate_at,
            score = plan.score,
            "bot plan selected"
        );
    }
    best
}

fn consider(
    best: &mut Option<Plan>,
    grid: &Grid,
    candidate: &Tetromino,
    rotations: u8,
    rotate_at: Option<i32>,
    weights: &BotWeights,
) {
    let score = score(grid, candidate, weights);
    if best.as_ref().is_some_and(|b| b.score >= score) {
        return;
    }
    *best = Some(Plan {
        rotations,
        column: candidate.position().0,
        rotate_at,
        target: candidate.shape().clone(),
        score,
    });
}

fn rotate_times(piece: &Tetromino, grid: &Grid, times: u8) -> Option<Tetromino> {
    let mut trial = piece.detached();
    for _ in 0..times {
        if !trial.rotate(Rotation::Clockwise, grid, RotateOptions::default()) {
            return None;
        }
    }
    Some(trial)
}

/// `piece` itself plus every position reachable by sliding left or right.
fn reachable(piece: &Tetromino, grid: &Grid) -> Vec<Tetromino> {
    let mut positions = vec![piece.detached()];
    for direction in [Direction::Left, Direction::Right] {
        let mut trial = piece.detached();
        while trial.shift(direction, grid) {
            positions.push(trial.detached());
        }
    }
    positions
}

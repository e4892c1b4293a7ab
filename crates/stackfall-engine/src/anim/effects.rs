//! Row clear, row shift and landing effects on frozen blocks.
//!
//! The logical grid changes instantly; these effects only drive the render
//! attributes of the affected blocks until their tweens finish.

use std::{f32::consts::PI, time::Duration};

use crate::core::{
    block::{Block, RenderAttrs},
    grid::{Grid, RowClear},
};

use super::timeline::{AnimationHandle, Easing, Timeline};

/// Blocks of a cleared row, kept alive only to be faded out.
#[derive(Debug)]
struct FadeRow {
    blocks: Vec<Block>,
    handle: AnimationHandle,
}

/// A surviving row that moved down; rendered sliding from its old row.
#[derive(Debug)]
struct ShiftRow {
    row: usize,
    distance: f32,
    handle: AnimationHandle,
}

#[derive(Debug)]
struct Landing {
    cells: Vec<(i32, i32)>,
    handle: AnimationHandle,
}

#[derive(Debug, Default)]
pub struct Effects {
    fades: Vec<FadeRow>,
    shifts: Vec<ShiftRow>,
    landings: Vec<Landing>,
}

impl Effects {
    /// Dispatches a fade for every cleared row and a shift for every moved row.
    pub fn clear_rows(
        &mut self,
        clear: &RowClear,
        timeline: &mut Timeline,
        fade: Duration,
        shift: Duration,
    ) {
        for (_, blocks) in &clear.cleared {
            self.fades.push(FadeRow {
                blocks: blocks.clone(),
                handle: timeline.tween(fade, Easing::EaseInOutQuad),
            });
        }
        for &(old, new) in &clear.shifted {
            #[expect(clippy::cast_precision_loss)]
            let distance = (new - old) as f32;
            self.shifts.push(ShiftRow {
                row: new,
                distance,
                handle: timeline.tween(shift, Easing::EaseOutCubic),
            });
        }
    }

    /// Pulses the given cells once.
    pub fn land(
        &mut self,
        cells: impl IntoIterator<Item = (i32, i32)>,
        timeline: &mut Timeline,
        duration: Duration,
    ) {
        self.landings.push(Landing {
            cells: cells.into_iter().collect(),
            handle: timeline.tween(duration, Easing::Linear),
        });
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.fades.is_empty() || !self.shifts.is_empty() || !self.landings.is_empty()
    }

    /// Writes current progress into block render attributes and drops
    /// effects whose tweens have resolved.
    pub fn apply(&mut self, grid: &mut Grid) {
        self.fades.retain_mut(|fade| {
            let p = fade.handle.progress();
            for block in &mut fade.blocks {
                let render = block.render_mut();
                render.opacity = 1.0 - p;
                render.scale = 1.0 - 0.4 * p;
            }
            fade.handle.is_pending()
        });

        self.shifts.retain(|shift| {
            let pending = shift.handle.is_pending();
            let offset = if pending {
                -shift.distance * (1.0 - shift.handle.progress())
            } else {
                0.0
            };
            if shift.row < grid.height() {
                for block in grid.row_blocks_mut(shift.row) {
                    block.render_mut().offset_y = offset;
                }
            }
            pending
        });

        self.landings.retain(|landing| {
            let pending = landing.handle.is_pending();
            let scale = if pending {
                1.0 + 0.15 * (PI * landing.handle.progress()).sin()
            } else {
                1.0
            };
            for &(x, y) in &landing.cells {
                if let Some(block) = grid.get_mut(x, y) {
                    block.render_mut().scale = scale;
                }
            }
            pending
        });
    }

    /// Cancels every effect and restores the affected blocks.
    ///
    /// Called before the grid changes shape again, since the effects address
    /// blocks by row.
    pub fn settle(&mut self, grid: &mut Grid) {
        for fade in self.fades.drain(..) {
            fade.handle.cancel();
        }
        for shift in self.shifts.drain(..) {
            shift.handle.cancel();
            if shift.row < grid.height() {
                for block in grid.row_blocks_mut(shift.row) {
                    *block.render_mut() = RenderAttrs::IDENTITY;
                }
            }
        }
        for landing in self.landings.drain(..) {
            landing.handle.cancel();
            for (x, y) in landing.cells {
                if let Some(block) = grid.get_mut(x, y) {
                    *block.render_mut() = RenderAttrs::IDENTITY;
                }
            }
        }
    }

    /// Blocks of cleared rows that are still fading out.
    pub fn fading_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.fades.iter().flat_map(|f| &f.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::tests::grid_from;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_clear_dispatches_fade_and_shift() {
        let mut grid = grid_from(&["....", "#...", "####"]);
        let clear = grid.clear_completed_rows();
        let mut timeline = Timeline::new();
        let mut effects = Effects::default();
        effects.clear_rows(&clear, &mut timeline, 100 * MS, 100 * MS);

        effects.apply(&mut grid);
        assert_eq!(effects.fading_blocks().count(), 4);
        let shifted = grid.get(0, 2).unwrap();
        assert!((shifted.render().offset_y - -1.0).abs() < 1e-4);

        timeline.advance(50 * MS);
        effects.apply(&mut grid);
        let offset = grid.get(0, 2).unwrap().render().offset_y;
        assert!(offset > -1.0 && offset < 0.0);
        assert!(effects.fading_blocks().all(|b| b.render().opacity < 1.0));

        timeline.advance(50 * MS);
        effects.apply(&mut grid);
        assert!(!effects.is_active());
        assert_eq!(grid.get(0, 2).unwrap().render(), RenderAttrs::IDENTITY);
    }

    #[test]
    fn test_landing_pulse_returns_to_identity() {
        let mut grid = grid_from(&["..", "##"]);
        let mut timeline = Timeline::new();
        let mut effects = Effects::default();
        effects.land([(0, 1), (1, 1)], &mut timeline, 100 * MS);

        timeline.advance(50 * MS);
        effects.apply(&mut grid);
        assert!(grid.get(0, 1).unwrap().render().scale > 1.0);

        timeline.advance(50 * MS);
        effects.apply(&mut grid);
        assert!((grid.get(0, 1).unwrap().render().scale - 1.0).abs() < f32::EPSILON);
        assert!(!effects.is_active());
    }

    #[test]
    fn test_settle_restores_blocks() {
        let mut grid = grid_from(&["....", "#...", "####"]);
        let clear = grid.clear_completed_rows();
        let mut timeline = Timeline::new();
        let mut effects = Effects::default();
        effects.clear_rows(&clear, &mut timeline, 100 * MS, 100 * MS);
        timeline.advance(10 * MS);
        effects.apply(&mut grid);

        effects.settle(&mut grid);
        assert!(!effects.is_active());
        assert!(!timeline.has_pending());
        assert_eq!(grid.get(0, 2).unwrap().render(), RenderAttrs::IDENTITY);
    }
}

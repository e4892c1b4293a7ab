//! Metrics of the grid a placement would produce.
//!
//! [`PlacementAnalysis`] freezes a landed piece into a copy of the grid and
//! removes completed rows, leaving the live grid untouched. Column-derived
//! metrics are computed lazily, on first use.

use std::cell::OnceCell;

use crate::core::{grid::Grid, tetromino::Tetromino};

#[derive(Debug)]
pub struct PlacementAnalysis {
    grid: Grid,
    cleared_lines: usize,
    bottom_row: i32,
    center_x: f64,
    column_heights: OnceCell<Vec<usize>>,
    holes: OnceCell<usize>,
}

impl PlacementAnalysis {
    /// Analyzes `landed`, which must already sit at its final position.
    #[must_use]
    pub fn from_grid(before_placement: &Grid, landed: &Tetromino) -> Self {
        let mut grid = before_placement.clone();
        grid.freeze(landed.blocks().map(|(x, y, b)| (x, y, *b)));
        let cleared_lines = grid.clear_completed_rows().count();

        let bottom_row = landed.blocks().map(|(_, y, _)| y).max().unwrap_or(0);
        let (sum, count) = landed
            .blocks()
            .fold((0, 0), |(sum, count), (x, _, _)| (sum + x, count + 1));
        let center_x = f64::from(sum) / f64::from(count.max(1)) + 0.5;

        Self {
            grid,
            cleared_lines,
            bottom_row,
            center_x,
            column_heights: OnceCell::new(),
            holes: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.grid.height()
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    /// Stack height of each column after the placement.
    pub fn column_heights(&self) -> &[usize] {
        self.column_heights.get_or_init(|| {
            let rows: Vec<_> = self.grid.rows().collect();
            (0..self.grid.width())
                .map(|x| {
                    rows.iter()
                        .position(|row| row[x].is_some())
                        .map_or(0, |top| self.grid.height() - top)
                })
                .collect()
        })
    }

    /// Empty cells with an occupied cell somewhere above them.
    #[must_use]
    pub fn holes(&self) -> usize {
        *self.holes.get_or_init(|| {
            let heights = self.column_heights();
            let mut holes = 0;
            for (x, &height) in heights.iter().enumerate() {
                let top = self.grid.height() - height;
                holes += self
                    .grid
                    .rows()
                    .skip(top)
                    .filter(|row| row[x].is_none())
                    .count();
            }
            holes
        })
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> usize {
        self.column_heights()
            .windows(2)
            .map(|w| w[0].abs_diff(w[1]))
            .sum()
    }

    /// Horizontal distance of the piece's center from the grid's center.
    #[must_use]
    pub fn center_distance(&self) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let center = self.grid.width() as f64 / 2.0;
        (self.center_x - center).abs()
    }

    /// Rows between the floor and the lowest block of the landed piece.
    #[must_use]
    pub fn drop_height(&self) -> usize {
        usize::try_from(self.bottom_row)
            .ok()
            .and_then(|bottom| self.grid.height().checked_sub(bottom + 1))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        grid::tests::grid_from,
        shape::PieceKind,
        tetromino::{Direction, PieceId},
    };

    fn landed(kind: PieceKind, grid: &Grid, column: i32) -> Tetromino {
        let mut piece = Tetromino::spawn(PieceId(0), kind, grid.width());
        while piece.position().0 > column && piece.shift(Direction::Left, grid) {}
        while piece.position().0 < column && piece.shift(Direction::Right, grid) {}
        while piece.shift(Direction::Down, grid) {}
        piece
    }

    #[test]
    fn test_metrics_of_flat_placement() {
        let grid = grid_from(&["......", "......", "......", "##..##"]);
        let o = landed(PieceKind::O, &grid, 2);
        let analysis = PlacementAnalysis::from_grid(&grid, &o);
        assert_eq!(analysis.cleared_lines(), 1);
        assert_eq!(analysis.column_heights(), [0, 0, 1, 1, 0, 0]);
        assert_eq!(analysis.holes(), 0);
        assert_eq!(analysis.bumpiness(), 2);
        assert!(analysis.center_distance().abs() < 1e-9);
        assert_eq!(analysis.drop_height(), 0);
    }

    #[test]
    fn test_holes_counted_below_overhang() {
        let grid = grid_from(&["....", "....", "....", "#..."]);
        // the O rests on the single block and leaves a gap under column 1
        let o = landed(PieceKind::O, &grid, 0);
        let analysis = PlacementAnalysis::from_grid(&grid, &o);
        assert_eq!(analysis.column_heights(), [3, 3, 0, 0]);
        assert_eq!(analysis.holes(), 1);
        assert_eq!(analysis.drop_height(), 1);
    }

    #[test]
    fn test_live_grid_is_untouched() {
        let grid = grid_from(&["....", "....", "...."]);
        let before = grid.clone();
        let o = landed(PieceKind::O, &grid, 0);
        let _ = PlacementAnalysis::from_grid(&grid, &o);
        assert_eq!(grid, before);
    }
}

use super::{block::Block, shape::Shape};

/// Row bookkeeping produced by [`Grid::clear_completed_rows`].
///
/// Row indices are top-to-bottom, like the grid itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowClear {
    /// Rows that were completed, with the blocks they held (bottom-to-top scan order).
    pub cleared: Vec<(usize, Vec<Block>)>,
    /// `(old_row, new_row)` for every surviving non-empty row that moved down.
    pub shifted: Vec<(usize, usize)>,
}

impl RowClear {
    #[must_use]
    pub fn count(&self) -> usize {
        self.cleared.len()
    }
}

/// Index-addressed block arena: a flat `width × height` array of cells.
///
/// Row 0 is the top row. Cells are written only by [`Grid::freeze`] and
/// removed only by [`Grid::clear_completed_rows`].
///
/// # Example
///
/// ```
/// use stackfall_engine::{Grid, PieceKind, Shape};
///
/// let mut grid = Grid::new(4, 4);
/// let shape = Shape::of(PieceKind::O);
/// assert!(grid.fits(&shape, 0, 2));
/// assert!(!grid.fits(&shape, 3, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Block>>,
}

impl Grid {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|x| *x < self.width)?;
        let y = usize::try_from(y).ok().filter(|y| *y < self.height)?;
        Some(y * self.width + x)
    }

    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&Block> {
        self.index(x, y).and_then(|i| self.cells[i].as_ref())
    }

    pub(crate) fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Block> {
        self.index(x, y).and_then(|i| self.cells[i].as_mut())
    }

    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some()
    }

    /// On-grid and unoccupied: the single legality rule for piece cells.
    #[must_use]
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i].is_none())
    }

    /// Checks whether `shape` placed with its top-left corner at `(x, y)` is collision-free.
    #[must_use]
    pub fn fits(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape
            .blocks()
            .all(|(dx, dy, _)| self.is_free(x + offset(dx), y + offset(dy)))
    }

    /// Iterates rows top-to-bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Block>]> + '_ {
        self.cells.chunks(self.width.max(1))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.cells.iter().flatten()
    }

    pub(crate) fn row_blocks_mut(&mut self, y: usize) -> impl Iterator<Item = &mut Block> + '_ {
        let start = y * self.width;
        self.cells[start..start + self.width].iter_mut().flatten()
    }

    #[must_use]
    pub fn is_row_complete(&self, y: usize) -> bool {
        self.width > 0 && self.cells[y * self.width..][..self.width].iter().all(Option::is_some)
    }

    /// Writes a block into an empty on-grid cell.
    ///
    /// Returns `false` (leaving the grid untouched) if the cell is off-grid or
    /// already occupied: a frozen cell is never overwritten.
    pub fn place(&mut self, x: i32, y: i32, mut block: Block) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if self.cells[i].is_some() {
            return false;
        }
        block.set_position(x, y);
        self.cells[i] = Some(block);
        true
    }

    /// Moves every block of a piece into the arena.
    ///
    /// Blocks that fall outside the grid (above the visible top) are dropped.
    /// Returns the topmost row any block of the piece occupied.
    pub fn freeze(&mut self, blocks: impl IntoIterator<Item = (i32, i32, Block)>) -> Option<i32> {
        let mut top = None;
        for (x, y, block) in blocks {
            top = Some(top.map_or(y, |t: i32| t.min(y)));
            self.place(x, y, block);
        }
        top
    }

    /// Removes fully occupied rows.
    ///
    /// Rows are scanned bottom-to-top; each completed row is counted, and each
    /// surviving row above it moves down by the number of completed rows found
    /// so far. The result is the surviving rows with as many empty rows
    /// prepended at the top as were cleared, so the height never changes.
    pub fn clear_completed_rows(&mut self) -> RowClear {
        let mut result = RowClear::default();
        let mut kept = Vec::with_capacity(self.height);
        for y in (0..self.height).rev() {
            let row = &self.cells[y * self.width..][..self.width];
            if self.is_row_complete(y) {
                result.cleared.push((y, row.iter().flatten().copied().collect()));
                continue;
            }
            let count = result.cleared.len();
            if count > 0 && row.iter().any(Option::is_some) {
                result.shifted.push((y, y + count));
            }
            kept.push(row.to_vec());
        }
        if result.cleared.is_empty() {
            return result;
        }

        kept.extend((0..result.count()).map(|_| vec![None; self.width]));
        kept.reverse();
        self.cells = kept.into_iter().flatten().collect();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if let Some(block) = cell {
                block.set_position(offset(i % self.width), offset(i / self.width));
            }
        }
        result
    }

    /// Re-dimensions the arena, keeping contents anchored to the bottom-left.
    ///
    /// Rows pushed above the new top and columns beyond the new width are dropped.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        let mut resized = Grid::new(width, height);
        for y in 0..self.height {
            let Some(new_y) = (y + height).checked_sub(self.height) else {
                continue;
            };
            for x in 0..self.width.min(width) {
                if let Some(block) = self.cells[y * self.width + x] {
                    resized.place(offset(x), offset(new_y), block);
                }
            }
        }
        *self = resized;
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn offset(n: usize) -> i32 {
    n as i32
}

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::block::Block;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Color index used for every block of this kind.
    #[must_use]
    pub const fn color(self) -> u8 {
        self as u8
    }

    /// Number of distinct rotation states.
    ///
    /// `O` has none, `I`/`S`/`Z` toggle between two, `J`/`L`/`T` cycle through four.
    #[must_use]
    pub const fn rotation_count(self) -> u8 {
        match self {
            PieceKind::O => 0,
            PieceKind::I | PieceKind::S | PieceKind::Z => 2,
            PieceKind::J | PieceKind::L | PieceKind::T => 4,
        }
    }

    const fn pattern(self) -> &'static [&'static str] {
        match self {
            PieceKind::I => &["....", "####", "....", "...."],
            PieceKind::O => &["##", "##"],
            PieceKind::S => &[".##", "##.", "..."],
            PieceKind::Z => &["##.", ".##", "..."],
            PieceKind::J => &["#..", "###", "..."],
            PieceKind::L => &["..#", "###", "..."],
            PieceKind::T => &[".#.", "###", "..."],
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }
}

/// Direction of a single quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// A piece shape: a fixed-size matrix of optional blocks.
///
/// Rotation is a transpose followed by a row reverse (clockwise) or a
/// matrix reverse (counterclockwise), so the matrix dimensions swap on
/// every quarter turn and empty padding rows/columns move with the blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<Option<Block>>,
}

impl Shape {
    #[must_use]
    pub fn of(kind: PieceKind) -> Self {
        Self::from_pattern(kind.pattern(), kind.color())
    }

    /// Builds a shape from rows of `#` (block) and `.` (empty).
    ///
    /// All rows must have the same length.
    #[must_use]
    pub fn from_pattern(rows: &[&str], color: u8) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let cells = rows
            .iter()
            .flat_map(|row| {
                assert_eq!(row.len(), width, "shape rows must have equal length");
                row.bytes().map(|b| (b == b'#').then(|| Block::new(color)))
            })
            .collect();
        Self {
            width,
            height,
            cells,
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

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<&Block> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x].as_ref()
    }

    /// Iterates over `(dx, dy, block)` of every occupied cell, row-major.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize, &Block)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|block| (i % self.width, i / self.width, block))
        })
    }

    /// Index of the first row holding a block.
    #[must_use]
    pub fn top_row(&self) -> Option<usize> {
        self.blocks().map(|(_, y, _)| y).min()
    }

    #[must_use]
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let transposed = self.transposed();
        match rotation {
            Rotation::Clockwise => transposed.rows_reversed_each(),
            Rotation::CounterClockwise => transposed.rows_reversed_order(),
        }
    }

    fn transposed(&self) -> Self {
        let (width, height) = (self.height, self.width);
        let mut cells = vec![None; width * height];
        for y in 0..height {
            for x in 0..width {
                cells[y * width + x] = self.cells[x * self.width + y];
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    fn rows_reversed_each(mut self) -> Self {
        for row in self.cells.chunks_mut(self.width.max(1)) {
            row.reverse();
        }
        self
    }

    fn rows_reversed_order(self) -> Self {
        let cells = self
            .cells
            .chunks(self.width.max(1))
            .rev()
            .flatten()
            .copied()
            .collect();
        Self { cells, ..self }
    }

    /// Occupancy with fully-empty leading/trailing rows and columns removed.
    #[must_use]
    pub fn outline(&self) -> Vec<Vec<bool>> {
        let Some((min_x, max_x, min_y, max_y)) = self.bounds() else {
            return Vec::new();
        };
        (min_y..=max_y)
            .map(|y| (min_x..=max_x).map(|x| self.get(x, y).is_some()).collect())
            .collect()
    }

    fn bounds(&self) -> Option<(usize, usize, usize, usize)> {
        let mut blocks = self.blocks();
        let (x0, y0, _) = blocks.next()?;
        Some(blocks.fold((x0, x0, y0, y0), |(min_x, max_x, min_y, max_y), (x, y, _)| {
            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
        }))
    }
}

/// Score values for line clears, indexed by rows cleared at once.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Score, cleared lines and placed pieces of the current game.
///
/// Zeroed by [`Board::reset`](crate::Board::reset).
///
/// # Example
///
/// ```
/// use stackfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of freezes by rows cleared (`[0]` = no clear, `[4]` = four rows).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records one frozen piece that cleared `cleared_lines` rows.
    ///
    /// Wider grids can clear more than four rows only with taller pieces,
    /// which do not exist; larger counts still add lines but no score.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.score += SCORE_TABLE.get(cleared_lines).copied().unwrap_or(0);
    }
}

use std::time::Duration;

use crate::anim::timeline::{AnimationHandle, Easing, Timeline};

use super::{
    block::Block,
    grid::{Grid, offset},
    shape::{PieceKind, Rotation, Shape},
};

/// Identity of one spawned piece; never reused within a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("#{_0}")]
pub struct PieceId(pub(crate) u64);

/// Horizontal or downward single-cell move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// Flags for [`Tetromino::rotate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotateOptions {
    /// Commit without validating against the grid.
    pub force: bool,
    /// Validate only; leave the piece untouched.
    pub test_only: bool,
}

#[derive(Debug)]
struct Motion {
    from: (f32, f32),
    handle: AnimationHandle,
}

/// The active piece.
///
/// Keeps a logical position `(x, y)` (top-left of the shape matrix, may be
/// negative while the piece is above the visible top) and an animated render
/// position that trails it while a move tween is in flight.
#[derive(Debug)]
pub struct Tetromino {
    id: PieceId,
    kind: PieceKind,
    shape: Shape,
    rotation_index: u8,
    x: i32,
    y: i32,
    current_x: f32,
    current_y: f32,
    motion: Option<Motion>,
    has_hard_dropped: bool,
    drop_cache: Option<(i32, i32)>,
}

impl Tetromino {
    /// Creates a piece centered horizontally with its topmost block on row 0.
    #[must_use]
    pub fn spawn(id: PieceId, kind: PieceKind, grid_width: usize) -> Self {
        let shape = Shape::of(kind);
        let x = offset(grid_width.saturating_sub(shape.width()) / 2);
        let y = -offset(shape.top_row().unwrap_or(0));
        #[expect(clippy::cast_precision_loss)]
        let (current_x, current_y) = (x as f32, y as f32);
        Self {
            id,
            kind,
            shape,
            rotation_index: 0,
            x,
            y,
            current_x,
            current_y,
            motion: None,
            has_hard_dropped: false,
            drop_cache: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Position currently shown on screen.
    #[must_use]
    pub fn render_position(&self) -> (f32, f32) {
        (self.current_x, self.current_y)
    }

    #[must_use]
    pub fn rotation_index(&self) -> u8 {
        self.rotation_index
    }

    #[must_use]
    pub fn has_hard_dropped(&self) -> bool {
        self.has_hard_dropped
    }

    /// Absolute `(x, y, block)` of every block.
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32, &Block)> + '_ {
        self.shape
            .blocks()
            .map(|(dx, dy, b)| (self.x + offset(dx), self.y + offset(dy), b))
    }

    /// Row of the topmost block.
    #[must_use]
    pub fn top(&self) -> i32 {
        self.y + offset(self.shape.top_row().unwrap_or(0))
    }

    #[must_use]
    pub fn fits(&self, grid: &Grid) -> bool {
        grid.fits(&self.shape, self.x, self.y)
    }

    /// Moves the logical position without animating.
    ///
    /// Used on detached trial pieces. Returns `false` (unchanged) on collision.
    pub fn shift(&mut self, direction: Direction, grid: &Grid) -> bool {
        if self.has_hard_dropped {
            return false;
        }
        let (dx, dy) = direction.delta();
        if !grid.fits(&self.shape, self.x + dx, self.y + dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        if dx != 0 {
            self.drop_cache = None;
        }
        true
    }

    /// Moves one cell and tweens the render position toward the new cell.
    ///
    /// Returns `None` if the piece has hard-dropped or the target collides.
    pub fn move_by(
        &mut self,
        direction: Direction,
        grid: &Grid,
        timeline: &mut Timeline,
        duration: Duration,
    ) -> Option<AnimationHandle> {
        if !self.shift(direction, grid) {
            return None;
        }
        Some(self.animate_to_logical(timeline, duration, Easing::EaseOutCubic))
    }

    /// Marks the piece terminal at `landing_y`, tweening it there.
    pub(crate) fn hard_drop_to(
        &mut self,
        landing_y: i32,
        timeline: &mut Timeline,
        duration: Duration,
    ) -> AnimationHandle {
        self.y = landing_y;
        self.has_hard_dropped = true;
        self.animate_to_logical(timeline, duration, Easing::Linear)
    }

    fn animate_to_logical(
        &mut self,
        timeline: &mut Timeline,
        duration: Duration,
        easing: Easing,
    ) -> AnimationHandle {
        if let Some(previous) = self.motion.take() {
            previous.handle.cancel();
        }
        let handle = timeline.tween(duration, easing);
        self.motion = Some(Motion {
            from: (self.current_x, self.current_y),
            handle: handle.clone(),
        });
        self.sync_render_position();
        handle
    }

    /// Updates the render position from the in-flight tween, if any.
    pub fn sync_render_position(&mut self) {
        #[expect(clippy::cast_precision_loss)]
        let (tx, ty) = (self.x as f32, self.y as f32);
        let Some(motion) = &self.motion else {
            (self.current_x, self.current_y) = (tx, ty);
            return;
        };
        if motion.handle.is_pending() {
            let p = motion.handle.progress();
            let (fx, fy) = motion.from;
            self.current_x = fx + (tx - fx) * p;
            self.current_y = fy + (ty - fy) * p;
        } else {
            (self.current_x, self.current_y) = (tx, ty);
            self.motion = None;
        }
    }

    /// Whether the rendered position has caught up with the logical one.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.motion.as_ref().is_none_or(|m| !m.handle.is_pending())
    }

    /// Rotates one quarter turn.
    ///
    /// Two-state pieces toggle: from their spawn state they turn clockwise,
    /// from the other state counterclockwise, whatever `rotation` says, so two
    /// turns always restore the spawn shape. Pieces with no rotation states
    /// never change.
    ///
    /// If the turned shape collides while the piece is still above the
    /// visible top, the turn is retried with the piece moved down to row 0.
    pub fn rotate(&mut self, rotation: Rotation, grid: &Grid, options: RotateOptions) -> bool {
        let count = self.kind.rotation_count();
        if self.has_hard_dropped || count == 0 {
            return false;
        }
        let rotation = match (count, self.rotation_index) {
            (2, 0) => Rotation::Clockwise,
            (2, _) => Rotation::CounterClockwise,
            _ => rotation,
        };
        let turned = self.shape.rotated(rotation);

        if options.force || grid.fits(&turned, self.x, self.y) {
            if !options.test_only {
                self.commit_rotation(turned, rotation, count);
            }
            return true;
        }

        if self.y < 0 && grid.fits(&turned, self.x, 0) {
            if !options.test_only {
                self.y = 0;
                self.commit_rotation(turned, rotation, count);
                self.sync_render_position();
            }
            return true;
        }
        false
    }

    fn commit_rotation(&mut self, turned: Shape, rotation: Rotation, count: u8) {
        self.shape = turned;
        self.rotation_index = match rotation {
            Rotation::Clockwise => (self.rotation_index + 1) % count,
            Rotation::CounterClockwise => (self.rotation_index + count - 1) % count,
        };
        self.drop_cache = None;
    }

    /// Row the piece would land on if dropped straight down.
    ///
    /// With `use_cache`, a result computed for the same column is reused.
    /// Autonomous play passes `false` so trial moves never see stale values.
    pub fn drop_point(&mut self, grid: &Grid, use_cache: bool) -> i32 {
        if use_cache
            && let Some((x, y)) = self.drop_cache
            && x == self.x
        {
            return y;
        }
        let mut y = self.y;
        while grid.fits(&self.shape, self.x, y + 1) {
            y += 1;
        }
        if use_cache {
            self.drop_cache = Some((self.x, y));
        }
        y
    }

    pub(crate) fn invalidate_drop_point(&mut self) {
        self.drop_cache = None;
    }

    /// Compares shapes ignoring the empty padding around the blocks.
    #[must_use]
    pub fn is_same_shape(&self, shape: &Shape) -> bool {
        self.shape.outline() == shape.outline()
    }

    /// An independent copy with the same kind, shape and position, but no
    /// animation state and no terminal flag. Moving it never affects `self`.
    #[must_use]
    pub fn detached(&self) -> Self {
        #[expect(clippy::cast_precision_loss)]
        let (current_x, current_y) = (self.x as f32, self.y as f32);
        Self {
            id: self.id,
            kind: self.kind,
            shape: self.shape.clone(),
            rotation_index: self.rotation_index,
            x: self.x,
            y: self.y,
            current_x,
            current_y,
            motion: None,
            has_hard_dropped: false,
            drop_cache: None,
        }
    }

    /// Consumes the piece, yielding its blocks at their absolute cells.
    pub(crate) fn into_blocks(self) -> impl Iterator<Item = (i32, i32, Block)> {
        let (x, y) = (self.x, self.y);
        let shape = self.shape;
        shape
            .blocks()
            .map(|(dx, dy, b)| (x + offset(dx), y + offset(dy), *b))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::tests::grid_from;

    const MS: Duration = Duration::from_millis(1);

    fn piece(kind: PieceKind, width: usize) -> Tetromino {
        Tetromino::spawn(PieceId(1), kind, width)
    }

    fn no_overlap(piece: &Tetromino, grid: &Grid) -> bool {
        piece.blocks().all(|(x, y, _)| grid.is_free(x, y))
    }

    #[test]
    fn test_spawn_is_centered_with_top_block_on_row_zero() {
        let t = piece(PieceKind::T, 10);
        assert_eq!(t.position(), (3, 0));
        assert_eq!(t.top(), 0);
        let i = piece(PieceKind::I, 10);
        assert_eq!(i.position(), (3, -1));
        assert_eq!(i.top(), 0);
    }

    #[test]
    fn test_move_rejected_on_collision_and_wall() {
        let grid = grid_from(&["....", "....", "...."]);
        let mut timeline = Timeline::new();
        let mut o = piece(PieceKind::O, 4);
        assert_eq!(o.position(), (1, 0));
        assert!(o.move_by(Direction::Left, &grid, &mut timeline, MS).is_some());
        assert!(o.move_by(Direction::Left, &grid, &mut timeline, MS).is_none());
        assert_eq!(o.position(), (0, 0));
        assert!(no_overlap(&o, &grid));
    }

    #[test]
    fn test_move_tweens_render_position() {
        let grid = Grid::new(6, 6);
        let mut timeline = Timeline::new();
        let mut o = piece(PieceKind::O, 6);
        let handle = o
            .move_by(Direction::Right, &grid, &mut timeline, 100 * MS)
            .unwrap();
        assert!(!o.is_settled());
        timeline.advance(100 * MS);
        o.sync_render_position();
        assert!(handle.poll().is_ready());
        assert!(o.is_settled());
        assert_eq!(o.render_position(), (3.0, 0.0));
    }

    #[test]
    fn test_hard_dropped_piece_is_immutable() {
        let grid = Grid::new(6, 6);
        let mut timeline = Timeline::new();
        let mut t = piece(PieceKind::T, 6);
        let landing = t.drop_point(&grid, false);
        t.hard_drop_to(landing, &mut timeline, MS);
        assert!(t.move_by(Direction::Left, &grid, &mut timeline, MS).is_none());
        assert!(!t.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
    }

    #[test]
    fn test_o_piece_never_rotates() {
        let grid = Grid::new(6, 6);
        let mut o = piece(PieceKind::O, 6);
        let before = o.shape().clone();
        assert!(!o.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        assert_eq!(o.shape(), &before);
    }

    #[test]
    fn test_four_state_piece_restores_after_four_turns() {
        let grid = Grid::new(10, 10);
        for kind in [PieceKind::T, PieceKind::J, PieceKind::L] {
            let mut p = piece(kind, 10);
            p.shift(Direction::Down, &grid);
            p.shift(Direction::Down, &grid);
            let original = p.shape().clone();
            for _ in 0..4 {
                assert!(p.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
                assert!(no_overlap(&p, &grid));
            }
            assert_eq!(p.shape(), &original, "{kind:?}");
            assert_eq!(p.rotation_index(), 0);
        }
    }

    #[test]
    fn test_two_state_piece_restores_after_two_turns() {
        let grid = Grid::new(10, 10);
        for kind in [PieceKind::I, PieceKind::S, PieceKind::Z] {
            let mut p = piece(kind, 10);
            p.shift(Direction::Down, &grid);
            p.shift(Direction::Down, &grid);
            let original = p.shape().clone();
            assert!(p.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
            assert_ne!(p.shape(), &original);
            assert!(p.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
            assert_eq!(p.shape(), &original, "{kind:?}");
        }
    }

    #[test]
    fn test_rotation_rejected_when_blocked() {
        let grid = grid_from(&["..........", "..........", "....#.....", ".........."]);
        let mut t = piece(PieceKind::T, 10);
        // T at x=3: clockwise puts a block at (4, 2)
        let before = t.shape().clone();
        assert!(!t.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        assert_eq!(t.shape(), &before);
        assert!(t.rotate(Rotation::Clockwise, &grid, RotateOptions { force: true, test_only: false }));
    }

    #[test]
    fn test_test_only_does_not_commit() {
        let grid = Grid::new(10, 10);
        let mut t = piece(PieceKind::T, 10);
        let before = t.shape().clone();
        let check_only = RotateOptions {
            force: false,
            test_only: true,
        };
        assert!(t.rotate(Rotation::Clockwise, &grid, check_only));
        assert_eq!(t.shape(), &before);
        assert_eq!(t.rotation_index(), 0);
    }

    #[test]
    fn test_spawn_recovery_moves_piece_to_row_zero() {
        let grid = Grid::new(10, 10);
        let mut i = piece(PieceKind::I, 10);
        assert_eq!(i.position(), (3, -1));
        assert!(i.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        assert_eq!(i.position(), (3, 0));
        assert_eq!(i.top(), 0);
        assert!(no_overlap(&i, &grid));
    }

    #[test]
    fn test_drop_point_cache() {
        let mut grid = grid_from(&["......", "......", "......", "......", "..##..", "......"]);
        let mut o = piece(PieceKind::O, 6);
        assert_eq!(o.position(), (2, 0));
        assert_eq!(o.drop_point(&grid, true), 2);

        // the cache survives a grid change while x is unchanged
        grid.clear();
        assert_eq!(o.drop_point(&grid, true), 2);
        // bypassing it sees the change
        assert_eq!(o.drop_point(&grid, false), 4);

        // a horizontal move recomputes
        assert!(o.shift(Direction::Left, &grid));
        assert_eq!(o.drop_point(&grid, true), 4);
    }

    #[test]
    fn test_is_same_shape_after_rotations() {
        let grid = Grid::new(10, 10);
        let mut l = piece(PieceKind::L, 10);
        l.shift(Direction::Down, &grid);
        let original = l.shape().clone();
        assert!(l.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        assert!(!l.is_same_shape(&original));
        for _ in 0..3 {
            assert!(l.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        }
        assert!(l.is_same_shape(&original));
    }

    #[test]
    fn test_is_same_shape_ignores_offset() {
        let mut i = piece(PieceKind::I, 10);
        let grid = Grid::new(10, 10);
        i.shift(Direction::Down, &grid);
        i.shift(Direction::Down, &grid);
        assert!(i.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        let vertical = Shape::from_pattern(&["#", "#", "#", "#"], 0);
        assert!(i.is_same_shape(&vertical));
    }

    #[test]
    fn test_detached_is_independent() {
        let grid = Grid::new(8, 8);
        let live = piece(PieceKind::T, 8);
        let mut copy = live.detached();
        assert!(copy.shift(Direction::Left, &grid));
        assert!(copy.rotate(Rotation::Clockwise, &grid, RotateOptions::default()));
        assert_eq!(live.position(), (2, 0));
        assert_eq!(live.rotation_index(), 0);
        assert_eq!(copy.kind(), live.kind());
    }
}

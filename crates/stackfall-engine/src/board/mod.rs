//! The game orchestrator.
//!
//! [`Board`] owns the grid, the piece queue, the active piece, the bot and the
//! shared animation [`Timeline`], and is the only way to change any of them.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --init--> Ready --play--> Playing <--pause/play--> Paused
//!                           ^                |
//!                           +-----reset------+--spawn blocked--> GameOver
//! ```
//!
//! # Frames
//!
//! The host calls [`Board::tick`] once per frame while [`Board::wants_frames`]
//! is true. A tick advances the timeline, resumes the cooperative tasks
//! (label typing, bot execution, trail fades), applies gravity and rebuilds
//! the [`Scene`]. When nothing is playing or animating, the tick reports that
//! it no longer wants frames.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use stackfall_engine::{Board, KeyPress, Key, PieceSeed, config::BoardConfig};
//!
//! let mut board = Board::new(BoardConfig::default(), PieceSeed::from_u128(1)).unwrap();
//! board.init();
//! board.play();
//! assert!(board.state().is_playing);
//!
//! board.handle_key(KeyPress::plain(Key::Space));
//! let mut now = Duration::ZERO;
//! while board.stats().completed_pieces() == 0 {
//!     now += Duration::from_millis(16);
//!     board.tick(now);
//! }
//! ```

use std::{task::Poll, time::Duration};

use rand_pcg::Pcg32;

use crate::{
    PieceCollisionError,
    anim::{AnimationHandle, Effects, LabelDeck, PiecePreview, Timeline, Trail},
    bot::{self, ActionOutcome, BotAction, BotDriver, BotView},
    config::{BoardConfig, ConfigError},
    core::{
        grid::Grid,
        piece_queue::{PieceQueue, PieceSeed},
        shape::{PieceKind, Rotation},
        tetromino::{Direction, PieceId, RotateOptions, Tetromino},
    },
};

pub use self::{
    input::{Command, Key, KeyPress},
    scene::{Geometry, Scene, SceneBlock, TrailSprite},
    state::{GameState, Phase, SubscriberId},
    stats::GameStats,
};

use self::state::Publisher;

mod input;
mod scene;
mod state;
mod stats;

/// Grid size used until the host surface is measured, when the surface
/// metrics set no maximum.
const DEFAULT_COLUMNS: usize = 10;
const DEFAULT_ROWS: usize = 20;

#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    phase: Phase,
    visible: bool,
    auto_paused: bool,
    drain_then_pause: bool,
    ticking: bool,
    grid: Grid,
    queue: PieceQueue,
    active: Option<Tetromino>,
    next_piece_id: u64,
    timeline: Timeline,
    effects: Effects,
    trails: Vec<Trail>,
    labels: LabelDeck,
    preview: Option<PiecePreview>,
    bot_enabled: bool,
    driver: Option<BotDriver>,
    rng: Pcg32,
    stats: GameStats,
    gravity: Duration,
    last_frame: Option<Duration>,
    geometry: Option<Geometry>,
    scene: Scene,
    publisher: Publisher,
}

impl Board {
    pub fn new(config: BoardConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let columns = config.surface.max_columns.unwrap_or(DEFAULT_COLUMNS);
        let rows = config.surface.max_rows.unwrap_or(DEFAULT_ROWS);
        let mut board = Self {
            phase: Phase::Uninitialized,
            visible: true,
            auto_paused: false,
            drain_then_pause: false,
            ticking: false,
            grid: Grid::new(columns, rows),
            queue: PieceQueue::with_seed(config.queue_length, config.bag, seed),
            active: None,
            next_piece_id: 0,
            timeline: Timeline::new(),
            effects: Effects::default(),
            trails: Vec::new(),
            labels: LabelDeck::new(config.labels.vocabulary.clone()),
            preview: None,
            bot_enabled: false,
            driver: None,
            rng: seed.effects_rng(),
            stats: GameStats::new(),
            gravity: Duration::ZERO,
            last_frame: None,
            geometry: None,
            scene: Scene::default(),
            publisher: Publisher::default(),
            config,
        };
        board.publish();
        Ok(board)
    }

    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Tetromino> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// The scene drawn by the last tick or resize.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_bot_enabled(&self) -> bool {
        self.bot_enabled
    }

    /// Whether the host should keep calling [`Board::tick`].
    #[must_use]
    pub fn wants_frames(&self) -> bool {
        self.ticking
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn state(&self) -> &GameState {
        self.publisher.current()
    }

    /// Registers a listener invoked with every new snapshot.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameState) + 'static) -> SubscriberId {
        self.publisher.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.publisher.unsubscribe(id)
    }

    /// Makes the board ready to play. Calling it again has no effect.
    pub fn init(&mut self) {
        if self.phase.is_uninitialized() {
            self.set_phase(Phase::Ready);
            self.redraw();
            self.publish();
        }
    }

    /// Cancels every animation and task, drops all listeners and returns to
    /// `Uninitialized`. Calling it again has no effect.
    pub fn destroy(&mut self) {
        self.publisher.clear();
        if self.phase.is_uninitialized() {
            return;
        }
        self.timeline.cancel_all();
        self.effects.settle(&mut self.grid);
        self.trails.clear();
        self.cancel_driver();
        self.preview = None;
        self.active = None;
        self.ticking = false;
        self.last_frame = None;
        self.set_phase(Phase::Uninitialized);
        self.scene = Scene::default();
    }

    /// Starts a game from `Ready` or resumes one from `Paused`.
    pub fn play(&mut self) -> bool {
        match self.phase {
            Phase::Ready => {
                self.set_phase(Phase::Playing);
                if self.active.is_none() {
                    self.advance_piece();
                }
            }
            Phase::Paused => self.set_phase(Phase::Playing),
            Phase::Playing => {}
            Phase::Uninitialized | Phase::GameOver => {
                tracing::trace!(phase = %self.phase, "play ignored");
                return false;
            }
        }
        self.auto_paused = false;
        self.drain_then_pause = false;
        if self.visible {
            self.timeline.resume();
        }
        self.request_frames();
        self.publish();
        self.phase.is_playing()
    }

    /// Stops gravity and input.
    ///
    /// With `finish_animations`, in-flight tweens run to completion before the
    /// timeline freezes, so a clear or shift is never cut off halfway.
    pub fn pause(&mut self, finish_animations: bool) -> bool {
        if !self.phase.is_playing() {
            tracing::trace!(phase = %self.phase, "pause ignored");
            return false;
        }
        self.set_phase(Phase::Paused);
        self.last_frame = None;
        if finish_animations {
            self.drain_then_pause = true;
        } else {
            self.timeline.pause();
        }
        self.publish();
        true
    }

    /// Clears the grid, refills the queue and zeroes the counters.
    ///
    /// A game in progress keeps playing with a fresh piece; otherwise the
    /// board returns to `Ready`.
    pub fn reset(&mut self) {
        if self.phase.is_uninitialized() {
            return;
        }
        let keep_playing = self.phase.is_playing();
        self.timeline.cancel_all();
        if self.visible {
            self.timeline.resume();
        }
        self.effects.settle(&mut self.grid);
        self.trails.clear();
        self.cancel_driver();
        self.preview = None;
        self.active = None;
        self.grid.clear();
        self.queue.refill();
        self.stats = GameStats::new();
        self.gravity = Duration::ZERO;
        self.drain_then_pause = false;
        self.auto_paused = false;
        if keep_playing {
            self.advance_piece();
            self.request_frames();
        } else {
            self.set_phase(Phase::Ready);
        }
        self.redraw();
        self.publish();
    }

    /// Hides or shows the board.
    ///
    /// Hiding freezes the timeline and pauses a running game. Showing resumes
    /// only a game that hiding paused.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.timeline.pause();
            self.last_frame = None;
            if self.phase.is_playing() {
                self.set_phase(Phase::Paused);
                self.auto_paused = true;
            }
        } else if self.auto_paused {
            self.play();
        } else if !self.phase.is_paused() || self.drain_then_pause {
            self.timeline.resume();
            self.request_frames();
        }
        self.publish();
    }

    pub fn set_bot_enabled(&mut self, enabled: bool) {
        if enabled == self.bot_enabled {
            return;
        }
        self.bot_enabled = enabled;
        if let Some(piece) = self.active.as_mut() {
            piece.invalidate_drop_point();
        }
        if !enabled {
            self.cancel_driver();
        }
        tracing::debug!(enabled, "autonomous play toggled");
        self.publish();
    }

    /// Applies a key press.
    ///
    /// Ignored while a modifier is held, while the bot owns the active piece,
    /// or while the board is hidden.
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        if !self.visible || (self.bot_enabled && self.active.is_some()) {
            return false;
        }
        let Some(command) = press.command() else {
            return false;
        };
        match command {
            Command::Move(direction) => self.move_piece(direction).is_some(),
            Command::Rotate(rotation) => self.rotate_piece(rotation),
            Command::HardDrop => self.hard_drop(),
        }
    }

    /// Moves the active piece one cell, returning the move tween.
    pub fn move_piece(&mut self, direction: Direction) -> Option<AnimationHandle> {
        if !self.phase.is_playing() {
            tracing::trace!(phase = %self.phase, ?direction, "move ignored");
            return None;
        }
        let piece = self.active.as_mut()?;
        let handle = piece.move_by(
            direction,
            &self.grid,
            &mut self.timeline,
            self.config.move_duration(),
        )?;
        if direction == Direction::Down {
            self.gravity = Duration::ZERO;
        }
        Some(handle)
    }

    pub fn rotate_piece(&mut self, rotation: Rotation) -> bool {
        if !self.phase.is_playing() {
            tracing::trace!(phase = %self.phase, ?rotation, "rotate ignored");
            return false;
        }
        self.active
            .as_mut()
            .is_some_and(|piece| piece.rotate(rotation, &self.grid, RotateOptions::default()))
    }

    /// Sends the active piece straight to its landing row.
    ///
    /// The piece becomes immutable at once; it is frozen on the first tick
    /// after its slide finishes. Long drops leave a [`Trail`].
    pub fn hard_drop(&mut self) -> bool {
        if !self.phase.is_playing() {
            tracing::trace!(phase = %self.phase, "hard drop ignored");
            return false;
        }
        let use_cache = !self.bot_enabled;
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        if piece.has_hard_dropped() {
            return false;
        }
        let landing = piece.drop_point(&self.grid, use_cache);
        let distance = landing - piece.position().1;
        if distance > self.config.trail.min_distance {
            let mut tops: Vec<(i32, i32)> = Vec::with_capacity(4);
            for (x, y, _) in piece.blocks() {
                match tops.iter_mut().find(|(column, _)| *column == x) {
                    Some((_, top)) => *top = (*top).min(y),
                    None => tops.push((x, y)),
                }
            }
            let trail = Trail::new(
                tops.iter().map(|&(column, top)| (column, top.max(0), top + distance)),
                piece.kind().color(),
                self.config.trail.particles,
                Duration::from_millis(self.config.trail.fade_ms),
                &mut self.rng,
            );
            self.trails.push(trail);
        }
        piece.hard_drop_to(landing, &mut self.timeline, self.config.hard_drop_duration());
        true
    }

    /// Re-derives the grid from a measured surface of `width × height` host units.
    ///
    /// A surface too small for a single cell leaves the board unmeasured:
    /// the grid is kept and the scene is empty.
    pub fn resize(&mut self, width: u16, height: u16) {
        let surface = self.config.surface;
        let (columns, rows) = surface.fit(width, height);
        if columns == 0 || rows == 0 {
            self.geometry = None;
            self.scene = Scene::default();
            return;
        }
        self.geometry = Some(Geometry {
            columns,
            rows,
            cell_width: surface.cell_width,
            cell_height: surface.cell_height,
            gap: surface.gap,
        });
        if (columns, rows) != (self.grid.width(), self.grid.height()) {
            self.resize_grid(columns, rows);
        }
        self.redraw();
    }

    fn resize_grid(&mut self, columns: usize, rows: usize) {
        tracing::debug!(columns, rows, "grid resized");
        self.effects.settle(&mut self.grid);
        self.grid.resize(columns, rows);
        self.cancel_driver();
        let Some(piece) = self.active.as_mut() else {
            return;
        };
        piece.invalidate_drop_point();
        if piece.fits(&self.grid) {
            return;
        }
        let respawned = Tetromino::spawn(piece.id(), piece.kind(), columns);
        if respawned.fits(&self.grid) {
            *piece = respawned;
        } else {
            tracing::info!(error = %PieceCollisionError, "piece no longer fits after resize");
            self.game_over();
        }
    }

    /// Advances one frame; returns whether more frames are wanted.
    pub fn tick(&mut self, timestamp: Duration) -> bool {
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| timestamp.saturating_sub(last));
        self.last_frame = Some(timestamp);
        if !self.is_animating() {
            self.ticking = false;
            self.last_frame = None;
            self.redraw();
            return false;
        }

        self.timeline.advance(dt);
        if self.drain_then_pause && !self.timeline.has_pending() {
            self.timeline.pause();
            self.drain_then_pause = false;
        }
        self.effects.apply(&mut self.grid);
        if let Some(piece) = self.active.as_mut() {
            piece.sync_render_position();
        }
        self.trails
            .retain_mut(|trail| trail.draw(&mut self.timeline).is_pending());

        if self.phase.is_playing() {
            self.poll_preview();
            self.poll_bot();
            self.apply_gravity(dt);
        }
        self.redraw();
        self.publish();
        true
    }

    fn is_animating(&self) -> bool {
        if !self.visible || self.phase.is_uninitialized() {
            return false;
        }
        self.phase.is_playing()
            || (!self.timeline.is_paused()
                && (self.timeline.has_pending()
                    || self.effects.is_active()
                    || !self.trails.is_empty()))
    }

    /// Registers for frames. The next tick starts a fresh clock, so time spent
    /// paused or hidden never reaches gravity or the timeline.
    fn request_frames(&mut self) {
        self.ticking = true;
        self.last_frame = None;
    }

    fn apply_gravity(&mut self, dt: Duration) {
        if self.active.as_ref().is_some_and(Tetromino::has_hard_dropped) {
            self.drop();
            return;
        }
        self.gravity += dt;
        let interval = self.config.drop_interval();
        while self.gravity >= interval && self.phase.is_playing() {
            self.gravity -= interval;
            self.drop();
        }
    }

    /// Moves the active piece down, freezing it once it can fall no further
    /// and its render position has caught up.
    ///
    /// Returns `false` when the freeze ended the game.
    fn drop(&mut self) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return true;
        };
        let moved = piece.move_by(
            Direction::Down,
            &self.grid,
            &mut self.timeline,
            self.config.move_duration(),
        );
        if moved.is_some() || !piece.is_settled() {
            return true;
        }
        let Some(piece) = self.active.take() else {
            return true;
        };

        self.effects.settle(&mut self.grid);
        let cells: Vec<(i32, i32)> = piece.blocks().map(|(x, y, _)| (x, y)).collect();
        let top = self.grid.freeze(piece.into_blocks());
        let clear = self.grid.clear_completed_rows();
        self.stats.complete_piece_drop(clear.count());
        if clear.count() > 0 {
            tracing::debug!(lines = clear.count(), "rows cleared");
            self.effects.clear_rows(
                &clear,
                &mut self.timeline,
                Duration::from_millis(self.config.row_fade_ms),
                Duration::from_millis(self.config.row_shift_ms),
            );
        } else {
            self.effects.land(
                cells,
                &mut self.timeline,
                Duration::from_millis(self.config.landing_ms),
            );
        }

        if top.is_some_and(|top| top <= 0) {
            self.game_over();
            return false;
        }
        self.advance_piece()
    }

    fn advance_piece(&mut self) -> bool {
        let kind = self.queue.pop_next();
        match self.spawn(kind) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, ?kind, "spawn blocked");
                self.game_over();
                false
            }
        }
    }

    fn spawn(&mut self, kind: PieceKind) -> Result<(), PieceCollisionError> {
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;
        self.cancel_driver();
        let piece = Tetromino::spawn(id, kind, self.grid.width());
        if !piece.fits(&self.grid) {
            return Err(PieceCollisionError);
        }
        let label = self.labels.next(&mut self.rng);
        self.preview = Some(PiecePreview::new(id, kind, label));
        self.active = Some(piece);
        self.gravity = Duration::ZERO;
        Ok(())
    }

    /// Ends the game. Remaining animations still play out; the board stops
    /// wanting frames once they are done.
    fn game_over(&mut self) {
        self.active = None;
        self.preview = None;
        self.bot_enabled = false;
        self.cancel_driver();
        self.set_phase(Phase::GameOver);
        tracing::info!(
            score = self.stats.score(),
            lines = self.stats.total_cleared_lines(),
            pieces = self.stats.completed_pieces(),
            "game over"
        );
        self.publish();
    }

    fn poll_preview(&mut self) {
        let active = self.active.as_ref().map(Tetromino::id);
        if let Some(preview) = self.preview.as_mut().filter(|p| !p.is_done()) {
            let typed = preview.poll(
                active,
                &mut self.timeline,
                &mut self.rng,
                self.config.labels.typing,
            );
            if typed.is_ready() {
                tracing::trace!(piece = ?active, "label finished");
            }
        }
    }

    fn poll_bot(&mut self) {
        if !self.bot_enabled {
            return;
        }
        let Some(piece) = self.active.as_ref() else {
            return;
        };
        if piece.has_hard_dropped() {
            return;
        }
        let id = piece.id();
        let mut driver = match self.driver.take() {
            Some(driver) if driver.piece_id() == id => driver,
            stale => {
                if let Some(mut stale) = stale {
                    stale.cancel();
                }
                match bot::plan(&self.grid, piece, &self.config.bot.weights) {
                    Some(plan) => BotDriver::new(id, plan),
                    None => BotDriver::drop_only(id),
                }
            }
        };

        loop {
            let preview_done = self
                .preview
                .as_ref()
                .is_none_or(|p| p.is_done() || p.piece_id() != id);
            let view = BotView {
                enabled: self.bot_enabled,
                active: self.active.as_ref(),
                preview_done,
            };
            match driver.poll(view, &mut self.timeline, &mut self.rng, self.config.bot.cadence) {
                Poll::Pending | Poll::Ready(None) => break,
                Poll::Ready(Some(action)) => {
                    let outcome = self.apply_bot_action(action);
                    driver.record(action, outcome);
                }
            }
        }
        self.driver = Some(driver);
    }

    fn apply_bot_action(&mut self, action: BotAction) -> ActionOutcome {
        match action {
            BotAction::Move(direction) => match self.move_piece(direction) {
                Some(handle) => {
                    if let Some(piece) = self.active.as_mut() {
                        piece.invalidate_drop_point();
                    }
                    ActionOutcome::Accepted(Some(handle))
                }
                None => ActionOutcome::Rejected,
            },
            BotAction::Rotate(rotation) => {
                if self.rotate_piece(rotation) {
                    ActionOutcome::Accepted(None)
                } else {
                    ActionOutcome::Rejected
                }
            }
            BotAction::HardDrop => {
                if self.hard_drop() {
                    ActionOutcome::Accepted(None)
                } else {
                    ActionOutcome::Rejected
                }
            }
        }
    }

    fn cancel_driver(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.cancel();
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::debug!(from = %self.phase, to = %phase, "phase transition");
            self.phase = phase;
        }
    }

    fn redraw(&mut self) {
        let use_cache = !self.bot_enabled;
        let active = self.active.as_mut().map(|piece| {
            let ghost = piece.drop_point(&self.grid, use_cache);
            (&*piece, ghost)
        });
        self.scene = Scene::build(
            self.geometry,
            &self.grid,
            &self.effects,
            active,
            &self.trails,
            self.preview.as_ref().map(PiecePreview::snapshot),
        );
    }

    fn snapshot(&self) -> GameState {
        let active = self.phase.is_playing() || self.phase.is_paused();
        GameState {
            is_playing: self.phase.is_playing(),
            is_paused: self.phase.is_paused(),
            is_game_over: self.phase.is_game_over(),
            is_game_active: active,
            is_bot_playing: active && self.bot_enabled,
            preview: self.preview.as_ref().map(PiecePreview::snapshot),
            score: self.stats.score(),
            lines: self.stats.total_cleared_lines(),
            pieces: self.stats.completed_pieces(),
            next: self.queue.upcoming().collect(),
        }
    }

    fn publish(&mut self) {
        let state = self.snapshot();
        self.publisher.publish(state);
    }
}

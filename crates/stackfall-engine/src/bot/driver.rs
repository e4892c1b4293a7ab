//! Executes a [`Plan`] one action at a time.
//!
//! The driver is a cooperative task polled once per frame. It never touches
//! the grid: each step yields a [`BotAction`] that the board applies through
//! the same operations the keyboard uses, then reports the outcome back.
//! Between actions it waits for the move tween and a randomized pause.
//!
//! Every poll starts by re-checking that autonomous play is still enabled and
//! that the board's active piece is the one the plan was made for. If either
//! check fails the task ends without acting.

use std::task::Poll;

use rand::Rng;

use crate::{
    anim::timeline::{AnimationHandle, Timeline},
    config::DelayRange,
    core::{
        shape::Rotation,
        tetromino::{Direction, PieceId, Tetromino},
    },
};

use super::planner::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Rotate(Rotation),
    Move(Direction),
    HardDrop,
}

/// What the board did with the last action.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Accepted; the handle, if any, tracks the resulting move tween.
    Accepted(Option<AnimationHandle>),
    Rejected,
}

/// Board state the driver re-validates on every resumption.
#[derive(Debug, Clone, Copy)]
pub struct BotView<'a> {
    pub enabled: bool,
    pub active: Option<&'a Tetromino>,
    /// Whether the active piece's label has finished typing.
    pub preview_done: bool,
}

#[derive(Debug)]
enum Wait {
    Ready,
    Motion(AnimationHandle),
    Delay(AnimationHandle),
}

#[derive(Debug)]
pub struct BotDriver {
    piece_id: PieceId,
    plan: Option<Plan>,
    wait: Wait,
    rotations_left: u8,
    finished: bool,
}

impl BotDriver {
    #[must_use]
    pub fn new(piece_id: PieceId, plan: Plan) -> Self {
        Self {
            piece_id,
            rotations_left: plan.rotations,
            plan: Some(plan),
            wait: Wait::Ready,
            finished: false,
        }
    }

    /// A driver that only waits for the label and then hard-drops.
    #[must_use]
    pub fn drop_only(piece_id: PieceId) -> Self {
        Self {
            piece_id,
            plan: None,
            wait: Wait::Ready,
            rotations_left: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn piece_id(&self) -> PieceId {
        self.piece_id
    }

    /// Resumes the task.
    ///
    /// `Ready(Some(action))` asks the board to perform `action` and report
    /// back with [`BotDriver::record`]; `Ready(None)` means the task is over.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        view: BotView<'_>,
        timeline: &mut Timeline,
        rng: &mut R,
        cadence: DelayRange,
    ) -> Poll<Option<BotAction>> {
        if self.finished {
            return Poll::Ready(None);
        }
        let piece = match view.active {
            Some(piece) if view.enabled && piece.id() == self.piece_id => piece,
            _ => return Poll::Ready(self.abandon()),
        };

        loop {
            match &self.wait {
                Wait::Ready => break,
                Wait::Motion(handle) => match handle.poll() {
                    Poll::Pending => return Poll::Pending,
                    // a cancelled tween means the piece moved again or the board was reset
                    Poll::Ready(_) => self.wait = Wait::Delay(timeline.delay(cadence.sample(rng))),
                },
                Wait::Delay(handle) => match handle.poll() {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(())) => self.wait = Wait::Ready,
                    Poll::Ready(Err(_)) => return Poll::Ready(self.abandon()),
                },
            }
        }

        if let Some(action) = self.next_move(piece) {
            return Poll::Ready(Some(action));
        }
        if !view.preview_done {
            return Poll::Pending;
        }
        self.finished = true;
        Poll::Ready(Some(BotAction::HardDrop))
    }

    fn next_move(&self, piece: &Tetromino) -> Option<BotAction> {
        let plan = self.plan.as_ref()?;
        let (x, _) = piece.position();
        let rotated = self.rotations_left == 0 || piece.is_same_shape(&plan.target);
        let toward = |column: i32| match column.cmp(&x) {
            std::cmp::Ordering::Less => Some(BotAction::Move(Direction::Left)),
            std::cmp::Ordering::Greater => Some(BotAction::Move(Direction::Right)),
            std::cmp::Ordering::Equal => None,
        };
        if !rotated {
            if let Some(column) = plan.rotate_at
                && let Some(action) = toward(column)
            {
                return Some(action);
            }
            return Some(BotAction::Rotate(Rotation::Clockwise));
        }
        toward(plan.column)
    }

    /// Reports what the board did with the last action.
    ///
    /// A rejected action abandons the rest of the plan: the piece is dropped
    /// where it is once its label has finished.
    pub fn record(&mut self, action: BotAction, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Accepted(handle) => {
                if let BotAction::Rotate(_) = action {
                    self.rotations_left = self.rotations_left.saturating_sub(1);
                }
                self.wait = handle.map_or(Wait::Ready, Wait::Motion);
                if matches!(self.wait, Wait::Ready) && !matches!(action, BotAction::HardDrop) {
                    // rotations have no tween; still pause before the next action
                    self.wait = Wait::Motion(AnimationHandle::finished());
                }
            }
            ActionOutcome::Rejected => {
                tracing::debug!(?action, piece = %self.piece_id, "bot action rejected");
                self.plan = None;
                self.wait = Wait::Ready;
                if action == BotAction::HardDrop {
                    self.finished = true;
                }
            }
        }
    }

    /// Ends the task, cancelling whatever it is waiting on.
    pub fn cancel(&mut self) {
        self.abandon();
    }

    fn abandon(&mut self) -> Option<BotAction> {
        if let Wait::Motion(handle) | Wait::Delay(handle) = &self.wait {
            handle.cancel();
        }
        self.wait = Wait::Ready;
        self.finished = true;
        None
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

//! Animation group: one clock driving every tween and delay of a board.
//!
//! Every animation is a child of a single [`Timeline`]. Pausing the timeline
//! freezes all children at once and resuming continues them from where they
//! stopped, so individual animations never track pause state themselves.
//!
//! Completion is observed through [`AnimationHandle::poll`], which mirrors
//! [`Future::poll`](std::future::Future::poll): a cooperative task stores the
//! handle at a suspension point and polls it on the next frame.

use std::{cell::Cell, rc::Rc, task::Poll, time::Duration};

/// Easing curve applied to linear progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseOutCubic,
    EaseInOutQuad,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Running { progress: f32 },
    Finished,
    Cancelled { progress: f32 },
}

/// The animation was cancelled before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("animation cancelled")]
pub struct Cancelled;

/// Shared view of one scheduled animation.
///
/// Cloning a handle observes the same animation.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    status: Rc<Cell<Status>>,
}

impl AnimationHandle {
    /// A handle that has already completed.
    #[must_use]
    pub fn finished() -> Self {
        Self {
            status: Rc::new(Cell::new(Status::Finished)),
        }
    }

    /// Eased progress in `[0.0, 1.0]`; frozen at its last value once cancelled.
    #[must_use]
    pub fn progress(&self) -> f32 {
        match self.status.get() {
            Status::Running { progress } | Status::Cancelled { progress } => progress,
            Status::Finished => 1.0,
        }
    }

    pub fn poll(&self) -> Poll<Result<(), Cancelled>> {
        match self.status.get() {
            Status::Running { .. } => Poll::Pending,
            Status::Finished => Poll::Ready(Ok(())),
            Status::Cancelled { .. } => Poll::Ready(Err(Cancelled)),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.poll().is_pending()
    }

    /// Cancels the animation; the timeline drops it on its next advance.
    pub fn cancel(&self) {
        if let Status::Running { progress } = self.status.get() {
            self.status.set(Status::Cancelled { progress });
        }
    }
}

#[derive(Debug)]
struct Entry {
    start: Duration,
    duration: Duration,
    easing: Easing,
    status: Rc<Cell<Status>>,
}

/// The shared animation clock of a board.
#[derive(Debug, Default)]
pub struct Timeline {
    clock: Duration,
    paused: bool,
    entries: Vec<Entry>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a tween that starts now and lasts `duration`.
    ///
    /// A zero duration yields an already-finished handle.
    pub fn tween(&mut self, duration: Duration, easing: Easing) -> AnimationHandle {
        if duration.is_zero() {
            return AnimationHandle::finished();
        }
        let status = Rc::new(Cell::new(Status::Running { progress: 0.0 }));
        self.entries.push(Entry {
            start: self.clock,
            duration,
            easing,
            status: Rc::clone(&status),
        });
        AnimationHandle { status }
    }

    /// Schedules a plain wait.
    pub fn delay(&mut self, duration: Duration) -> AnimationHandle {
        self.tween(duration, Easing::Linear)
    }

    /// Moves the clock forward and settles finished children. No-op while paused.
    pub fn advance(&mut self, dt: Duration) {
        if self.paused {
            return;
        }
        self.clock += dt;
        let clock = self.clock;
        self.entries.retain(|entry| {
            if let Status::Cancelled { .. } = entry.status.get() {
                return false;
            }
            let elapsed = clock.saturating_sub(entry.start);
            if elapsed >= entry.duration {
                entry.status.set(Status::Finished);
                return false;
            }
            let t = elapsed.as_secs_f32() / entry.duration.as_secs_f32();
            entry.status.set(Status::Running {
                progress: entry.easing.apply(t),
            });
            true
        });
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether any child is still running.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.status.get(), Status::Running { .. }))
    }

    /// Cancels every child.
    pub fn cancel_all(&mut self) {
        for entry in self.entries.drain(..) {
            if let Status::Running { progress } = entry.status.get() {
                entry.status.set(Status::Cancelled { progress });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_tween_progress_and_completion() {
        let mut timeline = Timeline::new();
        let handle = timeline.tween(100 * MS, Easing::Linear);
        assert!(handle.is_pending());
        timeline.advance(25 * MS);
        assert!((handle.progress() - 0.25).abs() < 1e-4);
        timeline.advance(75 * MS);
        assert_eq!(handle.poll(), Poll::Ready(Ok(())));
        assert!(!timeline.has_pending());
    }

    #[test]
    fn test_pause_freezes_every_child() {
        let mut timeline = Timeline::new();
        let a = timeline.tween(100 * MS, Easing::Linear);
        let b = timeline.delay(40 * MS);
        timeline.advance(20 * MS);
        timeline.pause();
        timeline.advance(500 * MS);
        assert!(a.is_pending());
        assert!(b.is_pending());
        assert!((a.progress() - 0.2).abs() < 1e-4);

        timeline.resume();
        timeline.advance(20 * MS);
        assert!(a.is_pending());
        assert_eq!(b.poll(), Poll::Ready(Ok(())));
    }

    #[test]
    fn test_cancel_resolves_with_error() {
        let mut timeline = Timeline::new();
        let handle = timeline.delay(10 * MS);
        handle.cancel();
        assert_eq!(handle.poll(), Poll::Ready(Err(Cancelled)));
        assert!(!timeline.has_pending());
        timeline.advance(MS);
        assert_eq!(handle.poll(), Poll::Ready(Err(Cancelled)));
    }

    #[test]
    fn test_cancel_all() {
        let mut timeline = Timeline::new();
        let handles: Vec<_> = (1..4).map(|i| timeline.delay(i * 10 * MS)).collect();
        timeline.cancel_all();
        assert!(handles.iter().all(|h| h.poll() == Poll::Ready(Err(Cancelled))));
        assert!(!timeline.has_pending());
    }

    #[test]
    fn test_zero_duration_is_finished() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.delay(Duration::ZERO).poll(), Poll::Ready(Ok(())));
        assert!(!timeline.has_pending());
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseInOutQuad] {
            assert!(easing.apply(0.0).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
    }
}

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use crate::event::TuiEvent;

/// Multiplexes frame ticks, renders and terminal input.
///
/// Ticks are only produced while an interval is registered. A tick registered
/// after a quiet period fires immediately, so the first frame of a new
/// animation is not delayed by a whole interval. A render follows every tick
/// and every terminal event.
#[derive(Debug)]
pub(super) struct EventLoop {
    origin: Instant,
    tick_interval: Option<Duration>,
    last_tick: Option<Instant>,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub(super) fn new() -> Self {
        Self {
            origin: Instant::now(),
            tick_interval: None,
            last_tick: None,
            dirty: true,
        }
    }

    /// Time elapsed since the loop was created.
    pub(super) fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    pub(super) fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval
    }

    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        if interval.is_none() {
            self.last_tick = None;
        }
        self.tick_interval = interval;
    }

    fn is_due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
        last.is_none_or(|last| now.duration_since(last) >= interval)
    }

    /// Blocks until the next tick, render or terminal event.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(interval) = self.tick_interval
                && Self::is_due(self.last_tick, interval, now)
            {
                self.last_tick = Some(now);
                self.dirty = true;
                return Ok(TuiEvent::Tick(now.duration_since(self.origin)));
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self
            .tick_interval
            .map(|interval| self.last_tick.map_or(now, |last| last + interval));
        let next_render_at = self.dirty.then_some(now);
        let next_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_without_tick_waits_for_input() {
        let mut events = EventLoop::new();
        events.dirty = false;
        assert_eq!(events.compute_timeout(Instant::now()), None);
    }

    #[test]
    fn test_fresh_tick_registration_is_due_immediately() {
        let mut events = EventLoop::new();
        events.dirty = false;
        events.set_tick_interval(Some(Duration::from_millis(16)));
        let now = Instant::now();
        assert_eq!(events.compute_timeout(now), Some(Duration::ZERO));
    }

    #[test]
    fn test_unregistering_ticks_forgets_last_tick() {
        let mut events = EventLoop::new();
        events.set_tick_interval(Some(Duration::from_millis(16)));
        events.last_tick = Some(Instant::now());
        events.set_tick_interval(None);
        assert_eq!(events.last_tick, None);
        assert_eq!(events.tick_interval(), None);
    }

    #[test]
    fn test_pending_render_does_not_wait() {
        let events = EventLoop::new();
        assert_eq!(events.compute_timeout(Instant::now()), Some(Duration::ZERO));
    }

    #[test]
    fn test_next_tick_waits_for_interval() {
        let mut events = EventLoop::new();
        events.dirty = false;
        let interval = Duration::from_millis(50);
        events.set_tick_interval(Some(interval));
        let now = Instant::now();
        events.last_tick = Some(now);
        assert_eq!(events.compute_timeout(now), Some(interval));
    }
}

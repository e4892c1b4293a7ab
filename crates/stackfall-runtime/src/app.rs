use crossterm::event::Event;
use ratatui::Frame;

use crate::Runtime;

/// Application driven by [`Runtime::run`].
pub trait App {
    /// Called once before the first event. Register a tick rate here if the
    /// application starts animating right away.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles terminal events (keys, resize, focus changes).
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances one frame. [`Runtime::frame_time`] holds the timestamp of
    /// this tick.
    fn update(&mut self, runtime: &mut Runtime);
}

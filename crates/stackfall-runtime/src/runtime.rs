use std::{io, time::Duration};

use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
};
use ratatui::DefaultTerminal;

use crate::{
    App,
    event::TuiEvent,
    event_loop::EventLoop,
};

/// Terminal application runtime.
///
/// Runs an [`App`] on the calling thread, delivering ticks while a tick rate
/// is registered and redrawing after every tick or terminal event.
#[derive(Default, Debug)]
pub struct Runtime {
    events: EventLoop,
    frame_time: Duration,
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick rate (ticks per second); `None` stops ticking.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    pub fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.events.set_tick_interval(interval);
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.events.tick_interval().is_some()
    }

    /// Timestamp of the current tick, measured from the start of the loop.
    ///
    /// Outside of [`App::update`] this is the current time.
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// Runs the application until [`App::should_exit`] returns true.
    ///
    /// Focus change reporting is enabled for the duration of the run so that
    /// applications receive `FocusGained`/`FocusLost`.
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        self.frame_time = self.events.elapsed();
        app.init(&mut self);

        ratatui::run(|terminal| {
            execute!(io::stdout(), EnableFocusChange)?;
            let result = self.event_loop(app, terminal);
            execute!(io::stdout(), DisableFocusChange)?;
            result
        })
    }

    fn event_loop<A>(&mut self, app: &mut A, terminal: &mut DefaultTerminal) -> io::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Tick(timestamp) => {
                    self.frame_time = timestamp;
                    app.update(self);
                }
                TuiEvent::Render => {
                    terminal.draw(|f| app.draw(f))?;
                }
                TuiEvent::Crossterm(event) => {
                    self.frame_time = self.events.elapsed();
                    app.handle_event(self, event);
                }
            }
        }
        Ok(())
    }
}

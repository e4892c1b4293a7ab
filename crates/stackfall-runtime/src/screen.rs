use std::fmt;

use crossterm::event::Event;
use ratatui::Frame;

use crate::{App, Runtime};

/// One layer of a [`ScreenStack`].
///
/// # Lifecycle
///
/// ```text
/// push/replace --> on_active <-------------+
///                     |                     | screen above pops
///                 (foreground)              |
///                     |                     |
///                 on_inactive --> (background)
///                     |
///                 on_close   (pop/replace/exit only)
/// ```
///
/// Only the foreground screen receives events and ticks. Tick registration
/// belongs in [`on_active`](Self::on_active), since the screen below may have
/// left a different rate behind.
///
/// ```rust
/// use crossterm::event::Event;
/// use ratatui::Frame;
/// use stackfall_runtime::{Runtime, Screen, ScreenTransition};
///
/// #[derive(Debug)]
/// struct Idle;
///
/// impl Screen for Idle {
///     fn on_active(&mut self, runtime: &mut Runtime) {
///         runtime.set_tick_rate(None);
///     }
///     fn on_inactive(&mut self, _runtime: &mut Runtime) {}
///     fn on_close(&mut self, _runtime: &mut Runtime) {}
///     fn handle_event(&mut self, _runtime: &mut Runtime, _event: &Event) -> ScreenTransition {
///         ScreenTransition::Pop
///     }
///     fn update(&mut self, _runtime: &mut Runtime) {}
///     fn draw(&self, _frame: &mut Frame) {}
/// }
/// ```
pub trait Screen: fmt::Debug {
    fn on_active(&mut self, runtime: &mut Runtime);

    /// The screen went to the background, or is about to be closed.
    fn on_inactive(&mut self, runtime: &mut Runtime);

    /// The screen is leaving the stack for good. Always preceded by
    /// [`on_inactive`](Self::on_inactive).
    fn on_close(&mut self, runtime: &mut Runtime);

    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event) -> ScreenTransition;

    fn update(&mut self, runtime: &mut Runtime);

    fn draw(&self, frame: &mut Frame);

    /// A modal screen is drawn over the screen below it instead of replacing it.
    fn is_modal(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub enum ScreenTransition {
    Stay,
    /// Pushes a screen; the current one goes to the background.
    Push(Box<dyn Screen>),
    /// Closes the current screen and reactivates the one below.
    Pop,
    Replace(Box<dyn Screen>),
    /// Closes every screen, top first.
    Exit,
}

#[derive(Debug)]
pub struct ScreenStack<'a> {
    screens: Vec<Box<dyn Screen + 'a>>,
    should_exit: bool,
}

impl<'a> ScreenStack<'a> {
    #[must_use]
    pub fn new(initial: Box<dyn Screen + 'a>) -> Self {
        Self {
            screens: vec![initial],
            should_exit: false,
        }
    }

    fn apply_transition(&mut self, runtime: &mut Runtime, transition: ScreenTransition) {
        match transition {
            ScreenTransition::Stay => {}
            ScreenTransition::Push(mut screen) => {
                if let Some(current) = self.screens.last_mut() {
                    current.on_inactive(runtime);
                }
                screen.on_active(runtime);
                self.screens.push(screen);
            }
            ScreenTransition::Pop => {
                self.close_top(runtime);
                if let Some(previous) = self.screens.last_mut() {
                    previous.on_active(runtime);
                }
            }
            ScreenTransition::Replace(mut screen) => {
                self.close_top(runtime);
                screen.on_active(runtime);
                self.screens.push(screen);
            }
            ScreenTransition::Exit => {
                while self.close_top(runtime) {}
                self.should_exit = true;
            }
        }
    }

    fn close_top(&mut self, runtime: &mut Runtime) -> bool {
        let Some(mut screen) = self.screens.pop() else {
            return false;
        };
        screen.on_inactive(runtime);
        screen.on_close(runtime);
        true
    }

    /// Index of the lowest screen that is visible through the modal ones above it.
    fn first_visible(&self) -> usize {
        self.screens
            .iter()
            .rposition(|screen| !screen.is_modal())
            .unwrap_or(0)
    }
}

impl App for ScreenStack<'_> {
    fn init(&mut self, runtime: &mut Runtime) {
        if let Some(screen) = self.screens.last_mut() {
            screen.on_active(runtime);
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit || self.screens.is_empty()
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: Event) {
        if let Some(current) = self.screens.last_mut() {
            let transition = current.handle_event(runtime, &event);
            self.apply_transition(runtime, transition);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        for screen in &self.screens[self.first_visible()..] {
            screen.draw(frame);
        }
    }

    fn update(&mut self, runtime: &mut Runtime) {
        if let Some(current) = self.screens.last_mut() {
            current.update(runtime);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct CallLog(Rc<RefCell<Vec<String>>>);

    impl CallLog {
        fn push(&self, msg: String) {
            self.0.borrow_mut().push(msg);
        }

        fn take(&self) -> Vec<String> {
            self.0.borrow_mut().drain(..).collect()
        }
    }

    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        log: CallLog,
        modal: bool,
        transition: Option<ScreenTransition>,
    }

    impl Recorder {
        fn boxed(name: &'static str, log: &CallLog) -> Box<Self> {
            Box::new(Self {
                name,
                log: log.clone(),
                modal: false,
                transition: None,
            })
        }

        fn modal(mut self: Box<Self>) -> Box<Self> {
            self.modal = true;
            self
        }

        fn then(mut self: Box<Self>, transition: ScreenTransition) -> Box<Self> {
            self.transition = Some(transition);
            self
        }
    }

    impl Screen for Recorder {
        fn on_active(&mut self, _runtime: &mut Runtime) {
            self.log.push(format!("{}: active", self.name));
        }

        fn on_inactive(&mut self, _runtime: &mut Runtime) {
            self.log.push(format!("{}: inactive", self.name));
        }

        fn on_close(&mut self, _runtime: &mut Runtime) {
            self.log.push(format!("{}: close", self.name));
        }

        fn handle_event(&mut self, _runtime: &mut Runtime, _event: &Event) -> ScreenTransition {
            self.log.push(format!("{}: event", self.name));
            self.transition.take().unwrap_or(ScreenTransition::Stay)
        }

        fn update(&mut self, _runtime: &mut Runtime) {
            self.log.push(format!("{}: update", self.name));
        }

        fn draw(&self, _frame: &mut Frame) {
            self.log.push(format!("{}: draw", self.name));
        }

        fn is_modal(&self) -> bool {
            self.modal
        }
    }

    fn key() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))
    }

    fn draw(stack: &ScreenStack<'_>) {
        let mut terminal = Terminal::new(TestBackend::new(8, 4)).unwrap();
        terminal.draw(|frame| stack.draw(frame)).unwrap();
    }

    #[test]
    fn test_push_backgrounds_without_closing() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        stack.apply_transition(&mut runtime, ScreenTransition::Push(Recorder::boxed("B", &log)));
        assert_eq!(log.take(), ["A: active", "A: inactive", "B: active"]);
    }

    #[test]
    fn test_pop_from_event_reactivates_previous() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        let top = Recorder::boxed("B", &log).then(ScreenTransition::Pop);
        stack.apply_transition(&mut runtime, ScreenTransition::Push(top));
        log.take();

        stack.handle_event(&mut runtime, key());
        assert_eq!(
            log.take(),
            ["B: event", "B: inactive", "B: close", "A: active"]
        );
        assert!(!stack.should_exit());
    }

    #[test]
    fn test_replace_closes_current() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        log.take();
        stack.apply_transition(
            &mut runtime,
            ScreenTransition::Replace(Recorder::boxed("B", &log)),
        );
        assert_eq!(log.take(), ["A: inactive", "A: close", "B: active"]);
    }

    #[test]
    fn test_exit_closes_top_first() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        stack.apply_transition(&mut runtime, ScreenTransition::Push(Recorder::boxed("B", &log)));
        log.take();

        stack.apply_transition(&mut runtime, ScreenTransition::Exit);
        assert_eq!(
            log.take(),
            ["B: inactive", "B: close", "A: inactive", "A: close"]
        );
        assert!(stack.should_exit());
    }

    #[test]
    fn test_popping_last_screen_exits() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log).then(ScreenTransition::Pop));
        stack.init(&mut runtime);
        assert!(!stack.should_exit());
        stack.handle_event(&mut runtime, key());
        assert!(stack.should_exit());
    }

    #[test]
    fn test_only_foreground_receives_updates_and_events() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        stack.apply_transition(&mut runtime, ScreenTransition::Push(Recorder::boxed("B", &log)));
        log.take();

        stack.update(&mut runtime);
        stack.handle_event(&mut runtime, key());
        assert_eq!(log.take(), ["B: update", "B: event"]);
    }

    #[test]
    fn test_modal_draws_over_screen_below() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        stack.apply_transition(&mut runtime, ScreenTransition::Push(Recorder::boxed("B", &log)));
        stack.apply_transition(
            &mut runtime,
            ScreenTransition::Push(Recorder::boxed("C", &log).modal()),
        );
        log.take();

        draw(&stack);
        assert_eq!(log.take(), ["B: draw", "C: draw"]);
    }

    #[test]
    fn test_opaque_screen_hides_screens_below() {
        let log = CallLog::default();
        let mut runtime = Runtime::new();
        let mut stack = ScreenStack::new(Recorder::boxed("A", &log));
        stack.init(&mut runtime);
        stack.apply_transition(&mut runtime, ScreenTransition::Push(Recorder::boxed("B", &log)));
        log.take();

        draw(&stack);
        assert_eq!(log.take(), ["B: draw"]);
    }
}

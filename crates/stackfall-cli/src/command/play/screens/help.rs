use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::Constraint,
    text::Line,
    widgets::{Block, Clear, Padding},
};
use stackfall_runtime::{Runtime, Screen, ScreenTransition};

use crate::ui::widgets::{KeyBinding, KeyBindingDisplay, style};

const BINDINGS: &[KeyBinding<'static>] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft drop"),
    (&["↑", "x"], "Rotate clockwise"),
    (&["z"], "Rotate counterclockwise"),
    (&["Space"], "Hard drop"),
    (&["p"], "Pause / resume"),
    (&["r"], "Restart"),
    (&["b"], "Toggle bot"),
    (&["q"], "Quit"),
];

/// Key reference drawn over the game. Any key closes it.
#[derive(Debug, Default)]
pub struct HelpScreen;

impl HelpScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for HelpScreen {
    fn on_active(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(None);
    }

    fn on_inactive(&mut self, _runtime: &mut Runtime) {}

    fn on_close(&mut self, _runtime: &mut Runtime) {}

    fn handle_event(&mut self, _runtime: &mut Runtime, event: &Event) -> ScreenTransition {
        let Some(key) = event.as_key_event() else {
            return ScreenTransition::Stay;
        };
        if key.kind != KeyEventKind::Press {
            return ScreenTransition::Stay;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return ScreenTransition::Exit;
        }
        ScreenTransition::Pop
    }

    fn update(&mut self, _runtime: &mut Runtime) {}

    fn draw(&self, frame: &mut Frame) {
        let keys = KeyBindingDisplay::new(BINDINGS).stacked(true).block(
            Block::bordered()
                .title(Line::from("HELP").centered())
                .title_bottom(Line::from("any key to close").centered())
                .padding(Padding::horizontal(1))
                .style(style::DEFAULT),
        );
        let area = frame
            .area()
            .centered(Constraint::Length(36), Constraint::Length(keys.height()));
        frame.render_widget(Clear, area);
        frame.render_widget(keys, area);
    }

    fn is_modal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEvent;

    use super::*;

    #[test]
    fn test_any_key_closes() {
        let mut runtime = Runtime::new();
        let mut help = HelpScreen::new();
        let key = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(matches!(
            help.handle_event(&mut runtime, &key),
            ScreenTransition::Pop
        ));
        assert!(matches!(
            help.handle_event(&mut runtime, &Event::FocusLost),
            ScreenTransition::Stay
        ));
    }
}

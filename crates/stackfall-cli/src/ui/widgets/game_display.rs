use ratatui::{
    layout::{Constraint, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Widget},
};
use stackfall_engine::{GameState, Scene};

use crate::ui::widgets::{
    BoardDisplay, KeyBinding, KeyBindingDisplay, PieceStackDisplay, StatusDisplay, color, style,
};

const SIDE_WIDTH: u16 = 22;

const PLAYING_KEYS: &[KeyBinding<'static>] = &[
    (&["←", "→", "↓"], "Move"),
    (&["↑", "x", "z"], "Rotate"),
    (&["Space"], "Drop"),
    (&["p"], "Pause"),
    (&["b"], "Bot"),
    (&["?"], "Help"),
    (&["q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding<'static>] = &[
    (&["p"], "Resume"),
    (&["r"], "Restart"),
    (&["?"], "Help"),
    (&["q"], "Quit"),
];
const IDLE_KEYS: &[KeyBinding<'static>] = &[
    (&["r"], "New game"),
    (&["?"], "Help"),
    (&["q"], "Quit"),
];

/// The whole play screen: board, status, upcoming pieces and key hints.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    scene: &'a Scene,
    state: &'a GameState,
}

impl<'a> GameDisplay<'a> {
    pub fn new(scene: &'a Scene, state: &'a GameState) -> Self {
        Self { scene, state }
    }

    /// Host area the board grid may occupy inside a terminal of `area`.
    pub fn board_surface(area: Rect) -> Rect {
        Block::bordered().inner(Self::areas(area).0)
    }

    fn areas(area: Rect) -> (Rect, Rect, Rect) {
        let [main, help] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let [board, side] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(SIDE_WIDTH)])
                .spacing(1)
                .areas(main);
        (board, side, help)
    }

    fn border_color(&self) -> Color {
        let state = self.state;
        if state.is_game_over {
            color::RED
        } else if state.is_paused {
            color::YELLOW
        } else if state.is_bot_playing {
            color::MAGENTA
        } else if state.is_playing {
            color::WHITE
        } else {
            color::GRAY
        }
    }

    fn popup(&self) -> Option<(&'static str, Style)> {
        let state = self.state;
        if state.is_game_over {
            Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
        } else if state.is_paused {
            Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
        } else if !state.is_game_active {
            Some(("READY", Style::new().fg(color::BLACK).bg(color::WHITE)))
        } else {
            None
        }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (board_area, side_area, help_area) = Self::areas(area);
        let border_style = self.border_color();
        let titled = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let board = BoardDisplay::new(self.scene).block(
            Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let status = StatusDisplay::new(self.state).block(titled("STATS"));
        let next = PieceStackDisplay::new(&self.state.next).block(titled("NEXT"));

        let [status_area, next_area] = Layout::vertical([
            Constraint::Length(status.height()),
            Constraint::Length(next.height()),
        ])
        .spacing(1)
        .areas(side_area);

        let grid_area = board.grid_area(board_area);
        Widget::render(&board, board_area, buf);
        status.render(status_area, buf);
        next.render(next_area, buf);

        let keys = if self.state.is_playing {
            PLAYING_KEYS
        } else if self.state.is_paused {
            PAUSED_KEYS
        } else {
            IDLE_KEYS
        };
        KeyBindingDisplay::new(keys).render(help_area, buf);

        if let Some((text, style)) = self.popup() {
            let anchor = grid_area.unwrap_or_else(|| board.inner(board_area));
            let popup_area =
                anchor.centered(Constraint::Length(anchor.width), Constraint::Length(3));
            let block = Block::new().style(style);
            let inner = block.inner(popup_area);
            Clear.render(popup_area, buf);
            block.render(popup_area, buf);
            Text::styled(text, style)
                .centered()
                .render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_surface_leaves_room_for_side_panel() {
        let area = Rect::new(0, 0, 80, 24);
        let surface = GameDisplay::board_surface(area);
        assert_eq!(surface.height, 24 - 1 - 2);
        assert_eq!(surface.width, 80 - SIDE_WIDTH - 1 - 2);
    }
}

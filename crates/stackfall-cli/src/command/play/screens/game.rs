use std::{cell::RefCell, rc::Rc};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Frame, layout::Rect};
use stackfall_engine::{Board, GameState, Key, KeyPress, SubscriberId};
use stackfall_runtime::{Runtime, Screen, ScreenTransition};

use crate::{command::play::screens::HelpScreen, ui::widgets::GameDisplay};

const FPS: f64 = 60.0;

/// Hosts a [`Board`]: forwards input, drives frames while the board asks for
/// them and hides the board whenever the terminal or a modal takes focus.
#[derive(Debug)]
pub struct GameScreen {
    board: Board,
    /// Latest snapshot delivered by the board's publisher.
    state: Rc<RefCell<GameState>>,
    subscription: Option<SubscriberId>,
}

impl GameScreen {
    pub fn new(mut board: Board, bot: bool) -> Self {
        let state = Rc::new(RefCell::new(board.state().clone()));
        let sink = Rc::clone(&state);
        let subscription = board.subscribe(move |snapshot| {
            sink.borrow_mut().clone_from(snapshot);
        });
        board.init();
        board.set_bot_enabled(bot);
        board.play();
        Self {
            board,
            state,
            subscription: Some(subscription),
        }
    }

    fn sync_frames(&self, runtime: &mut Runtime) {
        runtime.set_tick_rate(self.board.wants_frames().then_some(FPS));
    }

    fn measure(&mut self, width: u16, height: u16) {
        let surface = GameDisplay::board_surface(Rect::new(0, 0, width, height));
        self.board.resize(surface.width, surface.height);
    }

    fn toggle_pause(&mut self) {
        let phase = self.board.phase();
        if phase.is_playing() {
            self.board.pause(true);
        } else if phase.is_paused() {
            self.board.play();
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ScreenTransition {
        let host_key = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ScreenTransition::Exit;
            }
            KeyCode::Char('q') if host_key => return ScreenTransition::Exit,
            KeyCode::Char('?') if host_key => {
                return ScreenTransition::Push(Box::new(HelpScreen::new()));
            }
            KeyCode::Char('p') if host_key => self.toggle_pause(),
            KeyCode::Char('r') if host_key => {
                self.board.reset();
                self.board.play();
            }
            KeyCode::Char('b') if host_key => {
                let enabled = !self.board.is_bot_enabled();
                self.board.set_bot_enabled(enabled);
            }
            _ => {
                if let Some(press) = key_press(key) {
                    self.board.handle_key(press);
                }
            }
        }
        ScreenTransition::Stay
    }
}

fn key_press(event: &KeyEvent) -> Option<KeyPress> {
    let key = match event.code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    Some(KeyPress {
        key,
        modifier: !event.modifiers.is_empty(),
    })
}

impl Screen for GameScreen {
    fn on_active(&mut self, runtime: &mut Runtime) {
        match crossterm::terminal::size() {
            Ok((width, height)) => self.measure(width, height),
            Err(error) => tracing::warn!(%error, "failed to query terminal size"),
        }
        self.board.set_visible(true);
        self.sync_frames(runtime);
    }

    fn on_inactive(&mut self, runtime: &mut Runtime) {
        self.board.set_visible(false);
        runtime.set_tick_rate(None);
    }

    fn on_close(&mut self, _runtime: &mut Runtime) {
        if let Some(id) = self.subscription.take() {
            self.board.unsubscribe(id);
        }
        self.board.destroy();
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event) -> ScreenTransition {
        let transition = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::FocusLost => {
                self.board.set_visible(false);
                ScreenTransition::Stay
            }
            Event::FocusGained => {
                self.board.set_visible(true);
                ScreenTransition::Stay
            }
            Event::Resize(width, height) => {
                self.measure(*width, *height);
                ScreenTransition::Stay
            }
            _ => ScreenTransition::Stay,
        };
        self.sync_frames(runtime);
        transition
    }

    fn update(&mut self, runtime: &mut Runtime) {
        self.board.tick(runtime.frame_time());
        self.sync_frames(runtime);
    }

    fn draw(&self, frame: &mut Frame) {
        let state = self.state.borrow();
        frame.render_widget(GameDisplay::new(self.board.scene(), &state), frame.area());
    }
}

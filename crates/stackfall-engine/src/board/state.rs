use std::fmt;

use crate::{anim::PreviewState, core::shape::PieceKind};

/// Lifecycle of a [`Board`](crate::Board).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Phase {
    #[default]
    Uninitialized,
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// Immutable snapshot published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_game_over: bool,
    /// Playing or paused: a game is in progress.
    pub is_game_active: bool,
    pub is_bot_playing: bool,
    pub preview: Option<PreviewState>,
    pub score: usize,
    pub lines: usize,
    pub pieces: usize,
    /// Upcoming pieces, nearest first.
    pub next: Vec<PieceKind>,
}

/// Handle returned by [`Board::subscribe`](crate::Board::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Box<dyn FnMut(&GameState)>;

/// Publish/subscribe channel for [`GameState`] snapshots.
///
/// Listeners run synchronously on publish, after the mutation that produced
/// the snapshot has completed. A snapshot equal to the previous one is not
/// re-delivered.
#[derive(Default)]
pub(crate) struct Publisher {
    current: GameState,
    listeners: Vec<(SubscriberId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Publisher {
    pub(crate) fn current(&self) -> &GameState {
        &self.current
    }

    pub(crate) fn subscribe(&mut self, listener: impl FnMut(&GameState) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub(crate) fn publish(&mut self, state: GameState) {
        if state == self.current {
            return;
        }
        self.current = state;
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn test_publish_delivers_changes_only() {
        let mut publisher = Publisher::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = publisher.subscribe(move |s| sink.borrow_mut().push(s.score));

        publisher.publish(GameState {
            score: 100,
            ..GameState::default()
        });
        publisher.publish(GameState {
            score: 100,
            ..GameState::default()
        });
        publisher.publish(GameState {
            score: 300,
            ..GameState::default()
        });
        assert_eq!(*seen.borrow(), [100, 300]);

        assert!(publisher.unsubscribe(id));
        assert!(!publisher.unsubscribe(id));
        publisher.publish(GameState::default());
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(publisher.current(), &GameState::default());
    }
}

use crate::core::{shape::Rotation, tetromino::Direction};

/// Host-independent key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Char(char),
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Any of ctrl, alt, meta or shift held.
    pub modifier: bool,
}

impl KeyPress {
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifier: false,
        }
    }

    /// The game command bound to this key, if any.
    #[must_use]
    pub fn command(self) -> Option<Command> {
        if self.modifier {
            return None;
        }
        let command = match self.key {
            Key::Left => Command::Move(Direction::Left),
            Key::Right => Command::Move(Direction::Right),
            Key::Down => Command::Move(Direction::Down),
            Key::Up | Key::Char('x' | 'X') => Command::Rotate(Rotation::Clockwise),
            Key::Char('z' | 'Z') => Command::Rotate(Rotation::CounterClockwise),
            Key::Space | Key::Char(' ') => Command::HardDrop,
            Key::Char(_) => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Rotate(Rotation),
    HardDrop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            KeyPress::plain(Key::Up).command(),
            Some(Command::Rotate(Rotation::Clockwise))
        );
        assert_eq!(
            KeyPress::plain(Key::Char('z')).command(),
            Some(Command::Rotate(Rotation::CounterClockwise))
        );
        assert_eq!(KeyPress::plain(Key::Space).command(), Some(Command::HardDrop));
        assert_eq!(KeyPress::plain(Key::Char('q')).command(), None);
    }

    #[test]
    fn test_modifier_suppresses_command() {
        let press = KeyPress {
            key: Key::Left,
            modifier: true,
        };
        assert_eq!(press.command(), None);
    }
}

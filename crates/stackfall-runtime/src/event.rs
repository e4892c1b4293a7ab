use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum TuiEvent {
    /// Frame tick, stamped with the time since the loop started.
    #[from(skip)]
    Tick(Duration),
    Render,
    Crossterm(CrosstermEvent),
}

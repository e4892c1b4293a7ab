//! Terminal host loop for frame-driven applications.
//!
//! [`Runtime`] owns the terminal and a monotonic clock. It delivers crossterm
//! events (focus changes included), render requests and, while a tick rate is
//! registered, frame ticks stamped with the time elapsed since the loop
//! started. [`ScreenStack`] layers modal screens on top of each other.

pub use self::{
    app::App,
    runtime::Runtime,
    screen::{Screen, ScreenStack, ScreenTransition},
};

mod app;
mod event;
mod event_loop;
mod runtime;
mod screen;

//! Event handling for the application.
//!
//! This module handles keyboard input, terminal events, and the periodic
//! tick that drives animations and background-task polling.

mod handler;
mod keys;

pub use handler::EventHandler;
pub use keys::KeyBindings;

/// An application-level event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(crossterm::event::KeyEvent),
    /// The terminal was resized to (width, height).
    Resize(u16, u16),
    /// Periodic tick for animations and polling.
    Tick,
    /// The application should quit.
    Quit,
}

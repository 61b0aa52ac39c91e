//! Loading indicator component.
//!
//! Animated spinner shown while background fetches are in flight.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::theme;

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A loading indicator with an animated spinner.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    /// The message to display.
    message: String,
    /// Current spinner frame index.
    frame: usize,
    /// Whether the loading indicator is active.
    active: bool,
}

impl LoadingIndicator {
    /// Create a new loading indicator.
    pub fn new() -> Self {
        Self {
            message: "Loading...".to_string(),
            frame: 0,
            active: false,
        }
    }

    /// Create a loading indicator with a custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: 0,
            active: false,
        }
    }

    /// Set the message.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Get the current message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Start the loading indicator.
    pub fn start(&mut self) {
        self.active = true;
        self.frame = 0;
    }

    /// Start with a specific message.
    pub fn start_with_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.start();
    }

    /// Stop the loading indicator.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Check if the loading indicator is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the spinner animation by one frame.
    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Get the current spinner glyph.
    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }

    /// Render the indicator centered in the given area.
    ///
    /// Renders nothing while inactive.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }

        let text = format!("{} {}", self.spinner(), self.message);
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(theme().accent))
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
    }
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_inactive() {
        let loading = LoadingIndicator::new();
        assert!(!loading.is_active());
    }

    #[test]
    fn test_start_stop() {
        let mut loading = LoadingIndicator::new();
        loading.start();
        assert!(loading.is_active());
        loading.stop();
        assert!(!loading.is_active());
    }

    #[test]
    fn test_start_with_message() {
        let mut loading = LoadingIndicator::new();
        loading.start_with_message("Fetching items...");
        assert!(loading.is_active());
        assert_eq!(loading.message(), "Fetching items...");
    }

    #[test]
    fn test_tick_advances_and_wraps() {
        let mut loading = LoadingIndicator::new();
        loading.start();
        let first = loading.spinner();
        for _ in 0..SPINNER_FRAMES.len() {
            loading.tick();
        }
        assert_eq!(loading.spinner(), first);
    }

    #[test]
    fn test_tick_ignored_while_inactive() {
        let mut loading = LoadingIndicator::new();
        let first = loading.spinner();
        loading.tick();
        assert_eq!(loading.spinner(), first);
    }
}

//! Modal error dialog component.
//!
//! Critical errors are shown in a centered modal that blocks input until
//! dismissed. Recoverable errors go through toast notifications instead.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;

/// A modal dialog for critical errors.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    /// The dialog title.
    title: String,
    /// The error message body.
    message: String,
    /// Optional suggested action line.
    action: Option<String>,
    /// Whether the dialog is visible.
    visible: bool,
}

impl ErrorDialog {
    /// Create a new hidden error dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog for an application error.
    pub fn show(&mut self, error: &AppError) {
        self.title = "Error".to_string();
        self.message = error.user_message();
        self.action = error.suggested_action().map(str::to_string);
        self.visible = true;
    }

    /// Show the dialog with a custom title and message.
    pub fn show_message(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.title = title.into();
        self.message = message.into();
        self.action = None;
        self.visible = true;
    }

    /// Dismiss the dialog.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    /// Check if the dialog is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Get the current message (for tests and logging).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the dialog centered in the given area.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let width = area.width.min(60);
        let height = if self.action.is_some() { 9 } else { 7 };
        let rect = centered_rect(area, width, height);

        let mut lines = vec![
            Line::raw(""),
            Line::raw(self.message.clone()),
        ];
        if let Some(action) = &self.action {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                action.clone(),
                Style::default().fg(Color::Yellow),
            ));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Press Enter or Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        ));

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(Clear, rect);
        frame.render_widget(paragraph, rect);
    }
}

/// Compute a centered rectangle of the given size inside `area`.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;

    #[test]
    fn test_starts_hidden() {
        let dialog = ErrorDialog::new();
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_show_and_dismiss() {
        let mut dialog = ErrorDialog::new();
        dialog.show_message("Error", "Something went wrong");
        assert!(dialog.is_visible());
        assert_eq!(dialog.message(), "Something went wrong");

        dialog.dismiss();
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_show_app_error_includes_action() {
        let mut dialog = ErrorDialog::new();
        dialog.show(&AppError::Api(ApiError::Unauthorized));
        assert!(dialog.is_visible());
        assert!(dialog.action.is_some());
    }

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(area, 60, 8);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 8);
        assert_eq!(rect.x, 20);
        assert_eq!(rect.y, 16);
    }

    #[test]
    fn test_centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 30, 5);
        let rect = centered_rect(area, 60, 8);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 5);
    }
}

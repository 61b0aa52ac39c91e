//! Theme and styling configuration.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

use crate::api::types::StockStatus;

/// Color theme for the application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Dimmed foreground for hints and secondary text.
    pub dim: Color,
    /// Accent color for the header and titles.
    pub accent: Color,
    /// Highlight color for selected rows.
    pub highlight: Color,
    /// Table header color.
    pub header: Color,
}

impl Theme {
    /// The default dark theme.
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            highlight: Color::Cyan,
            header: Color::Yellow,
        }
    }

    /// A light-terminal friendly theme.
    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            highlight: Color::Blue,
            header: Color::Magenta,
        }
    }

    /// Look up a theme by name, falling back to dark.
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the selected table row.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Color for a stock status badge.
    pub fn status_color(&self, status: StockStatus) -> Color {
        match status {
            StockStatus::Ok => Color::Green,
            StockStatus::Attention => Color::Yellow,
            StockStatus::Damaged | StockStatus::Rejected => Color::Red,
            StockStatus::Destroyed | StockStatus::Lost => Color::DarkGray,
            StockStatus::Quarantined => Color::Magenta,
            StockStatus::Returned => Color::Blue,
            StockStatus::Unknown(_) => self.dim,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// The globally active theme.
static THEME: OnceLock<Theme> = OnceLock::new();

/// Initialize the global theme by name.
///
/// Later calls are ignored; the first initialization wins.
pub fn init_theme(name: &str) {
    let _ = THEME.set(Theme::by_name(name));
}

/// Get the active theme.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::dark)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_light() {
        let theme = Theme::by_name("light");
        assert_eq!(theme.fg, Color::Black);
    }

    #[test]
    fn test_by_name_unknown_falls_back_to_dark() {
        let theme = Theme::by_name("solarized");
        assert_eq!(theme.fg, Color::White);
    }

    #[test]
    fn test_status_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.status_color(StockStatus::Ok), Color::Green);
        assert_eq!(theme.status_color(StockStatus::Damaged), Color::Red);
        assert_eq!(theme.status_color(StockStatus::Unknown(99)), theme.dim);
    }
}

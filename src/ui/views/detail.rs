//! Stock item detail view.
//!
//! A scrollable per-record page showing the full information for one stock
//! item, opened by activating a row in the installed items table.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::types::StockItem;
use crate::events::KeyBindings;
use crate::ui::theme::theme;

/// Actions emitted by the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailAction {
    /// Return to the listing.
    GoBack,
    /// Open the item's page in the server web UI.
    OpenInBrowser(i64),
    /// List the items installed inside the displayed item.
    ViewInstalled(i64),
}

/// The stock item detail view.
pub struct DetailView {
    /// The displayed record.
    item: Option<StockItem>,
    /// Current scroll offset.
    scroll: u16,
    /// Maximum scroll offset, set from the rendered content height.
    max_scroll: u16,
    /// Navigation key bindings.
    keys: KeyBindings,
}

impl DetailView {
    /// Create a new, empty detail view.
    pub fn new() -> Self {
        Self {
            item: None,
            scroll: 0,
            max_scroll: 0,
            keys: KeyBindings::default(),
        }
    }

    /// Set the navigation key bindings.
    pub fn set_key_bindings(&mut self, keys: KeyBindings) {
        self.keys = keys;
    }

    /// Set the record to display, resetting scroll.
    pub fn set_item(&mut self, item: StockItem) {
        self.item = Some(item);
        self.scroll = 0;
    }

    /// Clear the view.
    pub fn clear(&mut self) {
        self.item = None;
        self.scroll = 0;
        self.max_scroll = 0;
    }

    /// The displayed record, if any.
    pub fn item(&self) -> Option<&StockItem> {
        self.item.as_ref()
    }

    /// Current scroll offset.
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Set the maximum scroll offset.
    pub fn set_max_scroll(&mut self, max: u16) {
        self.max_scroll = max;
        self.scroll = self.scroll.min(max);
    }

    /// Handle a key event, returning an action for the application.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<DetailAction> {
        if self.keys.is_down(key) {
            self.scroll = (self.scroll + 1).min(self.max_scroll);
            return None;
        }
        if self.keys.is_up(key) {
            self.scroll = self.scroll.saturating_sub(1);
            return None;
        }
        if self.keys.is_top(key) {
            self.scroll = 0;
            return None;
        }
        if self.keys.is_bottom(key) {
            self.scroll = self.max_scroll;
            return None;
        }
        if self.keys.is_page_down(key) {
            self.scroll = (self.scroll + 10).min(self.max_scroll);
            return None;
        }
        if self.keys.is_page_up(key) {
            self.scroll = self.scroll.saturating_sub(10);
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                Some(DetailAction::GoBack)
            }
            (KeyCode::Char('o'), KeyModifiers::NONE) => self
                .item
                .as_ref()
                .and_then(|item| item.pk)
                .map(DetailAction::OpenInBrowser),
            (KeyCode::Char('i'), KeyModifiers::NONE) => self
                .item
                .as_ref()
                .and_then(|item| item.pk)
                .map(DetailAction::ViewInstalled),
            _ => None,
        }
    }

    /// Render the detail page into the given area.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(item) = &self.item else {
            let paragraph = Paragraph::new("No stock item selected")
                .style(Style::default().fg(theme().dim))
                .block(self.detail_block(None));
            frame.render_widget(paragraph, area);
            return;
        };

        let pk = item.pk;
        let lines = detail_lines(item);

        // Content taller than the viewport can be scrolled
        let content_height = lines.len() as u16;
        let viewport = area.height.saturating_sub(2);
        self.max_scroll = content_height.saturating_sub(viewport);
        self.scroll = self.scroll.min(self.max_scroll);

        let paragraph = Paragraph::new(lines)
            .block(self.detail_block(pk))
            .scroll((self.scroll, 0));

        frame.render_widget(paragraph, area);
    }

    /// The bordered block around the detail page.
    fn detail_block(&self, pk: Option<i64>) -> Block<'static> {
        let title = match pk {
            Some(pk) => format!(" Stock item #{} ", pk),
            None => " Stock item ".to_string(),
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme().dim))
    }

    /// Render the one-line status bar.
    pub fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hint = "Esc: back  i: installed items  o: browser  j/k: scroll";
        let paragraph =
            Paragraph::new(Line::styled(hint, Style::default().fg(theme().dim)));
        frame.render_widget(paragraph, area);
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a labeled field line.
fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<14}", label),
            Style::default()
                .fg(theme().header)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

/// Build the detail page content for a stock item.
fn detail_lines(item: &StockItem) -> Vec<Line<'static>> {
    let status = item.stock_status();

    let mut lines = vec![
        Line::raw(""),
        field("Part", item.part_name()),
        field("Quantity", item.quantity_display()),
    ];

    if let Some(serial) = &item.serial {
        if !serial.is_empty() {
            lines.push(field("Serial", serial.clone()));
        }
    }
    if let Some(batch) = &item.batch {
        if !batch.is_empty() {
            lines.push(field("Batch", batch.clone()));
        }
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!("{:<14}", "Status"),
            Style::default()
                .fg(theme().header)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            status.label(),
            Style::default().fg(theme().status_color(status)),
        ),
    ]));

    if let Some(parent) = item.belongs_to {
        lines.push(field("Installed in", format!("#{}", parent)));
    }
    if let Some(name) = &item.location_name {
        lines.push(field("Location", name.clone()));
    } else if let Some(location) = item.location {
        lines.push(field("Location", format!("#{}", location)));
    }

    if let Some(detail) = &item.part_detail {
        lines.push(Line::raw(""));
        if let Some(ipn) = &detail.ipn {
            if !ipn.is_empty() {
                lines.push(field("IPN", ipn.clone()));
            }
        }
        if let Some(description) = &detail.description {
            if !description.is_empty() {
                lines.push(field("Description", description.clone()));
            }
        }
    }

    if let Some(updated) = &item.updated {
        lines.push(Line::raw(""));
        lines.push(field("Updated", updated.clone()));
    }
    if let Some(stocktake) = &item.stocktake_date {
        lines.push(field("Stocktake", stocktake.clone()));
    }

    if let Some(notes) = &item.notes {
        if !notes.is_empty() {
            lines.push(Line::raw(""));
            lines.push(field("Notes", notes.clone()));
        }
    }

    lines
}

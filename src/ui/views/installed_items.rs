//! Installed items table view.
//!
//! Lists the stock items installed inside a parent stock item. The view is
//! declarative glue: it owns column layout and cursor state, and emits
//! actions for the application to act on. Fetching, pagination and failure
//! handling live in the client/task layer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::types::StockItem;
use crate::cache::CacheStatus;
use crate::events::KeyBindings;
use crate::ui::theme::theme;

/// Rows skipped by a page-up/page-down movement.
const PAGE_JUMP: usize = 10;

/// Actions emitted by the installed items view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    /// Open the detail view for the stock item with this primary key.
    OpenItem(i64),
    /// Re-fetch the current listing.
    Refresh,
    /// Fetch the next page of results.
    LoadMore,
    /// Open the item's page in the server web UI.
    OpenInBrowser(i64),
}

/// The installed items table view.
pub struct InstalledItemsView {
    /// The loaded records.
    items: Vec<StockItem>,
    /// Cursor state for the table widget.
    table_state: TableState,
    /// The parent stock item the listing is filtered to.
    parent: Option<i64>,
    /// Total matching records reported by the server.
    total: Option<u32>,
    /// Whether a fetch is in flight.
    loading: bool,
    /// The active profile name, for the status bar.
    profile_name: Option<String>,
    /// Freshness of the displayed data.
    cache_status: Option<CacheStatus>,
    /// Navigation key bindings.
    keys: KeyBindings,
}

impl InstalledItemsView {
    /// Create a new, empty view.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            table_state: TableState::default(),
            parent: None,
            total: None,
            loading: false,
            profile_name: None,
            cache_status: None,
            keys: KeyBindings::default(),
        }
    }

    /// Set the navigation key bindings.
    pub fn set_key_bindings(&mut self, keys: KeyBindings) {
        self.keys = keys;
    }

    /// Replace the listing contents.
    ///
    /// Resets the cursor to the first row.
    pub fn set_items(&mut self, items: Vec<StockItem>, total: u32) {
        self.items = items;
        self.total = Some(total);
        self.table_state
            .select(if self.items.is_empty() { None } else { Some(0) });
    }

    /// Append a page of results, keeping the cursor in place.
    pub fn append_items(&mut self, mut items: Vec<StockItem>) {
        self.items.append(&mut items);
        if self.table_state.selected().is_none() && !self.items.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    /// Clear the listing.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total = None;
        self.table_state.select(None);
    }

    /// Set the parent stock item filter.
    pub fn set_parent(&mut self, parent: Option<i64>) {
        self.parent = parent;
    }

    /// Get the parent stock item filter.
    pub fn parent(&self) -> Option<i64> {
        self.parent
    }

    /// Set the loading state.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Check if a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set the profile name shown in the status bar.
    pub fn set_profile_name(&mut self, name: Option<String>) {
        self.profile_name = name;
    }

    /// Set the freshness indicator.
    pub fn set_cache_status(&mut self, status: Option<CacheStatus>) {
        self.cache_status = status;
    }

    /// Number of loaded records.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total matching records, when known.
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    /// Check whether the server has more records than are loaded.
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => (self.items.len() as u32) < total,
            None => false,
        }
    }

    /// The index of the selected row.
    pub fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// The selected record, if any.
    pub fn selected_item(&self) -> Option<&StockItem> {
        self.table_state
            .selected()
            .and_then(|i| self.items.get(i))
    }

    /// Handle a key event, returning an action for the application.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ListAction> {
        if self.keys.is_down(key) {
            return self.select_next();
        }
        if self.keys.is_up(key) {
            self.select_previous();
            return None;
        }
        if self.keys.is_top(key) {
            self.select_first();
            return None;
        }
        if self.keys.is_bottom(key) {
            self.select_last();
            return None;
        }
        if self.keys.is_page_down(key) {
            self.jump(PAGE_JUMP as isize);
            return None;
        }
        if self.keys.is_page_up(key) {
            self.jump(-(PAGE_JUMP as isize));
            return None;
        }

        match (key.code, key.modifiers) {
            // A record without a primary key cannot be navigated to;
            // Enter on such a row does nothing.
            (KeyCode::Enter, _) => self
                .selected_item()
                .and_then(|item| item.pk)
                .map(ListAction::OpenItem),
            (KeyCode::Char('r'), KeyModifiers::NONE) => Some(ListAction::Refresh),
            (KeyCode::Char('o'), KeyModifiers::NONE) => self
                .selected_item()
                .and_then(|item| item.pk)
                .map(ListAction::OpenInBrowser),
            _ => None,
        }
    }

    /// Move the cursor down, requesting the next page at the end.
    fn select_next(&mut self) -> Option<ListAction> {
        if self.items.is_empty() {
            return None;
        }
        let current = self.selected_index();
        if current + 1 < self.items.len() {
            self.table_state.select(Some(current + 1));
            None
        } else if self.has_more() && !self.loading {
            Some(ListAction::LoadMore)
        } else {
            None
        }
    }

    fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let current = self.selected_index();
        self.table_state.select(Some(current.saturating_sub(1)));
    }

    fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.table_state.select(Some(self.items.len() - 1));
        }
    }

    fn jump(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = self.selected_index() as isize;
        let last = (self.items.len() - 1) as isize;
        let target = (current + delta).clamp(0, last);
        self.table_state.select(Some(target as usize));
    }

    /// Render the table into the given area.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.items.is_empty() {
            self.render_empty(frame, area);
            return;
        }

        let header = Row::new(vec!["Part", "Quantity", "Batch", "Status"])
            .style(Style::default().fg(theme().header))
            .bottom_margin(1);

        let rows: Vec<Row> = self.items.iter().map(stock_item_row).collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(24),
                Constraint::Length(14),
                Constraint::Length(16),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(self.list_block())
        .highlight_style(theme().selection_style())
        .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    /// Render the empty/loading placeholder.
    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let message = if self.loading {
            "Loading installed items..."
        } else {
            "No installed items"
        };

        let paragraph = Paragraph::new(vec![Line::raw(""), Line::raw(message)])
            .style(Style::default().fg(theme().dim))
            .alignment(Alignment::Center)
            .block(self.list_block());

        frame.render_widget(paragraph, area);
    }

    /// The bordered block around the listing.
    fn list_block(&self) -> Block<'static> {
        let title = match self.parent {
            Some(pk) => format!(" Installed in stock item #{} ", pk),
            None => " Stock items ".to_string(),
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme().dim))
    }

    /// Render the one-line status bar.
    pub fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();

        let count = match self.total {
            Some(total) => format!(" {}/{} items ", self.items.len(), total),
            None => format!(" {} items ", self.items.len()),
        };
        spans.push(Span::styled(
            count,
            Style::default().fg(Color::Black).bg(theme().accent),
        ));

        if let Some(status) = self.cache_status {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("{} {}", status.icon(), status.text()),
                Style::default().fg(theme().dim),
            ));
        }

        if let Some(profile) = &self.profile_name {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{}]", profile),
                Style::default().fg(theme().dim),
            ));
        }

        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "Enter: details  r: refresh  o: browser  ?: help  q: quit",
            Style::default().fg(theme().dim),
        ));

        let paragraph = Paragraph::new(Line::from(spans));
        frame.render_widget(paragraph, area);
    }
}

impl Default for InstalledItemsView {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a table row for one stock item.
fn stock_item_row(item: &StockItem) -> Row<'static> {
    let status = item.stock_status();
    Row::new(vec![
        Cell::from(item.part_name()),
        Cell::from(item.quantity_display()),
        Cell::from(item.batch_display().to_string()),
        Cell::from(status.label()).style(Style::default().fg(theme().status_color(status))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pk: Option<i64>, quantity: f64, serial: Option<&str>) -> StockItem {
        StockItem {
            pk,
            part: 7,
            part_detail: None,
            quantity,
            serial: serial.map(str::to_string),
            batch: None,
            status: 10,
            belongs_to: Some(100),
            location: None,
            location_name: None,
            notes: None,
            updated: None,
            stocktake_date: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_set_items_selects_first() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(1), 1.0, None), item(Some(2), 2.0, None)], 2);
        assert_eq!(view.selected_index(), 0);
        assert_eq!(view.item_count(), 2);
    }

    #[test]
    fn test_set_items_empty_selects_none(){
        let mut view = InstalledItemsView::new();
        view.set_items(Vec::new(), 0);
        assert!(view.selected_item().is_none());
    }

    #[test]
    fn test_navigation() {
        let mut view = InstalledItemsView::new();
        view.set_items(
            vec![
                item(Some(1), 1.0, None),
                item(Some(2), 2.0, None),
                item(Some(3), 3.0, None),
            ],
            3,
        );

        view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(view.selected_index(), 1);

        view.handle_input(key(KeyCode::Char('k')));
        assert_eq!(view.selected_index(), 0);

        view.handle_input(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert_eq!(view.selected_index(), 2);

        view.handle_input(key(KeyCode::Char('g')));
        assert_eq!(view.selected_index(), 0);
    }

    #[test]
    fn test_enter_opens_item_with_pk() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(42), 1.0, None)], 1);

        let action = view.handle_input(key(KeyCode::Enter));
        assert_eq!(action, Some(ListAction::OpenItem(42)));
    }

    #[test]
    fn test_enter_without_pk_is_noop() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(None, 1.0, Some("5"))], 1);

        let action = view.handle_input(key(KeyCode::Enter));
        assert_eq!(action, None);
    }

    #[test]
    fn test_enter_on_empty_list_is_noop() {
        let mut view = InstalledItemsView::new();
        assert_eq!(view.handle_input(key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_refresh_action() {
        let mut view = InstalledItemsView::new();
        assert_eq!(
            view.handle_input(key(KeyCode::Char('r'))),
            Some(ListAction::Refresh)
        );
    }

    #[test]
    fn test_open_in_browser_requires_pk() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(None, 1.0, None)], 1);
        assert_eq!(view.handle_input(key(KeyCode::Char('o'))), None);

        view.set_items(vec![item(Some(9), 1.0, None)], 1);
        assert_eq!(
            view.handle_input(key(KeyCode::Char('o'))),
            Some(ListAction::OpenInBrowser(9))
        );
    }

    #[test]
    fn test_load_more_at_end_of_partial_listing() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(1), 1.0, None), item(Some(2), 1.0, None)], 10);

        view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(view.selected_index(), 1);

        // At the last loaded row with more on the server
        let action = view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(action, Some(ListAction::LoadMore));
    }

    #[test]
    fn test_no_load_more_when_fully_loaded() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(1), 1.0, None), item(Some(2), 1.0, None)], 2);

        view.handle_input(key(KeyCode::Char('j')));
        let action = view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(action, None);
        assert_eq!(view.selected_index(), 1);
    }

    #[test]
    fn test_no_load_more_while_loading() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(1), 1.0, None)], 10);
        view.set_loading(true);
        assert_eq!(view.handle_input(key(KeyCode::Char('j'))), None);
    }

    #[test]
    fn test_append_items_keeps_cursor() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(1), 1.0, None), item(Some(2), 1.0, None)], 4);
        view.handle_input(key(KeyCode::Char('j')));

        view.append_items(vec![item(Some(3), 1.0, None), item(Some(4), 1.0, None)]);
        assert_eq!(view.selected_index(), 1);
        assert_eq!(view.item_count(), 4);
        assert!(!view.has_more());
    }

    #[test]
    fn test_page_jump_clamps() {
        let mut view = InstalledItemsView::new();
        view.set_items(
            (0..5).map(|i| item(Some(i), 1.0, None)).collect(),
            5,
        );

        view.handle_input(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(view.selected_index(), 4);

        view.handle_input(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(view.selected_index(), 0);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut view = InstalledItemsView::new();
        view.set_items(vec![item(Some(1), 1.0, None)], 1);
        view.clear();
        assert_eq!(view.item_count(), 0);
        assert!(view.selected_item().is_none());
        assert!(!view.has_more());
    }

    #[test]
    fn test_parent_accessor() {
        let mut view = InstalledItemsView::new();
        assert_eq!(view.parent(), None);
        view.set_parent(Some(17));
        assert_eq!(view.parent(), Some(17));
    }
}

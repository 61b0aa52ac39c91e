//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA) pattern for
//! predictable state management in the TUI application.

use tracing::{debug, info, trace, warn};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::types::StockItem;
use crate::api::StockListQuery;
use crate::cache::CacheStatus;
use crate::config::{Config, ConfigError, Profile};
use crate::error::AppError;
use crate::events::{Event, KeyBindings};
use crate::ui::{
    DetailAction, DetailView, ErrorDialog, InstalledItemsView, ListAction, LoadingIndicator,
    Notification, NotificationManager,
};

/// The current view/screen state of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Application is loading initial data.
    #[default]
    Loading,
    /// Displaying the installed items listing.
    ItemList,
    /// Displaying details of a single stock item.
    ItemDetail,
    /// Help screen is displayed.
    Help,
    /// Application is in the process of exiting.
    Exiting,
}

/// The main application struct that holds all state.
///
/// This implements the Model part of The Elm Architecture (TEA).
pub struct App {
    /// The current view state.
    state: AppState,
    /// Whether the application should quit.
    should_quit: bool,
    /// The installed items listing view.
    list_view: InstalledItemsView,
    /// The stock item detail view.
    detail_view: DetailView,
    /// The primary key shown in the detail view.
    selected_item_pk: Option<i64>,
    /// Parents navigated through while drilling down, oldest first.
    parent_stack: Vec<Option<i64>>,
    /// Notification manager for toast messages.
    notifications: NotificationManager,
    /// Error dialog for critical errors.
    error_dialog: ErrorDialog,
    /// Global loading indicator.
    loading: LoadingIndicator,
    /// Application configuration.
    config: Config,
    /// The current active profile.
    current_profile: Option<Profile>,
    /// A listing fetch that the main loop should spawn.
    pending_refresh: bool,
    /// A next-page fetch that the main loop should spawn.
    pending_load_more: bool,
    /// A detail fetch that the main loop should spawn.
    pending_item: Option<i64>,
}

impl App {
    /// Create a new application instance.
    pub fn new() -> Self {
        debug!("Creating new application instance");

        let config = Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using default: {}", e);
            Config::default()
        });

        Self::with_config(config)
    }

    /// Create a new application instance with the given configuration.
    ///
    /// This is useful for testing and for custom initialization.
    pub fn with_config(config: Config) -> Self {
        debug!("Creating application with custom config");

        let current_profile = config.get_default_profile().cloned();
        let profile_name = current_profile.as_ref().map(|p| p.name.clone());
        let keys = KeyBindings::new(config.settings.vim_mode);

        let mut list_view = InstalledItemsView::new();
        list_view.set_loading(true);
        list_view.set_profile_name(profile_name);
        list_view.set_key_bindings(keys);

        let mut detail_view = DetailView::new();
        detail_view.set_key_bindings(keys);

        let mut loading = LoadingIndicator::with_message("Loading installed items...");
        loading.start();

        Self {
            state: AppState::Loading,
            should_quit: false,
            list_view,
            detail_view,
            selected_item_pk: None,
            parent_stack: Vec::new(),
            notifications: NotificationManager::new(),
            error_dialog: ErrorDialog::new(),
            loading,
            config,
            current_profile,
            pending_refresh: true,
            pending_load_more: false,
            pending_item: None,
        }
    }

    /// Get a mutable reference to the list view.
    pub fn list_view_mut(&mut self) -> &mut InstalledItemsView {
        &mut self.list_view
    }

    /// Get a reference to the list view.
    pub fn list_view(&self) -> &InstalledItemsView {
        &self.list_view
    }

    /// Get a mutable reference to the detail view.
    pub fn detail_view_mut(&mut self) -> &mut DetailView {
        &mut self.detail_view
    }

    /// Get a reference to the detail view.
    pub fn detail_view(&self) -> &DetailView {
        &self.detail_view
    }

    /// Get the primary key shown in the detail view.
    pub fn selected_item_pk(&self) -> Option<i64> {
        self.selected_item_pk
    }

    /// Set the parent stock item whose installed items are listed.
    pub fn set_parent(&mut self, parent: Option<i64>) {
        self.list_view.set_parent(parent);
    }

    /// Set the record shown in the detail view.
    pub fn set_detail_item(&mut self, item: StockItem) {
        self.selected_item_pk = item.pk;
        self.detail_view.set_item(item);
    }

    // ========================================================================
    // Pending operations drained by the main loop
    // ========================================================================

    /// Build the listing query for the current parent and offset 0.
    fn listing_query(&self, offset: u32) -> StockListQuery {
        StockListQuery {
            parent: self.list_view.parent(),
            search: None,
            offset,
            limit: self.config.settings.page_size,
        }
    }

    /// Take a pending listing fetch, if one was requested.
    pub fn take_pending_refresh(&mut self) -> Option<StockListQuery> {
        if !self.pending_refresh {
            return None;
        }
        self.pending_refresh = false;
        Some(self.listing_query(0))
    }

    /// Take a pending next-page fetch, if one was requested.
    pub fn take_pending_load_more(&mut self) -> Option<StockListQuery> {
        if !self.pending_load_more {
            return None;
        }
        self.pending_load_more = false;
        Some(self.listing_query(self.list_view.item_count() as u32))
    }

    /// Take a pending detail fetch, if one was requested.
    pub fn take_pending_item(&mut self) -> Option<i64> {
        self.pending_item.take()
    }

    /// Request a fresh listing fetch for the current parent.
    pub fn request_refresh(&mut self) {
        self.list_view.set_loading(true);
        self.pending_refresh = true;
    }

    // ========================================================================
    // Results applied by the main loop
    // ========================================================================

    /// Apply a fetched listing page.
    pub fn apply_listing(&mut self, page_items: Vec<StockItem>, total: u32, status: CacheStatus) {
        self.list_view.set_items(page_items, total);
        self.list_view.set_loading(false);
        self.list_view.set_cache_status(Some(status));
        self.loading.stop();
        if self.state == AppState::Loading {
            self.state = AppState::ItemList;
        }
    }

    /// Apply a next-page result, appending to the listing.
    pub fn apply_load_more(&mut self, page_items: Vec<StockItem>) {
        self.list_view.append_items(page_items);
        self.list_view.set_loading(false);
    }

    /// Apply a fetched detail record.
    ///
    /// Ignored when the user already navigated elsewhere.
    pub fn apply_item(&mut self, pk: i64, item: StockItem) {
        if self.selected_item_pk == Some(pk) {
            self.detail_view.set_item(item);
        } else {
            trace!(pk, "Discarding stale detail fetch");
        }
    }

    // ========================================================================
    // Notification and error handling methods
    // ========================================================================

    /// Get a reference to the notification manager.
    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    /// Get a mutable reference to the notification manager.
    pub fn notifications_mut(&mut self) -> &mut NotificationManager {
        &mut self.notifications
    }

    /// Add an info notification.
    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.notifications.info(message);
    }

    /// Add a success notification.
    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.notifications.success(message);
    }

    /// Add a warning notification.
    pub fn notify_warning(&mut self, message: impl Into<String>) {
        self.notifications.warning(message);
    }

    /// Add an error notification (for non-critical errors).
    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notifications.error(message);
    }

    /// Handle an application error.
    ///
    /// Critical errors are shown in a modal dialog.
    /// Recoverable errors are shown as toast notifications.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.error_dialog.show(error);
        } else {
            debug!(error = %error, "Recoverable error occurred");
            self.notifications.push(Notification::error(error.user_message()));
        }
    }

    /// Show an error dialog with a custom message.
    pub fn show_error_dialog(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.error_dialog.show_message(title, message);
    }

    /// Dismiss the error dialog.
    pub fn dismiss_error_dialog(&mut self) {
        self.error_dialog.dismiss();
    }

    /// Check if an error dialog is visible.
    pub fn is_error_dialog_visible(&self) -> bool {
        self.error_dialog.is_visible()
    }

    /// Get a reference to the loading indicator.
    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    /// Get a mutable reference to the loading indicator.
    pub fn loading_mut(&mut self) -> &mut LoadingIndicator {
        &mut self.loading
    }

    /// Start the loading indicator with a message.
    pub fn start_loading(&mut self, message: impl Into<String>) {
        self.loading.start_with_message(message);
    }

    /// Stop the loading indicator.
    pub fn stop_loading(&mut self) {
        self.loading.stop();
    }

    /// Check if the loading indicator is active.
    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    // ========================================================================
    // Profile management methods
    // ========================================================================

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the current active profile.
    pub fn current_profile(&self) -> Option<&Profile> {
        self.current_profile.as_ref()
    }

    /// Get the current profile name.
    pub fn current_profile_name(&self) -> Option<&str> {
        self.current_profile.as_ref().map(|p| p.name.as_str())
    }

    /// Select a profile by name (e.g. from the command line).
    ///
    /// Returns an error if the profile is not configured.
    pub fn select_profile(&mut self, profile_name: &str) -> Result<(), ConfigError> {
        let profile = self.config.get_profile(profile_name)?.clone();

        info!(profile = %profile_name, "Selected profile");

        self.list_view
            .set_profile_name(Some(profile.name.clone()));
        self.current_profile = Some(profile);
        Ok(())
    }

    /// Returns whether the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns the current application state.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Update the application state based on an event.
    ///
    /// This implements the Update part of The Elm Architecture (TEA).
    /// All state changes flow through this method for predictable behavior.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
                self.state = AppState::Exiting;
            }
            Event::Key(key_event) => {
                trace!(key = ?key_event.code, modifiers = ?key_event.modifiers, "Key event");
                self.handle_key_event(key_event);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
                // Terminal resize is handled automatically by ratatui
            }
            Event::Tick => {
                self.handle_tick();
            }
        }
    }

    /// Handle keyboard input events.
    fn handle_key_event(&mut self, key_event: crossterm::event::KeyEvent) {
        use crossterm::event::{KeyCode, KeyModifiers};

        // Handle error dialog first (blocks all other input)
        if self.error_dialog.is_visible() {
            match key_event.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.error_dialog.dismiss();
                }
                _ => {}
            }
            return;
        }

        // Global key bindings (always available)
        match (key_event.code, key_event.modifiers) {
            // Quit on Ctrl+C (always works)
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                self.state = AppState::Exiting;
                return;
            }
            // Help on '?' (the detail view consumes keys itself)
            (KeyCode::Char('?'), KeyModifiers::NONE) if self.state != AppState::ItemDetail => {
                if self.state != AppState::Help {
                    self.state = AppState::Help;
                }
                return;
            }
            _ => {}
        }

        // State-specific key handling
        match self.state {
            AppState::ItemList | AppState::Loading => {
                // Handle 'q' to quit only in list view
                if key_event.code == KeyCode::Char('q') && key_event.modifiers == KeyModifiers::NONE
                {
                    self.should_quit = true;
                    self.state = AppState::Exiting;
                    return;
                }

                // Esc unwinds one drill-down level
                if key_event.code == KeyCode::Esc {
                    self.pop_parent();
                    return;
                }

                if let Some(action) = self.list_view.handle_input(key_event) {
                    match action {
                        ListAction::OpenItem(pk) => {
                            debug!(pk, "Opening stock item detail");
                            self.open_detail(pk);
                        }
                        ListAction::Refresh => {
                            info!("Refreshing installed items");
                            self.request_refresh();
                        }
                        ListAction::LoadMore => {
                            debug!("Loading next listing page");
                            self.list_view.set_loading(true);
                            self.pending_load_more = true;
                        }
                        ListAction::OpenInBrowser(pk) => {
                            self.open_in_browser(pk);
                        }
                    }
                }
            }
            AppState::ItemDetail => {
                if let Some(action) = self.detail_view.handle_input(key_event) {
                    match action {
                        DetailAction::GoBack => {
                            debug!("Going back to installed items");
                            self.state = AppState::ItemList;
                            self.detail_view.clear();
                            self.selected_item_pk = None;
                        }
                        DetailAction::OpenInBrowser(pk) => {
                            self.open_in_browser(pk);
                        }
                        DetailAction::ViewInstalled(pk) => {
                            debug!(pk, "Drilling into installed items");
                            self.push_parent(pk);
                        }
                    }
                }
            }
            AppState::Help => {
                // Escape or 'q' to close help
                if key_event.code == KeyCode::Esc
                    || (key_event.code == KeyCode::Char('q')
                        && key_event.modifiers == KeyModifiers::NONE)
                {
                    self.state = AppState::ItemList;
                }
            }
            AppState::Exiting => {
                // No input handling while exiting
            }
        }
    }

    /// Open the detail view for a stock item.
    ///
    /// The record from the listing is shown immediately; a background
    /// fetch replaces it with the full record.
    fn open_detail(&mut self, pk: i64) {
        if let Some(item) = self
            .list_view
            .selected_item()
            .filter(|i| i.pk == Some(pk))
            .cloned()
        {
            self.detail_view.set_item(item);
        }
        self.selected_item_pk = Some(pk);
        self.pending_item = Some(pk);
        self.state = AppState::ItemDetail;
    }

    /// Drill into a stock item, listing what is installed inside it.
    fn push_parent(&mut self, pk: i64) {
        self.parent_stack.push(self.list_view.parent());
        self.list_view.set_parent(Some(pk));
        self.list_view.clear();
        self.detail_view.clear();
        self.selected_item_pk = None;
        self.request_refresh();
        self.state = AppState::ItemList;
    }

    /// Unwind one drill-down level, if any.
    fn pop_parent(&mut self) {
        if let Some(parent) = self.parent_stack.pop() {
            debug!(?parent, "Returning to previous parent");
            self.list_view.set_parent(parent);
            self.list_view.clear();
            self.request_refresh();
        }
    }

    /// Depth of the drill-down stack.
    pub fn parent_depth(&self) -> usize {
        self.parent_stack.len()
    }

    /// Open a stock item's page in the server web UI.
    fn open_in_browser(&mut self, pk: i64) {
        let Some(profile) = &self.current_profile else {
            self.notify_warning("No profile configured");
            return;
        };

        let url = format!("{}/stock/item/{}/", profile.url.trim_end_matches('/'), pk);
        debug!(url = %url, "Opening in browser");
        match open::that(&url) {
            Ok(()) => self.notify_info(format!("Opened stock item #{} in browser", pk)),
            Err(e) => self.notify_error(format!("Failed to open browser: {}", e)),
        }
    }

    /// Handle periodic tick events.
    fn handle_tick(&mut self) {
        self.loading.tick();
        self.notifications.tick();
    }

    /// Render the application UI.
    ///
    /// This implements the View part of The Elm Architecture (TEA).
    /// The view is a pure function of the current state.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Create the main layout with header, content, and footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Footer/Status bar
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_content(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);

        // Render notifications (on top of everything except dialogs)
        self.notifications.render(frame, area);

        // Render error dialog (on top of everything)
        self.error_dialog.render(frame, area);
    }

    /// Render the application header.
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new("LazyStock")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(title, area);
    }

    /// Render the main content area based on current state.
    fn render_content(&mut self, frame: &mut Frame, area: Rect) {
        match self.state {
            AppState::Loading | AppState::ItemList => {
                self.list_view.render(frame, area);
                if self.state == AppState::Loading {
                    self.loading.render(frame, area);
                }
            }
            AppState::ItemDetail => {
                self.detail_view.render(frame, area);
            }
            AppState::Help => {
                let paragraph = Paragraph::new(self.render_help_view())
                    .block(Block::default().borders(Borders::NONE))
                    .alignment(Alignment::Center);
                frame.render_widget(paragraph, area);
            }
            AppState::Exiting => {
                let paragraph = Paragraph::new(vec![
                    Line::raw(""),
                    Line::styled("Goodbye!", Style::default().fg(Color::Green)),
                ])
                .alignment(Alignment::Center);
                frame.render_widget(paragraph, area);
            }
        }
    }

    /// Render the footer/status bar.
    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        match self.state {
            AppState::Loading | AppState::ItemList => {
                self.list_view.render_status_bar(frame, area);
            }
            AppState::ItemDetail => {
                self.detail_view.render_status_bar(frame, area);
            }
            _ => {
                let state_str = match self.state {
                    AppState::Help => "Help",
                    AppState::Exiting => "Exiting...",
                    _ => "",
                };

                let footer = Line::from(vec![
                    Span::styled(
                        format!(" {} ", state_str),
                        Style::default().fg(Color::Black).bg(Color::Cyan),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        "Press 'q' to quit, '?' for help, Esc to go back",
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);

                frame.render_widget(Paragraph::new(footer), area);
            }
        }
    }

    /// Render help view content.
    fn render_help_view(&self) -> Vec<Line<'static>> {
        vec![
            Line::raw(""),
            Line::styled("Help", Style::default().fg(Color::Cyan)),
            Line::raw(""),
            Line::styled("Global:", Style::default().fg(Color::Yellow)),
            Line::raw("  Ctrl+C  - Quit application"),
            Line::raw("  ?       - Show this help"),
            Line::raw(""),
            Line::styled("Installed items:", Style::default().fg(Color::Yellow)),
            Line::raw("  j / ↓   - Move down"),
            Line::raw("  k / ↑   - Move up"),
            Line::raw("  g / G   - First / last item"),
            Line::raw("  Ctrl+d  - Page down"),
            Line::raw("  Ctrl+u  - Page up"),
            Line::raw("  Enter   - Open item details"),
            Line::raw("  r       - Refresh listing"),
            Line::raw("  o       - Open item in browser"),
            Line::raw("  Esc     - Back to previous parent"),
            Line::raw("  q       - Quit application"),
            Line::raw(""),
            Line::styled("Item detail:", Style::default().fg(Color::Yellow)),
            Line::raw("  j / ↓   - Scroll down"),
            Line::raw("  k / ↑   - Scroll up"),
            Line::raw("  i       - View installed items"),
            Line::raw("  o       - Open item in browser"),
            Line::raw("  q / Esc - Go back to list"),
            Line::raw(""),
            Line::styled(
                "Press Esc or q to close this help screen",
                Style::default().fg(Color::DarkGray),
            ),
        ]
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

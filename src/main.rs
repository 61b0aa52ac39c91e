//! LazyStock - a terminal-based user interface for inventory management.
//!
//! This application browses the stock items installed inside a parent
//! stock item on an inventory management server, directly from the
//! terminal.

mod api;
mod app;
mod cache;
mod config;
mod error;
mod events;
mod logging;
mod tasks;
mod ui;

use std::io;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use crate::api::{auth, InventoryClient};
use crate::app::App;
use crate::cache::{CacheManager, CacheStatus};
use crate::config::{Config, Profile};
use crate::events::EventHandler;
use crate::tasks::{create_task_channel, ApiMessage};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "lazystock", version, about = "A terminal UI for inventory management servers")]
struct Cli {
    /// Stock item whose installed items are listed at startup.
    #[arg(short = 'P', long)]
    parent: Option<i64>,

    /// Profile to use instead of the configured default.
    #[arg(short, long)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Subcommands that run outside the TUI.
#[derive(Debug, Subcommand)]
enum Command {
    /// Acquire an API token and store it in the OS keyring.
    Login,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init()?;

    let result = match &cli.command {
        Some(Command::Login) => run_login(&cli).await,
        None => run_tui(&cli).await,
    };

    logging::shutdown();
    result
}

/// Resolve the profile selected on the command line or configured as
/// default.
fn resolve_profile(config: &Config, cli: &Cli) -> anyhow::Result<Profile> {
    let profile = match &cli.profile {
        Some(name) => config.get_profile(name)?,
        None => config
            .get_default_profile()
            .context("No profile configured. Add one to the configuration file first.")?,
    };
    Ok(profile.clone())
}

/// Acquire and store an API token for a profile.
async fn run_login(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    let profile = resolve_profile(&config, cli)?;

    let client = InventoryClient::with_token(&profile.url, &profile.username, "")?;

    eprint!(
        "Password for {} at {}: ",
        profile.username, profile.url
    );
    let password = read_password()?;

    let token = client.acquire_token(&profile.username, &password).await?;
    auth::store_token(&profile.name, &token)?;

    println!("Token stored for profile '{}'", profile.name);
    info!(profile = %profile.name, "Stored API token");
    Ok(())
}

/// Read a password from the terminal without echoing it.
fn read_password() -> anyhow::Result<String> {
    use crossterm::event::{self, Event as CrosstermEvent};

    enable_raw_mode()?;
    let mut password = String::new();
    let result = loop {
        match event::read()? {
            CrosstermEvent::Key(key) => match (key.code, key.modifiers) {
                (KeyCode::Enter, _) => break Ok(password),
                (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                    break Err(anyhow::anyhow!("Login cancelled"))
                }
                (KeyCode::Backspace, _) => {
                    password.pop();
                }
                (KeyCode::Char(c), _) => password.push(c),
                _ => {}
            },
            _ => {}
        }
    };
    disable_raw_mode()?;
    eprintln!();
    result
}

/// Run the TUI application.
async fn run_tui(cli: &Cli) -> anyhow::Result<()> {
    let mut app = App::new();

    if let Some(name) = &cli.profile {
        app.select_profile(name)?;
    }
    app.set_parent(cli.parent);

    ui::init_theme(&app.config().settings.theme);

    let cache = app.current_profile().map(|profile| {
        CacheManager::new(&profile.name, app.config().settings.cache_ttl_minutes)
    });
    let cache = match cache {
        Some(Ok(cache)) => Some(cache),
        Some(Err(e)) => {
            warn!("Cache disabled: {}", e);
            None
        }
        None => None,
    };

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, cache.as_ref()).await;
    restore_terminal(&mut terminal)?;

    result
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> anyhow::Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

/// The main event loop.
///
/// Renders the UI, drains background task results, spawns tasks for
/// pending operations, and feeds terminal events into the application.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cache: Option<&CacheManager>,
) -> anyhow::Result<()> {
    let events = EventHandler::new();
    let (mut rx, spawner) = create_task_channel();
    let mut client: Option<InventoryClient> = None;

    match app.current_profile().cloned() {
        Some(profile) => {
            info!(profile = %profile.name, "Connecting");
            spawner.spawn_connect(profile);
        }
        None => {
            app.stop_loading();
            app.list_view_mut().set_loading(false);
            let path = Config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the configuration file".to_string());
            app.show_error_dialog(
                "No profile configured",
                format!("Add a server profile to {} and restart.", path),
            );
        }
    }

    loop {
        terminal.draw(|frame| app.view(frame))?;

        // Drain background task results
        while let Ok(message) = rx.try_recv() {
            handle_message(app, &mut client, cache, message);
        }

        // Spawn tasks for pending operations once connected
        if let Some(client) = client.as_ref() {
            if let Some(query) = app.take_pending_refresh() {
                debug!(?query, "Spawning listing fetch");
                spawner.spawn_fetch_items(client, query);
            }
            if let Some(query) = app.take_pending_load_more() {
                debug!(?query, "Spawning load more");
                spawner.spawn_load_more(client, query);
            }
            if let Some(pk) = app.take_pending_item() {
                debug!(pk, "Spawning item fetch");
                spawner.spawn_fetch_item(client, pk);
            }
        }

        let event = events.next().context("Failed to read terminal event")?;
        app.update(event);

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Apply a background task result to the application state.
fn handle_message(
    app: &mut App,
    client: &mut Option<InventoryClient>,
    cache: Option<&CacheManager>,
    message: ApiMessage,
) {
    match message {
        ApiMessage::ClientConnected(Ok(connected)) => {
            info!("Connected to {}", connected.base_url());
            app.notify_success(format!("Connected to {}", connected.base_url()));
            *client = Some(connected);
        }
        ApiMessage::ClientConnected(Err(message)) => {
            error!("Connection failed: {}", message);
            app.stop_loading();
            app.list_view_mut().set_loading(false);
            app.show_error_dialog("Connection failed", message);

            // Fall back to cached data for the initial listing
            if let (Some(cache), Some(query)) = (cache, app.take_pending_refresh()) {
                if let Some(page) = cache.get_listing(&query) {
                    app.apply_listing(page.results, page.count, CacheStatus::Offline);
                    app.notify_warning("Offline - showing cached data");
                }
            }
        }
        ApiMessage::ItemsFetched { query, result } => match result {
            Ok(page) => {
                if let Some(cache) = cache {
                    if let Err(e) = cache.set_listing(&query, &page) {
                        debug!("Failed to cache listing: {}", e);
                    }
                }
                app.apply_listing(page.results, page.count, CacheStatus::Fresh);
            }
            Err(message) => {
                warn!("Listing fetch failed: {}", message);
                app.stop_loading();
                app.list_view_mut().set_loading(false);

                let cached = cache.and_then(|c| c.get_listing(&query));
                match cached {
                    Some(page) => {
                        app.apply_listing(page.results, page.count, CacheStatus::Offline);
                        app.notify_warning("Offline - showing cached data");
                    }
                    None => app.notify_error(message),
                }
            }
        },
        ApiMessage::LoadMoreFetched { query, result } => match result {
            Ok(page) => {
                if let Some(cache) = cache {
                    if let Err(e) = cache.set_listing(&query, &page) {
                        debug!("Failed to cache listing page: {}", e);
                    }
                }
                app.apply_load_more(page.results);
            }
            Err(message) => {
                warn!("Load more failed: {}", message);
                app.list_view_mut().set_loading(false);
                app.notify_error(message);
            }
        },
        ApiMessage::ItemFetched { pk, result } => match result {
            Ok(item) => {
                if let Some(cache) = cache {
                    if let Err(e) = cache.set_item(&item) {
                        debug!("Failed to cache item: {}", e);
                    }
                }
                app.apply_item(pk, item);
            }
            Err(message) => {
                warn!(pk, "Item fetch failed: {}", message);
                app.notify_error(message);
            }
        },
    }
}

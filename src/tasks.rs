//! Async task management for non-blocking API operations.
//!
//! This module provides a way to execute async operations in background
//! tasks while keeping the UI responsive. It uses tokio channels to
//! communicate results back to the main event loop.
//!
//! # Architecture
//!
//! The task system follows a simple pattern:
//! 1. The main loop detects a pending operation (e.g., `pending_refresh`)
//! 2. Instead of awaiting inline, it spawns a background task via `TaskSpawner`
//! 3. The main loop continues rendering and handling events
//! 4. When the task completes, it sends an `ApiMessage` through the channel
//! 5. The main loop polls the channel with `try_recv()` and handles results
//!
//! # Adding New Task Types
//!
//! To add a new async operation:
//! 1. Add a variant to `ApiMessage` for the result
//! 2. Add a spawn method to `TaskSpawner`
//! 3. Handle the message in the main event loop

use tokio::sync::mpsc;

use crate::api::types::{PagedResults, StockItem};
use crate::api::{InventoryClient, StockListQuery};
use crate::config::Profile;

/// Messages sent from background tasks to the main event loop.
///
/// Each variant represents the result of an async operation. The main loop
/// matches on these to update application state appropriately.
#[derive(Debug)]
pub enum ApiMessage {
    /// Initial client connection result
    ClientConnected(Result<InventoryClient, String>),

    /// Installed-items listing results (initial fetch or refresh)
    ItemsFetched {
        query: StockListQuery,
        result: Result<PagedResults<StockItem>, String>,
    },

    /// Pagination load more results
    LoadMoreFetched {
        query: StockListQuery,
        result: Result<PagedResults<StockItem>, String>,
    },

    /// A single stock item for the detail view
    ItemFetched {
        pk: i64,
        result: Result<StockItem, String>,
    },
}

/// Spawns background tasks for async operations.
///
/// This struct holds a channel sender and provides methods to spawn
/// various types of async operations. Each method clones the necessary
/// data and spawns a tokio task that sends its result through the channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Spawn a task to connect to the inventory server with the given profile.
    pub fn spawn_connect(&self, profile: Profile) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = InventoryClient::new(&profile)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::ClientConnected(result));
        });
    }

    /// Spawn a task to fetch the installed-items listing for a query.
    pub fn spawn_fetch_items(&self, client: &InventoryClient, query: StockListQuery) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client
                .list_installed_items(&query)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::ItemsFetched { query, result });
        });
    }

    /// Spawn a task to load the next page of a listing.
    pub fn spawn_load_more(&self, client: &InventoryClient, query: StockListQuery) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client
                .list_installed_items(&query)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::LoadMoreFetched { query, result });
        });
    }

    /// Spawn a task to fetch a single stock item for the detail view.
    pub fn spawn_fetch_item(&self, client: &InventoryClient, pk: i64) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.get_stock_item(pk).await.map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::ItemFetched { pk, result });
        });
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}

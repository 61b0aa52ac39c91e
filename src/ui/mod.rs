//! User interface components and views.
//!
//! This module contains all TUI rendering logic, including views for
//! different screens and reusable UI components.

mod components;
pub mod theme;
mod views;

pub use components::{ErrorDialog, LoadingIndicator, Notification, NotificationManager};
pub use theme::init_theme;
pub use views::{DetailAction, DetailView, InstalledItemsView, ListAction};

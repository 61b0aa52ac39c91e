//! Reusable UI components.

mod error_dialog;
mod loading;
mod notification;

pub use error_dialog::ErrorDialog;
pub use loading::LoadingIndicator;
pub use notification::{Notification, NotificationManager, NotificationType};

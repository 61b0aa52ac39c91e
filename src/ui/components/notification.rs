//! Notification/toast component for user feedback.
//!
//! Transient messages (success, error, info, warning) rendered in the
//! top-right corner and expired on tick.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// The type of notification, which determines its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Informational message (blue).
    Info,
    /// Success message (green).
    Success,
    /// Warning message (yellow).
    Warning,
    /// Error message (red).
    Error,
}

impl NotificationType {
    /// Get the icon for this notification type.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
            NotificationType::Warning => "⚠",
            NotificationType::Error => "✗",
        }
    }

    /// Get the color for this notification type.
    pub fn color(&self) -> Color {
        match self {
            NotificationType::Info => Color::Blue,
            NotificationType::Success => Color::Green,
            NotificationType::Warning => Color::Yellow,
            NotificationType::Error => Color::Red,
        }
    }
}

/// A single notification message.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The notification message.
    pub message: String,
    /// The type of notification.
    pub notification_type: NotificationType,
    /// When the notification was created.
    pub created_at: Instant,
    /// How long the notification should be displayed.
    pub duration: Duration,
}

impl Notification {
    /// Create a new notification.
    pub fn new(
        message: impl Into<String>,
        notification_type: NotificationType,
        duration: Duration,
    ) -> Self {
        Self {
            message: message.into(),
            notification_type,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Create an info notification with default duration (3 seconds).
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info, Duration::from_secs(3))
    }

    /// Create a success notification with default duration (3 seconds).
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Success, Duration::from_secs(3))
    }

    /// Create a warning notification with default duration (5 seconds).
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Warning, Duration::from_secs(5))
    }

    /// Create an error notification with default duration (5 seconds).
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error, Duration::from_secs(5))
    }

    /// Check if the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

/// Maximum number of notifications rendered at once.
const MAX_VISIBLE: usize = 3;

/// Manages multiple notifications.
#[derive(Debug, Default)]
pub struct NotificationManager {
    /// Queue of notifications, newest at the back.
    notifications: VecDeque<Notification>,
}

impl NotificationManager {
    /// Create a new notification manager.
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
        }
    }

    /// Push a notification.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Add an info notification.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::info(message));
    }

    /// Add a success notification.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::success(message));
    }

    /// Add a warning notification.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::warning(message));
    }

    /// Add an error notification.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Check if there are no pending notifications.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Drop expired notifications. Call once per tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    /// Remove all notifications.
    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    /// Render the most recent notifications in the top-right corner.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible: Vec<&Notification> = self
            .notifications
            .iter()
            .rev()
            .take(MAX_VISIBLE)
            .collect();

        let width = area.width.min(44);
        let mut y = area.y + 1;

        for notification in visible.into_iter().rev() {
            let height = 3;
            if y + height > area.y + area.height {
                break;
            }

            let rect = Rect {
                x: area.x + area.width.saturating_sub(width + 1),
                y,
                width,
                height,
            };

            let color = notification.notification_type.color();
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", notification.notification_type.icon()),
                    Style::default().fg(color),
                ),
                Span::raw(notification.message.clone()),
            ]);

            let paragraph = Paragraph::new(line).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );

            frame.render_widget(Clear, rect);
            frame.render_widget(paragraph, rect);

            y += height;
        }
    }
}

//! Transient, self-expiring operator notifications.
//!
//! Producers push a message with a level and forget about it. Each entry
//! carries its creation time and a time-to-live; [`NotificationBus::prune`]
//! drops expired entries. The bus only decides *what* is visible; how a
//! notification looks is up to the rendering layer.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Default lifetime of a notification.
pub const DEFAULT_TTL_MS: u64 = 5_000;

/// Severity / styling of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl Notification {
    /// Whether the notification is past its lifetime at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at + self.ttl
    }
}

/// Fire-and-forget notification queue.
#[derive(Debug)]
pub struct NotificationBus {
    entries: VecDeque<Notification>,
    ttl: Duration,
    next_id: u64,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::with_ttl_ms(DEFAULT_TTL_MS)
    }
}

impl NotificationBus {
    /// Create a bus whose notifications live for `ttl_ms` milliseconds.
    pub fn with_ttl_ms(ttl_ms: u64) -> Self {
        Self {
            entries: VecDeque::new(),
            ttl: Duration::milliseconds(i64::from(u32::try_from(ttl_ms).unwrap_or(u32::MAX))),
            next_id: 1,
        }
    }

    /// Push a notification stamped with the current time. Returns its id.
    pub fn push(&mut self, level: Level, message: impl Into<String>) -> u64 {
        self.push_at(level, message, Utc::now())
    }

    /// Push a notification stamped with an explicit time.
    pub fn push_at(&mut self, level: Level, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();

        tracing::debug!(id, %level, %message, "notification");

        self.entries.push_back(Notification {
            id,
            level,
            message,
            created_at: now,
            ttl: self.ttl,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Level::Success, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(Level::Info, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(Level::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(Level::Error, message)
    }

    /// Remove a notification before it expires. Returns `false` if it was
    /// already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Drop every notification that has expired at `now`.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| !n.is_expired(now));
        before - self.entries.len()
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.entries.iter().filter(|n| !n.is_expired(now)).collect()
    }

    /// Every retained notification, oldest first, regardless of expiry.
    pub fn all(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Notifications with an id greater than `after`, oldest first.
    pub fn since(&self, after: u64) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(move |n| n.id > after)
    }

    /// The most recently pushed notification that is still retained.
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! In-memory log of user-facing stream events.
//!
//! Entries are kept newest first and are never evicted. Nothing is persisted.
use std::{collections::VecDeque, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Kind of event a [`Notification`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A stream was created.
    StreamCreated,
    /// Vested tokens were claimed.
    TokensClaimed,
    /// A stream was cancelled.
    StreamCancelled,
    /// A stream was edited.
    StreamEdited,
}

impl NotificationKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [
        Self::StreamCreated,
        Self::TokensClaimed,
        Self::StreamCancelled,
        Self::StreamEdited,
    ];

    /// Wire name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StreamCreated => "stream_created",
            Self::TokensClaimed => "tokens_claimed",
            Self::StreamCancelled => "stream_cancelled",
            Self::StreamEdited => "stream_edited",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let reason = format!("unknown notification type `{s}`");
                Error::invalid_input(reason)
            })
    }
}

/// One entry of the [`NotificationLog`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier, unique within the log.
    pub id: u64,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Creation instant, Unix seconds.
    pub timestamp: u64,
    /// Whether the user has seen it. Only ever goes from `false` to `true`.
    pub read: bool,
}

/// Selection applied by [`NotificationLog::filter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationFilter {
    /// Every entry.
    #[default]
    All,
    /// Entries of one kind.
    Kind(NotificationKind),
}

impl NotificationFilter {
    fn matches(self, notification: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => notification.kind == kind,
        }
    }
}

impl FromStr for NotificationFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse().map(Self::Kind)
    }
}

/// Append-only notification list, newest first.
#[derive(Clone, Debug, Default)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    next_id: u64,
}

impl NotificationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends an unread notification and returns its id.
    pub fn record(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push_front(Notification {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            timestamp,
            read: false,
        });
        id
    }

    /// Marks notification `id` as read. Unknown ids are ignored.
    pub fn mark_read(&mut self, id: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|n| n.id == id) {
            entry.read = true;
        }
    }

    /// Entries selected by `filter`, newest first.
    pub fn filter(
        &self,
        filter: NotificationFilter,
    ) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(move |n| filter.matches(n))
    }

    /// Number of unread entries.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Session store for capture sessions.
//!
//! Sessions live only in process memory; a restart drops them, which is an
//! accepted non-goal. The store is a sharded map so disjoint conversations
//! never contend, while per-key mutation stays sequential because the
//! transport delivers one event at a time per conversation.

use crate::events::{MediaKind, MessageRef};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Identifies the owner of a capture session: one user in one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Conversation (chat) identifier.
    pub chat_id: i64,
    /// User identifier within the conversation.
    pub user_id: i64,
}

impl SessionKey {
    /// Create a session key.
    #[must_use]
    pub const fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.user_id)
    }
}

/// Lifecycle state of a capture session.
///
/// `Absent` is a first-class state: a store lookup for a key with no record
/// reports it explicitly instead of leaving absence to mean something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session exists for the key.
    #[default]
    Absent,
    /// Session is accepting file events.
    Collecting,
    /// Session has been taken for replay and will be discarded after.
    Flushing,
}

/// One captured file reference. Immutable once created.
#[derive(Debug, Clone)]
pub struct CapturedItem {
    reference: MessageRef,
    name: String,
    received_at: DateTime<Utc>,
    kind: MediaKind,
}

impl CapturedItem {
    /// Create a captured item.
    #[must_use]
    pub fn new(
        reference: MessageRef,
        name: impl Into<String>,
        kind: MediaKind,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reference,
            name: name.into(),
            received_at,
            kind,
        }
    }

    /// Handle for replaying the underlying message.
    #[must_use]
    pub const fn reference(&self) -> MessageRef {
        self.reference
    }

    /// Inferred name, used as the sort key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the item was received.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Kind of media.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// A capture session for one (chat, user) pair.
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    items: Vec<CapturedItem>,
    state: SessionState,
    started_at: DateTime<Utc>,
}

impl Session {
    fn new(key: SessionKey) -> Self {
        Self {
            key,
            items: Vec::new(),
            state: SessionState::Collecting,
            started_at: Utc::now(),
        }
    }

    /// The owning key.
    #[must_use]
    pub const fn key(&self) -> SessionKey {
        self.key
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CapturedItem] {
        &self.items
    }

    /// Number of captured items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// When the session was opened.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Mark the session as flushing. Items are frozen from here on.
    pub const fn begin_flush(&mut self) {
        self.state = SessionState::Flushing;
    }

    /// Consume the session, yielding its items in insertion order.
    #[must_use]
    pub fn into_items(self) -> Vec<CapturedItem> {
        self.items
    }
}

/// Sharded in-memory store mapping session keys to active sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionKey, Session>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the state for a key; `Absent` when no record exists.
    #[must_use]
    pub fn state(&self, key: SessionKey) -> SessionState {
        self.sessions
            .get(&key)
            .map_or(SessionState::Absent, |s| s.state())
    }

    /// Open a session for the key.
    ///
    /// Returns `false` without touching the existing record when one is
    /// already active.
    pub fn begin(&self, key: SessionKey) -> bool {
        match self.sessions.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Session::new(key));
                debug!(%key, "capture session opened");
                true
            }
        }
    }

    /// Append an item to a collecting session.
    ///
    /// Returns the new item count, or `None` when there is no collecting
    /// session for the key.
    pub fn append(&self, key: SessionKey, item: CapturedItem) -> Option<usize> {
        let mut session = self.sessions.get_mut(&key)?;
        if session.state() != SessionState::Collecting {
            return None;
        }
        session.items.push(item);
        Some(session.items.len())
    }

    /// Remove and return the session for the key, if any.
    ///
    /// Used both by abort and by finish; the finish path removes the session
    /// before replaying so events arriving mid-flush observe `Absent`.
    pub fn take(&self, key: SessionKey) -> Option<Session> {
        let (_, session) = self.sessions.remove(&key)?;
        debug!(%key, items = session.item_count(), "capture session removed");
        Some(session)
    }

    /// Number of currently active sessions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

//! Inbound events for the capture engine.
//!
//! The transport adapter decodes each update into one of these variants
//! exactly once, so the engine pattern-matches over a closed set instead of
//! probing optional message attributes.

use crate::session::SessionKey;
use chrono::{DateTime, Utc};

/// Opaque handle to an already-delivered message.
///
/// The transport must be able to re-emit the referenced message into the
/// same conversation later; nothing else is ever done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub i64);

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of captured media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Document or generic file.
    Document,
    /// Photo.
    Photo,
    /// Video file.
    Video,
    /// Audio file or music.
    Audio,
    /// Voice note.
    Voice,
    /// Animation (GIF).
    Animation,
}

impl MediaKind {
    /// Whether this kind can carry an explicit file-name attribute.
    #[must_use]
    pub const fn carries_file_name(self) -> bool {
        matches!(
            self,
            Self::Document | Self::Video | Self::Audio | Self::Animation
        )
    }

    /// Label used when synthesizing a name for an unnamed upload.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Voice => "voice",
            _ => "media",
        }
    }

    /// Stable lowercase name, for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Animation => "animation",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file-bearing message received while a chat may be capturing.
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// Session key of the sender in this conversation.
    pub key: SessionKey,
    /// Handle for replaying the message later.
    pub reference: MessageRef,
    /// Kind of media the message carries.
    pub kind: MediaKind,
    /// Explicit file name, when the media kind carries one.
    pub file_name: Option<String>,
    /// Caption attached to the message, if any.
    pub caption: Option<String>,
    /// When the message was sent; current time is used when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl FileEvent {
    /// Create a file event with no name, caption, or timestamp.
    #[must_use]
    pub const fn new(key: SessionKey, reference: MessageRef, kind: MediaKind) -> Self {
        Self {
            key,
            reference,
            kind,
            file_name: None,
            caption: None,
            timestamp: None,
        }
    }

    /// Set the explicit file name.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Set the caption.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the message timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }
}

/// An inbound event dispatched to the capture engine.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// Open a capture session for the given key.
    StartSession(SessionKey),
    /// Discard the active session without flushing.
    Abort(SessionKey),
    /// Close the active session, sort, and replay.
    Finish(SessionKey),
    /// A file-bearing message arrived.
    FileUploaded(FileEvent),
}

impl InboundEvent {
    /// The session key this event targets.
    #[must_use]
    pub const fn key(&self) -> SessionKey {
        match self {
            Self::StartSession(key) | Self::Abort(key) | Self::Finish(key) => *key,
            Self::FileUploaded(event) => event.key,
        }
    }
}

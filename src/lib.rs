//! Sortbot - a Telegram bot that collects uploaded files and forwards them
//! back in natural-sort order.
//!
//! The bot runs a small capture workflow: `/first` opens a capture session,
//! every file sent afterwards is appended to it, and `/last` re-emits the
//! collected messages into the same chat sorted alphabetically (natural
//! order, so `file2` comes before `file10`) by inferred file name.
//!
//! # Architecture
//!
//! - **Session Store** ([`session`]) - sharded in-memory map from
//!   (chat, user) to the active capture session
//! - **Engine** ([`engine`]) - the capture/flush state machine driven by
//!   inbound events
//! - **Transport** ([`transport`]) - outbound boundary: status replies and
//!   message replay
//! - **Telegram** ([`telegram`]) - teloxide adapter that decodes updates
//!   into the closed inbound event set
//!
//! The bot never downloads file bytes; it only reorders references to
//! messages Telegram has already delivered.

// Core modules
pub mod config;
pub mod copy;
pub mod engine;
pub mod error;
pub mod events;
pub mod naming;
pub mod natsort;
pub mod pacer;
pub mod session;
pub mod telegram;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{
        BotError, ConfigError, ConfigResult, Result, TransportError, TransportResult,
    };

    // Config
    pub use crate::config::{BotConfig, config_path, init_config, load_config, save_config};

    // Events
    pub use crate::events::{FileEvent, InboundEvent, MediaKind, MessageRef};

    // Engine
    pub use crate::engine::{CaptureEngine, EventOutcome};

    // Naming and ordering
    pub use crate::naming::infer_name;
    pub use crate::natsort::{SortKey, sort_key};

    // Pacing
    pub use crate::pacer::{IntervalPacer, NoPacer, Pacer};

    // Session
    pub use crate::session::{CapturedItem, Session, SessionKey, SessionState, SessionStore};

    // Transport
    pub use crate::telegram::{TelegramChannel, TelegramChannelConfig, TelegramTransport};
    pub use crate::transport::{MessageFormat, Transport};
}

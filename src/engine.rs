//! Capture/flush engine.
//!
//! Drives the session state machine: `/first` opens a session, file events
//! append to it, `/last` sorts and replays, `/cancel` discards. The engine
//! processes one event at a time per session key; the transport serializes
//! delivery per conversation, so no per-key locking happens here beyond the
//! store's own sharding.

use crate::copy;
use crate::error::Result;
use crate::events::{FileEvent, InboundEvent};
use crate::naming::{self, infer_name};
use crate::natsort::sort_key;
use crate::pacer::{IntervalPacer, Pacer};
use crate::session::{CapturedItem, SessionKey, SessionState, SessionStore};
use crate::transport::{MessageFormat, Transport};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// What an event did, surfaced for logging and tests.
///
/// These are the user-facing conditions of the workflow; none of them is a
/// fault, and all of them except `IgnoredNoSession` produce a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A new capture session was opened.
    Started,
    /// `/first` while a session was already collecting; nothing changed.
    AlreadyActive,
    /// A file was appended to the session.
    Captured {
        /// The inferred name echoed back to the user.
        name: String,
    },
    /// A file arrived with no session in progress; silently dropped.
    IgnoredNoSession,
    /// `/last` or `/cancel` with no session in progress.
    NoActiveSession,
    /// The session was aborted; nothing replayed.
    Cancelled {
        /// Items discarded with the session.
        discarded: usize,
    },
    /// `/last` on a session that captured nothing; discarded.
    EmptySession,
    /// The session was flushed.
    Flushed {
        /// Items captured in the session; this is the count reported back.
        total: usize,
        /// Items whose replay actually succeeded.
        replayed: usize,
    },
}

/// The capture/flush engine.
pub struct CaptureEngine<T> {
    store: Arc<SessionStore>,
    transport: Arc<T>,
    pacer: Box<dyn Pacer>,
}

impl<T> std::fmt::Debug for CaptureEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEngine").finish_non_exhaustive()
    }
}

impl<T: Transport> CaptureEngine<T> {
    /// Create an engine with the default replay pacing.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, transport: Arc<T>) -> Self {
        Self::with_pacer(store, transport, IntervalPacer::default())
    }

    /// Create an engine with a custom pacing policy.
    #[must_use]
    pub fn with_pacer(
        store: Arc<SessionStore>,
        transport: Arc<T>,
        pacer: impl Pacer + 'static,
    ) -> Self {
        Self {
            store,
            transport,
            pacer: Box::new(pacer),
        }
    }

    /// The session store backing this engine.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Dispatch one inbound event.
    ///
    /// Reply failures propagate to the caller; every other condition is
    /// resolved into an [`EventOutcome`].
    pub async fn handle(&self, event: InboundEvent) -> Result<EventOutcome> {
        match event {
            InboundEvent::StartSession(key) => self.start_session(key).await,
            InboundEvent::Abort(key) => self.abort(key).await,
            InboundEvent::Finish(key) => self.finish(key).await,
            InboundEvent::FileUploaded(file) => self.capture_file(file).await,
        }
    }

    async fn start_session(&self, key: SessionKey) -> Result<EventOutcome> {
        if self.store.state(key) == SessionState::Collecting {
            self.reply(key, copy::ALREADY_CAPTURING, MessageFormat::Plain)
                .await?;
            return Ok(EventOutcome::AlreadyActive);
        }

        self.store.begin(key);
        info!(%key, "capture started");
        self.reply(key, copy::FIRST_STARTED, MessageFormat::Markdown)
            .await?;
        Ok(EventOutcome::Started)
    }

    async fn abort(&self, key: SessionKey) -> Result<EventOutcome> {
        let Some(session) = self.store.take(key) else {
            self.reply(key, copy::NOT_CAPTURING, MessageFormat::Plain)
                .await?;
            return Ok(EventOutcome::NoActiveSession);
        };

        let discarded = session.item_count();
        info!(%key, discarded, "capture cancelled");
        self.reply(key, copy::CANCEL_OK, MessageFormat::Plain)
            .await?;
        Ok(EventOutcome::Cancelled { discarded })
    }

    async fn capture_file(&self, file: FileEvent) -> Result<EventOutcome> {
        let key = file.key;
        if self.store.state(key) != SessionState::Collecting {
            // No session to append to; stay quiet so stray uploads in a
            // group chat do not trigger bot chatter.
            return Ok(EventOutcome::IgnoredNoSession);
        }

        let name = infer_name(&file);
        let item = CapturedItem::new(
            file.reference,
            name.clone(),
            file.kind,
            file.timestamp.unwrap_or_else(Utc::now),
        );

        let Some(count) = self.store.append(key, item) else {
            return Ok(EventOutcome::IgnoredNoSession);
        };

        info!(%key, name = %name, kind = %file.kind, count, "file captured");
        let text = if name == naming::FALLBACK_NAME {
            copy::file_received_noname(&name)
        } else {
            copy::file_received(&name)
        };
        self.reply(key, &text, MessageFormat::Markdown).await?;
        Ok(EventOutcome::Captured { name })
    }

    async fn finish(&self, key: SessionKey) -> Result<EventOutcome> {
        // Remove the session up front: events arriving mid-flush observe
        // Absent, and a failed flush never leaves a half-consumed session.
        let Some(mut session) = self.store.take(key) else {
            self.reply(key, copy::NOT_CAPTURING, MessageFormat::Plain)
                .await?;
            return Ok(EventOutcome::NoActiveSession);
        };
        session.begin_flush();

        let total = session.item_count();
        if total == 0 {
            self.reply(key, copy::LAST_NONE, MessageFormat::Plain)
                .await?;
            return Ok(EventOutcome::EmptySession);
        }

        self.reply(key, &copy::last_processing(total), MessageFormat::Markdown)
            .await?;

        let mut items = session.into_items();
        items.sort_by_cached_key(|item| sort_key(item.name()));

        let mut replayed = 0usize;
        for (index, item) in items.iter().enumerate() {
            match self
                .transport
                .replay_message(key.chat_id, item.reference())
                .await
            {
                Ok(()) => replayed += 1,
                // Best-effort delivery: one failed replay is skipped and the
                // rest of the session still goes out.
                Err(e) => warn!(
                    %key,
                    reference = %item.reference(),
                    name = %item.name(),
                    error = %e,
                    "replay failed; skipping"
                ),
            }
            if index + 1 < items.len() {
                self.pacer.pause().await;
            }
        }

        info!(%key, total, replayed, "capture flushed");
        // The reported count is the captured total, not the replayed count.
        self.reply(key, &copy::last_done(total), MessageFormat::Markdown)
            .await?;
        Ok(EventOutcome::Flushed { total, replayed })
    }

    async fn reply(&self, key: SessionKey, text: &str, format: MessageFormat) -> Result<()> {
        self.transport.reply_text(key.chat_id, text, format).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportResult};
    use crate::events::{MediaKind, MessageRef};
    use crate::pacer::NoPacer;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Transport that records every outbound call; selected references fail
    /// their replay.
    #[derive(Default)]
    struct RecordingTransport {
        replies: Mutex<Vec<(i64, String)>>,
        replays: Mutex<Vec<(i64, i64)>>,
        failing_refs: Mutex<HashSet<i64>>,
    }

    impl RecordingTransport {
        fn fail_reference(&self, reference: i64) {
            self.failing_refs.lock().unwrap().insert(reference);
        }

        fn replies(&self) -> Vec<String> {
            self.replies
                .lock()
                .unwrap()
                .iter()
                .map(|(_, text)| text.clone())
                .collect()
        }

        fn replayed_refs(&self) -> Vec<i64> {
            self.replays
                .lock()
                .unwrap()
                .iter()
                .map(|(_, reference)| *reference)
                .collect()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn reply_text(
            &self,
            chat_id: i64,
            text: &str,
            _format: MessageFormat,
        ) -> TransportResult<()> {
            self.replies.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }

        async fn replay_message(
            &self,
            chat_id: i64,
            reference: MessageRef,
        ) -> TransportResult<()> {
            if self.failing_refs.lock().unwrap().contains(&reference.0) {
                return Err(TransportError::replay("message is gone"));
            }
            self.replays.lock().unwrap().push((chat_id, reference.0));
            Ok(())
        }
    }

    fn engine() -> (CaptureEngine<RecordingTransport>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let engine = CaptureEngine::with_pacer(
            Arc::new(SessionStore::new()),
            Arc::clone(&transport),
            NoPacer,
        );
        (engine, transport)
    }

    fn upload(key: SessionKey, reference: i64, name: &str) -> InboundEvent {
        InboundEvent::FileUploaded(
            FileEvent::new(key, MessageRef(reference), MediaKind::Document)
                .with_file_name(name),
        )
    }

    const KEY: SessionKey = SessionKey::new(100, 200);

    #[tokio::test]
    async fn test_start_twice_reports_already_active() {
        let (engine, _) = engine();

        assert_eq!(engine.handle(InboundEvent::StartSession(KEY)).await.unwrap(), EventOutcome::Started);
        engine.handle(upload(KEY, 1, "a.txt")).await.unwrap();

        let outcome = engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::AlreadyActive);

        // The first session's items are untouched.
        let outcome = engine.handle(InboundEvent::Finish(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::Flushed { total: 1, replayed: 1 });
    }

    #[tokio::test]
    async fn test_file_without_session_is_silently_ignored() {
        let (engine, transport) = engine();

        let outcome = engine.handle(upload(KEY, 1, "a.txt")).await.unwrap();
        assert_eq!(outcome, EventOutcome::IgnoredNoSession);
        assert!(transport.replies().is_empty());
    }

    #[tokio::test]
    async fn test_capture_echoes_inferred_name() {
        let (engine, transport) = engine();
        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();

        let outcome = engine.handle(upload(KEY, 1, "  notes  v1.md ")).await.unwrap();
        assert_eq!(outcome, EventOutcome::Captured { name: "notes v1.md".into() });
        assert!(transport.replies().last().unwrap().contains("notes v1.md"));
    }

    #[tokio::test]
    async fn test_fallback_name_gets_assigned_wording() {
        let (engine, transport) = engine();
        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();

        let event = InboundEvent::FileUploaded(
            FileEvent::new(KEY, MessageRef(1), MediaKind::Photo).with_caption("   "),
        );
        let outcome = engine.handle(event).await.unwrap();
        assert_eq!(outcome, EventOutcome::Captured { name: "unnamed".into() });
        assert!(transport.replies().last().unwrap().contains("assigned"));
    }

    #[tokio::test]
    async fn test_finish_replays_in_natural_order() {
        let (engine, transport) = engine();
        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();

        for (reference, name) in [(1, "b.txt"), (2, "a.txt"), (3, "10.txt"), (4, "2.txt")] {
            engine.handle(upload(KEY, reference, name)).await.unwrap();
        }

        let outcome = engine.handle(InboundEvent::Finish(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::Flushed { total: 4, replayed: 4 });

        // 2.txt, 10.txt, a.txt, b.txt
        assert_eq!(transport.replayed_refs(), vec![4, 3, 2, 1]);
        assert_eq!(engine.store().state(KEY), SessionState::Absent);
    }

    #[tokio::test]
    async fn test_finish_without_session() {
        let (engine, transport) = engine();

        let outcome = engine.handle(InboundEvent::Finish(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::NoActiveSession);
        assert_eq!(transport.replies(), vec![copy::NOT_CAPTURING.to_string()]);
    }

    #[tokio::test]
    async fn test_finish_with_no_items_discards_quietly() {
        let (engine, transport) = engine();
        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();

        let outcome = engine.handle(InboundEvent::Finish(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::EmptySession);
        assert!(transport.replayed_refs().is_empty());
        assert_eq!(engine.store().state(KEY), SessionState::Absent);
        assert!(transport.replies().last().unwrap().contains("didn\u{2019}t receive"));
    }

    #[tokio::test]
    async fn test_abort_discards_without_replaying() {
        let (engine, transport) = engine();
        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();
        for reference in 1..=3 {
            engine.handle(upload(KEY, reference, "x.txt")).await.unwrap();
        }

        let outcome = engine.handle(InboundEvent::Abort(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::Cancelled { discarded: 3 });
        assert!(transport.replayed_refs().is_empty());
        assert_eq!(engine.store().state(KEY), SessionState::Absent);
    }

    #[tokio::test]
    async fn test_replay_failure_is_skipped_and_count_unchanged() {
        let (engine, transport) = engine();
        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();

        for reference in 1..=5 {
            let name = format!("file{reference}.txt");
            engine.handle(upload(KEY, reference, &name)).await.unwrap();
        }
        transport.fail_reference(3);

        let outcome = engine.handle(InboundEvent::Finish(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::Flushed { total: 5, replayed: 4 });

        assert_eq!(transport.replayed_refs(), vec![1, 2, 4, 5]);
        // The done report still carries the original captured count.
        assert!(transport.replies().last().unwrap().contains("*5*"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_key() {
        let (engine, transport) = engine();
        let other = SessionKey::new(100, 999);

        engine.handle(InboundEvent::StartSession(KEY)).await.unwrap();
        engine.handle(InboundEvent::StartSession(other)).await.unwrap();
        engine.handle(upload(KEY, 1, "mine.txt")).await.unwrap();

        engine.handle(InboundEvent::Abort(other)).await.unwrap();
        assert_eq!(engine.store().state(KEY), SessionState::Collecting);

        let outcome = engine.handle(InboundEvent::Finish(KEY)).await.unwrap();
        assert_eq!(outcome, EventOutcome::Flushed { total: 1, replayed: 1 });
        assert_eq!(transport.replayed_refs(), vec![1]);
    }
}

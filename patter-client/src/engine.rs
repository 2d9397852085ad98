//! The sync engine: canonical in-memory feed plus its I/O reactions.
//!
//! The engine reconciles a one-time snapshot fetch with the live push
//! stream. Mutations happen in reaction to exactly three completions:
//! snapshot fetch, push delivery, and send. Each handler runs to completion;
//! the feed stays readable and unchanged while an I/O call is in flight.
//!
//! Failure semantics: snapshot fetch and send are independently
//! fault-isolated. A failure is logged at the handling site, leaves the feed
//! (and on send, the draft) in its prior state, and never terminates the
//! session. Errors are still returned as values so callers and tests can
//! observe them; [`SyncEngine::start`] shows the ignore-and-continue
//! posture.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use patter_core::{Draft, Feed};
use patter_types::{Message, SendRequest};

use crate::channel::{Channel, ChannelError};

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Snapshot load failed (network or non-2xx). The feed keeps its prior
    /// state.
    #[error("snapshot fetch failed: {0}")]
    Fetch(#[source] ChannelError),

    /// Submit failed (network or non-2xx). The draft is preserved for a
    /// manual retry.
    #[error("send failed: {0}")]
    Send(#[source] ChannelError),

    /// The push channel failed.
    #[error("push channel error: {0}")]
    Channel(#[source] ChannelError),
}

/// Configuration for [`SyncEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The label this client stamps on its own sends. Fixed for the
    /// session; supplied explicitly rather than derived from the
    /// environment.
    pub sender_identity: String,
}

impl EngineConfig {
    /// Create a configuration with the given sender identity.
    pub fn new(sender_identity: impl Into<String>) -> Self {
        Self {
            sender_identity: sender_identity.into(),
        }
    }
}

/// The message synchronization engine.
///
/// Owns the append-only feed and the outbound draft, and is the sole
/// consumer of its injected [`Channel`].
pub struct SyncEngine<C: Channel> {
    config: EngineConfig,
    channel: C,
    feed: Arc<Mutex<Feed>>,
    draft: Arc<Mutex<Draft>>,
    revision: watch::Sender<u64>,
}

impl<C: Channel> SyncEngine<C> {
    /// Create a new engine around a channel. No I/O happens until
    /// [`start`](Self::start).
    pub fn new(config: EngineConfig, channel: C) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            config,
            channel,
            feed: Arc::new(Mutex::new(Feed::new())),
            draft: Arc::new(Mutex::new(Draft::new())),
            revision,
        }
    }

    /// Start the session: open the push subscription, then load the
    /// snapshot.
    ///
    /// A snapshot failure is logged and swallowed (the session continues
    /// with an empty feed, no automatic retry); a failure to open the push
    /// subscription is returned.
    pub async fn start(&self) -> Result<(), EngineError> {
        self.channel.open().await.map_err(EngineError::Channel)?;
        if let Err(e) = self.load_snapshot().await {
            warn!("continuing without snapshot: {}", e);
        }
        Ok(())
    }

    /// Tear down the session by releasing the push subscription.
    ///
    /// In-flight request/response calls are abandoned, not cancelled.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.channel.close().await.map_err(EngineError::Channel)
    }

    /// Fetch the current full message set and replace the feed with it,
    /// dropping `null` entries. Returns the number of entries kept.
    ///
    /// This is the only full-feed overwrite in the session lifecycle. On
    /// failure the feed keeps its prior state.
    pub async fn load_snapshot(&self) -> Result<usize, EngineError> {
        let entries = match self.channel.request_snapshot().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("snapshot fetch failed: {}", e);
                return Err(EngineError::Fetch(e));
            }
        };

        let total = entries.len();
        let mut feed = self.feed.lock().await;
        let kept = feed.replace_with_snapshot(entries);
        if kept < total {
            debug!(dropped = total - kept, "dropped null snapshot entries");
        }
        self.revision.send_replace(feed.revision());
        Ok(kept)
    }

    /// Ingest one push event: `None` is discarded silently, anything else
    /// is appended at the feed tail. Returns whether the feed changed.
    ///
    /// No deduplication is performed; the contract assumes exactly-once
    /// delivery, so a server-side duplicate broadcast is visible twice.
    pub async fn on_push_message(&self, event: Option<Message>) -> bool {
        if event.is_none() {
            debug!("discarding null push event");
        }
        let mut feed = self.feed.lock().await;
        let changed = feed.ingest(event);
        if changed {
            self.revision.send_replace(feed.revision());
        }
        changed
    }

    /// Receive and ingest a single push event. Returns whether the feed
    /// changed.
    pub async fn pump_one(&self) -> Result<bool, EngineError> {
        let event = self
            .channel
            .next_event()
            .await
            .map_err(EngineError::Channel)?;
        Ok(self.on_push_message(event).await)
    }

    /// Ingest push events in delivery order until the subscription ends.
    pub async fn run(&self) -> Result<(), EngineError> {
        loop {
            match self.channel.next_event().await {
                Ok(event) => {
                    self.on_push_message(event).await;
                }
                Err(ChannelError::ConnectionClosed) => {
                    debug!("push subscription ended");
                    return Ok(());
                }
                Err(e) => {
                    warn!("push subscription failed: {}", e);
                    return Err(EngineError::Channel(e));
                }
            }
        }
    }

    /// Submit the current draft for broadcast.
    ///
    /// A blank (empty or whitespace-only) draft is a no-op. On acceptance
    /// the draft is cleared; on failure it is preserved so the user can
    /// retry. The engine never appends the sent message itself - it becomes
    /// visible only when the push channel delivers it back.
    pub async fn send(&self) -> Result<(), EngineError> {
        let mut draft = self.draft.lock().await;
        if draft.is_blank() {
            return Ok(());
        }

        let request = SendRequest::new(draft.as_str(), self.config.sender_identity.as_str());
        match self.channel.submit(&request).await {
            Ok(()) => {
                draft.clear();
                debug!("send accepted");
                Ok(())
            }
            Err(e) => {
                warn!("send failed, draft preserved: {}", e);
                Err(EngineError::Send(e))
            }
        }
    }

    /// Replace the pending outbound text.
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.draft.lock().await.set(text);
    }

    /// The pending outbound text.
    pub async fn draft(&self) -> String {
        self.draft.lock().await.as_str().to_string()
    }

    /// A point-in-time copy of the feed, in arrival order.
    pub async fn feed(&self) -> Vec<Message> {
        self.feed.lock().await.entries().to_vec()
    }

    /// Number of accepted feed entries.
    pub async fn feed_len(&self) -> usize {
        self.feed.lock().await.len()
    }

    /// Subscribe to feed revision changes.
    ///
    /// Any presentation layer can watch this instead of coupling to the
    /// engine's internals; the value is the feed revision counter.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// The label stamped on this client's sends.
    pub fn sender_identity(&self) -> &str {
        &self.config.sender_identity
    }

    /// Access the underlying channel (for testing).
    pub fn channel(&self) -> &C {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MockChannel;

    fn engine_with_mock() -> (SyncEngine<MockChannel>, MockChannel) {
        let channel = MockChannel::new();
        let engine = SyncEngine::new(EngineConfig::new("Sender 1"), channel.clone());
        (engine, channel)
    }

    fn msg(content: &str, username: &str) -> Message {
        Message::outbound(content, username)
    }

    // ===========================================
    // Startup and Teardown Tests
    // ===========================================

    #[tokio::test]
    async fn start_opens_channel_and_loads_snapshot() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![Some(msg("hi", "A")), None]);

        engine.start().await.unwrap();

        assert!(channel.is_open());
        assert_eq!(channel.open_calls(), 1);
        let feed = engine.feed().await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].content.as_deref(), Some("hi"));
        assert_eq!(feed[0].username.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn start_survives_snapshot_failure_with_empty_feed() {
        let (engine, channel) = engine_with_mock();
        channel.fail_next_snapshot("connection refused");

        engine.start().await.unwrap();

        assert!(channel.is_open());
        assert_eq!(engine.feed_len().await, 0);
    }

    #[tokio::test]
    async fn start_propagates_open_failure() {
        let (engine, channel) = engine_with_mock();
        channel.fail_next_open("network unreachable");

        let result = engine.start().await;
        assert!(matches!(
            result,
            Err(EngineError::Channel(ChannelError::ConnectionFailed(_)))
        ));
    }

    #[tokio::test]
    async fn shutdown_releases_subscription_once() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![]);
        engine.start().await.unwrap();

        engine.shutdown().await.unwrap();

        assert!(!channel.is_open());
        assert_eq!(channel.close_calls(), 1);
    }

    // ===========================================
    // Snapshot Tests
    // ===========================================

    #[tokio::test]
    async fn snapshot_failure_leaves_prior_feed_state() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![Some(msg("before", "A"))]);
        engine.load_snapshot().await.unwrap();

        channel.reject_next_snapshot(503);
        let result = engine.load_snapshot().await;

        assert!(matches!(
            result,
            Err(EngineError::Fetch(ChannelError::Rejected { status: 503 }))
        ));
        let feed = engine.feed().await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].content.as_deref(), Some("before"));
    }

    #[tokio::test]
    async fn snapshot_reports_kept_count() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![Some(msg("a", "A")), None, Some(msg("b", "B")), None]);

        let kept = engine.load_snapshot().await.unwrap();
        assert_eq!(kept, 2);
        assert_eq!(engine.feed_len().await, 2);
    }

    // ===========================================
    // Push Ingestion Tests
    // ===========================================

    #[tokio::test]
    async fn null_push_event_never_changes_feed_length() {
        let (engine, _channel) = engine_with_mock();
        engine.on_push_message(Some(msg("one", "A"))).await;

        assert!(!engine.on_push_message(None).await);
        assert_eq!(engine.feed_len().await, 1);
    }

    #[tokio::test]
    async fn pushes_append_after_snapshot_in_arrival_order() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![Some(msg("S1", "A")), Some(msg("S2", "B"))]);
        engine.start().await.unwrap();

        for content in ["A", "B", "C"] {
            channel.queue_event(Some(msg(content, "other")));
        }
        // The mock reports closed once its queue drains, ending the run.
        engine.run().await.unwrap();

        let order: Vec<_> = engine
            .feed()
            .await
            .iter()
            .map(|m| m.content.clone().unwrap())
            .collect();
        assert_eq!(order, ["S1", "S2", "A", "B", "C"]);
    }

    #[tokio::test]
    async fn run_surfaces_receive_failures() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![]);
        engine.start().await.unwrap();
        channel.fail_next_event("reset by peer");

        let result = engine.run().await;
        assert!(matches!(
            result,
            Err(EngineError::Channel(ChannelError::ReceiveFailed(_)))
        ));
    }

    #[tokio::test]
    async fn pump_one_reports_whether_feed_changed() {
        let (engine, channel) = engine_with_mock();
        channel.open().await.unwrap();
        channel.queue_event(None);
        channel.queue_event(Some(msg("hi", "A")));

        assert!(!engine.pump_one().await.unwrap());
        assert!(engine.pump_one().await.unwrap());
        assert_eq!(engine.feed_len().await, 1);
    }

    // ===========================================
    // Send Tests
    // ===========================================

    #[tokio::test]
    async fn blank_draft_send_is_a_no_op() {
        let (engine, channel) = engine_with_mock();
        engine.set_draft("   \t").await;

        engine.send().await.unwrap();

        assert!(channel.submitted().is_empty());
        assert_eq!(engine.draft().await, "   \t");
    }

    #[tokio::test]
    async fn send_success_clears_draft_without_touching_feed() {
        let (engine, channel) = engine_with_mock();
        engine.set_draft("hi").await;

        engine.send().await.unwrap();

        assert_eq!(engine.draft().await, "");
        assert_eq!(engine.feed_len().await, 0);
        assert_eq!(
            channel.last_submitted(),
            Some(SendRequest::new("hi", "Sender 1"))
        );
    }

    #[tokio::test]
    async fn send_transport_failure_preserves_draft() {
        let (engine, channel) = engine_with_mock();
        engine.set_draft("hello").await;
        channel.fail_next_submit("connection reset");

        let result = engine.send().await;

        assert!(matches!(
            result,
            Err(EngineError::Send(ChannelError::RequestFailed(_)))
        ));
        assert_eq!(engine.draft().await, "hello");
    }

    #[tokio::test]
    async fn send_rejection_preserves_draft() {
        let (engine, channel) = engine_with_mock();
        engine.set_draft("hello").await;
        channel.reject_next_submit(500);

        let result = engine.send().await;

        assert!(matches!(
            result,
            Err(EngineError::Send(ChannelError::Rejected { status: 500 }))
        ));
        assert_eq!(engine.draft().await, "hello");
    }

    #[tokio::test]
    async fn send_becomes_visible_only_via_push_echo() {
        let (engine, channel) = engine_with_mock();
        channel.queue_snapshot(vec![]);
        engine.start().await.unwrap();

        engine.set_draft("hi").await;
        engine.send().await.unwrap();
        assert_eq!(engine.feed_len().await, 0);

        // The server broadcasts the accepted message back.
        channel.queue_event(Some(msg("hi", "Sender 1")));
        engine.pump_one().await.unwrap();

        let feed = engine.feed().await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].content.as_deref(), Some("hi"));
    }

    // ===========================================
    // Change Notification Tests
    // ===========================================

    #[tokio::test]
    async fn feed_changes_are_observable_via_watch() {
        let (engine, channel) = engine_with_mock();
        let mut changes = engine.subscribe_changes();
        assert_eq!(*changes.borrow_and_update(), 0);

        channel.queue_snapshot(vec![Some(msg("hi", "A"))]);
        engine.load_snapshot().await.unwrap();

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 1);

        engine.on_push_message(Some(msg("more", "B"))).await;
        assert_eq!(*changes.borrow_and_update(), 2);

        // Null events do not notify
        engine.on_push_message(None).await;
        assert!(!changes.has_changed().unwrap());
    }

    // ===========================================
    // Configuration Tests
    // ===========================================

    #[tokio::test]
    async fn sender_identity_comes_from_config() {
        let (engine, channel) = engine_with_mock();
        assert_eq!(engine.sender_identity(), "Sender 1");

        engine.set_draft("x").await;
        engine.send().await.unwrap();
        assert_eq!(channel.last_submitted().unwrap().username, "Sender 1");
    }

    #[tokio::test]
    async fn independent_engines_do_not_share_state() {
        let (first, first_channel) = engine_with_mock();
        let second_channel = MockChannel::new();
        let second = SyncEngine::new(EngineConfig::new("Sender 2"), second_channel.clone());

        first.on_push_message(Some(msg("only-first", "A"))).await;

        assert_eq!(first.feed_len().await, 1);
        assert_eq!(second.feed_len().await, 0);
        assert!(first_channel.submitted().is_empty());
        assert!(second_channel.submitted().is_empty());
    }
}

//! Mock channel for testing.
//!
//! Allows queueing snapshots and push events, capturing submitted messages,
//! and injecting failures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use patter_types::{Message, SendRequest};

use super::{Channel, ChannelError};

/// Mock channel for testing.
///
/// Clones share state, so a test can keep a handle for verification while
/// the engine owns another.
#[derive(Debug, Default)]
pub struct MockChannel {
    inner: Arc<Mutex<MockChannelInner>>,
}

#[derive(Debug, Default)]
struct MockChannelInner {
    open: bool,
    open_calls: u32,
    close_calls: u32,
    snapshot_queue: VecDeque<Vec<Option<Message>>>,
    event_queue: VecDeque<Option<Message>>,
    submitted: Vec<SendRequest>,
    fail_next_open: Option<String>,
    fail_next_snapshot: Option<String>,
    reject_next_snapshot: Option<u16>,
    fail_next_submit: Option<String>,
    reject_next_submit: Option<u16>,
    fail_next_event: Option<String>,
}

impl MockChannel {
    /// Create a new mock channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot to be returned by the next `request_snapshot` call.
    pub fn queue_snapshot(&self, entries: Vec<Option<Message>>) {
        let mut inner = self.inner.lock().unwrap();
        inner.snapshot_queue.push_back(entries);
    }

    /// Queue a push event to be delivered by `next_event`.
    pub fn queue_event(&self, event: Option<Message>) {
        let mut inner = self.inner.lock().unwrap();
        inner.event_queue.push_back(event);
    }

    /// All requests that were submitted.
    pub fn submitted(&self) -> Vec<SendRequest> {
        let inner = self.inner.lock().unwrap();
        inner.submitted.clone()
    }

    /// The most recently submitted request.
    pub fn last_submitted(&self) -> Option<SendRequest> {
        let inner = self.inner.lock().unwrap();
        inner.submitted.last().cloned()
    }

    /// How many times `open` was called.
    pub fn open_calls(&self) -> u32 {
        self.inner.lock().unwrap().open_calls
    }

    /// How many times `close` was called.
    pub fn close_calls(&self) -> u32 {
        self.inner.lock().unwrap().close_calls
    }

    /// Cause the next `open` to fail with the given error.
    pub fn fail_next_open(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_open = Some(error.to_string());
    }

    /// Cause the next `request_snapshot` to fail at the transport level.
    pub fn fail_next_snapshot(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_snapshot = Some(error.to_string());
    }

    /// Cause the next `request_snapshot` to be rejected with a status code.
    pub fn reject_next_snapshot(&self, status: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner.reject_next_snapshot = Some(status);
    }

    /// Cause the next `submit` to fail at the transport level.
    pub fn fail_next_submit(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_submit = Some(error.to_string());
    }

    /// Cause the next `submit` to be rejected with a status code.
    pub fn reject_next_submit(&self, status: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner.reject_next_submit = Some(status);
    }

    /// Cause the next `next_event` to fail with the given error.
    pub fn fail_next_event(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_event = Some(error.to_string());
    }

    /// Clear all state (queues, captures, connection).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockChannelInner::default();
    }
}

impl Clone for MockChannel {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn open(&self) -> Result<(), ChannelError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_open.take() {
            return Err(ChannelError::ConnectionFailed(error));
        }

        inner.open = true;
        inner.open_calls += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), ChannelError> {
        let mut inner = self.inner.lock().unwrap();
        inner.open = false;
        inner.close_calls += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().unwrap().open
    }

    async fn request_snapshot(&self) -> Result<Vec<Option<Message>>, ChannelError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_snapshot.take() {
            return Err(ChannelError::RequestFailed(error));
        }
        if let Some(status) = inner.reject_next_snapshot.take() {
            return Err(ChannelError::Rejected { status });
        }

        inner
            .snapshot_queue
            .pop_front()
            .ok_or_else(|| ChannelError::RequestFailed("no snapshot queued".to_string()))
    }

    async fn submit(&self, request: &SendRequest) -> Result<(), ChannelError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_submit.take() {
            return Err(ChannelError::RequestFailed(error));
        }
        if let Some(status) = inner.reject_next_submit.take() {
            return Err(ChannelError::Rejected { status });
        }

        inner.submitted.push(request.clone());
        Ok(())
    }

    async fn next_event(&self) -> Result<Option<Message>, ChannelError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.open {
            return Err(ChannelError::NotConnected);
        }

        if let Some(error) = inner.fail_next_event.take() {
            return Err(ChannelError::ReceiveFailed(error));
        }

        inner
            .event_queue
            .pop_front()
            .ok_or(ChannelError::ConnectionClosed)
    }
}

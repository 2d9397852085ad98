//! Channel abstraction for the chat server.
//!
//! A channel owns exactly one push subscription for the session lifetime
//! and routes outbound calls through a request/response pair. The engine
//! receives its channel at construction and drives the lifecycle
//! explicitly: `open` once at session start, `close` once at teardown.
//!
//! # Design
//!
//! The push side is pull-shaped: the consumer awaits [`Channel::next_event`]
//! for each delivery, so events are processed strictly in transport order.
//! The request side (`request_snapshot`, `submit`) is stateless and usable
//! before `open`.

mod http;
mod mock;

pub use http::{HttpChannel, HttpChannelConfig};
pub use mock::MockChannel;

use async_trait::async_trait;
use thiserror::Error;

use patter_types::{Message, SendRequest, WireError};

/// Channel errors.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Establishing the push subscription failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The push subscription is not open.
    #[error("not connected")]
    NotConnected,

    /// The push subscription ended.
    #[error("connection closed")]
    ConnectionClosed,

    /// A request/response call failed at the transport level.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The server answered a request with a non-2xx status.
    #[error("request rejected with status {status}")]
    Rejected {
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// Receiving from the push subscription failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A payload did not decode against the wire contract.
    #[error("decode failed: {0}")]
    Decode(#[from] WireError),
}

/// Transport over the chat server's request and push surfaces.
///
/// Implementations own the underlying connection mechanism (HTTP +
/// WebSocket, mock, etc). In-flight request/response calls are abandoned on
/// teardown, never cancelled.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Establish the push subscription. Called once per session.
    async fn open(&self) -> Result<(), ChannelError>;

    /// Release the push subscription. Called once on session teardown.
    async fn close(&self) -> Result<(), ChannelError>;

    /// Whether the push subscription is currently established.
    fn is_open(&self) -> bool;

    /// One-shot fetch of the full current message set.
    ///
    /// `null` entries are passed through for the caller to filter.
    async fn request_snapshot(&self) -> Result<Vec<Option<Message>>, ChannelError>;

    /// One-shot submission of a message for broadcast.
    ///
    /// Success means the server accepted the message; it gives no guarantee
    /// about when the corresponding push event arrives.
    async fn submit(&self, request: &SendRequest) -> Result<(), ChannelError>;

    /// Await the next push event on the `message` topic.
    ///
    /// A `None` event is a well-formed null delivery. Returns
    /// [`ChannelError::ConnectionClosed`] once the subscription ends.
    async fn next_event(&self) -> Result<Option<Message>, ChannelError>;
}

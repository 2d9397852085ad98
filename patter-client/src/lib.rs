//! # patter-client
//!
//! Client library for the patter real-time chat feed.
//!
//! The crate has two halves:
//!
//! - [`Channel`]: ownership of the session's single push subscription plus
//!   the one-shot request/response calls (snapshot fetch, submit).
//!   [`HttpChannel`] talks to a real server; [`MockChannel`] drives tests.
//! - [`SyncEngine`]: the canonical in-memory feed. It loads the snapshot
//!   once, ingests live push events, routes outbound sends, and publishes a
//!   feed revision for any presentation layer to watch.
//!
//! ## Example
//!
//! ```ignore
//! use patter_client::{EngineConfig, HttpChannel, HttpChannelConfig, SyncEngine};
//!
//! let channel = HttpChannel::new(HttpChannelConfig::new("http://localhost:5000"));
//! let engine = SyncEngine::new(EngineConfig::new("Sender 1"), channel);
//!
//! engine.start().await?;
//! engine.set_draft("hello").await;
//! engine.send().await?;
//! engine.run().await?; // ingest push events until the channel closes
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod engine;

pub use channel::{Channel, ChannelError, HttpChannel, HttpChannelConfig, MockChannel};
pub use engine::{EngineConfig, EngineError, SyncEngine};

//! # patter-types
//!
//! Wire format types for the patter chat server contract.
//!
//! The server speaks JSON on all three surfaces: the snapshot endpoint
//! (`GET /messages`), the send endpoint (`POST /send`), and the push
//! channel (`{type, payload}` frames on the `message` topic). This crate
//! holds the shared shapes so the client and any tooling agree on them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod message;
pub mod wire;

pub use error::WireError;
pub use message::Message;
pub use wire::{parse_snapshot, PushFrame, SendRequest};

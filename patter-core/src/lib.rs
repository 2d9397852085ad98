//! # patter-core
//!
//! Pure feed logic for patter (no I/O, instant tests).
//!
//! This crate implements the state containers and display rules of the chat
//! feed without any network I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce
//! output without side effects. The actual I/O (snapshot fetch, send, push
//! subscription) is performed by `patter-client`, which feeds results into
//! these containers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod display;
pub mod draft;
pub mod feed;

pub use display::{
    content_text, format_timestamp, sender_label, EMPTY_CONTENT, INVALID_DATE, NO_DATE,
    UNKNOWN_SENDER,
};
pub use draft::Draft;
pub use feed::Feed;

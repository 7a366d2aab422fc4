//! vidwire core: value codec, record schemas, envelopes, and error types.
//!
//! This crate defines the wire-level contracts shared by the host dispatcher
//! and the client invoker. It carries no transport or runtime dependencies so
//! either side can embed it.
//!
//! # Panic policy
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `VidwireError`/`Result` so a malformed
//! message fails that one call and nothing else.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod codec;
pub mod error;
pub mod protocol;
pub mod schema;

/// Shared result type.
pub use error::{ErrorCode, Result, VidwireError};

//! Error types for the whisper-link crate.
//!
//! The wire-level protocol has almost no user-visible error surface by
//! design: desyncs resync silently, duplicates are suppressed, stale
//! ACKs are ignored. The one place a caller can get a `Result` back is
//! construction, where a receive buffer too small to ever hold a
//! minimal frame is a programmer error worth catching early.

use thiserror::Error;

/// Errors that can occur while configuring a [`crate::Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The receive buffer capacity is too small to hold even a zero-payload
    /// frame (prefix + header + checksum = 8 bytes).
    #[error("receive buffer capacity {capacity} is smaller than the minimum frame size {minimum}")]
    BufferTooSmall { capacity: usize, minimum: usize },
}

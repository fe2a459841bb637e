//! Ambient typed-error surface.
//!
//! This never changes the allocator's hot-path contract (`Option`/`void` only,
//! per the caller contract documented on [`crate::router::SizeRouter`] and
//! [`crate::pool::SlabPool`]): `PoolError` only backs the opt-in, non-hot-path
//! construction APIs and the structured fields on `tracing` error events.

use thiserror::Error;

/// Errors surfaced by the opt-in, `Result`-returning construction paths.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PoolError {
  /// `grow_one_block` exhausted its retry budget against the system allocator.
  #[error("block growth failed after {attempts} attempts")]
  BlockGrowthExhausted {
    /// Number of `posix_memalign`/`aligned_alloc` attempts made.
    attempts: u32,
  },

  /// A [`crate::config::SizeClassConfig`] failed validation.
  #[error("invalid size-class configuration: {reason}")]
  InvalidConfig {
    /// Human-readable reason the configuration was rejected.
    reason: &'static str,
  },
}

//! Playback reconciliation engine.
//!
//! Keeps an external media player embed converged on application intent.
//! The embed is asynchronous and occasionally desynchronized: loads do not
//! take effect instantly, seeks can silently fail, and play commands can be
//! ignored while buffering. Everything here is built around re-observing
//! the embed and issuing at most one corrective action at a time.

/// Completion and error-driven advancement detection
pub mod advance;
/// Engine service tying sampling, reconciliation, and sync together
pub mod engine;
/// Playback error types
pub mod error;
/// Media player capability trait
pub mod handle;
/// Media identifier extraction from hosting URLs
pub mod media_id;
/// Retrying state-convergence protocol
pub mod reconcile;
/// Polling snapshot sampler
pub mod sampler;
/// Intent/state synchronization
pub mod sync;
/// Playback types
pub mod types;

#[cfg(test)]
mod tests;

pub use advance::AdvanceSignal;
pub use engine::PlaybackEngine;
pub use error::PlaybackError;
pub use handle::{MediaHandle, PlayerErrorEvent};
pub use reconcile::{ReconcileFailure, ReconcileOutcome, ReconcileStep, reconcile};
pub use types::{
    MediaId, MediaItem, PlaybackIntent, PlaybackTarget, PlayerSnapshot, PlayerState, Volume,
};

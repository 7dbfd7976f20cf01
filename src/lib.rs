//! Playhead - Playback synchronization engine for embedded media players.
//!
//! Playhead keeps an external, asynchronous media player embed converged on
//! application intent: which item to play, where its playhead should be,
//! whether it is playing, and how loud. The main features include:
//!
//! - A capability trait abstracting the player embed
//! - A retrying reconciliation state machine with supersession handling
//! - An adaptive-interval snapshot sampler
//! - Completion and error-driven queue advancement signals
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use playhead::config::PlaybackConfig;
//! use playhead::services::playback::PlaybackEngine;
//!
//! // Create an engine with default thresholds
//! let engine = PlaybackEngine::new(PlaybackConfig::default());
//!
//! // Subscribe to queue advancement requests
//! let mut advances = engine.advance_signals();
//! ```

/// Playback configuration schema and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Reactive services for playback integration.
pub mod services;

/// Tracing initialization for host applications.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{PlayheadError, Result};

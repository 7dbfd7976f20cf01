//! Completion and error-driven advancement detection.
//!
//! Watches snapshots against the current target and decides when the
//! surrounding application should advance its queue. Emitting a signal is
//! this component's only side effect; it never touches the queue itself.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::PlaybackConfig;

use super::types::{MediaItem, PlaybackIntent, PlaybackTarget, PlayerSnapshot, PlayerState};

/// Request that the application advance its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceSignal {
    /// How many queue entries to advance by
    pub count: u32,

    /// Whether the user explicitly skipped
    pub user_skipped: bool,

    /// Whether the advance was forced by a playback error
    pub due_to_error: bool,
}

impl AdvanceSignal {
    /// The current item finished playing
    pub fn natural() -> Self {
        Self {
            count: 1,
            user_skipped: false,
            due_to_error: false,
        }
    }

    /// The current item is unplayable and was skipped automatically
    pub fn error_skip() -> Self {
        Self {
            count: 1,
            user_skipped: false,
            due_to_error: true,
        }
    }

    /// The user skipped the given number of entries
    pub fn user_skip(count: u32) -> Self {
        Self {
            count,
            user_skipped: true,
            due_to_error: false,
        }
    }
}

/// Per-snapshot evaluation of whether the current item is over.
///
/// Stateful for two reasons: a finished item must only be reported once
/// per target, and an error-driven skip must only fire once per error-flag
/// activation so a persistently broken embed cannot trigger a skip storm.
#[derive(Debug)]
pub(crate) struct AdvanceDetector {
    config: PlaybackConfig,
    error_skip_spent: bool,
    advanced_for: Option<u64>,
}

impl AdvanceDetector {
    pub(crate) fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            error_skip_spent: false,
            advanced_for: None,
        }
    }

    /// Evaluate the latest snapshot. Returns a signal at most once per
    /// target, and `None` while the embed is still converging.
    pub(crate) fn evaluate(
        &mut self,
        item: Option<&MediaItem>,
        target: Option<&PlaybackTarget>,
        snapshot: &PlayerSnapshot,
        intent: &PlaybackIntent,
        error_flagged: bool,
    ) -> Option<AdvanceSignal> {
        // The one-shot re-arms only once the flag clears, which happens on
        // the next successful reconciliation.
        if !error_flagged {
            self.error_skip_spent = false;
        }

        let (item, target) = (item?, target?);

        // Wrong media loaded: still converging, no verdict either way. This
        // also guards the error path against skipping on a stale error from
        // a previous item.
        if snapshot.current_media != target.media_id {
            return None;
        }

        if self.advanced_for == Some(target.sequence) {
            return None;
        }

        if self.is_finished(item, snapshot) {
            debug!(
                item = %item.id,
                time_secs = snapshot.current_time.as_secs_f64(),
                "Item finished, requesting advance"
            );
            self.advanced_for = Some(target.sequence);
            return Some(AdvanceSignal::natural());
        }

        if error_flagged
            && !self.error_skip_spent
            && snapshot.state == PlayerState::Unstarted
            && intent.playing
        {
            warn!(item = %item.id, "Item is unplayable, requesting auto-skip");
            self.error_skip_spent = true;
            self.advanced_for = Some(target.sequence);
            return Some(AdvanceSignal::error_skip());
        }

        None
    }

    fn is_finished(&self, item: &MediaItem, snapshot: &PlayerSnapshot) -> bool {
        if progress(item, snapshot) >= 1.0 {
            return true;
        }

        // Items that run to the end of the underlying media rarely reach
        // their nominal end offset exactly; accept anything within the
        // configured margin of the embed's reported duration.
        snapshot.duration > Duration::ZERO
            && snapshot.current_time > Duration::ZERO
            && snapshot.current_time >= snapshot.duration.saturating_sub(self.config.end_margin())
    }
}

/// Fraction of the item played, measured from the item's start offset.
pub(crate) fn progress(item: &MediaItem, snapshot: &PlayerSnapshot) -> f64 {
    let length = item.duration();
    if length.is_zero() {
        return 1.0;
    }

    let played = snapshot.current_time.saturating_sub(item.start);
    played.as_secs_f64() / length.as_secs_f64()
}

//! Intent/state synchronization.
//!
//! Two-way binding between application intent and the embed, with explicit
//! precedence so the two sides cannot feed back into each other:
//!
//! - The application owns play/pause. The embed's buffering transitions
//!   must never masquerade as user pauses, so transport state only flows
//!   outward, as corrective calls when a mismatch is observed.
//! - Volume and mute are the one place the embed is a legitimate source of
//!   changes (the user can operate the embed's own controls), so those
//!   flow inward from snapshots.

use crate::services::common::Property;

use super::types::{PlayerSnapshot, PlayerState, Volume};

/// Corrective transport call the sync layer wants issued to the embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportCorrection {
    /// Intent says playing but the embed is paused
    Play,

    /// Intent says paused but the embed is playing
    Pause,
}

/// Reconciles each snapshot against application intent.
#[derive(Debug, Default)]
pub(crate) struct IntentSync {
    last_embed_volume: Option<Volume>,
    last_embed_muted: Option<bool>,
}

impl IntentSync {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fold one snapshot into intent and report any transport correction
    /// the caller should issue to the embed.
    pub(crate) fn apply(
        &mut self,
        snapshot: &PlayerSnapshot,
        playing: &Property<bool>,
        volume: &Property<Volume>,
        muted: &Property<bool>,
    ) -> Option<TransportCorrection> {
        // Only a change between consecutive snapshots counts as
        // embed-originated. Comparing against intent directly would let a
        // stale echo of an old value overwrite a fresh application change.
        if let Some(last) = self.last_embed_volume {
            if snapshot.volume != last {
                volume.set(snapshot.volume);
            }
        }
        self.last_embed_volume = Some(snapshot.volume);

        if let Some(last) = self.last_embed_muted {
            if snapshot.muted != last {
                muted.set(snapshot.muted);
            }
        }
        self.last_embed_muted = Some(snapshot.muted);

        match (playing.get(), snapshot.state) {
            (true, PlayerState::Paused) => Some(TransportCorrection::Play),
            (false, PlayerState::Playing) => Some(TransportCorrection::Pause),
            _ => None,
        }
    }
}

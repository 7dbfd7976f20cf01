use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::error::PlaybackError;
use super::types::{MediaId, PlayerState, Volume};

/// Asynchronous error notification from the embed.
///
/// Carries the provider's raw error code. The engine only uses the event
/// as a signal; the code is kept for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerErrorEvent {
    /// Provider-specific error code
    pub code: i32,
}

/// Capability surface of an external media player embed.
///
/// The engine drives implementations of this trait; it never assumes calls
/// take effect immediately. Every mutating call is treated as best-effort
/// and verified later through polling.
///
/// Getters return the embed's last known values and must not block; a
/// handle that has no media loaded reports zero durations, an empty media
/// URL, and `PlayerState::Unstarted`.
#[async_trait]
pub trait MediaHandle: Send + Sync {
    /// Load a media item and position the playhead at the given offset.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn load(&self, media_id: &MediaId, start_offset: Duration) -> Result<(), PlaybackError>;

    /// Start or resume playback.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Pause playback.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn pause(&self) -> Result<(), PlaybackError>;

    /// Move the playhead.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn seek_to(&self, position: Duration) -> Result<(), PlaybackError>;

    /// Begin playback at the given offset of the loaded media.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn start_at(&self, position: Duration) -> Result<(), PlaybackError>;

    /// Current playhead position.
    async fn current_time(&self) -> Duration;

    /// Total duration of the loaded media.
    async fn duration(&self) -> Duration;

    /// URL of the currently loaded media, if any.
    ///
    /// The media identifier is extracted from this URL; see
    /// [`MediaId::from_url`](super::types::MediaId::from_url).
    async fn media_url(&self) -> Option<String>;

    /// Current embed volume.
    async fn volume(&self) -> Volume;

    /// Set the embed volume.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn set_volume(&self, volume: Volume) -> Result<(), PlaybackError>;

    /// Whether the embed is muted.
    async fn is_muted(&self) -> bool;

    /// Mute the embed.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn mute(&self) -> Result<(), PlaybackError>;

    /// Unmute the embed.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the embed rejected the call.
    async fn unmute(&self) -> Result<(), PlaybackError>;

    /// Reported player state.
    async fn state(&self) -> PlayerState;

    /// Subscribe to asynchronous playback error events.
    ///
    /// This is the one push-based channel the embed offers; everything
    /// else is observed by polling.
    fn error_events(&self) -> broadcast::Receiver<PlayerErrorEvent>;
}

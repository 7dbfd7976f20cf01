/// Common utilities and abstractions for services
pub mod common;
/// Playback reconciliation engine
pub mod playback;

pub use playback::{
    AdvanceSignal, MediaHandle, MediaId, MediaItem, PlaybackEngine, PlaybackError, PlaybackIntent,
    PlayerErrorEvent, PlayerSnapshot, PlayerState, Volume,
};

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Opaque identifier for a media item hosted by the embed provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MediaId(String);

impl MediaId {
    /// Create a MediaId from a raw identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty ("nothing loaded") identifier
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A playable slice of a hosted media item.
///
/// Items are slices rather than whole videos: a single upload can carry
/// several tracks, each delimited by a start and end offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Hosted media identifier
    pub id: MediaId,

    /// Offset into the media where this item begins
    pub start: Duration,

    /// Offset into the media where this item ends
    pub end: Duration,
}

impl MediaItem {
    /// Length of the item slice
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Reported state of the external player embed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing is loaded, or the embed gave up on the current media
    #[default]
    Unstarted,

    /// Playback reached the end of the media
    Ended,

    /// Currently playing
    Playing,

    /// Paused mid-media
    Paused,

    /// Waiting on network data
    Buffering,

    /// The embed reported an unrecognized or error state
    Error,
}

impl PlayerState {
    /// Whether the embed has the media loaded and responsive.
    ///
    /// Playing, paused, and buffering all count: a paused or buffering
    /// embed has converged on the media even if audio is not flowing.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused | Self::Buffering)
    }
}

impl From<i32> for PlayerState {
    /// Map the embed's raw numeric state codes.
    ///
    /// Code 5 ("cued") maps to Unstarted: the media is loaded but playback
    /// never began.
    fn from(code: i32) -> Self {
        match code {
            -1 => Self::Unstarted,
            0 => Self::Ended,
            1 => Self::Playing,
            2 => Self::Paused,
            3 => Self::Buffering,
            5 => Self::Unstarted,
            _ => Self::Error,
        }
    }
}

/// Volume of the player, as a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume(u8);

impl Volume {
    /// Create a new instance of a volume with safeguarded values
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(100)
    }
}

impl Deref for Volume {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u8> for Volume {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Desired playback state the embed is driven toward.
///
/// Immutable once created. Selecting a new item or seeking supersedes the
/// target with a fresh one; targets are never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackTarget {
    /// Media the embed should have loaded
    pub media_id: MediaId,

    /// Offset playback should start from
    pub start_offset: Duration,

    /// When this target was issued.
    ///
    /// Convergence checks loosen once the target is old enough: if the
    /// environment suspended execution (backgrounded tab), strict time
    /// matching would retry forever.
    pub requested_at: Instant,

    /// Monotonic issue number.
    ///
    /// `requested_at` is too coarse to tell targets apart: two issued
    /// within the same clock tick would alias.
    pub sequence: u64,
}

impl PlaybackTarget {
    /// Create a target issued now
    pub fn new(media_id: MediaId, start_offset: Duration) -> Self {
        static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

        Self {
            media_id,
            start_offset,
            requested_at: Instant::now(),
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Time elapsed since the target was issued
    pub fn age(&self) -> Duration {
        self.requested_at.elapsed()
    }
}

/// Immutable snapshot of the embed's observable state.
///
/// Produced wholesale on each poll tick; never partially updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    /// Playhead position
    pub current_time: Duration,

    /// Total duration of the loaded media as reported by the embed
    pub duration: Duration,

    /// Identifier of the media the embed currently has loaded
    pub current_media: MediaId,

    /// Reported player state
    pub state: PlayerState,

    /// Embed volume
    pub volume: Volume,

    /// Embed mute state
    pub muted: bool,
}

/// Application-level desired transport and audio state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackIntent {
    /// Whether playback should be running
    pub playing: bool,

    /// Desired volume
    pub volume: Volume,

    /// Desired mute state
    pub muted: bool,
}

impl Default for PlaybackIntent {
    fn default() -> Self {
        Self {
            playing: false,
            volume: Volume::default(),
            muted: false,
        }
    }
}

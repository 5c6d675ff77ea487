//! Playback engine adapter contract.
//!
//! A [`PlaybackEngine`] wraps one player instance of an opaque media engine.
//! Engines run their own worker threads and report lifecycle changes through
//! an [`EventSender`]; every report is tagged with the [`MediaId`] it
//! concerns so that the owning tile can discard reports from media it has
//! already replaced.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;
use url::Url;
use uuid::Uuid;

#[cfg(feature = "gstreamer")]
pub mod gst;
pub mod test_utils;

/// Identity of one opened media handle.
///
/// Ids are unique for the lifetime of the process, so an id never refers to
/// two different handles even across tiles or grid rebuilds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MediaId(u64);

static NEXT_MEDIA_ID: AtomicU64 = AtomicU64::new(1);

impl MediaId {
    /// Allocate a fresh id. Backends call this from their `open_*` methods.
    pub fn next() -> Self {
        Self(NEXT_MEDIA_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Rebuild an id previously obtained through [`MediaId::as_u64`].
    /// Zero is reserved for "no media".
    pub fn from_u64(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media-{}", self.0)
    }
}

/// Identity of one tile. A rebuilt grid never reuses an id.
pub type TileId = Uuid;

/// Lifecycle events reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Opening,
    Playing,
    Paused,
    /// Fill level of the read-ahead buffer, 0-100.
    Buffering(u8),
    Stopped,
    EndReached,
    Error(String),
}

/// An engine event on its way from an engine worker thread to the owner
/// thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineNotification {
    pub tile: TileId,
    pub media: MediaId,
    pub event: EngineEvent,
}

/// Sending half handed to each engine, bound to the tile owning it.
#[derive(Debug, Clone)]
pub struct EventSender {
    tile: TileId,
    tx: mpsc::UnboundedSender<EngineNotification>,
}

impl EventSender {
    pub fn new(tile: TileId, tx: mpsc::UnboundedSender<EngineNotification>) -> Self {
        Self { tile, tx }
    }

    pub fn tile(&self) -> TileId {
        self.tile
    }

    /// Queue an event for the owner thread. A closed channel means the grid
    /// is gone, in which case the event has nobody to inform.
    pub fn emit(&self, media: MediaId, event: EngineEvent) {
        trace!("Tile {} {}: {:?}", self.tile, media, event);
        let _ = self.tx.send(EngineNotification {
            tile: self.tile,
            media,
            event,
        });
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine initialization failed: {0}")]
    Initialization(String),

    #[error("No playback engine available")]
    Unavailable,

    #[error("Unknown media handle: {0}")]
    UnknownMedia(MediaId),

    #[error("Engine backend error: {0}")]
    Backend(String),

    #[error("State change failed: {0}")]
    StateChange(String),
}

/// One player instance of the media engine.
///
/// None of the methods block on I/O: `play` and friends only request a
/// state change, the outcome arrives later as an [`EngineEvent`].
pub trait PlaybackEngine: Send {
    /// Open a network stream with the given read-ahead window.
    fn open_network(&mut self, uri: &Url, read_ahead: Duration) -> Result<MediaId, EngineError>;

    /// Open a local file. `path` is absolute and known to exist.
    fn open_file(&mut self, path: &Path, read_ahead: Duration) -> Result<MediaId, EngineError>;

    /// Force software decoding for `media`.
    fn disable_hardware_decode(&mut self, media: MediaId) -> Result<(), EngineError>;

    /// Start playback of `media`, replacing whatever the player held.
    fn play(&mut self, media: MediaId) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    fn resume(&mut self) -> Result<(), EngineError>;

    fn is_playing(&self) -> bool;

    fn stop(&mut self) -> Result<(), EngineError>;

    fn set_mute(&mut self, muted: bool) -> Result<(), EngineError>;

    /// Release one media handle.
    fn dispose_media(&mut self, media: MediaId) -> Result<(), EngineError>;

    /// Release the player itself. No other method is called afterwards.
    fn dispose(&mut self) -> Result<(), EngineError>;
}

/// Creates one [`PlaybackEngine`] per tile.
pub trait EngineFactory: Send + Sync {
    /// Process-wide engine bootstrap. Implementations run the actual
    /// initialization exactly once no matter how often this is called.
    fn initialize(&self) -> Result<(), EngineError>;

    fn create(&self, events: EventSender) -> Result<Box<dyn PlaybackEngine>, EngineError>;
}

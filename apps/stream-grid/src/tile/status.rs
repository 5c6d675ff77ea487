use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a tile shows no picture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoSignalReason {
    Idle,
    EmptyUrl,
    FileNotFound,
    Failed,
    Stopped,
    Ended,
}

impl NoSignalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoSignalReason::Idle => "NO SIGNAL",
            NoSignalReason::EmptyUrl => "EMPTY URL",
            NoSignalReason::FileNotFound => "FILE NOT FOUND",
            NoSignalReason::Failed => "FAILED",
            NoSignalReason::Stopped => "STOPPED",
            NoSignalReason::Ended => "ENDED",
        }
    }
}

impl fmt::Display for NoSignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-initiated, non-error end of playback.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    Stopped,
    Ended,
}

/// Everything that can take a tile off the air. Faults never leave the tile;
/// each one becomes a [`TileState::NoSignal`] with a fixed reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TileFault {
    #[error("Source reference is empty")]
    EmptyInput,

    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Failed to open or start source: {0}")]
    OpenOrPlayFailure(String),

    #[error("Engine reported an error: {0}")]
    EngineError(String),

    #[error("Playback terminated: {0:?}")]
    EngineTermination(Termination),
}

impl TileFault {
    pub fn reason(&self) -> NoSignalReason {
        match self {
            TileFault::EmptyInput => NoSignalReason::EmptyUrl,
            TileFault::FileNotFound(_) => NoSignalReason::FileNotFound,
            TileFault::OpenOrPlayFailure(_) | TileFault::EngineError(_) => NoSignalReason::Failed,
            TileFault::EngineTermination(Termination::Stopped) => NoSignalReason::Stopped,
            TileFault::EngineTermination(Termination::Ended) => NoSignalReason::Ended,
        }
    }
}

/// Per-tile playback state machine states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileState {
    NoSignal(NoSignalReason),
    /// A connect attempt is settling.
    Connecting,
    /// Read-ahead buffer fill, reported while not yet playing.
    Buffering(u8),
    Live,
    Paused,
    /// Terminal. Reached only through teardown.
    Disposed,
}

impl TileState {
    pub fn is_disposed(&self) -> bool {
        matches!(self, TileState::Disposed)
    }
}

impl Default for TileState {
    fn default() -> Self {
        TileState::NoSignal(NoSignalReason::Idle)
    }
}

/// Display category of a tile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusKind {
    NoSignal,
    Pending,
    Live,
    Paused,
}

/// Frame color signal, derived from [`StatusKind`] only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorderColor {
    Success,
    Warning,
    Info,
    Error,
}

impl BorderColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorderColor::Success => "success",
            BorderColor::Warning => "warning",
            BorderColor::Info => "info",
            BorderColor::Error => "error",
        }
    }
}

impl From<StatusKind> for BorderColor {
    fn from(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Live => BorderColor::Success,
            StatusKind::Paused => BorderColor::Warning,
            StatusKind::Pending => BorderColor::Info,
            StatusKind::NoSignal => BorderColor::Error,
        }
    }
}

/// What the host renders for one tile: a caption, an overlay over the video
/// area (empty while a picture is expected) and the border color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileStatus {
    pub kind: StatusKind,
    pub caption: String,
    pub overlay: String,
    pub border: BorderColor,
}

impl TileStatus {
    fn new(kind: StatusKind, caption: String) -> Self {
        let overlay = if kind == StatusKind::NoSignal {
            caption.clone()
        } else {
            String::new()
        };
        Self {
            kind,
            caption,
            overlay,
            border: kind.into(),
        }
    }
}

impl From<&TileState> for TileStatus {
    fn from(state: &TileState) -> Self {
        match state {
            TileState::NoSignal(reason) => {
                TileStatus::new(StatusKind::NoSignal, reason.to_string())
            }
            TileState::Connecting => {
                TileStatus::new(StatusKind::Pending, "CONNECTING...".to_string())
            }
            TileState::Buffering(percent) => {
                TileStatus::new(StatusKind::Pending, format!("BUFFERING {percent}%"))
            }
            TileState::Live => TileStatus::new(StatusKind::Live, "LIVE".to_string()),
            TileState::Paused => TileStatus::new(StatusKind::Paused, "PAUSED".to_string()),
            // Disposed tiles are no longer rendered by the host.
            TileState::Disposed => {
                TileStatus::new(StatusKind::NoSignal, NoSignalReason::Idle.to_string())
            }
        }
    }
}

impl fmt::Display for TileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.caption, self.border.as_str())
    }
}

/// Label of the pause/resume control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PauseLabel {
    #[default]
    Pause,
    Resume,
}

impl PauseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseLabel::Pause => "Pause",
            PauseLabel::Resume => "Resume",
        }
    }
}

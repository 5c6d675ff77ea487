pub mod config;
pub mod console;
pub mod demo;
pub mod engine;
pub mod grid;
#[cfg(feature = "gstreamer")]
pub mod gst_utils;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use engine::{EngineError, EngineEvent, EngineFactory, MediaId, PlaybackEngine};
pub use grid::{GridManager, Layout, LayoutError};
pub use tile::{BorderColor, TileController, TileState, TileStatus};

// Common error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamGridError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Engine error: {0}")]
    EngineError(#[from] EngineError),

    #[error("Layout error: {0}")]
    LayoutError(#[from] LayoutError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamGridError>;

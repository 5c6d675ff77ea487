//! Demo loader: fills the grid with bundled sample files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::grid::GridManager;

pub const DEFAULT_DEMO_DIR: &str = "DemoVideos";
pub const DEFAULT_DEMO_FILES: [&str; 2] = ["demo1.mp4", "demo2.mp4"];

/// Directory holding the demo files when none is configured: `DemoVideos`
/// next to the executable, or in the working directory as a fallback.
pub fn default_demo_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DEMO_DIR)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEMO_DIR))
}

/// Assign `files` to the tiles in turn (tile `i` gets `files[i % len]`) and
/// connect every tile. Missing files are not checked here; the tiles report
/// them themselves.
pub fn load_demo<S: AsRef<str>>(grid: &mut GridManager, dir: &Path, files: &[S]) -> usize {
    if files.is_empty() {
        warn!("No demo files configured");
        return 0;
    }

    info!("Loading demo from {:?} into {} tiles", dir, grid.len());

    for (index, tile) in grid.tiles_mut().iter_mut().enumerate() {
        let file = dir.join(files[index % files.len()].as_ref());
        tile.set_source(file.to_string_lossy());
        tile.connect();
    }
    grid.len()
}

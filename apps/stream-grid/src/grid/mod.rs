use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{EngineFactory, EngineNotification, EventSender};
use crate::tile::{PlaybackOptions, TileController};

pub mod layout;

pub use layout::{Layout, LayoutError};

/// Owns the rectangular arrangement of tiles.
///
/// The grid has no playback logic of its own. It creates tiles, tears them
/// down on layout changes, and is the single place where engine
/// notifications are handed to tiles: whoever owns the grid owns the only
/// thread that mutates tile state.
pub struct GridManager {
    factory: Arc<dyn EngineFactory>,
    options: PlaybackOptions,
    layout: Layout,
    tiles: Vec<TileController>,
    event_tx: mpsc::UnboundedSender<EngineNotification>,
    event_rx: mpsc::UnboundedReceiver<EngineNotification>,
}

impl std::fmt::Debug for GridManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridManager")
            .field("layout", &self.layout)
            .field("tiles", &self.tiles)
            .field("options", &self.options)
            .finish()
    }
}

impl GridManager {
    /// Bootstrap the engine runtime and build the first grid.
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        options: PlaybackOptions,
        layout: Layout,
    ) -> crate::Result<Self> {
        factory.initialize()?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut grid = Self {
            factory,
            options,
            layout,
            tiles: Vec::new(),
            event_tx,
            event_rx,
        };
        grid.set_layout(layout);
        Ok(grid)
    }

    /// Replace every tile with `layout.tile_count()` fresh ones.
    ///
    /// Old tiles are disposed before the new ones exist, which terminates
    /// their playback immediately.
    pub fn set_layout(&mut self, layout: Layout) {
        info!("Rebuilding grid {} -> {}", self.layout, layout);

        self.dispose_tiles();

        // Anything still queued belongs to the tiles just disposed.
        let mut dropped = 0;
        while self.event_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Dropped {} notifications from the previous grid", dropped);
        }

        self.layout = layout;
        self.tiles = (0..layout.tile_count()).map(|_| self.create_tile()).collect();

        info!("Grid {} ready with {} tiles", layout, self.tiles.len());
    }

    fn create_tile(&self) -> TileController {
        let id = Uuid::new_v4();
        let events = EventSender::new(id, self.event_tx.clone());
        let engine = match self.factory.create(events) {
            Ok(engine) => Some(engine),
            Err(e) => {
                warn!("Tile {} has no playback engine: {}", id, e);
                None
            }
        };
        TileController::new(id, engine, self.options.clone())
    }

    fn dispose_tiles(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.dispose();
        }
        self.tiles.clear();
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in row-major order.
    pub fn tiles(&self) -> &[TileController] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [TileController] {
        &mut self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&TileController> {
        self.tiles.get(index)
    }

    pub fn tile_mut(&mut self, index: usize) -> Option<&mut TileController> {
        self.tiles.get_mut(index)
    }

    pub fn tile_at(&self, row: usize, column: usize) -> Option<&TileController> {
        self.layout.index(row, column).and_then(|i| self.tiles.get(i))
    }

    pub fn connect_all(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.connect();
        }
    }

    pub fn stop_all(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.stop_hard();
        }
    }

    /// Hand one notification to the tile it belongs to. Returns whether a
    /// tile applied it.
    pub fn dispatch(&mut self, notification: EngineNotification) -> bool {
        let EngineNotification { tile, media, event } = notification;
        match self.tiles.iter_mut().find(|t| t.id() == tile) {
            Some(target) => target.handle_event(media, event),
            None => {
                debug!("No tile {} in the current grid, dropping {:?}", tile, event);
                false
            }
        }
    }

    /// Dispatch everything queued so far without waiting. Returns the number
    /// of notifications processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(notification) = self.event_rx.try_recv() {
            self.dispatch(notification);
            processed += 1;
        }
        processed
    }

    /// Wait for the next engine notification. The grid holds a sender
    /// itself, so this only yields `None` if the grid is being torn down.
    pub async fn next_notification(&mut self) -> Option<EngineNotification> {
        self.event_rx.recv().await
    }

    /// Dispose every tile and leave the grid empty.
    pub fn shutdown(&mut self) {
        info!("Shutting down grid {}", self.layout);
        self.dispose_tiles();
    }
}

impl Drop for GridManager {
    fn drop(&mut self) {
        self.dispose_tiles();
    }
}

use std::sync::Arc;

use stream_grid::engine::test_utils::{EngineCall, MockEngineFactory, MockProbe};
use stream_grid::engine::EngineEvent;
use stream_grid::tile::{NoSignalReason, PlaybackOptions, TileState};
use stream_grid::{GridManager, Layout};

/// A grid backed by mock engines.
pub struct TestFixture {
    pub factory: Arc<MockEngineFactory>,
    pub grid: GridManager,
}

impl TestFixture {
    pub fn new(rows: usize, columns: usize) -> Self {
        super::init_test_environment();
        let factory = MockEngineFactory::new();
        let grid = GridManager::new(
            factory.clone(),
            PlaybackOptions::default(),
            Layout::new(rows, columns).unwrap(),
        )
        .unwrap();
        Self { factory, grid }
    }

    /// Probe of the engine behind tile `index` of the current grid.
    pub fn probe(&self, index: usize) -> MockProbe {
        let first = self.factory.created() - self.grid.len();
        self.factory.probe(first + index)
    }

    pub fn connect(&mut self, index: usize, source: &str) {
        let tile = self.grid.tile_mut(index).unwrap();
        tile.set_source(source);
        tile.connect();
    }

    /// Emit `event` for the tile's current media and dispatch everything
    /// queued.
    pub fn emit(&mut self, index: usize, event: EngineEvent) {
        self.probe(index).emit(event);
        self.grid.pump();
    }

    pub fn state(&self, index: usize) -> &TileState {
        self.grid.tile(index).unwrap().state()
    }
}

pub fn no_signal(reason: NoSignalReason) -> TileState {
    TileState::NoSignal(reason)
}

pub fn count_calls(probe: &MockProbe, matches: impl Fn(&EngineCall) -> bool) -> usize {
    probe.calls().iter().filter(|c| matches(c)).count()
}

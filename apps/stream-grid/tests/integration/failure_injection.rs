use stream_grid::engine::EngineEvent;
use stream_grid::tile::{BorderColor, NoSignalReason, TileState};

use super::common::*;

#[test]
fn test_engine_error_while_live() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "http://camera/live.m3u8");
    fixture.emit(0, EngineEvent::Playing);

    fixture.emit(0, EngineEvent::Error("connection reset".to_string()));
    let status = fixture.grid.tile(0).unwrap().status();
    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Failed));
    assert_eq!(status.caption, "FAILED");
    assert_eq!(status.border, BorderColor::Error);

    // A fresh connect recovers the tile.
    fixture.grid.tile_mut(0).unwrap().connect();
    assert_eq!(fixture.state(0), &TileState::Connecting);
    fixture.emit(0, EngineEvent::Playing);
    assert_eq!(fixture.state(0), &TileState::Live);
}

#[test]
fn test_open_refused() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.probe(0).fail_next_open();
    fixture.connect(0, "rtsp://camera/one");

    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Failed));
    assert!(fixture.probe(0).live_media().is_empty());
    assert_eq!(fixture.grid.tile(0).unwrap().media(), None);
}

#[test]
fn test_play_refused_releases_handle() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.probe(0).fail_next_play();
    fixture.connect(0, "rtsp://camera/one");

    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Failed));
    assert!(fixture.probe(0).live_media().is_empty());
}

#[test]
fn test_stop_failure_is_absorbed() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "rtsp://camera/one");
    fixture.emit(0, EngineEvent::Playing);

    let probe = fixture.probe(0);
    probe.fail_stop(true);
    fixture.grid.tile_mut(0).unwrap().stop_hard();
    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Stopped));

    // Teardown still runs to the end.
    fixture.grid.shutdown();
    assert!(probe.is_disposed());
}

#[test]
fn test_engine_creation_failure() {
    let factory = stream_grid::engine::test_utils::MockEngineFactory::new();
    factory.fail_create(true);
    let mut grid = stream_grid::GridManager::new(
        factory,
        Default::default(),
        stream_grid::Layout::default(),
    )
    .unwrap();

    let tile = grid.tile_mut(3).unwrap();
    tile.set_source("rtsp://camera/one");
    tile.connect();
    assert_eq!(tile.state(), &TileState::NoSignal(NoSignalReason::Failed));

    tile.toggle_pause();
    tile.stop_hard();
    assert_eq!(tile.state(), &TileState::NoSignal(NoSignalReason::Failed));
}

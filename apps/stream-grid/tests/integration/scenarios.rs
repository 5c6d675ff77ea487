use std::time::Duration;

use stream_grid::engine::test_utils::EngineCall;
use stream_grid::engine::EngineEvent;
use stream_grid::tile::{BorderColor, NoSignalReason, PauseLabel, TileState};
use stream_grid::Layout;
use tracing::info;

use super::common::*;

#[test]
fn test_layout_presets() {
    let mut fixture = TestFixture::new(2, 2);
    assert_eq!(fixture.grid.len(), 4);

    fixture.grid.set_layout(Layout::new(3, 3).unwrap());
    assert_eq!(fixture.grid.len(), 9);
    assert!(fixture
        .grid
        .tiles()
        .iter()
        .all(|t| t.state() == &no_signal(NoSignalReason::Idle)));
    assert_eq!(fixture.grid.tile_at(2, 2).unwrap().id(), fixture.grid.tile(8).unwrap().id());

    fixture.grid.set_layout("1x5".parse().unwrap());
    assert_eq!(fixture.grid.len(), 5);
    assert_eq!(fixture.factory.initialization_count(), 1);
}

#[test]
fn test_network_stream_lifecycle() {
    let mut fixture = TestFixture::new(2, 2);
    info!("Connecting tile 0 to an RTSP camera");

    fixture.connect(0, "rtsp://camera.local/stream1");
    assert_eq!(fixture.state(0), &TileState::Connecting);
    assert_eq!(fixture.grid.tile(0).unwrap().status().caption, "CONNECTING...");

    let probe = fixture.probe(0);
    let media = probe.current_media().unwrap();
    assert_eq!(
        probe.calls(),
        vec![
            EngineCall::Stop,
            EngineCall::OpenNetwork(
                "rtsp://camera.local/stream1".to_string(),
                Duration::from_millis(300)
            ),
            EngineCall::DisableHardwareDecode(media),
            EngineCall::Play(media),
        ]
    );

    fixture.emit(0, EngineEvent::Buffering(40));
    assert_eq!(fixture.state(0), &TileState::Buffering(40));
    assert_eq!(fixture.grid.tile(0).unwrap().status().caption, "BUFFERING 40%");

    fixture.emit(0, EngineEvent::Playing);
    let status = fixture.grid.tile(0).unwrap().status();
    assert_eq!(status.caption, "LIVE");
    assert_eq!(status.border, BorderColor::Success);
    assert!(status.overlay.is_empty());

    // Late buffering reports while playing do not regress the tile.
    fixture.emit(0, EngineEvent::Buffering(90));
    assert_eq!(fixture.state(0), &TileState::Live);

    fixture.grid.tile_mut(0).unwrap().toggle_pause();
    assert_eq!(fixture.grid.tile(0).unwrap().pause_label(), PauseLabel::Resume);
    fixture.emit(0, EngineEvent::Paused);
    assert_eq!(fixture.state(0), &TileState::Paused);
    assert_eq!(fixture.grid.tile(0).unwrap().status().border, BorderColor::Warning);

    fixture.grid.tile_mut(0).unwrap().toggle_pause();
    assert_eq!(fixture.grid.tile(0).unwrap().pause_label(), PauseLabel::Pause);
    fixture.emit(0, EngineEvent::Playing);
    assert_eq!(fixture.state(0), &TileState::Live);

    // The other tiles never moved.
    for index in 1..4 {
        assert_eq!(fixture.state(index), &no_signal(NoSignalReason::Idle));
    }
}

#[test]
fn test_local_file_playback() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clip.mp4");
    std::fs::write(&file, b"clip").unwrap();

    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, &format!("  {}  ", file.display()));
    assert_eq!(fixture.state(0), &TileState::Connecting);
    assert!(fixture
        .probe(0)
        .calls()
        .contains(&EngineCall::OpenFile(file.clone(), Duration::from_millis(300))));

    fixture.emit(0, EngineEvent::Playing);
    assert_eq!(fixture.state(0), &TileState::Live);

    fixture.emit(0, EngineEvent::EndReached);
    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Ended));
    assert_eq!(fixture.grid.tile(0).unwrap().status().border, BorderColor::Error);
}

#[test]
fn test_input_errors() {
    let mut fixture = TestFixture::new(1, 2);

    fixture.connect(0, "   ");
    let status = fixture.grid.tile(0).unwrap().status();
    assert_eq!(status.caption, "EMPTY URL");
    assert_eq!(status.border, BorderColor::Error);

    fixture.connect(1, "/definitely/not/here/video.mp4");
    let status = fixture.grid.tile(1).unwrap().status();
    assert_eq!(status.caption, "FILE NOT FOUND");
    assert_eq!(status.overlay, "FILE NOT FOUND");

    assert_eq!(fixture.probe(0).open_count(), 0);
    assert_eq!(fixture.probe(1).open_count(), 0);
}

#[test]
fn test_source_is_read_at_connect_time() {
    let mut fixture = TestFixture::new(1, 1);
    let tile = fixture.grid.tile_mut(0).unwrap();
    tile.set_source("rtsp://camera/a");
    tile.set_source("rtsp://camera/b");
    assert!(fixture.probe(0).calls().is_empty());

    fixture.grid.tile_mut(0).unwrap().connect();
    let opened: Vec<_> = fixture
        .probe(0)
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            EngineCall::OpenNetwork(uri, _) => Some(uri),
            _ => None,
        })
        .collect();
    assert_eq!(opened, vec!["rtsp://camera/b".to_string()]);
}

use stream_grid::engine::test_utils::EngineCall;
use stream_grid::engine::EngineEvent;
use stream_grid::tile::{NoSignalReason, PauseLabel, TileState};
use stream_grid::Layout;

use super::common::*;

#[test]
fn test_reconnect_keeps_one_handle() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "rtsp://camera/one");
    let first = fixture.probe(0).current_media().unwrap();

    fixture.connect(0, "rtsp://camera/two");
    let probe = fixture.probe(0);
    let second = probe.current_media().unwrap();
    assert_ne!(first, second);
    assert_eq!(probe.live_media(), vec![second]);
    assert!(probe.calls().contains(&EngineCall::DisposeMedia(first)));

    // Late reports from the first attempt are inert.
    probe.emit_for(first, EngineEvent::Playing);
    fixture.grid.pump();
    assert_eq!(fixture.state(0), &TileState::Connecting);

    probe.emit_for(first, EngineEvent::Error("old stream died".to_string()));
    fixture.grid.pump();
    assert_eq!(fixture.state(0), &TileState::Connecting);

    fixture.emit(0, EngineEvent::Playing);
    assert_eq!(fixture.state(0), &TileState::Live);
}

#[test]
fn test_stop_hard_is_idempotent() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "rtsp://camera/one");
    fixture.emit(0, EngineEvent::Playing);

    for _ in 0..3 {
        fixture.grid.tile_mut(0).unwrap().stop_hard();
        fixture.grid.pump();
        assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Stopped));
        assert!(!fixture.grid.tile(0).unwrap().is_paused());
    }

    let probe = fixture.probe(0);
    assert_eq!(count_calls(&probe, |c| *c == EngineCall::SetMute(true)), 3);
    assert_eq!(count_calls(&probe, |c| *c == EngineCall::SetMute(false)), 3);
    // The handle stays loaded after a hard stop.
    assert_eq!(probe.live_media().len(), 1);
}

#[test]
fn test_stop_then_resume_restarts_playback() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "rtsp://camera/one");
    fixture.emit(0, EngineEvent::Playing);
    fixture.grid.tile_mut(0).unwrap().stop_hard();
    fixture.grid.pump();

    let probe = fixture.probe(0);
    probe.clear_calls();
    fixture.grid.tile_mut(0).unwrap().toggle_pause();
    let media = probe.current_media().unwrap();
    assert_eq!(probe.calls(), vec![EngineCall::Resume, EngineCall::Play(media)]);

    fixture.emit(0, EngineEvent::Playing);
    assert_eq!(fixture.state(0), &TileState::Live);
}

#[test]
fn test_toggle_after_end_replays() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "rtsp://camera/one");
    fixture.emit(0, EngineEvent::Playing);
    fixture.emit(0, EngineEvent::EndReached);
    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Ended));

    let probe = fixture.probe(0);
    probe.clear_calls();
    fixture.grid.tile_mut(0).unwrap().toggle_pause();
    let media = probe.current_media().unwrap();
    assert_eq!(probe.calls(), vec![EngineCall::Resume, EngineCall::Play(media)]);
    assert_eq!(fixture.grid.tile(0).unwrap().pause_label(), PauseLabel::Pause);

    // The tile never shows PAUSED on the way.
    fixture.grid.pump();
    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Ended));
    fixture.emit(0, EngineEvent::Playing);
    assert_eq!(fixture.state(0), &TileState::Live);
}

#[test]
fn test_dispose_while_connecting_and_live() {
    let mut fixture = TestFixture::new(1, 2);
    fixture.connect(0, "rtsp://camera/one");
    fixture.connect(1, "rtsp://camera/two");
    fixture.emit(1, EngineEvent::Playing);

    let probes = [fixture.probe(0), fixture.probe(1)];
    let media: Vec<_> = probes.iter().map(|p| p.current_media().unwrap()).collect();

    fixture.grid.set_layout(Layout::new(1, 1).unwrap());

    for probe in &probes {
        assert!(probe.is_disposed());
        assert!(probe.live_media().is_empty());
        assert_eq!(probe.calls().last(), Some(&EngineCall::Dispose));
    }

    // Whatever the old engines still report goes nowhere.
    for (probe, media) in probes.iter().zip(media) {
        probe.emit_for(media, EngineEvent::Playing);
    }
    fixture.grid.pump();
    assert_eq!(fixture.state(0), &no_signal(NoSignalReason::Idle));
}

#[test]
fn test_disposed_tile_ignores_everything() {
    let mut fixture = TestFixture::new(1, 1);
    fixture.connect(0, "rtsp://camera/one");
    let probe = fixture.probe(0);
    let media = probe.current_media().unwrap();

    let tile = fixture.grid.tile_mut(0).unwrap();
    tile.dispose();
    let calls = probe.calls().len();

    tile.set_source("rtsp://camera/two");
    tile.connect();
    tile.toggle_pause();
    tile.stop_hard();
    tile.dispose();
    assert!(!tile.handle_event(media, EngineEvent::Playing));

    assert_eq!(tile.state(), &TileState::Disposed);
    assert_eq!(tile.status().caption, "NO SIGNAL");
    assert_eq!(probe.calls().len(), calls);
}

#[test]
fn test_shutdown_releases_every_engine() {
    let mut fixture = TestFixture::new(3, 3);
    fixture.grid.connect_all();
    fixture.grid.shutdown();
    assert!(fixture.grid.is_empty());
    assert!(fixture.factory.probes().iter().all(|p| p.is_disposed()));
}

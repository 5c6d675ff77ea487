//! In-memory engine used by the test suites.
//!
//! [`MockEngineFactory`] hands out [`MockEngine`]s and keeps a [`MockProbe`]
//! for each of them, in creation order, so tests can inspect the calls a tile
//! made and inject engine events as if they came from a worker thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use super::{EngineError, EngineEvent, EngineFactory, EventSender, MediaId, PlaybackEngine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    OpenNetwork(String, Duration),
    OpenFile(PathBuf, Duration),
    DisableHardwareDecode(MediaId),
    Play(MediaId),
    Pause,
    Resume,
    Stop,
    SetMute(bool),
    DisposeMedia(MediaId),
    Dispose,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<EngineCall>,
    live_media: Vec<MediaId>,
    current: Option<MediaId>,
    playing: bool,
    disposed: bool,
    fail_open: bool,
    fail_play: bool,
    fail_stop: bool,
}

/// Test-side view of one [`MockEngine`].
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
    events: EventSender,
}

impl MockProbe {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Media handles opened and not yet disposed.
    pub fn live_media(&self) -> Vec<MediaId> {
        self.state.lock().live_media.clone()
    }

    /// Media handle most recently passed to `play`.
    pub fn current_media(&self) -> Option<MediaId> {
        self.state.lock().current
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    pub fn open_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, EngineCall::OpenNetwork(..) | EngineCall::OpenFile(..)))
            .count()
    }

    pub fn fail_next_open(&self) {
        self.state.lock().fail_open = true;
    }

    pub fn fail_next_play(&self) {
        self.state.lock().fail_play = true;
    }

    pub fn fail_stop(&self, fail: bool) {
        self.state.lock().fail_stop = fail;
    }

    /// Report `event` for the media currently loaded in the player.
    pub fn emit(&self, event: EngineEvent) {
        let media = self
            .current_media()
            .expect("emit requires a media handle in the player");
        self.emit_for(media, event);
    }

    /// Report `event` for an explicit media handle, current or not.
    pub fn emit_for(&self, media: MediaId, event: EngineEvent) {
        {
            let mut state = self.state.lock();
            if state.current == Some(media) {
                match event {
                    EngineEvent::Playing => state.playing = true,
                    EngineEvent::Paused
                    | EngineEvent::Stopped
                    | EngineEvent::EndReached
                    | EngineEvent::Error(_) => state.playing = false,
                    _ => {}
                }
            }
        }
        self.events.emit(media, event);
    }
}

/// Scripted [`PlaybackEngine`]. Calls are recorded and only the state a real
/// player would change synchronously is updated; playing/paused flip when
/// the test emits the matching event.
#[derive(Debug)]
pub struct MockEngine {
    probe: MockProbe,
}

impl MockEngine {
    fn record(&self, call: EngineCall) {
        self.probe.state.lock().calls.push(call);
    }

    fn open(&mut self, call: EngineCall) -> Result<MediaId, EngineError> {
        self.record(call);
        let mut state = self.probe.state.lock();
        if std::mem::take(&mut state.fail_open) {
            return Err(EngineError::Backend("open refused".to_string()));
        }
        let media = MediaId::next();
        state.live_media.push(media);
        Ok(media)
    }
}

impl PlaybackEngine for MockEngine {
    fn open_network(&mut self, uri: &Url, read_ahead: Duration) -> Result<MediaId, EngineError> {
        self.open(EngineCall::OpenNetwork(uri.to_string(), read_ahead))
    }

    fn open_file(&mut self, path: &Path, read_ahead: Duration) -> Result<MediaId, EngineError> {
        self.open(EngineCall::OpenFile(path.to_path_buf(), read_ahead))
    }

    fn disable_hardware_decode(&mut self, media: MediaId) -> Result<(), EngineError> {
        self.record(EngineCall::DisableHardwareDecode(media));
        Ok(())
    }

    fn play(&mut self, media: MediaId) -> Result<(), EngineError> {
        self.record(EngineCall::Play(media));
        let mut state = self.probe.state.lock();
        if !state.live_media.contains(&media) {
            return Err(EngineError::UnknownMedia(media));
        }
        if std::mem::take(&mut state.fail_play) {
            return Err(EngineError::StateChange("play refused".to_string()));
        }
        state.current = Some(media);
        drop(state);
        self.probe.events.emit(media, EngineEvent::Opening);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Pause);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Resume);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.probe.state.lock().playing
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Stop);
        let mut state = self.probe.state.lock();
        if state.fail_stop {
            return Err(EngineError::StateChange("stop refused".to_string()));
        }
        state.playing = false;
        let current = state.current;
        drop(state);
        if let Some(media) = current {
            self.probe.events.emit(media, EngineEvent::Stopped);
        }
        Ok(())
    }

    fn set_mute(&mut self, muted: bool) -> Result<(), EngineError> {
        self.record(EngineCall::SetMute(muted));
        Ok(())
    }

    fn dispose_media(&mut self, media: MediaId) -> Result<(), EngineError> {
        self.record(EngineCall::DisposeMedia(media));
        let mut state = self.probe.state.lock();
        state.live_media.retain(|m| *m != media);
        if state.current == Some(media) {
            state.current = None;
            state.playing = false;
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Dispose);
        let mut state = self.probe.state.lock();
        state.disposed = true;
        state.playing = false;
        state.current = None;
        Ok(())
    }
}

/// Factory producing [`MockEngine`]s.
#[derive(Debug, Default)]
pub struct MockEngineFactory {
    initializations: AtomicUsize,
    probes: Mutex<Vec<MockProbe>>,
    fail_create: Mutex<bool>,
}

impl MockEngineFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// How many times the process-wide bootstrap actually ran.
    pub fn initialization_count(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Probe of the `index`-th engine created, counting across rebuilds.
    pub fn probe(&self, index: usize) -> MockProbe {
        self.probes.lock()[index].clone()
    }

    pub fn probes(&self) -> Vec<MockProbe> {
        self.probes.lock().clone()
    }

    pub fn created(&self) -> usize {
        self.probes.lock().len()
    }

    pub fn fail_create(&self, fail: bool) {
        *self.fail_create.lock() = fail;
    }
}

impl EngineFactory for MockEngineFactory {
    fn initialize(&self) -> Result<(), EngineError> {
        // Same single-assignment shape as the real bootstrap.
        let _ = self
            .initializations
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst);
        Ok(())
    }

    fn create(&self, events: EventSender) -> Result<Box<dyn PlaybackEngine>, EngineError> {
        self.initialize()?;
        if *self.fail_create.lock() {
            return Err(EngineError::Backend("player creation refused".to_string()));
        }
        let probe = MockProbe {
            state: Arc::new(Mutex::new(MockState::default())),
            events,
        };
        self.probes.lock().push(probe.clone());
        Ok(Box::new(MockEngine { probe }))
    }
}

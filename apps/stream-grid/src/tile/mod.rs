//! Per-tile playback controller.
//!
//! A [`TileController`] owns one [`PlaybackEngine`] and at most one open
//! media handle. User intents (`connect`, `toggle_pause`, `stop_hard`) and
//! engine events are the only inputs of its state machine; the displayed
//! [`TileStatus`] is a projection of the current [`TileState`].
//!
//! Nothing here returns an error. Every failure ends up as a
//! [`TileState::NoSignal`] with a reason the host can show.

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{EngineEvent, EngineError, MediaId, PlaybackEngine, TileId};

pub mod source;
pub mod status;

pub use source::SourceReference;
pub use status::{
    BorderColor, NoSignalReason, PauseLabel, StatusKind, Termination, TileFault, TileState,
    TileStatus,
};

/// Engine options applied to every media handle a tile opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub network_read_ahead: Duration,
    pub file_read_ahead: Duration,
    pub software_decode: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            network_read_ahead: Duration::from_millis(300),
            file_read_ahead: Duration::from_millis(300),
            software_decode: true,
        }
    }
}

pub struct TileController {
    id: TileId,
    engine: Option<Box<dyn PlaybackEngine>>,
    media: Option<MediaId>,
    pending_source: String,
    state: TileState,
    paused: bool,
    pause_label: PauseLabel,
    options: PlaybackOptions,
}

impl std::fmt::Debug for TileController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileController")
            .field("id", &self.id)
            .field("has_engine", &self.engine.is_some())
            .field("media", &self.media)
            .field("pending_source", &self.pending_source)
            .field("state", &self.state)
            .field("paused", &self.paused)
            .finish()
    }
}

impl TileController {
    /// Create a tile around an engine. `engine` is `None` when the engine
    /// could not be created; such a tile fails every connect attempt.
    pub fn new(
        id: TileId,
        engine: Option<Box<dyn PlaybackEngine>>,
        options: PlaybackOptions,
    ) -> Self {
        debug!("Creating tile {}", id);
        Self {
            id,
            engine,
            media: None,
            pending_source: String::new(),
            state: TileState::default(),
            paused: false,
            pause_label: PauseLabel::Pause,
            options,
        }
    }

    /// Convenience constructor with a random id.
    pub fn with_engine(engine: Box<dyn PlaybackEngine>, options: PlaybackOptions) -> Self {
        Self::new(Uuid::new_v4(), Some(engine), options)
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn state(&self) -> &TileState {
        &self.state
    }

    pub fn status(&self) -> TileStatus {
        TileStatus::from(&self.state)
    }

    pub fn pause_label(&self) -> PauseLabel {
        self.pause_label
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn source(&self) -> &str {
        &self.pending_source
    }

    /// Media handle currently bound to the engine, if any.
    pub fn media(&self) -> Option<MediaId> {
        self.media
    }

    /// Remember the source for the next [`connect`](Self::connect).
    pub fn set_source(&mut self, text: impl Into<String>) {
        if self.state.is_disposed() {
            return;
        }
        self.pending_source = text.into();
    }

    /// Open the pending source and request playback.
    ///
    /// Returns as soon as the engine accepted the request; the tile stays in
    /// [`TileState::Connecting`] until engine events move it on. Calling it
    /// again while a previous attempt is settling discards that attempt.
    pub fn connect(&mut self) {
        if self.state.is_disposed() {
            return;
        }

        let input = self.pending_source.trim().to_string();
        if input.is_empty() {
            self.fail(TileFault::EmptyInput);
            return;
        }

        self.transition(TileState::Connecting);
        self.paused = false;
        self.release_media();

        let source = match SourceReference::classify(&input) {
            Ok(source) => source,
            Err(fault) => {
                self.fail(fault);
                return;
            }
        };

        info!("Tile {} connecting to {} source {}", self.id, source.kind(), input);

        if let Err(e) = self.open_and_play(&source) {
            // Never leave a half-opened handle behind.
            self.release_media();
            self.fail(TileFault::OpenOrPlayFailure(e.to_string()));
        }
    }

    fn open_and_play(&mut self, source: &SourceReference) -> Result<(), EngineError> {
        let engine = self.engine.as_mut().ok_or(EngineError::Unavailable)?;

        let media = match source {
            SourceReference::Network(url) => {
                engine.open_network(url, self.options.network_read_ahead)?
            }
            SourceReference::File(path) => engine.open_file(path, self.options.file_read_ahead)?,
        };
        self.media = Some(media);

        if self.options.software_decode {
            engine.disable_hardware_decode(media)?;
        }

        engine.play(media)
    }

    /// Pause when playing, resume otherwise. Only the control label changes
    /// here; the displayed state follows the engine's answer.
    pub fn toggle_pause(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let Some(media) = self.media else {
            debug!("Tile {} has nothing loaded, ignoring pause toggle", self.id);
            return;
        };

        let result = if engine.is_playing() {
            engine.pause().map(|()| {
                self.paused = true;
                self.pause_label = PauseLabel::Resume;
            })
        } else {
            engine
                .resume()
                .and_then(|()| {
                    if engine.is_playing() {
                        Ok(())
                    } else {
                        engine.play(media)
                    }
                })
                .map(|()| {
                    self.paused = false;
                    self.pause_label = PauseLabel::Pause;
                })
        };

        if let Err(e) = result {
            warn!("Tile {} pause toggle failed: {}", self.id, e);
            self.fail(TileFault::OpenOrPlayFailure(e.to_string()));
        }
    }

    /// Stop playback right away, without waiting for the engine to confirm.
    /// The media handle stays loaded so that a later resume restarts it.
    pub fn stop_hard(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        best_effort(self.id, "stop", engine.stop());
        // Flush whatever frame the video output still holds.
        best_effort(self.id, "mute", engine.set_mute(true));
        best_effort(self.id, "unmute", engine.set_mute(false));

        self.paused = false;
        self.pause_label = PauseLabel::Pause;
        self.transition(TileState::NoSignal(NoSignalReason::Stopped));
    }

    /// Feed one engine event into the state machine.
    ///
    /// Events for any media other than the current one are dropped, which
    /// makes reports from replaced or released handles inert. Returns whether
    /// the event was applied.
    pub fn handle_event(&mut self, media: MediaId, event: EngineEvent) -> bool {
        if self.state.is_disposed() {
            debug!("Tile {} disposed, dropping {:?}", self.id, event);
            return false;
        }
        if self.media != Some(media) {
            debug!(
                "Tile {} dropping stale {:?} from {} (current: {:?})",
                self.id, event, media, self.media
            );
            return false;
        }

        match event {
            EngineEvent::Opening => {
                debug!("Tile {} opening {}", self.id, media);
            }
            EngineEvent::Playing => self.transition(TileState::Live),
            EngineEvent::Paused => self.transition(TileState::Paused),
            EngineEvent::Buffering(percent) => {
                let playing = self.engine.as_ref().is_some_and(|e| e.is_playing());
                if !playing {
                    self.transition(TileState::Buffering(percent.min(100)));
                }
            }
            EngineEvent::Stopped => self.fail(TileFault::EngineTermination(Termination::Stopped)),
            EngineEvent::EndReached => self.fail(TileFault::EngineTermination(Termination::Ended)),
            EngineEvent::Error(message) => self.fail(TileFault::EngineError(message)),
        }
        true
    }

    /// Release everything the tile holds. Every step is attempted even if an
    /// earlier one fails, and the tile ends in [`TileState::Disposed`].
    pub fn dispose(&mut self) {
        if self.state.is_disposed() {
            return;
        }

        if let Some(mut engine) = self.engine.take() {
            best_effort(self.id, "stop", engine.stop());
            if let Some(media) = self.media.take() {
                best_effort(self.id, "dispose media", engine.dispose_media(media));
            }
            best_effort(self.id, "dispose player", engine.dispose());
        }

        self.media = None;
        self.paused = false;
        self.state = TileState::Disposed;
        info!("Tile {} disposed", self.id);
    }

    /// Stop and drop the current media handle, if any.
    fn release_media(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            self.media = None;
            return;
        };

        best_effort(self.id, "stop", engine.stop());
        if let Some(media) = self.media.take() {
            best_effort(self.id, "dispose media", engine.dispose_media(media));
        }
    }

    fn fail(&mut self, fault: TileFault) {
        debug!("Tile {}: {}", self.id, fault);
        self.transition(TileState::NoSignal(fault.reason()));
    }

    fn transition(&mut self, next: TileState) {
        if self.state == next {
            return;
        }
        info!("Tile {} {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}

impl Drop for TileController {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn best_effort(tile: TileId, step: &str, result: Result<(), EngineError>) {
    if let Err(e) = result {
        debug!("Tile {} ignoring {} failure: {}", tile, step, e);
    }
}

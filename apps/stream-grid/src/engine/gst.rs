//! GStreamer backend: one `playbin` per tile.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gst::prelude::*;
use gst::MessageView;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{EngineError, EngineEvent, EngineFactory, EventSender, MediaId, PlaybackEngine};
use crate::gst_utils;

/// Sink elements used instead of playbin's automatic choice.
#[derive(Debug, Clone, Default)]
pub struct SinkConfig {
    pub video_sink: Option<String>,
    pub audio_sink: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GstEngineFactory {
    sinks: SinkConfig,
}

impl GstEngineFactory {
    pub fn new(sinks: SinkConfig) -> Self {
        Self { sinks }
    }
}

impl EngineFactory for GstEngineFactory {
    fn initialize(&self) -> Result<(), EngineError> {
        gst_utils::initialize_once()
    }

    fn create(&self, events: EventSender) -> Result<Box<dyn PlaybackEngine>, EngineError> {
        gst_utils::initialize_once()?;
        Ok(Box::new(GstPlaybackEngine::new(events, &self.sinks)?))
    }
}

#[derive(Debug, Clone)]
struct GstMedia {
    uri: String,
    read_ahead: Duration,
    software_decode: bool,
}

pub struct GstPlaybackEngine {
    playbin: gst::Element,
    bus: gst::Bus,
    /// Media id stamped on bus messages; 0 while nothing is loaded.
    current: Arc<AtomicU64>,
    /// Set once the current media reached EOS or failed. Cleared by `play`.
    finished: Arc<AtomicBool>,
    /// Media whose uri is set on the playbin.
    loaded: Option<MediaId>,
    media: HashMap<MediaId, GstMedia>,
    events: EventSender,
}

impl std::fmt::Debug for GstPlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GstPlaybackEngine")
            .field("playbin", &self.playbin.name())
            .field("current", &self.current.load(Ordering::Acquire))
            .field("finished", &self.finished.load(Ordering::Acquire))
            .field("loaded", &self.loaded)
            .field("media", &self.media)
            .finish()
    }
}

fn make_element(factory: &str) -> Result<gst::Element, EngineError> {
    gst::ElementFactory::make(factory)
        .build()
        .map_err(|e| EngineError::Backend(format!("Failed to create {}: {}", factory, e)))
}

impl GstPlaybackEngine {
    pub fn new(events: EventSender, sinks: &SinkConfig) -> Result<Self, EngineError> {
        let playbin = gst::ElementFactory::make("playbin")
            .name(format!("playbin-{}", events.tile()))
            .build()
            .map_err(|e| EngineError::Backend(format!("Failed to create playbin: {}", e)))?;

        if let Some(name) = &sinks.video_sink {
            playbin.set_property("video-sink", make_element(name)?);
        }
        if let Some(name) = &sinks.audio_sink {
            playbin.set_property("audio-sink", make_element(name)?);
        }

        let bus = playbin
            .bus()
            .ok_or_else(|| EngineError::Backend("Failed to get playbin bus".to_string()))?;

        let current = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        Self::watch_bus(&bus, &playbin, current.clone(), finished.clone(), events.clone());

        debug!("Created playbin for tile {}", events.tile());

        Ok(Self {
            playbin,
            bus,
            current,
            finished,
            loaded: None,
            media: HashMap::new(),
            events,
        })
    }

    /// Translate bus messages into engine events on the streaming threads.
    /// The channel behind `events` carries them to the owner thread.
    fn watch_bus(
        bus: &gst::Bus,
        playbin: &gst::Element,
        current: Arc<AtomicU64>,
        finished: Arc<AtomicBool>,
        events: EventSender,
    ) {
        let playbin = playbin.downgrade();
        bus.set_sync_handler(move |_bus, msg| {
            let Some(media) = MediaId::from_u64(current.load(Ordering::Acquire)) else {
                return gst::BusSyncReply::Drop;
            };

            let event = match msg.view() {
                MessageView::StateChanged(changed)
                    if msg.src().map(|s| s.type_().name()) == Some("GstPlayBin") =>
                {
                    // Passing through PAUSED on the way down is not a pause.
                    match (changed.old(), changed.current(), changed.pending()) {
                        (_, gst::State::Playing, _) => Some(EngineEvent::Playing),
                        (gst::State::Playing, gst::State::Paused, gst::State::VoidPending) => {
                            Some(EngineEvent::Paused)
                        }
                        (gst::State::Ready, gst::State::Paused, _) => Some(EngineEvent::Opening),
                        _ => None,
                    }
                }
                MessageView::Buffering(buffering) => {
                    Some(EngineEvent::Buffering(buffering.percent().clamp(0, 100) as u8))
                }
                MessageView::Eos(_) => {
                    finished.store(true, Ordering::Release);
                    Some(EngineEvent::EndReached)
                }
                MessageView::Error(err) => {
                    error!(
                        "Error from {}: {} (debug: {:?})",
                        media,
                        err.error(),
                        err.debug()
                    );
                    finished.store(true, Ordering::Release);
                    // State changes are not allowed from a streaming thread.
                    if let Some(playbin) = playbin.upgrade() {
                        let current = current.clone();
                        playbin.call_async(move |playbin| {
                            if current.load(Ordering::Acquire) != media.as_u64() {
                                return;
                            }
                            if let Err(e) = playbin.set_state(gst::State::Null) {
                                warn!("Failed to shut down {} after error: {:?}", media, e);
                            }
                        });
                    }
                    Some(EngineEvent::Error(err.error().to_string()))
                }
                _ => None,
            };

            if let Some(event) = event {
                events.emit(media, event);
            }
            gst::BusSyncReply::Drop
        });
    }

    fn open(&mut self, uri: String, read_ahead: Duration) -> MediaId {
        let media = MediaId::next();
        debug!("Opening {} as {}", uri, media);
        self.media.insert(
            media,
            GstMedia {
                uri,
                read_ahead,
                software_decode: false,
            },
        );
        media
    }

    fn set_state(&self, state: gst::State) -> Result<gst::StateChangeSuccess, EngineError> {
        self.playbin.set_state(state).map_err(|e| {
            EngineError::StateChange(format!(
                "{:?} -> {:?}: {}",
                self.playbin.current_state(),
                state,
                e
            ))
        })
    }
}

impl PlaybackEngine for GstPlaybackEngine {
    fn open_network(&mut self, uri: &Url, read_ahead: Duration) -> Result<MediaId, EngineError> {
        Ok(self.open(uri.to_string(), read_ahead))
    }

    fn open_file(&mut self, path: &Path, read_ahead: Duration) -> Result<MediaId, EngineError> {
        let uri = Url::from_file_path(path)
            .map_err(|()| EngineError::Backend(format!("Not an absolute path: {:?}", path)))?;
        Ok(self.open(uri.to_string(), read_ahead))
    }

    fn disable_hardware_decode(&mut self, media: MediaId) -> Result<(), EngineError> {
        let entry = self.media.get_mut(&media).ok_or(EngineError::UnknownMedia(media))?;
        entry.software_decode = true;
        Ok(())
    }

    fn play(&mut self, media: MediaId) -> Result<(), EngineError> {
        let entry = self.media.get(&media).cloned().ok_or(EngineError::UnknownMedia(media))?;

        // Already loaded and not finished: continue where it is.
        if self.loaded == Some(media) && !self.finished.load(Ordering::Acquire) {
            debug!("Continuing {}", media);
            return self.set_state(gst::State::Playing).map(|_| ());
        }

        // The uri can only change in NULL/READY.
        self.set_state(gst::State::Null)?;
        self.finished.store(false, Ordering::Release);

        if entry.software_decode {
            gst_utils::demote_hardware_decoders();
        }

        let buffer_duration = i64::try_from(entry.read_ahead.as_nanos()).unwrap_or(i64::MAX);
        self.playbin.set_property("uri", entry.uri.as_str());
        self.playbin.set_property("buffer-duration", buffer_duration);

        self.loaded = Some(media);
        self.current.store(media.as_u64(), Ordering::Release);
        info!("Playing {} from {}", media, entry.uri);
        self.set_state(gst::State::Playing)?;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.set_state(gst::State::Paused).map(|_| ())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        // Finished media has nothing to resume; `play` restarts it.
        if self.finished.load(Ordering::Acquire) {
            return Ok(());
        }
        self.set_state(gst::State::Playing).map(|_| ())
    }

    /// Playing, or on its way there. False once the media finished.
    fn is_playing(&self) -> bool {
        if self.finished.load(Ordering::Acquire) {
            return false;
        }
        self.playbin.current_state() == gst::State::Playing
            || self.playbin.pending_state() == gst::State::Playing
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.set_state(gst::State::Null)?;
        // Going to NULL flushes the bus, so report the stop ourselves.
        if let Some(media) = MediaId::from_u64(self.current.load(Ordering::Acquire)) {
            self.events.emit(media, EngineEvent::Stopped);
        }
        Ok(())
    }

    fn set_mute(&mut self, muted: bool) -> Result<(), EngineError> {
        self.playbin.set_property("mute", muted);
        Ok(())
    }

    fn dispose_media(&mut self, media: MediaId) -> Result<(), EngineError> {
        self.media.remove(&media).ok_or(EngineError::UnknownMedia(media))?;
        if self.loaded == Some(media) {
            self.loaded = None;
        }
        let _ = self.current.compare_exchange(
            media.as_u64(),
            0,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        debug!("Released {}", media);
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), EngineError> {
        self.current.store(0, Ordering::Release);
        self.loaded = None;
        self.media.clear();
        self.bus.unset_sync_handler();
        self.set_state(gst::State::Null).map(|_| ())
    }
}

impl Drop for GstPlaybackEngine {
    fn drop(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Null) {
            warn!("Error stopping playbin during drop: {:?}", e);
        }
    }
}

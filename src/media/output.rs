//! `rodio`-backed elements.
//!
//! Every element owns one `Sink` on the shared output stream. A paused sink is
//! prepared as soon as a source is assigned, so opening and decoding errors
//! surface before the first play request. A video without an audio track has
//! nothing to decode; it runs on a [`PictureClock`] instead of a sink.

use std::fs::File;
use std::io::BufReader;
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info, warn};

use super::clock::PictureClock;
use super::element::{
    ElementEvent, ElementFactory, ElementKind, MediaElement, PlayRejection, PlayTicket,
};
use super::probe::probe_duration;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("no audio output device: {0}")]
    NoOutput(String),
}

/// Open the default output device.
pub fn open_output() -> Result<Rc<OutputStream>, MediaError> {
    let mut stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| MediaError::NoOutput(e.to_string()))?;
    // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
    // but noisy for a TUI app.
    stream.log_on_drop(false);
    info!("audio output opened");
    Ok(Rc::new(stream))
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the source's total duration when the decoder knows it.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| MediaError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let total = decoder.total_duration();
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

pub struct RodioElement {
    stream: Rc<OutputStream>,
    kind: ElementKind,
    source: Option<PathBuf>,
    sink: Option<Sink>,
    // Set instead of `sink` for a picture-only video.
    clock: Option<PictureClock>,
    // Position the current sink started from; `get_pos` counts from there.
    offset: Duration,
    duration: Option<Duration>,
    volume: f32,
    looping: bool,
    playing: bool,
    failure: Option<String>,
    progress_interval: Duration,
    last_update: Option<Instant>,
    events: Vec<ElementEvent>,
}

impl RodioElement {
    pub fn new(stream: Rc<OutputStream>, kind: ElementKind, progress_interval: Duration) -> Self {
        Self {
            stream,
            kind,
            source: None,
            sink: None,
            clock: None,
            offset: Duration::ZERO,
            duration: None,
            volume: 1.0,
            looping: false,
            playing: false,
            failure: None,
            progress_interval,
            last_update: None,
            events: Vec::new(),
        }
    }

    /// Replace the sink with a fresh one starting at `start_at`.
    fn rebuild(&mut self, start_at: Duration) -> bool {
        let Some(path) = self.source.clone() else {
            return false;
        };
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.clock = None;
        match create_sink_at(&self.stream, &path, start_at) {
            Ok((sink, total)) => {
                sink.set_volume(self.volume);
                if self.duration.is_none() {
                    self.duration = total.or_else(|| probe_duration(&path));
                }
                self.sink = Some(sink);
                self.offset = start_at;
                self.failure = None;
                true
            }
            Err(e @ MediaError::Decode { .. }) if self.kind == ElementKind::Video => {
                self.open_picture_only(&path, start_at, e)
            }
            Err(e) => self.fail(e),
        }
    }

    /// The container opened but holds no audio the decoder can play. A
    /// readable header is enough to show the picture on a wall clock.
    fn open_picture_only(&mut self, path: &Path, start_at: Duration, err: MediaError) -> bool {
        let Some(total) = probe_duration(path) else {
            return self.fail(err);
        };
        debug!(path = %path.display(), "no audio track, running the picture on a clock");
        let mut clock = PictureClock::new(Some(total));
        clock.seek(start_at, Instant::now());
        self.clock = Some(clock);
        self.duration = Some(total);
        self.offset = start_at;
        self.failure = None;
        true
    }

    fn fail(&mut self, err: MediaError) -> bool {
        warn!(kind = ?self.kind, "{err}");
        self.failure = Some(err.to_string());
        self.events.push(ElementEvent::Failed(err.to_string()));
        self.playing = false;
        false
    }

    fn start(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
        if let Some(clock) = self.clock.as_mut() {
            clock.start(Instant::now());
        }
    }

    /// Nothing left to play in the current source.
    fn drained(&self) -> bool {
        match (&self.clock, &self.sink) {
            (Some(clock), _) => clock.finished(Instant::now()),
            (None, Some(sink)) => sink.empty(),
            (None, None) => true,
        }
    }
}

impl MediaElement for RodioElement {
    fn set_source(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
        self.duration = None;
        self.playing = false;
        self.last_update = None;

        if self.rebuild(Duration::ZERO) {
            debug!(kind = ?self.kind, path = %path.display(), "source ready");
            if let Some(d) = self.duration {
                self.events.push(ElementEvent::MetadataLoaded(d));
            }
            self.events.push(ElementEvent::CanPlayThrough);
        }
    }

    fn request_play(&mut self, ticket: PlayTicket) {
        if self.source.is_none() {
            self.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Err(PlayRejection::NoSource),
            });
            return;
        }

        let drained = self.drained();
        if (drained || self.failure.is_some()) && !self.rebuild(Duration::ZERO) {
            let reason = self.failure.clone().unwrap_or_default();
            self.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Err(PlayRejection::Unavailable(reason)),
            });
            return;
        }

        self.start();
        self.playing = true;
        self.events.push(ElementEvent::PlaySettled {
            ticket,
            outcome: Ok(()),
        });
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        if let Some(clock) = self.clock.as_mut() {
            clock.pause(Instant::now());
        }
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        if self.sink.is_none() && self.clock.is_none() {
            return;
        }
        // Rebuild and skip into the file; works for every format the decoder opens.
        if self.rebuild(position) && self.playing {
            self.start();
        }
    }

    fn position(&self) -> Duration {
        if let Some(clock) = &self.clock {
            return clock.position(Instant::now());
        }
        let pos = self.offset + self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos);
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn poll(&mut self) -> Vec<ElementEvent> {
        if self.playing {
            if self.drained() {
                if self.looping {
                    if self.rebuild(Duration::ZERO) {
                        self.start();
                    }
                } else {
                    self.playing = false;
                    self.events.push(ElementEvent::Ended);
                }
            } else {
                let now = Instant::now();
                let due = self
                    .last_update
                    .is_none_or(|t| now.duration_since(t) >= self.progress_interval);
                if due {
                    self.last_update = Some(now);
                    self.events.push(ElementEvent::TimeUpdate(self.position()));
                }
            }
        }
        mem::take(&mut self.events)
    }
}

/// Builds rodio elements sharing one output stream.
pub struct RodioFactory {
    stream: Rc<OutputStream>,
    progress_interval: Duration,
}

impl RodioFactory {
    pub fn new(stream: Rc<OutputStream>, progress_interval: Duration) -> Self {
        Self {
            stream,
            progress_interval,
        }
    }
}

impl ElementFactory for RodioFactory {
    fn create(&self, kind: ElementKind) -> Box<dyn MediaElement> {
        Box::new(RodioElement::new(
            Rc::clone(&self.stream),
            kind,
            self.progress_interval,
        ))
    }
}

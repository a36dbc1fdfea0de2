use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;

/// Reads a media file's duration without decoding or playing it.
pub trait DurationProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Option<Duration>;
}

/// Header-only probe backed by `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn probe(&self, path: &Path) -> Option<Duration> {
        probe_duration(path)
    }
}

/// Duration from the file's container headers; `None` when unreadable or zero.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    Some(tagged.properties().duration()).filter(|d| !d.is_zero())
}

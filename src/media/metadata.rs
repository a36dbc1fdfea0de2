//! Process-wide duration cache keyed by media path.
//!
//! Durations are probed on a short-lived background thread and handed back
//! over a channel; `pump` applies finished probes on the UI thread. Each path
//! is probed at most once: later lookups return the pending or settled entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::format::{DURATION_PLACEHOLDER, format_duration};
use super::probe::DurationProbe;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DurationLookup {
    /// A probe is in flight.
    Pending,
    Ready(Duration),
    /// The probe finished without a duration. Not retried.
    Unavailable,
}

type ProbeResult = (PathBuf, Option<Duration>);

pub struct DurationCache {
    probe: Arc<dyn DurationProbe>,
    entries: HashMap<PathBuf, DurationLookup>,
    tx: Sender<ProbeResult>,
    rx: Receiver<ProbeResult>,
    probes_started: usize,
}

impl DurationCache {
    pub fn new(probe: Arc<dyn DurationProbe>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            probe,
            entries: HashMap::new(),
            tx,
            rx,
            probes_started: 0,
        }
    }

    /// Return the cached entry for `path`, starting a probe on first sight.
    pub fn resolve(&mut self, path: &Path) -> DurationLookup {
        if let Some(entry) = self.entries.get(path) {
            return *entry;
        }

        let probe = Arc::clone(&self.probe);
        let tx = self.tx.clone();
        let owned = path.to_path_buf();
        let spawned = thread::Builder::new()
            .name("duration-probe".to_string())
            .spawn(move || {
                let d = probe.probe(&owned);
                let _ = tx.send((owned, d));
            });

        let entry = match spawned {
            Ok(_) => {
                self.probes_started += 1;
                DurationLookup::Pending
            }
            Err(e) => {
                warn!(path = %path.display(), "could not start duration probe: {e}");
                DurationLookup::Unavailable
            }
        };
        self.entries.insert(path.to_path_buf(), entry);
        entry
    }

    /// The entry for `path` without starting a probe.
    pub fn lookup(&self, path: &Path) -> Option<DurationLookup> {
        self.entries.get(path).copied()
    }

    pub fn duration(&self, path: &Path) -> Option<Duration> {
        match self.lookup(path) {
            Some(DurationLookup::Ready(d)) => Some(d),
            _ => None,
        }
    }

    /// Display label for `path`: `M:SS`, `N sec`, or the placeholder.
    pub fn label(&self, path: &Path) -> String {
        self.duration(path)
            .map(format_duration)
            .unwrap_or_else(|| DURATION_PLACEHOLDER.to_string())
    }

    /// Apply finished probes. Returns how many entries settled.
    pub fn pump(&mut self) -> usize {
        let mut settled = 0;
        while let Ok(result) = self.rx.try_recv() {
            self.apply(result);
            settled += 1;
        }
        settled
    }

    /// Block until at least one probe settles or `timeout` passes, then apply
    /// everything that is ready.
    #[cfg(test)]
    pub fn wait(&mut self, timeout: Duration) -> usize {
        use std::sync::mpsc::RecvTimeoutError;
        use std::time::Instant;

        let deadline = Instant::now() + timeout;
        let mut settled = 0;
        while settled == 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(result) => {
                    self.apply(result);
                    settled += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        settled + self.pump()
    }

    /// Number of probes ever started.
    pub fn probes_started(&self) -> usize {
        self.probes_started
    }

    fn apply(&mut self, (path, d): ProbeResult) {
        let entry = match d {
            Some(d) => DurationLookup::Ready(d),
            None => {
                debug!(path = %path.display(), "duration unavailable");
                DurationLookup::Unavailable
            }
        };
        self.entries.insert(path, entry);
    }
}

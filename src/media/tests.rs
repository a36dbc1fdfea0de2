use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use super::clock::PictureClock;
use super::fake::{FakeElement, FakeHandle, PlayPolicy};
use super::*;

fn track(policy: PlayPolicy, looping: bool) -> (MediaTrack, FakeHandle) {
    let (el, h) = FakeElement::new(ElementKind::Audio, policy, Duration::from_secs(100));
    (MediaTrack::new(Box::new(el), looping), h)
}

fn loaded(policy: PlayPolicy, looping: bool) -> (MediaTrack, FakeHandle) {
    let (mut t, h) = track(policy, looping);
    t.load(Path::new("/media/a.wav"));
    t.pump();
    (t, h)
}

#[test]
fn format_duration_uses_seconds_under_a_minute() {
    assert_eq!(format_duration(Duration::from_secs(0)), "0 sec");
    assert_eq!(format_duration(Duration::from_millis(45_900)), "45 sec");
    assert_eq!(format_duration(Duration::from_secs(60)), "1:00");
    assert_eq!(format_duration(Duration::from_secs(61)), "1:01");
    assert_eq!(format_duration(Duration::from_secs(600)), "10:00");
}

#[test]
fn format_clock_shows_placeholder_for_unknown_total() {
    assert_eq!(
        format_clock(Duration::from_secs(5), Some(Duration::from_secs(75))),
        "00:05 / 01:15"
    );
    assert_eq!(format_clock(Duration::from_secs(5), None), "00:05 / --:--");
}

#[test]
fn track_walks_idle_loading_ready() {
    let (mut t, _h) = track(PlayPolicy::Resolve, false);
    assert_eq!(t.state(), TrackState::Idle);
    t.load(Path::new("/media/a.wav"));
    assert_eq!(t.state(), TrackState::Loading);
    let events = t.pump();
    assert!(events.contains(&TrackEvent::Ready(Duration::from_secs(100))));
    assert!(events.contains(&TrackEvent::CanPlayThrough));
    assert_eq!(t.state(), TrackState::Ready);
    assert!(t.can_play_through());
}

#[test]
fn play_without_source_does_nothing() {
    let (mut t, h) = track(PlayPolicy::Resolve, false);
    assert_eq!(t.play(), None);
    assert!(!t.is_playing());
    assert_eq!(h.play_requests(), 0);
}

#[test]
fn play_counts_as_playing_until_settled() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, false);
    let ticket = t.play();
    assert!(ticket.is_some());
    assert!(t.is_playing());
    assert_eq!(t.pending_play(), ticket);
    t.pump();
    assert_eq!(t.pending_play(), None);
    assert!(t.is_playing());
    assert!(h.audible());
}

#[test]
fn rejected_play_leaves_track_paused() {
    let (mut t, h) = loaded(PlayPolicy::Reject, false);
    t.play();
    let events = t.pump();
    assert_eq!(events, vec![TrackEvent::Rejected(PlayRejection::Policy)]);
    assert_eq!(t.state(), TrackState::Paused);
    assert!(!h.audible());

    // The next explicit attempt tries again.
    h.set_policy(PlayPolicy::Resolve);
    t.play();
    t.pump();
    assert!(t.is_playing());
    assert!(h.audible());
}

#[test]
fn stale_play_outcome_after_pause_is_silenced() {
    let (mut t, h) = loaded(PlayPolicy::Hold, false);
    t.play();
    t.pause();
    h.resolve_held();
    assert!(h.audible());
    t.pump();
    assert!(!h.audible());
    assert!(!t.is_playing());
}

#[test]
fn superseded_ticket_does_not_pause_newer_request() {
    let (mut t, h) = loaded(PlayPolicy::Hold, false);
    let first = t.play().unwrap();
    let second = t.play().unwrap();
    assert!(second > first);
    h.resolve_held();
    t.pump();
    assert!(t.is_playing());
    assert!(h.audible());
}

#[test]
fn pause_is_idempotent() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, false);
    t.play();
    t.pump();
    t.pause();
    t.pause();
    assert_eq!(t.state(), TrackState::Paused);
    assert!(!h.audible());
}

#[test]
fn seek_and_volume_are_clamped() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, false);
    t.seek_to(-3.0);
    assert_eq!(h.position(), Duration::ZERO);
    t.seek_to(500.0);
    assert_eq!(h.position(), Duration::from_secs(100));
    t.seek_to(25.0);
    assert_eq!(t.progress(), 0.25);

    t.set_volume(1.7);
    assert_eq!(h.volume(), 1.0);
    t.set_volume(-0.2);
    assert_eq!(h.volume(), 0.0);
    t.set_volume(0.4);
    assert_eq!(t.volume(), 0.4);
}

#[test]
fn ended_fires_once_and_restart_plays_again() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, false);
    t.play();
    t.pump();
    h.finish();
    h.finish();
    let events = t.pump();
    assert_eq!(events, vec![TrackEvent::Ended]);
    assert_eq!(t.state(), TrackState::Ended);

    t.restart();
    t.pump();
    assert_eq!(t.state(), TrackState::Playing);
    assert_eq!(h.position(), Duration::ZERO);
    assert!(h.audible());
}

#[test]
fn looping_track_never_reports_ended() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, true);
    assert!(h.looping());
    t.play();
    t.pump();
    h.finish();
    assert!(t.pump().is_empty());
    assert!(t.is_playing());
}

#[test]
fn progress_is_reported_only_while_playing() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, false);
    h.advance_to(Duration::from_secs(10));
    assert!(t.pump().is_empty());

    t.play();
    t.pump();
    h.advance_to(Duration::from_secs(50));
    assert_eq!(t.pump(), vec![TrackEvent::Progress(0.5)]);
}

#[test]
fn broken_source_reports_failure_and_rejects_play() {
    let (mut t, h) = track(PlayPolicy::Resolve, false);
    h.break_source(Path::new("/media/missing.wav"));
    t.load(Path::new("/media/missing.wav"));
    let events = t.pump();
    assert!(matches!(events.as_slice(), [TrackEvent::Failed(_)]));
    assert!(t.has_failed());
    assert!(!t.can_play_through());

    t.play();
    let events = t.pump();
    assert!(matches!(
        events.as_slice(),
        [TrackEvent::Rejected(PlayRejection::Unavailable(_))]
    ));
    assert!(!t.is_playing());
}

#[test]
fn fade_out_pauses_and_restores_volume() {
    let (mut t, h) = loaded(PlayPolicy::Resolve, false);
    t.set_volume(0.8);
    t.play();
    t.pump();
    t.fade_out(Duration::from_millis(4), 4);
    assert!(!t.is_playing());
    assert!(!h.audible());
    assert_eq!(h.volume(), 0.8);
}

struct GatedProbe {
    calls: AtomicUsize,
    gate: Mutex<Receiver<()>>,
}

impl DurationProbe for GatedProbe {
    fn probe(&self, path: &Path) -> Option<Duration> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .gate
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5));
        if path.ends_with("missing.wav") {
            None
        } else {
            Some(Duration::from_secs(83))
        }
    }
}

fn gated_cache() -> (DurationCache, Arc<GatedProbe>, Sender<()>) {
    let (tx, rx) = mpsc::channel();
    let probe = Arc::new(GatedProbe {
        calls: AtomicUsize::new(0),
        gate: Mutex::new(rx),
    });
    (DurationCache::new(probe.clone()), probe, tx)
}

#[test]
fn concurrent_resolves_share_one_probe() {
    let (mut cache, probe, gate) = gated_cache();
    let path = PathBuf::from("/media/a.wav");

    assert_eq!(cache.resolve(&path), DurationLookup::Pending);
    assert_eq!(cache.resolve(&path), DurationLookup::Pending);
    assert_eq!(cache.label(&path), DURATION_PLACEHOLDER);

    gate.send(()).unwrap();
    assert_eq!(cache.wait(Duration::from_secs(5)), 1);

    assert_eq!(cache.probes_started(), 1);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        cache.resolve(&path),
        DurationLookup::Ready(Duration::from_secs(83))
    );
    assert_eq!(cache.label(&path), "1:23");
    assert_eq!(cache.probes_started(), 1);
}

#[test]
fn unresolvable_duration_keeps_placeholder_without_retrying() {
    let (mut cache, probe, gate) = gated_cache();
    let path = PathBuf::from("/media/missing.wav");

    cache.resolve(&path);
    gate.send(()).unwrap();
    cache.wait(Duration::from_secs(5));

    assert_eq!(cache.lookup(&path), Some(DurationLookup::Unavailable));
    assert_eq!(cache.resolve(&path), DurationLookup::Unavailable);
    assert_eq!(cache.label(&path), DURATION_PLACEHOLDER);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn lookup_does_not_start_a_probe() {
    let (cache, probe, _gate) = gated_cache();
    assert_eq!(cache.lookup(Path::new("/media/a.wav")), None);
    assert_eq!(cache.probes_started(), 0);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn lofty_probe_returns_none_for_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("junk.wav");
    std::fs::write(&p, b"not a wav").unwrap();
    assert_eq!(LoftyProbe.probe(&p), None);
    assert_eq!(probe_duration(&dir.path().join("absent.wav")), None);
}

#[test]
fn picture_clock_runs_only_while_started() {
    let t0 = Instant::now();
    let secs = |n| t0 + Duration::from_secs(n);
    let mut clock = PictureClock::new(Some(Duration::from_secs(30)));

    assert_eq!(clock.position(secs(5)), Duration::ZERO);
    clock.start(secs(5));
    assert_eq!(clock.position(secs(12)), Duration::from_secs(7));

    clock.pause(secs(12));
    assert_eq!(clock.position(secs(20)), Duration::from_secs(7));

    clock.start(secs(20));
    clock.seek(Duration::from_secs(25), secs(21));
    assert_eq!(clock.position(secs(23)), Duration::from_secs(27));
    assert!(!clock.finished(secs(23)));
    assert!(clock.finished(secs(40)));
    assert_eq!(clock.position(secs(40)), Duration::from_secs(30));
}

#[test]
fn picture_clock_without_length_never_finishes() {
    let t0 = Instant::now();
    let mut clock = PictureClock::new(None);
    clock.start(t0);
    assert!(!clock.finished(t0 + Duration::from_secs(3600)));
    clock.seek(Duration::from_secs(90), t0);
    assert_eq!(clock.position(t0), Duration::from_secs(90));
}

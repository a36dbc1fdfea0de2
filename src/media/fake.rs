//! In-memory elements for tests. Each element exposes a [`FakeHandle`] so a
//! test can see what is audible and drive deferred play outcomes.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use super::element::{
    ElementEvent, ElementFactory, ElementKind, MediaElement, PlayRejection, PlayTicket,
};

/// How a fake element answers play requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayPolicy {
    /// Start immediately; the outcome is reported on the next poll.
    Resolve,
    /// Refuse every request.
    Reject,
    /// Keep requests pending until the test settles them.
    Hold,
}

#[derive(Debug)]
pub struct FakeState {
    pub kind: ElementKind,
    pub source: Option<PathBuf>,
    pub audible: bool,
    pub position: Duration,
    pub duration: Duration,
    pub volume: f32,
    pub looping: bool,
    pub policy: PlayPolicy,
    /// Whether `set_source` reports `CanPlayThrough` right away.
    pub instant_ready: bool,
    pub broken: HashSet<PathBuf>,
    /// Sources that open and run but carry no audio track.
    pub picture_only: HashSet<PathBuf>,
    /// Playing, whether or not anything is heard.
    pub running: bool,
    pub held: Vec<PlayTicket>,
    pub events: Vec<ElementEvent>,
    pub play_requests: usize,
    pub sources_set: usize,
    /// The element was dropped; it can no longer make sound.
    pub dropped: bool,
}

impl FakeState {
    fn start(&mut self) {
        self.running = true;
        self.audible = self
            .source
            .as_ref()
            .is_none_or(|p| !self.picture_only.contains(p));
    }

    fn halt(&mut self) {
        self.running = false;
        self.audible = false;
    }
}

#[derive(Debug, Clone)]
pub struct FakeHandle(Rc<RefCell<FakeState>>);

impl FakeHandle {
    pub fn audible(&self) -> bool {
        self.0.borrow().audible
    }

    pub fn running(&self) -> bool {
        self.0.borrow().running
    }

    pub fn volume(&self) -> f32 {
        self.0.borrow().volume
    }

    pub fn position(&self) -> Duration {
        self.0.borrow().position
    }

    pub fn source(&self) -> Option<PathBuf> {
        self.0.borrow().source.clone()
    }

    pub fn kind(&self) -> ElementKind {
        self.0.borrow().kind
    }

    pub fn looping(&self) -> bool {
        self.0.borrow().looping
    }

    pub fn play_requests(&self) -> usize {
        self.0.borrow().play_requests
    }

    pub fn sources_set(&self) -> usize {
        self.0.borrow().sources_set
    }

    pub fn dropped(&self) -> bool {
        self.0.borrow().dropped
    }

    pub fn set_policy(&self, policy: PlayPolicy) {
        self.0.borrow_mut().policy = policy;
    }

    pub fn break_source(&self, path: &Path) {
        self.0.borrow_mut().broken.insert(path.to_path_buf());
    }

    /// Settle every held request successfully: audio starts.
    pub fn resolve_held(&self) {
        let mut s = self.0.borrow_mut();
        let held = mem::take(&mut s.held);
        if s.dropped {
            return;
        }
        for ticket in held {
            s.start();
            s.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Ok(()),
            });
        }
    }

    /// Settle every held request with a policy refusal.
    pub fn reject_held(&self) {
        let mut s = self.0.borrow_mut();
        let held = mem::take(&mut s.held);
        for ticket in held {
            s.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Err(PlayRejection::Policy),
            });
        }
    }

    /// Report enough buffered data to play through.
    pub fn make_ready(&self) {
        self.0.borrow_mut().events.push(ElementEvent::CanPlayThrough);
    }

    /// Advance playback to `position` and report it.
    pub fn advance_to(&self, position: Duration) {
        let mut s = self.0.borrow_mut();
        s.position = position;
        s.events.push(ElementEvent::TimeUpdate(position));
    }

    /// Reach the end of the source.
    pub fn finish(&self) {
        let mut s = self.0.borrow_mut();
        if s.looping {
            s.position = Duration::ZERO;
            return;
        }
        s.position = s.duration;
        s.halt();
        s.events.push(ElementEvent::Ended);
    }
}

pub struct FakeElement {
    state: Rc<RefCell<FakeState>>,
}

impl FakeElement {
    pub fn new(kind: ElementKind, policy: PlayPolicy, duration: Duration) -> (Self, FakeHandle) {
        let state = Rc::new(RefCell::new(FakeState {
            kind,
            source: None,
            audible: false,
            position: Duration::ZERO,
            duration,
            volume: 1.0,
            looping: false,
            policy,
            instant_ready: true,
            broken: HashSet::new(),
            picture_only: HashSet::new(),
            running: false,
            held: Vec::new(),
            events: Vec::new(),
            play_requests: 0,
            sources_set: 0,
            dropped: false,
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            FakeHandle(state),
        )
    }
}

impl Drop for FakeElement {
    fn drop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.dropped = true;
        s.halt();
        s.held.clear();
    }
}

impl MediaElement for FakeElement {
    fn set_source(&mut self, path: &Path) {
        let mut s = self.state.borrow_mut();
        s.source = Some(path.to_path_buf());
        s.sources_set += 1;
        s.halt();
        s.position = Duration::ZERO;
        s.held.clear();
        if s.broken.contains(path) {
            s.events.push(ElementEvent::Failed(format!("cannot open {}", path.display())));
            return;
        }
        let d = s.duration;
        s.events.push(ElementEvent::MetadataLoaded(d));
        if s.instant_ready {
            s.events.push(ElementEvent::CanPlayThrough);
        }
    }

    fn request_play(&mut self, ticket: PlayTicket) {
        let mut s = self.state.borrow_mut();
        s.play_requests += 1;
        if s.source.is_none() {
            s.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Err(PlayRejection::NoSource),
            });
            return;
        }
        if s.source.as_ref().is_some_and(|p| s.broken.contains(p)) {
            s.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Err(PlayRejection::Unavailable("broken".into())),
            });
            return;
        }
        match s.policy {
            PlayPolicy::Resolve => {
                s.start();
                s.events.push(ElementEvent::PlaySettled {
                    ticket,
                    outcome: Ok(()),
                });
            }
            PlayPolicy::Reject => s.events.push(ElementEvent::PlaySettled {
                ticket,
                outcome: Err(PlayRejection::Policy),
            }),
            PlayPolicy::Hold => s.held.push(ticket),
        }
    }

    fn pause(&mut self) {
        self.state.borrow_mut().halt();
    }

    fn seek(&mut self, position: Duration) {
        self.state.borrow_mut().position = position;
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        let s = self.state.borrow();
        s.source.as_ref().map(|_| s.duration)
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn poll(&mut self) -> Vec<ElementEvent> {
        mem::take(&mut self.state.borrow_mut().events)
    }
}

/// Creates fake elements and keeps a handle to each, in creation order.
pub struct FakeFactory {
    policy: Cell<PlayPolicy>,
    instant_ready: Cell<bool>,
    duration: Duration,
    broken: RefCell<HashSet<PathBuf>>,
    picture_only: RefCell<HashSet<PathBuf>>,
    created: RefCell<Vec<FakeHandle>>,
}

impl FakeFactory {
    pub fn new(policy: PlayPolicy, duration: Duration) -> Self {
        Self {
            policy: Cell::new(policy),
            instant_ready: Cell::new(true),
            duration,
            broken: RefCell::new(HashSet::new()),
            picture_only: RefCell::new(HashSet::new()),
            created: RefCell::new(Vec::new()),
        }
    }

    /// Policy for elements created from now on.
    pub fn set_policy(&self, policy: PlayPolicy) {
        self.policy.set(policy);
    }

    /// Whether elements created from now on report `CanPlayThrough` on load.
    pub fn set_instant_ready(&self, ready: bool) {
        self.instant_ready.set(ready);
    }

    /// Make `path` unopenable for elements created from now on.
    pub fn break_source(&self, path: &Path) {
        self.broken.borrow_mut().insert(path.to_path_buf());
    }

    /// Give `path` no audio track for elements created from now on.
    pub fn strip_audio(&self, path: &Path) {
        self.picture_only.borrow_mut().insert(path.to_path_buf());
    }

    pub fn handles(&self) -> Vec<FakeHandle> {
        self.created.borrow().clone()
    }

    /// Handles of elements of `kind` that are still alive.
    pub fn live(&self, kind: ElementKind) -> Vec<FakeHandle> {
        self.created
            .borrow()
            .iter()
            .filter(|h| h.kind() == kind && !h.dropped())
            .cloned()
            .collect()
    }

    pub fn last(&self, kind: ElementKind) -> Option<FakeHandle> {
        self.created
            .borrow()
            .iter()
            .rev()
            .find(|h| h.kind() == kind)
            .cloned()
    }

    /// Whether any element created by this factory is making sound.
    pub fn any_audible(&self) -> bool {
        self.created.borrow().iter().any(FakeHandle::audible)
    }
}

impl ElementFactory for FakeFactory {
    fn create(&self, kind: ElementKind) -> Box<dyn MediaElement> {
        let (el, handle) = FakeElement::new(kind, self.policy.get(), self.duration);
        {
            let mut s = handle.0.borrow_mut();
            s.instant_ready = self.instant_ready.get();
            s.broken = self.broken.borrow().clone();
            s.picture_only = self.picture_only.borrow().clone();
        }
        self.created.borrow_mut().push(handle);
        Box::new(el)
    }
}

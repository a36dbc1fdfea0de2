//! Page-wide coordination bus.
//!
//! Players subscribe once for their whole lifetime and receive signals
//! synchronously, in subscription order, on the thread that publishes. The bus
//! only holds weak references, so a dropped player disappears from it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The showcase overlay is taking over the output.
    ShowcaseOpened,
    /// The showcase overlay released the output.
    ShowcaseClosed,
    /// A preview became audible.
    PreviewStarted,
    /// No preview is audible or suspended anymore.
    PreviewStopped,
}

pub trait Subscriber {
    fn on_signal(&mut self, signal: Signal);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    target: Weak<RefCell<dyn Subscriber>>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Cheap to clone; every clone addresses the same subscriber list.
#[derive(Clone, Default)]
pub struct Bus {
    inner: Rc<RefCell<Inner>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<S: Subscriber + 'static>(&self, subscriber: &Rc<RefCell<S>>) -> SubscriptionId {
        let strong: Rc<RefCell<dyn Subscriber>> = subscriber.clone();
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.entries.push(Entry {
            id,
            target: Rc::downgrade(&strong),
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|e| e.id != id);
        inner.entries.len() != before
    }

    /// Deliver `signal` to every live subscriber. Returns how many received it.
    pub fn publish(&self, signal: Signal) -> usize {
        // Collect first so a subscriber may touch the bus while handling.
        let targets: Vec<Rc<RefCell<dyn Subscriber>>> = {
            let mut inner = self.inner.borrow_mut();
            inner.entries.retain(|e| e.target.strong_count() > 0);
            inner.entries.iter().filter_map(|e| e.target.upgrade()).collect()
        };

        trace!(?signal, subscribers = targets.len(), "publish");
        for target in &targets {
            target.borrow_mut().on_signal(signal);
        }
        targets.len()
    }

    /// Live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.target.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Signal>,
    }

    impl Subscriber for Recorder {
        fn on_signal(&mut self, signal: Signal) {
            self.seen.push(signal);
        }
    }

    #[test]
    fn publish_reaches_every_subscriber_in_order() {
        let bus = Bus::new();
        let a = Rc::new(RefCell::new(Recorder::default()));
        let b = Rc::new(RefCell::new(Recorder::default()));
        bus.subscribe(&a);
        bus.subscribe(&b);

        assert_eq!(bus.publish(Signal::ShowcaseOpened), 2);
        assert_eq!(bus.publish(Signal::ShowcaseClosed), 2);

        let expected = vec![Signal::ShowcaseOpened, Signal::ShowcaseClosed];
        assert_eq!(a.borrow().seen, expected);
        assert_eq!(b.borrow().seen, expected);
    }

    #[test]
    fn repeated_cycles_do_not_grow_subscriptions() {
        let bus = Bus::new();
        let a = Rc::new(RefCell::new(Recorder::default()));
        bus.subscribe(&a);
        for _ in 0..50 {
            bus.publish(Signal::ShowcaseOpened);
            bus.publish(Signal::ShowcaseClosed);
        }
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(a.borrow().seen.len(), 100);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let bus = Bus::new();
        let keep = Rc::new(RefCell::new(Recorder::default()));
        bus.subscribe(&keep);
        {
            let gone = Rc::new(RefCell::new(Recorder::default()));
            bus.subscribe(&gone);
            assert_eq!(bus.subscriber_count(), 2);
        }
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.publish(Signal::PreviewStarted), 1);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let bus = Bus::new();
        let a = Rc::new(RefCell::new(Recorder::default()));
        let b = Rc::new(RefCell::new(Recorder::default()));
        let id_a = bus.subscribe(&a);
        bus.subscribe(&b);

        assert!(bus.unsubscribe(id_a));
        assert!(!bus.unsubscribe(id_a));
        bus.publish(Signal::PreviewStopped);
        assert!(a.borrow().seen.is_empty());
        assert_eq!(b.borrow().seen, vec![Signal::PreviewStopped]);
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = Bus::new();
        let other = bus.clone();
        let a = Rc::new(RefCell::new(Recorder::default()));
        bus.subscribe(&a);
        assert_eq!(other.publish(Signal::ShowcaseOpened), 1);
    }
}

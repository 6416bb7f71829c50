//! Publish/subscribe relay between the keyboard and anything that reacts to notes.
//!
//! `NoteBridge` is a cheap handle (clones share one subscriber registry); build
//! one per page and hand clones to producers and consumers. Delivery is
//! synchronous, in registration order, best-effort: with no subscribers a
//! publish is a no-op and nothing is retained for later.
//!
//! Each dispatch works on a snapshot of the subscriber list taken when it
//! starts, so handlers may subscribe or unsubscribe (themselves or others)
//! while it runs. A handler added mid-dispatch is first called by the next
//! publish; a handler removed mid-dispatch is not called again.

use crate::event::{NoteEvent, NoteKind, NoteMessage};
use fnv::FnvHashMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Handler = dyn Fn(&NoteMessage);

struct Entry {
    id: u64,
    live: Cell<bool>,
    handler: Box<Handler>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_kind: FnvHashMap<NoteKind, Vec<Rc<Entry>>>,
}

#[derive(Clone, Default)]
pub struct NoteBridge {
    registry: Rc<RefCell<Registry>>,
}

impl NoteBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one kind of message. The handler stays registered
    /// until the returned [`Subscription`] is unsubscribed or dropped.
    #[must_use = "dropping a Subscription unsubscribes its handler"]
    pub fn subscribe(
        &self,
        kind: NoteKind,
        handler: impl Fn(&NoteMessage) + 'static,
    ) -> Subscription {
        let entry = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            let entry = Rc::new(Entry {
                id,
                live: Cell::new(true),
                handler: Box::new(handler),
            });
            reg.by_kind.entry(kind).or_default().push(entry.clone());
            entry
        };
        log::debug!("[bridge] subscribed #{} to {:?}", entry.id, kind);
        Subscription {
            slot: Some(Slot {
                registry: Rc::downgrade(&self.registry),
                kind,
                entry,
            }),
        }
    }

    pub fn publish_note_on(&self, detail: NoteEvent) {
        self.publish(&NoteMessage::On(detail));
    }

    pub fn publish_note_off(&self) {
        self.publish(&NoteMessage::Off);
    }

    pub fn publish(&self, message: &NoteMessage) {
        let kind = message.kind();
        let snapshot: SmallVec<[Rc<Entry>; 4]> = {
            let reg = self.registry.borrow();
            reg.by_kind
                .get(&kind)
                .map(|entries| entries.iter().cloned().collect())
                .unwrap_or_default()
        };
        log::trace!("[bridge] {:?} -> {} handler(s)", kind, snapshot.len());
        for entry in snapshot {
            if entry.live.get() {
                (entry.handler)(message);
            }
        }
    }

    pub fn subscriber_count(&self, kind: NoteKind) -> usize {
        self.registry
            .borrow()
            .by_kind
            .get(&kind)
            .map_or(0, |entries| entries.len())
    }
}

struct Slot {
    registry: Weak<RefCell<Registry>>,
    kind: NoteKind,
    entry: Rc<Entry>,
}

/// Capability to deregister one handler. Unsubscribes on drop.
pub struct Subscription {
    slot: Option<Slot>,
}

impl Subscription {
    pub fn kind(&self) -> Option<NoteKind> {
        self.slot.as_ref().map(|s| s.kind)
    }

    pub fn is_active(&self) -> bool {
        self.slot.as_ref().is_some_and(|s| s.entry.live.get())
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the handler registered for as long as the bridge lives.
    pub fn detach(mut self) {
        self.slot = None;
    }

    fn release(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        slot.entry.live.set(false);
        // The bridge may already be gone; then there is nothing to remove from.
        if let Some(registry) = slot.registry.upgrade() {
            let mut reg = registry.borrow_mut();
            if let Some(entries) = reg.by_kind.get_mut(&slot.kind) {
                entries.retain(|e| e.id != slot.entry.id);
            }
        }
        log::debug!("[bridge] unsubscribed #{} from {:?}", slot.entry.id, slot.kind);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c4() -> NoteEvent {
        NoteEvent {
            note: "C4".into(),
            midi: 60,
            freq: 261.63,
            velocity: 1.0,
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&NoteMessage)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for = log.clone();
        let make = move |tag: &str| {
            let log = log_for.clone();
            let tag = tag.to_string();
            Box::new(move |m: &NoteMessage| {
                log.borrow_mut().push(format!("{}:{:?}", tag, m.kind()));
            }) as Box<dyn Fn(&NoteMessage)>
        };
        (log, make)
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bridge = NoteBridge::new();
        bridge.publish_note_on(c4());
        bridge.publish_note_off();
        assert_eq!(bridge.subscriber_count(NoteKind::On), 0);
    }

    #[test]
    fn delivers_in_registration_order_per_kind() {
        let bridge = NoteBridge::new();
        let (log, make) = recorder();
        let _a = bridge.subscribe(NoteKind::On, make("a"));
        let _b = bridge.subscribe(NoteKind::Off, make("b"));
        let _c = bridge.subscribe(NoteKind::On, make("c"));

        bridge.publish_note_on(c4());
        bridge.publish_note_off();

        assert_eq!(*log.borrow(), ["a:On", "c:On", "b:Off"]);
    }

    #[test]
    fn note_on_carries_the_event() {
        let bridge = NoteBridge::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_h = seen.clone();
        let _s = bridge.subscribe(NoteKind::On, move |m| {
            if let NoteMessage::On(ev) = m {
                *seen_h.borrow_mut() = Some(ev.clone());
            }
        });
        bridge.publish_note_on(c4());
        assert_eq!(seen.borrow().as_ref().map(|e| e.midi), Some(60));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bridge = NoteBridge::new();
        let (log, make) = recorder();
        let sub = bridge.subscribe(NoteKind::On, make("a"));
        assert!(sub.is_active());
        drop(sub);
        bridge.publish_note_on(c4());
        assert!(log.borrow().is_empty());
        assert_eq!(bridge.subscriber_count(NoteKind::On), 0);
    }

    #[test]
    fn detached_subscription_keeps_handler() {
        let bridge = NoteBridge::new();
        let (log, make) = recorder();
        bridge.subscribe(NoteKind::Off, make("a")).detach();
        bridge.publish_note_off();
        assert_eq!(*log.borrow(), ["a:Off"]);
    }

    #[test]
    fn self_unsubscribe_during_dispatch() {
        let bridge = NoteBridge::new();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let calls_h = calls.clone();
        let slot_h = slot.clone();
        let sub = bridge.subscribe(NoteKind::On, move |_| {
            calls_h.set(calls_h.get() + 1);
            if let Some(s) = slot_h.borrow_mut().take() {
                s.unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(sub);

        let (log, make) = recorder();
        let _later = bridge.subscribe(NoteKind::On, make("later"));

        bridge.publish_note_on(c4());
        bridge.publish_note_on(c4());

        assert_eq!(calls.get(), 1);
        // The live handler after the removed one is never skipped.
        assert_eq!(*log.borrow(), ["later:On", "later:On"]);
    }

    #[test]
    fn handler_removed_by_earlier_handler_is_not_called() {
        let bridge = NoteBridge::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let victim_h = victim.clone();
        let _killer = bridge.subscribe(NoteKind::On, move |_| {
            victim_h.borrow_mut().take();
        });
        let (log, make) = recorder();
        *victim.borrow_mut() = Some(bridge.subscribe(NoteKind::On, make("victim")));

        bridge.publish_note_on(c4());
        assert!(log.borrow().is_empty());
        assert_eq!(bridge.subscriber_count(NoteKind::On), 1);
    }

    #[test]
    fn handler_added_during_dispatch_waits_for_next_publish() {
        let bridge = NoteBridge::new();
        let (log, make) = recorder();
        let added: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
        let bridge_h = bridge.clone();
        let added_h = added.clone();
        let make = Rc::new(make);
        let make_h = make.clone();
        let _adder = bridge.subscribe(NoteKind::On, move |_| {
            if added_h.borrow().is_empty() {
                let sub = bridge_h.subscribe(NoteKind::On, (*make_h)("new"));
                added_h.borrow_mut().push(sub);
            }
        });

        bridge.publish_note_on(c4());
        assert!(log.borrow().is_empty());
        bridge.publish_note_on(c4());
        assert_eq!(*log.borrow(), ["new:On"]);
    }

    #[test]
    fn reentrant_publish_is_allowed() {
        let bridge = NoteBridge::new();
        let (log, make) = recorder();
        let bridge_h = bridge.clone();
        let _on = bridge.subscribe(NoteKind::On, move |_| bridge_h.publish_note_off());
        let _off = bridge.subscribe(NoteKind::Off, make("off"));
        bridge.publish_note_on(c4());
        assert_eq!(*log.borrow(), ["off:Off"]);
    }

    #[test]
    fn subscription_outliving_bridge_drops_quietly() {
        let bridge = NoteBridge::new();
        let sub = bridge.subscribe(NoteKind::On, |_| {});
        drop(bridge);
        sub.unsubscribe();
    }
}

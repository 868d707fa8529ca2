//! Per-kind subscriber lists with ordered fan-out.
//!
//! The registry maps each [`EventKind`] to an ordered list of callbacks.
//! Subscription order defines invocation order; fan-out is synchronous and
//! happens on the caller's stack, one event at a time.
//!
//! # Invariants
//!
//! - Exactly one invocation per currently-subscribed callback per dispatched
//!   event.
//! - Dispatch snapshots the list before invoking anything: a callback
//!   unsubscribed mid-dispatch still receives the in-flight invocation but
//!   none after it, and a callback subscribed mid-dispatch starts with the
//!   next event.
//!
//! Callbacks are single-threaded `Rc` closures; the registry itself hands
//! out `&self` methods so callbacks holding an `Rc<DispatchRegistry>` may
//! re-enter `subscribe`/`unsubscribe` during fan-out.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use shareroom_proto::{EventKind, ServerEvent};

/// Boxed subscriber callback.
type Callback = Rc<RefCell<dyn FnMut(&ServerEvent)>>;

/// Opaque handle identifying one subscription.
///
/// Returned by [`DispatchRegistry::subscribe`]; passing it to
/// [`DispatchRegistry::unsubscribe`] removes exactly that registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// One registered subscription.
struct Entry {
    id: SubscriberId,
    callback: Callback,
}

/// Dispatch registry: ordered subscriber lists keyed by event kind.
pub struct DispatchRegistry {
    inner: RefCell<Inner>,
}

struct Inner {
    lists: HashMap<EventKind, Vec<Entry>>,
    next_id: u64,
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchRegistry {
    /// Create an empty registry covering the full event enumeration.
    pub fn new() -> Self {
        let lists = EventKind::ALL.into_iter().map(|kind| (kind, Vec::new())).collect();
        Self { inner: RefCell::new(Inner { lists, next_id: 0 }) }
    }

    /// Append a callback to the list for `kind`.
    ///
    /// The callback is invoked for every subsequent dispatch of `kind`, in
    /// subscription order relative to the other subscribers of that kind.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl FnMut(&ServerEvent) + 'static,
    ) -> SubscriberId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriberId(inner.next_id);
        inner.next_id += 1;

        if let Some(list) = inner.lists.get_mut(&kind) {
            list.push(Entry { id, callback: Rc::new(RefCell::new(callback)) });
        }

        id
    }

    /// Remove the subscription `id` from the list for `kind`.
    ///
    /// Removing an id that is not subscribed is a no-op. Takes effect for
    /// future dispatches only; an in-flight fan-out keeps its snapshot.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriberId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(list) = inner.lists.get_mut(&kind) {
            list.retain(|entry| entry.id != id);
        }
    }

    /// Fan an event out to every subscriber of its kind, in order.
    ///
    /// The subscriber list is snapshotted before the first invocation, so
    /// callbacks may mutate the registry without affecting this fan-out.
    pub fn dispatch(&self, event: &ServerEvent) {
        let snapshot: Vec<Callback> = {
            let inner = self.inner.borrow();
            inner
                .lists
                .get(&event.kind())
                .map(|list| list.iter().map(|entry| Rc::clone(&entry.callback)).collect())
                .unwrap_or_default()
        };

        tracing::debug!(kind = %event.kind(), subscribers = snapshot.len(), "dispatching event");

        for callback in snapshot {
            (callback.borrow_mut())(event);
        }
    }

    /// Remove every subscription, returning the registry to empty.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        for list in inner.lists.values_mut() {
            list.clear();
        }
    }

    /// Number of subscribers currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner.borrow().lists.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use shareroom_proto::payloads::room::ErrorNotice;

    use super::*;

    fn sample_event() -> ServerEvent {
        ServerEvent::RoomJoinError(ErrorNotice { message: "full".to_string() })
    }

    #[test]
    fn fan_out_invokes_each_subscriber_once_in_order() {
        let registry = DispatchRegistry::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3 {
            let calls = Rc::clone(&calls);
            registry.subscribe(EventKind::RoomJoinError, move |_| calls.borrow_mut().push(tag));
        }

        registry.dispatch(&sample_event());
        assert_eq!(*calls.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let registry = DispatchRegistry::new();
        let hits = Rc::new(RefCell::new(0));

        let hits_clone = Rc::clone(&hits);
        registry.subscribe(EventKind::Message, move |_| *hits_clone.borrow_mut() += 1);

        registry.dispatch(&sample_event());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn unsubscribed_callback_is_never_invoked_again() {
        let registry = DispatchRegistry::new();
        let hits = Rc::new(RefCell::new(0));

        let hits_clone = Rc::clone(&hits);
        let id = registry
            .subscribe(EventKind::RoomJoinError, move |_| *hits_clone.borrow_mut() += 1);

        registry.dispatch(&sample_event());
        registry.unsubscribe(EventKind::RoomJoinError, id);
        registry.dispatch(&sample_event());

        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribing_absent_id_is_a_noop() {
        let registry = DispatchRegistry::new();
        let id = registry.subscribe(EventKind::Message, |_| {});

        // Wrong kind, then double removal: neither disturbs anything.
        registry.unsubscribe(EventKind::NewFile, id);
        assert_eq!(registry.subscriber_count(EventKind::Message), 1);
        registry.unsubscribe(EventKind::Message, id);
        registry.unsubscribe(EventKind::Message, id);
        assert_eq!(registry.subscriber_count(EventKind::Message), 0);
    }

    #[test]
    fn unsubscribe_during_dispatch_keeps_inflight_invocation() {
        let registry = Rc::new(DispatchRegistry::new());
        let hits = Rc::new(RefCell::new(0));

        // Second subscriber counts invocations; first removes it mid-dispatch.
        let hits_clone = Rc::clone(&hits);
        let victim_id = Rc::new(RefCell::new(None));

        let registry_clone = Rc::clone(&registry);
        let victim_clone = Rc::clone(&victim_id);
        registry.subscribe(EventKind::RoomJoinError, move |_| {
            if let Some(id) = *victim_clone.borrow() {
                registry_clone.unsubscribe(EventKind::RoomJoinError, id);
            }
        });

        let id = registry
            .subscribe(EventKind::RoomJoinError, move |_| *hits_clone.borrow_mut() += 1);
        *victim_id.borrow_mut() = Some(id);

        // First dispatch: victim still in the snapshot, so it runs once.
        registry.dispatch(&sample_event());
        assert_eq!(*hits.borrow(), 1);

        // Second dispatch: victim is gone.
        registry.dispatch(&sample_event());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn subscribe_during_dispatch_starts_with_next_event() {
        let registry = Rc::new(DispatchRegistry::new());
        let late_hits = Rc::new(RefCell::new(0));

        let registry_clone = Rc::clone(&registry);
        let late_clone = Rc::clone(&late_hits);
        let armed = Rc::new(RefCell::new(false));
        let armed_clone = Rc::clone(&armed);
        registry.subscribe(EventKind::RoomJoinError, move |_| {
            if !*armed_clone.borrow() {
                *armed_clone.borrow_mut() = true;
                let late = Rc::clone(&late_clone);
                registry_clone.subscribe(EventKind::RoomJoinError, move |_| {
                    *late.borrow_mut() += 1;
                });
            }
        });

        registry.dispatch(&sample_event());
        assert_eq!(*late_hits.borrow(), 0);

        registry.dispatch(&sample_event());
        assert_eq!(*late_hits.borrow(), 1);
    }

    #[test]
    fn clear_empties_every_kind() {
        let registry = DispatchRegistry::new();
        for kind in EventKind::ALL {
            registry.subscribe(kind, |_| {});
        }

        registry.clear();
        for kind in EventKind::ALL {
            assert_eq!(registry.subscriber_count(kind), 0);
        }
    }
}

//! Typed event emitter
//!
//! Vendor callbacks are funnelled into an [`EventEmitter`] so the rest of the
//! crate subscribes to plain Rust enums instead of raw JS closures.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`EventEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

/// Single-threaded event emitter.
///
/// Listeners run in subscription order. The listener list is snapshotted
/// before each dispatch, so a listener may subscribe or unsubscribe while an
/// event is being delivered; the change applies from the next emission.
pub struct EventEmitter<E> {
    listeners: RefCell<Vec<(ListenerId, Listener<E>)>>,
    next_id: Cell<u64>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if the listener was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let emitter = EventEmitter::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| seen.borrow_mut().push(format!("{}{}", tag, v)));
        }

        emitter.emit(&1);
        emitter.emit(&2);

        assert_eq!(*seen.borrow(), vec!["a1", "b1", "c1", "a2", "b2", "c2"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let emitter = EventEmitter::<()>::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let id = emitter.subscribe(move |_| c.set(c.get() + 1));

        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        emitter.emit(&());

        assert_eq!(count.get(), 1);
        assert!(!emitter.unsubscribe(id));
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_subscribe_during_emit_applies_next_time() {
        let emitter = Rc::new(EventEmitter::<()>::new());
        let late_calls = Rc::new(Cell::new(0));

        let inner = Rc::clone(&emitter);
        let late = Rc::clone(&late_calls);
        emitter.subscribe(move |_| {
            let late = Rc::clone(&late);
            inner.subscribe(move |_| late.set(late.get() + 1));
        });

        emitter.emit(&());
        assert_eq!(late_calls.get(), 0);

        emitter.emit(&());
        assert_eq!(late_calls.get(), 1);
    }
}

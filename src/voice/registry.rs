//! Live connection handles keyed by their SDK object
//!
//! The SDK hands back the same JS object in every callback for one call. The
//! registry maps it to a single wrapper so listeners are attached once, and
//! forgets it when the call ends, is rejected or is cancelled.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub struct HandleRegistry<K, V> {
    live: Rc<RefCell<Vec<(K, V)>>>,
}

impl<K, V> Clone for HandleRegistry<K, V> {
    fn clone(&self) -> Self {
        Self {
            live: Rc::clone(&self.live),
        }
    }
}

impl<K, V> Default for HandleRegistry<K, V> {
    fn default() -> Self {
        Self {
            live: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<K: PartialEq, V: Clone> HandleRegistry<K, V> {
    /// The wrapper for `key`, built with `bind` the first time it is seen.
    pub fn resolve(&self, key: K, bind: impl FnOnce(&K) -> V) -> V {
        if let Some((_, existing)) = self.live.borrow().iter().find(|(k, _)| *k == key) {
            return existing.clone();
        }
        let value = bind(&key);
        self.live.borrow_mut().push((key, value.clone()));
        value
    }

    pub fn release(&self, key: &K) -> bool {
        release_from(&self.live, key)
    }

    /// A handle a wrapper can keep without keeping the registry alive.
    pub fn downgrade(&self) -> WeakRegistry<K, V> {
        WeakRegistry {
            live: Rc::downgrade(&self.live),
        }
    }
}

pub struct WeakRegistry<K, V> {
    live: Weak<RefCell<Vec<(K, V)>>>,
}

impl<K, V> Clone for WeakRegistry<K, V> {
    fn clone(&self) -> Self {
        Self {
            live: Weak::clone(&self.live),
        }
    }
}

impl<K: PartialEq, V> WeakRegistry<K, V> {
    /// No-op once the registry itself is gone.
    pub fn release(&self, key: &K) -> bool {
        match self.live.upgrade() {
            Some(live) => release_from(&live, key),
            None => false,
        }
    }
}

fn release_from<K: PartialEq, V>(live: &RefCell<Vec<(K, V)>>, key: &K) -> bool {
    // dropped after the borrow ends, in case the value's drop reaches back in
    let removed = {
        let mut live = live.borrow_mut();
        let index = live.iter().position(|(k, _)| k == key);
        index.map(|i| live.remove(i))
    };
    removed.is_some()
}

//! Observer - The store capability the widget reads from and writes to.
//!
//! The widget never holds the authoritative list. Before each mutation it
//! calls [`Observer::value`], mutates that fresh copy, and hands it back with
//! [`Observer::set_value`].

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::Signal;

use crate::types::Item;

/// Read/write access to the host's authoritative item list.
pub trait Observer {
    /// Current list.
    fn value(&self) -> Vec<Item>;

    /// Commit a new list (host re-renders/persists).
    fn set_value(&self, items: Vec<Item>);
}

/// A signal is the native store: readers that track it re-run on `set_value`.
impl Observer for Signal<Vec<Item>> {
    fn value(&self) -> Vec<Item> {
        self.get()
    }

    fn set_value(&self, items: Vec<Item>) {
        self.set(items);
    }
}

/// Plain storage, for hosts without a reactive runtime (share it as `Rc<RefCell<_>>`).
impl Observer for RefCell<Vec<Item>> {
    fn value(&self) -> Vec<Item> {
        self.borrow().clone()
    }

    fn set_value(&self, items: Vec<Item>) {
        *self.borrow_mut() = items;
    }
}

impl<O: Observer + ?Sized> Observer for Rc<O> {
    fn value(&self) -> Vec<Item> {
        (**self).value()
    }

    fn set_value(&self, items: Vec<Item>) {
        (**self).set_value(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::signal;

    fn round_trip(observer: &dyn Observer) {
        let mut items = observer.value();
        items.push(Item::new("added"));
        observer.set_value(items);
        assert_eq!(observer.value().last(), Some(&Item::new("added")));
    }

    #[test]
    fn test_signal_observer() {
        let items = signal(vec![Item::new("a")]);
        round_trip(&items);
        assert_eq!(items.get().len(), 2);
    }

    #[test]
    fn test_shared_vec_observer() {
        let items = Rc::new(RefCell::new(Vec::new()));
        round_trip(&items);
        assert_eq!(items.borrow().len(), 1);
    }

    #[test]
    fn test_value_is_a_snapshot() {
        let items = Rc::new(RefCell::new(vec![Item::new("a")]));
        let mut snapshot = items.value();
        snapshot[0].selected = true;
        assert!(!items.borrow()[0].selected);
    }
}

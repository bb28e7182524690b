//! Change notifications with scoped registration
//!
//! Listeners are registered on an explicit `ChangeNotifier` and stay
//! registered only while the returned `Subscription` lives. Dropping the
//! subscription unregisters the listener; no callback fires after that.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::error::{HighlightError, Result};

/// What changed on the text widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// Text content changed
    TextChanged,
    /// Layout bounds changed (resize, rotation) with or without a text edit
    BoundsChanged,
}

type Listener = Rc<dyn Fn(ChangeEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    closed: bool,
}

/// Single-threaded listener registry
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Rc<RefCell<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays active until the subscription drops
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription>
    where
        F: Fn(ChangeEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        if registry.closed {
            return Err(HighlightError::Subscription(
                "notifier is closed".to_string(),
            ));
        }
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Rc::new(listener)));
        debug!(id, "change listener registered");
        Ok(Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        })
    }

    /// Deliver an event to every registered listener, in registration order
    ///
    /// Listeners may subscribe or unsubscribe while being notified; such
    /// changes take effect from the next event.
    pub fn notify(&self, event: ChangeEvent) {
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        trace!(?event, listeners = listeners.len(), "notify");
        for listener in listeners {
            listener(event);
        }
    }

    /// Drop every listener and refuse new ones
    pub fn close(&self) {
        let released = {
            let mut registry = self.registry.borrow_mut();
            registry.closed = true;
            std::mem::take(&mut registry.listeners)
        };
        // Listeners may own subscriptions on this notifier; they unregister
        // from their own drop, so the borrow must already be released here.
        drop(released);
    }

    pub fn is_closed(&self) -> bool {
        self.registry.borrow().closed
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Registration handle; unregisters its listener when dropped
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Unregister now instead of at drop
    pub fn cancel(self) {}

    /// Check if the listener is still registered
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let active = registry.borrow().listeners.iter().any(|(id, _)| *id == self.id);
        active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let released = match registry.try_borrow_mut() {
            Ok(mut registry) => registry
                .listeners
                .iter()
                .position(|(id, _)| *id == self.id)
                .map(|idx| registry.listeners.remove(idx)),
            Err(_) => {
                debug!(id = self.id, "registry busy, change listener left registered");
                return;
            }
        };
        if released.is_some() {
            debug!(id = self.id, "change listener released");
        }
        // The listener is dropped here, after the registry borrow ends
        drop(released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_listener_receives_events() {
        let notifier = ChangeNotifier::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = notifier.subscribe(move |e| sink.borrow_mut().push(e)).unwrap();

        notifier.notify(ChangeEvent::TextChanged);
        notifier.notify(ChangeEvent::BoundsChanged);
        assert_eq!(
            *seen.borrow(),
            vec![ChangeEvent::TextChanged, ChangeEvent::BoundsChanged]
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier = ChangeNotifier::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let sub = notifier.subscribe(move |_| counter.set(counter.get() + 1)).unwrap();
        assert!(sub.is_active());
        assert_eq!(notifier.listener_count(), 1);

        notifier.notify(ChangeEvent::TextChanged);
        drop(sub);
        notifier.notify(ChangeEvent::TextChanged);
        assert_eq!(count.get(), 1);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_cancel_is_explicit_drop() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe(|_| {}).unwrap();
        sub.cancel();
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_closed_notifier_refuses_registration() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe(|_| {}).unwrap();
        notifier.close();
        assert!(!sub.is_active());
        assert!(matches!(
            notifier.subscribe(|_| {}),
            Err(HighlightError::Subscription(_))
        ));
    }

    #[test]
    fn test_subscription_outlives_notifier() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe(|_| {}).unwrap();
        drop(notifier);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_listener_may_notify_reentrantly() {
        let notifier = ChangeNotifier::new();
        let depth = Rc::new(Cell::new(0));
        let inner = notifier.clone();
        let d = Rc::clone(&depth);
        let _sub = notifier
            .subscribe(move |e| {
                d.set(d.get() + 1);
                if e == ChangeEvent::TextChanged {
                    inner.notify(ChangeEvent::BoundsChanged);
                }
            })
            .unwrap();
        notifier.notify(ChangeEvent::TextChanged);
        assert_eq!(depth.get(), 2);
    }

    #[test]
    fn test_listener_owning_subscription_releases_it() {
        let notifier = ChangeNotifier::new();
        let inner = notifier.subscribe(|_| {}).unwrap();
        let outer = notifier
            .subscribe(move |_| {
                let _ = inner.is_active();
            })
            .unwrap();
        assert_eq!(notifier.listener_count(), 2);

        // Dropping the outer listener drops the inner subscription with it
        drop(outer);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_close_releases_nested_subscriptions() {
        let notifier = ChangeNotifier::new();
        let other = ChangeNotifier::new();
        let inner = other.subscribe(|_| {}).unwrap();
        let nested = notifier.subscribe(|_| {}).unwrap();
        let _outer = notifier
            .subscribe(move |_| {
                let _ = (inner.is_active(), nested.is_active());
            })
            .unwrap();

        notifier.close();
        assert_eq!(notifier.listener_count(), 0);
        assert_eq!(other.listener_count(), 0);
    }
}

//! Named-event publish/subscribe.
//!
//! The emitter is strict on purpose: registering the same listener twice,
//! removing a listener that is not there, and emitting an event whose
//! listeners were all removed are errors. Emitting an event nobody ever
//! subscribed to is allowed, so optional signals cost nothing.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use crate::error::EmitterError;

/// A registered callback. Identity is the `Arc` allocation, so keep the
/// handle around to remove it later.
pub type Listener<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Wrap a closure into a [`Listener`].
pub fn listener<A, F>(f: F) -> Listener<A>
where
    F: Fn(&A) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Synchronous in-memory event dispatch keyed by `K`, passing `&A`.
pub struct EventEmitter<K, A> {
    listeners: RwLock<HashMap<K, Vec<Listener<A>>>>,
}

impl<K, A> EventEmitter<K, A>
where
    K: Eq + Hash + Clone + Display,
{
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register `listener` for `event`.
    pub fn add_listener(&self, event: K, listener: Listener<A>) -> Result<(), EmitterError> {
        let mut map = self.listeners.write().unwrap_or_else(|p| p.into_inner());
        let listeners = map.entry(event.clone()).or_default();
        if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return Err(EmitterError::DuplicateListener {
                event: event.to_string(),
            });
        }
        listeners.push(listener);
        Ok(())
    }

    /// Unregister `listener` from `event`.
    pub fn remove_listener(&self, event: &K, listener: &Listener<A>) -> Result<(), EmitterError> {
        let mut map = self.listeners.write().unwrap_or_else(|p| p.into_inner());
        let listeners = map.get_mut(event).ok_or_else(|| EmitterError::UnknownEvent {
            event: event.to_string(),
        })?;
        let index = listeners
            .iter()
            .position(|l| Arc::ptr_eq(l, listener))
            .ok_or_else(|| EmitterError::ListenerNotFound {
                event: event.to_string(),
            })?;
        listeners.remove(index);
        Ok(())
    }

    /// Call every listener of `event` in registration order.
    ///
    /// Listeners run after the internal lock is released, so they may add or
    /// remove listeners themselves; changes apply to the next emit.
    pub fn emit(&self, event: &K, args: &A) -> Result<(), EmitterError> {
        let listeners = {
            let map = self.listeners.read().unwrap_or_else(|p| p.into_inner());
            match map.get(event) {
                None => return Ok(()),
                Some(listeners) if listeners.is_empty() => {
                    return Err(EmitterError::NoListener {
                        event: event.to_string(),
                    });
                }
                Some(listeners) => listeners.clone(),
            }
        };

        for listener in &listeners {
            listener(args);
        }
        Ok(())
    }

    pub fn listener_count(&self, event: &K) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(event)
            .map_or(0, Vec::len)
    }
}

impl<K, A> Default for EventEmitter<K, A>
where
    K: Eq + Hash + Clone + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, A> std::fmt::Debug for EventEmitter<K, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events = self
            .listeners
            .read()
            .map(|map| map.len())
            .unwrap_or_default();
        f.debug_struct("EventEmitter").field("events", &events).finish()
    }
}

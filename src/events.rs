//! Event plumbing between the host and source instances.
//!
//! `EventDispatcher` is the host's process-wide table of frontend event
//! callbacks. `SignalHandler` is the per-source table of named signal
//! callbacks ("hide", "activate", ...). Both hand out a `CallbackId` on
//! connect so the owner can disconnect again.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Frontend events broadcast by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendEvent {
    /// The program (live) scene changed
    SceneChanged,
    /// The scene staged in the preview changed
    PreviewSceneChanged,
    StudioModeEnabled,
    StudioModeDisabled,
    Exit,
}

/// Source lifecycle signal names.
pub const SIGNAL_HIDE: &str = "hide";
pub const SIGNAL_ACTIVATE: &str = "activate";
pub const SIGNAL_DEACTIVATE: &str = "deactivate";

/// Handle returned by connect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(u64);

static NEXT_CALLBACK_ID: AtomicU64 = AtomicU64::new(1);

impl CallbackId {
    fn next() -> Self {
        Self(NEXT_CALLBACK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub type FrontendCallback = Arc<dyn Fn(FrontendEvent) + Send + Sync>;
pub type SignalCallback = Arc<dyn Fn(&str) + Send + Sync>;

// A panicking callback must not take the whole table down with it.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Process-wide frontend event table.
///
/// Callbacks run in registration order. The table is snapshotted before a
/// dispatch, so a callback may connect or disconnect while it runs.
pub struct EventDispatcher {
    callbacks: RwLock<BTreeMap<CallbackId, FrontendCallback>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn add_event_callback(&self, callback: FrontendCallback) -> CallbackId {
        let id = CallbackId::next();
        write(&self.callbacks).insert(id, callback);
        id
    }

    /// Returns `false` if `id` was not connected.
    pub fn remove_event_callback(&self, id: CallbackId) -> bool {
        write(&self.callbacks).remove(&id).is_some()
    }

    pub fn dispatch(&self, event: FrontendEvent) {
        let callbacks: Vec<FrontendCallback> = read(&self.callbacks).values().cloned().collect();
        log::trace!("dispatching {:?} to {} callbacks", event, callbacks.len());
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn callback_count(&self) -> usize {
        read(&self.callbacks).len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Named signal table attached to a single source.
pub struct SignalHandler {
    connections: RwLock<BTreeMap<CallbackId, (String, SignalCallback)>>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn connect(&self, signal: &str, callback: SignalCallback) -> CallbackId {
        let id = CallbackId::next();
        write(&self.connections).insert(id, (signal.to_string(), callback));
        id
    }

    /// Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: CallbackId) -> bool {
        write(&self.connections).remove(&id).is_some()
    }

    /// Invoke every callback connected to `signal`.
    pub fn emit(&self, signal: &str) {
        let callbacks: Vec<SignalCallback> = read(&self.connections)
            .values()
            .filter(|(name, _)| name == signal)
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(signal);
        }
    }

    pub fn connection_count(&self) -> usize {
        read(&self.connections).len()
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

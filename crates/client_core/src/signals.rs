//! In-memory signal bus shared by the components of one mounted shell.
//!
//! Dispatch is synchronous and fire-and-forget: `emit` runs every handler
//! currently subscribed to the topic before returning, and a signal with no
//! subscriber is dropped. Nothing is queued or replayed.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use parking_lot::RwLock;
use shared::domain::ProjectId;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A project row asked the form to start editing it.
    EditProject { id: ProjectId, name: String },
    /// The project collection changed and the list should refetch.
    RefreshProjects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    EditProject,
    RefreshProjects,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::EditProject { .. } => SignalKind::EditProject,
            Self::RefreshProjects => SignalKind::RefreshProjects,
        }
    }
}

type Handler = Arc<dyn Fn(&Signal) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<SignalKind, Vec<(u64, Handler)>>>,
}

#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Arc<BusInner>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: SignalKind, handler: F) -> Subscription
    where
        F: Fn(&Signal) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let handler: Handler = Arc::new(handler);
        self.inner
            .handlers
            .write()
            .entry(kind)
            .or_default()
            .push((id, handler));
        debug!(?kind, subscription_id = id, "signals: subscribed");
        Subscription {
            bus: Arc::downgrade(&self.inner),
            kind,
            id,
            released: false,
        }
    }

    /// Dispatches `signal` and returns how many handlers received it.
    pub fn emit(&self, signal: Signal) -> usize {
        let kind = signal.kind();
        // Handlers run outside the lock so they can emit or (un)subscribe.
        let handlers: Vec<Handler> = self
            .inner
            .handlers
            .read()
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            debug!(?kind, "signals: no listener, signal dropped");
            return 0;
        }

        for handler in &handlers {
            handler(&signal);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, kind: SignalKind) -> usize {
        self.inner
            .handlers
            .read()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Registration handle; the handler is removed when this is cancelled or dropped.
pub struct Subscription {
    bus: Weak<BusInner>,
    kind: SignalKind,
    id: u64,
    released: bool,
}

impl Subscription {
    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        let mut handlers = bus.handlers.write();
        if let Some(entries) = handlers.get_mut(&self.kind) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                handlers.remove(&self.kind);
            }
        }
        debug!(kind = ?self.kind, subscription_id = self.id, "signals: unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "tests/signals_tests.rs"]
mod tests;

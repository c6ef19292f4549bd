use std::{
    future::Future,
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use tokio::{runtime::Handle, task::AbortHandle};
use tracing::{debug, warn};

/// Lifetime of one mounted component instance.
///
/// Deferred work (refetches, message timers) is spawned through the scope so
/// unmounting can abort it, and every completion checks `is_active` before
/// touching component state.
///
/// The runtime the component was mounted on is captured here, so tasks can
/// be spawned from threads outside that runtime (signal handlers invoked by
/// synchronous UI code).
pub struct Scope {
    name: &'static str,
    runtime: Option<Handle>,
    active: AtomicBool,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Scope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            runtime: Handle::try_current().ok(),
            active: AtomicBool::new(true),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.is_active() {
            debug!(scope = self.name, "scope: closed, deferred task skipped");
            return;
        }

        let Some(runtime) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            warn!(scope = self.name, "scope: no tokio runtime, deferred task dropped");
            return;
        };

        let handle = runtime.spawn(task);
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle.abort_handle());
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    pub fn close(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let tasks: Vec<AbortHandle> = self.tasks.lock().drain(..).collect();
        debug!(
            scope = self.name,
            aborted = tasks.len(),
            "scope: closed"
        );
        for task in tasks {
            task.abort();
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.close();
    }
}

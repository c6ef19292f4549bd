use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    count::{CountSlot, CountUpdate},
    scope::Scope,
    service::ProjectService,
};

pub const COUNT_LOAD_ERROR: &str = "Error loading project count. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountStatus {
    Loading,
    Ready,
    Failed(String),
}

/// What the dashboard cards show. `completed` has no backing data and stays 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub status: CountStatus,
    pub total: u64,
    pub active: u64,
    pub completed: u64,
}

/// Count widget: reads the aggregate count once per mount.
pub struct CountWidget {
    service: Arc<dyn ProjectService>,
    count: CountSlot,
    scope: Scope,
    status: watch::Sender<CountStatus>,
}

impl CountWidget {
    pub async fn mount(service: Arc<dyn ProjectService>, count: CountSlot) -> Arc<Self> {
        let (status, _) = watch::channel(CountStatus::Loading);
        let widget = Arc::new(Self {
            service,
            count,
            scope: Scope::new("dashboard"),
            status,
        });
        widget.load().await;
        widget
    }

    async fn load(&self) {
        let result = self.service.count().await;
        if !self.scope.is_active() {
            debug!("dashboard: unmounted, count result discarded");
            return;
        }

        match result {
            Ok(count) => {
                self.count.apply(CountUpdate::Fetched(count));
                self.status.send_replace(CountStatus::Ready);
            }
            Err(err) => {
                warn!(%err, "dashboard: failed to load project count");
                self.status
                    .send_replace(CountStatus::Failed(COUNT_LOAD_ERROR.to_string()));
            }
        }
    }

    pub fn status(&self) -> CountStatus {
        self.status.borrow().clone()
    }

    pub fn view(&self) -> DashboardView {
        let value = self.count.value();
        DashboardView {
            status: self.status(),
            total: value,
            active: value,
            completed: 0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CountStatus> {
        self.status.subscribe()
    }

    pub fn unmount(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;

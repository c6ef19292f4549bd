use std::sync::Arc;

use parking_lot::Mutex;
use shared::domain::{Project, ProjectId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    count::{CountSlot, CountUpdate},
    scope::Scope,
    service::ProjectService,
    signals::{Signal, SignalBus, SignalKind, Subscription},
};

pub const LIST_LOAD_ERROR: &str = "Error loading projects. Please try again.";
pub const DELETE_ERROR: &str = "Error deleting project. Please try again.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this project?";
pub const EMPTY_LIST_MESSAGE: &str = "No projects found. Add your first project above!";

/// Interactive yes/no question asked before destructive actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped every time a fetch settles, successful or not.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
    Failed,
}

pub struct ProjectList {
    service: Arc<dyn ProjectService>,
    count: CountSlot,
    bus: SignalBus,
    confirm: Arc<dyn Confirm>,
    scope: Scope,
    state: watch::Sender<ListState>,
    refresh_subscription: Mutex<Option<Subscription>>,
}

impl ProjectList {
    /// Registers for refresh signals and performs the initial fetch.
    pub async fn mount(
        service: Arc<dyn ProjectService>,
        count: CountSlot,
        bus: SignalBus,
        confirm: Arc<dyn Confirm>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(ListState {
            loading: true,
            ..ListState::default()
        });
        let list = Arc::new(Self {
            service,
            count,
            bus,
            confirm,
            scope: Scope::new("project_list"),
            state,
            refresh_subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&list);
        let subscription = list
            .bus
            .subscribe(SignalKind::RefreshProjects, move |_| {
                if let Some(list) = weak.upgrade() {
                    list.schedule_refresh();
                }
            });
        *list.refresh_subscription.lock() = Some(subscription);

        list.fetch_projects().await;
        list
    }

    fn schedule_refresh(self: &Arc<Self>) {
        let list = Arc::clone(self);
        self.scope.spawn(async move {
            list.fetch_projects().await;
        });
    }

    /// Replaces the working set with a fresh read of every project.
    pub async fn fetch_projects(&self) {
        self.state.send_modify(|state| state.loading = true);
        let result = self.service.list().await;
        if !self.scope.is_active() {
            debug!("project_list: unmounted, fetch result discarded");
            return;
        }

        match result {
            Ok(projects) => {
                self.count.apply(CountUpdate::Listed(projects.len()));
                self.state.send_modify(|state| {
                    state.projects = projects;
                    state.loading = false;
                    state.error = None;
                    state.generation += 1;
                });
            }
            Err(err) => {
                warn!(%err, "project_list: failed to load projects");
                self.state.send_modify(|state| {
                    state.projects.clear();
                    state.loading = false;
                    state.error = Some(LIST_LOAD_ERROR.to_string());
                    state.generation += 1;
                });
            }
        }
    }

    /// Asks the form to edit `project`; the list itself does not change.
    pub fn edit(&self, project: &Project) -> usize {
        self.bus.emit(Signal::EditProject {
            id: project.id.clone(),
            name: project.name.clone(),
        })
    }

    pub async fn delete(&self, id: &ProjectId) -> DeleteOutcome {
        if !self.confirm.confirm(DELETE_PROMPT) {
            debug!(project_id = %id, "project_list: delete declined");
            return DeleteOutcome::Declined;
        }

        match self.service.delete(id).await {
            Ok(()) => {
                info!(project_id = %id, "project_list: project deleted");
                if self.scope.is_active() {
                    self.fetch_projects().await;
                }
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(project_id = %id, %err, "project_list: delete failed");
                if self.scope.is_active() {
                    self.state
                        .send_modify(|state| state.error = Some(DELETE_ERROR.to_string()));
                }
                DeleteOutcome::Failed
            }
        }
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.borrow().projects.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn unmount(&self) {
        self.scope.close();
        if let Some(subscription) = self.refresh_subscription.lock().take() {
            subscription.cancel();
        }
    }
}

#[cfg(test)]
#[path = "tests/project_list_tests.rs"]
mod tests;

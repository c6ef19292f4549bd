use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use shared::domain::ProjectId;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    count::{CountSlot, CountUpdate},
    scope::Scope,
    service::ProjectService,
    signals::{Signal, SignalBus, SignalKind, Subscription},
};

pub const MIN_NAME_LEN: usize = 3;
pub const NAME_TOO_SHORT: &str = "Project name must be at least 3 characters";
pub const SAVE_FAILED: &str = "Failed to save project";
pub const PROJECT_ADDED: &str = "Project added successfully!";
pub const PROJECT_UPDATED: &str = "Project updated successfully!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Editing {
        id: ProjectId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub mode: FormMode,
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl FormState {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Editing { .. })
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Project"
        } else {
            "Add New Project"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.loading, self.is_editing()) {
            (true, _) => "Saving...",
            (false, true) => "Update Project",
            (false, false) => "Add Project",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Rejected,
    Created,
    Updated,
    Failed(String),
}

pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LEN
}

pub struct ProjectForm {
    service: Arc<dyn ProjectService>,
    count: CountSlot,
    bus: SignalBus,
    scope: Scope,
    success_ttl: Duration,
    state: Arc<watch::Sender<FormState>>,
    edit_subscription: Mutex<Option<Subscription>>,
}

impl ProjectForm {
    pub fn mount(
        service: Arc<dyn ProjectService>,
        count: CountSlot,
        bus: SignalBus,
        success_ttl: Duration,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(FormState::default());
        let form = Arc::new(Self {
            service,
            count,
            bus,
            scope: Scope::new("project_form"),
            success_ttl,
            state: Arc::new(state),
            edit_subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&form);
        let subscription = form.bus.subscribe(SignalKind::EditProject, move |signal| {
            if let (Some(form), Signal::EditProject { id, name }) = (weak.upgrade(), signal) {
                form.begin_edit(id.clone(), name.clone());
            }
        });
        *form.edit_subscription.lock() = Some(subscription);
        form
    }

    fn begin_edit(&self, id: ProjectId, name: String) {
        if !self.scope.is_active() {
            return;
        }
        debug!(project_id = %id, "project_form: edit session started");
        self.state.send_modify(|state| {
            state.name = name;
            state.mode = FormMode::Editing { id };
        });
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.state.send_modify(|state| state.name = name);
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (name, mode) = {
            let state = self.state.borrow();
            (state.name.clone(), state.mode.clone())
        };

        if !is_valid_name(&name) {
            self.state
                .send_modify(|state| state.error = Some(NAME_TOO_SHORT.to_string()));
            return SubmitOutcome::Rejected;
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = match &mode {
            FormMode::Create => self.service.create(&name).await,
            FormMode::Editing { id } => self.service.update(id, &name).await,
        };

        let outcome = match (&result, &mode) {
            (Ok(()), FormMode::Create) => SubmitOutcome::Created,
            (Ok(()), FormMode::Editing { .. }) => SubmitOutcome::Updated,
            (Err(err), _) => SubmitOutcome::Failed(err.message_or(SAVE_FAILED)),
        };

        if !self.scope.is_active() {
            debug!("project_form: unmounted, submit result discarded");
            return outcome;
        }

        match &outcome {
            SubmitOutcome::Created | SubmitOutcome::Updated => {
                let message = if outcome == SubmitOutcome::Created {
                    PROJECT_ADDED
                } else {
                    PROJECT_UPDATED
                };
                info!(?mode, "project_form: project saved");
                self.state.send_modify(|state| {
                    state.success = Some(message.to_string());
                    state.name.clear();
                    state.mode = FormMode::Create;
                    state.loading = false;
                });
                if outcome == SubmitOutcome::Created {
                    self.count.apply(CountUpdate::Created);
                }
                self.bus.emit(Signal::RefreshProjects);
                self.schedule_success_clear();
            }
            SubmitOutcome::Failed(message) => {
                warn!(?mode, %message, "project_form: save failed");
                let message = message.clone();
                self.state.send_modify(|state| {
                    state.error = Some(message);
                    state.loading = false;
                });
            }
            SubmitOutcome::Rejected => {}
        }
        outcome
    }

    // Earlier timers are left running, so one can clear a newer message early.
    fn schedule_success_clear(&self) {
        let state = Arc::clone(&self.state);
        let ttl = self.success_ttl;
        self.scope.spawn(async move {
            tokio::time::sleep(ttl).await;
            state.send_modify(|state| state.success = None);
        });
    }

    /// Drops any edit session and returns to create mode.
    pub fn cancel(&self) {
        self.state.send_modify(|state| {
            state.name.clear();
            state.mode = FormMode::Create;
            state.error = None;
        });
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn unmount(&self) {
        self.scope.close();
        if let Some(subscription) = self.edit_subscription.lock().take() {
            subscription.cancel();
        }
    }
}

#[cfg(test)]
#[path = "tests/project_form_tests.rs"]
mod tests;

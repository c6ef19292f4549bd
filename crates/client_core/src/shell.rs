use std::sync::Arc;

use tracing::info;

use crate::{
    config::ClientConfig,
    count::CountSlot,
    dashboard::CountWidget,
    project_form::ProjectForm,
    project_list::{Confirm, ProjectList},
    service::ProjectService,
    signals::SignalBus,
};

pub const APP_TITLE: &str = "IAD Assignment";
pub const APP_SUBTITLE: &str = "Task Management";

/// Root of the component tree: owns the signal bus and the count slot and
/// mounts the dashboard, form and list against one project service.
pub struct Shell {
    service: Arc<dyn ProjectService>,
    bus: SignalBus,
    count: CountSlot,
    dashboard: Arc<CountWidget>,
    form: Arc<ProjectForm>,
    list: Arc<ProjectList>,
}

impl Shell {
    pub async fn mount(
        service: Arc<dyn ProjectService>,
        confirm: Arc<dyn Confirm>,
        config: &ClientConfig,
    ) -> Self {
        let bus = SignalBus::new();
        let count = CountSlot::new();

        let form = ProjectForm::mount(
            Arc::clone(&service),
            count.clone(),
            bus.clone(),
            config.success_message_ttl,
        );
        let (dashboard, list) = tokio::join!(
            CountWidget::mount(Arc::clone(&service), count.clone()),
            ProjectList::mount(Arc::clone(&service), count.clone(), bus.clone(), confirm),
        );

        info!(
            projects = list.state().projects.len(),
            count = count.value(),
            "shell: mounted"
        );
        Self {
            service,
            bus,
            count,
            dashboard,
            form,
            list,
        }
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    pub fn count(&self) -> &CountSlot {
        &self.count
    }

    pub fn dashboard(&self) -> &Arc<CountWidget> {
        &self.dashboard
    }

    pub fn form(&self) -> &Arc<ProjectForm> {
        &self.form
    }

    pub fn list(&self) -> &Arc<ProjectList> {
        &self.list
    }

    /// Tears the count widget down and mounts a fresh one, which is the only
    /// way to retry a failed count read.
    pub async fn remount_dashboard(&mut self) {
        self.dashboard.unmount();
        self.dashboard = CountWidget::mount(Arc::clone(&self.service), self.count.clone()).await;
        info!(status = ?self.dashboard.status(), "shell: dashboard remounted");
    }

    pub fn unmount(&self) {
        self.dashboard.unmount();
        self.form.unmount();
        self.list.unmount();
        info!("shell: unmounted");
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;

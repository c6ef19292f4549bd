//! Client-side state for the projects dashboard: a count widget, a
//! create/edit form and a project list kept in sync over a signal bus and a
//! shared count slot, all backed by the remote project service.

pub mod config;
pub mod count;
pub mod dashboard;
pub mod project_form;
pub mod project_list;
pub mod scope;
pub mod service;
pub mod shell;
pub mod signals;

pub use config::ClientConfig;
pub use count::{CountSlot, CountSnapshot, CountSource, CountUpdate};
pub use dashboard::{CountStatus, CountWidget, DashboardView};
pub use project_form::{FormMode, FormState, ProjectForm, SubmitOutcome};
pub use project_list::{Confirm, DeleteOutcome, ListState, ProjectList};
pub use service::{HttpProjectService, ProjectService, ServiceError};
pub use shell::Shell;
pub use signals::{Signal, SignalBus, SignalKind, Subscription};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

//! Plain-text rendering of the shell's component views.

use std::fmt::Write as _;

use client_core::{
    dashboard::CountStatus,
    project_list::EMPTY_LIST_MESSAGE,
    shell::{APP_SUBTITLE, APP_TITLE},
    DashboardView, FormState, ListState, Shell,
};

pub fn render_shell(shell: &Shell) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {APP_TITLE} | {APP_SUBTITLE} ==");
    out.push_str(&render_dashboard(&shell.dashboard().view()));
    out.push_str(&render_form(&shell.form().state()));
    out.push_str(&render_list(&shell.list().state()));
    out
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::from("\nDashboard\n");
    match &view.status {
        CountStatus::Loading => out.push_str("  Loading stats...\n"),
        CountStatus::Failed(message) => {
            let _ = writeln!(out, "  ! {message}");
        }
        CountStatus::Ready => {
            let _ = writeln!(
                out,
                "  Total Projects: {}  Active Projects: {}  Completed Projects: {}",
                view.total, view.active, view.completed
            );
        }
    }
    out
}

pub fn render_form(state: &FormState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", state.title());
    if let Some(error) = &state.error {
        let _ = writeln!(out, "  ! {error}");
    }
    if let Some(success) = &state.success {
        let _ = writeln!(out, "  + {success}");
    }
    let _ = writeln!(out, "  Project Name: {}", state.name);
    if state.is_editing() {
        let _ = writeln!(out, "  [{}] [Cancel]", state.submit_label());
    } else {
        let _ = writeln!(out, "  [{}]", state.submit_label());
    }
    out
}

pub fn render_list(state: &ListState) -> String {
    let mut out = String::from("\nProjects\n");
    if let Some(error) = &state.error {
        let _ = writeln!(out, "  ! {error}");
    }
    if state.loading {
        out.push_str("  Loading projects...\n");
    } else if state.projects.is_empty() {
        let _ = writeln!(out, "  {EMPTY_LIST_MESSAGE}");
    } else {
        for (row, project) in state.projects.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {}  [edit] [delete]", row + 1, project.name);
        }
    }
    out
}

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use parking_lot::Mutex;
use shared::{
    domain::{Project, ProjectId},
    error::ApiErrorBody,
    protocol::{CountResponse, ProjectListResponse, ProjectNameRequest},
};
use tokio::{net::TcpListener, sync::watch};

use crate::{
    project_form::FormState,
    project_list::{Confirm, ListState},
    service::{ProjectService, ServiceError},
};

pub(crate) const WAIT: Duration = Duration::from_secs(2);

/// In-memory project service that records every call it receives.
#[derive(Default)]
pub(crate) struct FakeProjectService {
    projects: Mutex<Vec<Project>>,
    calls: Mutex<Vec<&'static str>>,
    reported_count: Mutex<Option<u64>>,
    save_failure: Mutex<Option<Option<String>>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    fail_count: AtomicBool,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
}

impl FakeProjectService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_projects(projects: &[(&str, &str)]) -> Arc<Self> {
        let service = Self::default();
        *service.projects.lock() = projects
            .iter()
            .map(|(id, name)| Project {
                id: ProjectId::from(*id),
                name: name.to_string(),
            })
            .collect();
        Arc::new(service)
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub(crate) fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.projects
            .lock()
            .iter()
            .map(|project| project.name.clone())
            .collect()
    }

    /// Makes `count` answer with `count` instead of the real collection size.
    pub(crate) fn report_count(&self, count: u64) {
        *self.reported_count.lock() = Some(count);
    }

    /// Makes create/update fail with a 4xx carrying `message`.
    pub(crate) fn fail_saves(&self, message: Option<&str>) {
        *self.save_failure.lock() = Some(message.map(str::to_string));
    }

    /// Holds every later call to `operation` for `delay` before answering.
    pub(crate) fn delay(&self, operation: &'static str, delay: Duration) {
        self.delays.lock().insert(operation, delay);
    }

    pub(crate) fn fail_count(&self, fail: bool) {
        self.fail_count.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    async fn record(&self, operation: &'static str) {
        self.calls.lock().push(operation);
        let delay = self.delays.lock().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn save_error(&self) -> Option<ServiceError> {
        self.save_failure
            .lock()
            .clone()
            .map(|message| ServiceError::Status {
                status: 422,
                message,
            })
    }
}

fn not_found() -> ServiceError {
    ServiceError::Status {
        status: 404,
        message: None,
    }
}

#[async_trait]
impl ProjectService for FakeProjectService {
    async fn count(&self) -> Result<u64, ServiceError> {
        self.record("count").await;
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(ServiceError::Transport("connection refused".into()));
        }
        let reported = *self.reported_count.lock();
        Ok(reported.unwrap_or(self.projects.lock().len() as u64))
    }

    async fn list(&self) -> Result<Vec<Project>, ServiceError> {
        self.record("list").await;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ServiceError::Status {
                status: 500,
                message: Some("database unavailable".into()),
            });
        }
        Ok(self.projects.lock().clone())
    }

    async fn create(&self, name: &str) -> Result<(), ServiceError> {
        self.record("create").await;
        if let Some(err) = self.save_error() {
            return Err(err);
        }
        self.projects.lock().push(Project {
            id: ProjectId::new(uuid::Uuid::new_v4().to_string()),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn update(&self, id: &ProjectId, name: &str) -> Result<(), ServiceError> {
        self.record("update").await;
        if let Some(err) = self.save_error() {
            return Err(err);
        }
        let mut projects = self.projects.lock();
        let project = projects
            .iter_mut()
            .find(|project| &project.id == id)
            .ok_or_else(not_found)?;
        project.name = name.to_string();
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), ServiceError> {
        self.record("delete").await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ServiceError::Status {
                status: 500,
                message: None,
            });
        }
        let mut projects = self.projects.lock();
        let before = projects.len();
        projects.retain(|project| &project.id != id);
        if projects.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

/// Answers every confirmation prompt the same way and remembers the prompts.
pub(crate) struct ScriptedConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub(crate) fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}

pub(crate) async fn wait_for_list_generation(mut rx: watch::Receiver<ListState>, min: u64) -> ListState {
    let state = tokio::time::timeout(WAIT, rx.wait_for(|state| state.generation >= min))
        .await
        .expect("list fetch did not settle in time")
        .expect("list state channel closed");
    ListState::clone(&state)
}

pub(crate) async fn wait_for_form<F>(mut rx: watch::Receiver<FormState>, predicate: F) -> FormState
where
    F: FnMut(&FormState) -> bool,
{
    let state = tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("form did not reach expected state in time")
        .expect("form state channel closed");
    FormState::clone(&state)
}

#[derive(Default)]
struct ApiStore {
    projects: Vec<Project>,
    next_id: i64,
    requests: Vec<String>,
    fail_count: bool,
}

#[derive(Clone, Default)]
struct ApiState {
    store: Arc<Mutex<ApiStore>>,
}

/// HTTP fake of the remote project service, bound to an ephemeral port.
pub(crate) struct FakeApi {
    pub(crate) base_url: String,
    state: ApiState,
}

impl FakeApi {
    pub(crate) async fn spawn(seed: &[&str]) -> anyhow::Result<Self> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let state = ApiState::default();
        {
            let mut store = state.store.lock();
            for name in seed {
                store.next_id += 1;
                let id = ProjectId::from(store.next_id);
                store.projects.push(Project {
                    id,
                    name: name.to_string(),
                });
            }
        }

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .route("/api/projects", get(api_list).post(api_create))
            .route("/api/projects/count", get(api_count))
            .route("/api/projects/:id", put(api_update).delete(api_delete))
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
        })
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.state.store.lock().requests.clone()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.state
            .store
            .lock()
            .projects
            .iter()
            .map(|project| project.name.clone())
            .collect()
    }

    pub(crate) fn fail_count(&self, fail: bool) {
        self.state.store.lock().fail_count = fail;
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiErrorBody::new(message))).into_response()
}

async fn api_count(State(state): State<ApiState>) -> Response {
    let mut store = state.store.lock();
    store.requests.push("GET /api/projects/count".into());
    if store.fail_count {
        return error_body(StatusCode::SERVICE_UNAVAILABLE, "count offline");
    }
    Json(CountResponse {
        count: store.projects.len() as u64,
    })
    .into_response()
}

async fn api_list(State(state): State<ApiState>) -> Response {
    let mut store = state.store.lock();
    store.requests.push("GET /api/projects".into());
    Json(ProjectListResponse {
        projects: store.projects.clone(),
    })
    .into_response()
}

async fn api_create(
    State(state): State<ApiState>,
    Json(body): Json<ProjectNameRequest>,
) -> Response {
    let mut store = state.store.lock();
    store.requests.push("POST /api/projects".into());
    if store.projects.iter().any(|project| project.name == body.name) {
        return error_body(StatusCode::CONFLICT, "Project name already exists");
    }
    store.next_id += 1;
    let project = Project {
        id: ProjectId::from(store.next_id),
        name: body.name,
    };
    store.projects.push(project.clone());
    (StatusCode::CREATED, Json(project)).into_response()
}

async fn api_update(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(body): Json<ProjectNameRequest>,
) -> Response {
    let mut store = state.store.lock();
    store.requests.push(format!("PUT /api/projects/{id}"));
    match store
        .projects
        .iter_mut()
        .find(|project| project.id.as_str() == id)
    {
        Some(project) => {
            project.name = body.name;
            Json(project.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn api_delete(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    let mut store = state.store.lock();
    store.requests.push(format!("DELETE /api/projects/{id}"));
    let before = store.projects.len();
    store.projects.retain(|project| project.id.as_str() != id);
    if store.projects.len() == before {
        return error_body(StatusCode::NOT_FOUND, "Project not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

use serde::{Deserialize, Serialize};

use crate::domain::Project;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

/// Body shared by create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectNameRequest {
    pub name: String,
}

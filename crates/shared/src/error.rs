use serde::{Deserialize, Serialize};

/// Error payload the project service returns alongside non-2xx statuses.
///
/// Every field is optional; services that reply with an empty or unrelated
/// body still decode into an `ApiErrorBody` with no message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Decodes a raw response body, treating anything unparseable as "no message".
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn into_message(self) -> Option<String> {
        self.message.filter(|message| !message.is_empty())
    }
}

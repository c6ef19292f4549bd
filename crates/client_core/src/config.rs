use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://railway-app-production-f84d.up.railway.app";
pub const DEFAULT_SUCCESS_MESSAGE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// How long the form keeps its success message before clearing it.
    pub success_message_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            success_message_ttl: DEFAULT_SUCCESS_MESSAGE_TTL,
        }
    }
}

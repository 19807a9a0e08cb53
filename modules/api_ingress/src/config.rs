use serde::{Deserialize, Serialize};

/// HTTP host settings, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    pub enable_docs: bool,
    /// Origins allowed to make credentialed cross-origin calls. Empty disables CORS.
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            enable_docs: false,
            cors_allowed_origins: Vec::new(),
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

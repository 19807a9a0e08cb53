use serde::{Deserialize, Serialize};

/// Configuration for the users module, read from `modules.users`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    /// HMAC secret for session tokens. Startup fails while this is empty.
    #[serde(default)]
    pub token_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
        }
    }
}

// Keeps the secret out of `--print-config` style debug output.
impl std::fmt::Debug for UsersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl UsersConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token_secret.trim().is_empty() {
            anyhow::bail!(
                "modules.users.token_secret is empty; set it in the config file or via TOKEN_SECRET"
            );
        }
        if self.token_ttl_secs <= 0 {
            anyhow::bail!("modules.users.token_ttl_secs must be positive");
        }
        if self.cookie_name.is_empty() {
            anyhow::bail!("modules.users.cookie_name must not be empty");
        }
        Ok(())
    }
}

fn default_token_ttl_secs() -> i64 {
    24 * 60 * 60
}

fn default_cookie_name() -> String {
    "token".to_string()
}

use serde::Deserialize;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Environment variable selecting the backend.
pub const BASE_URL_ENV: &str = "INVOICEME_API_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `INVOICEME_API_URL`, falling back to the default.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_override_option("base_url", std::env::var(BASE_URL_ENV).ok())?
            .build()?
            .try_deserialize()
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let settings = ClientSettings::new("http://backend:8080/api/");
        assert_eq!(settings.normalized_base_url(), "http://backend:8080/api");
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ClientSettings::default().base_url, DEFAULT_BASE_URL);
    }
}

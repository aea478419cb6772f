use invoiceme_client::ClientSettings;
use secrecy::{ExposeSecret, Secret};
use tower_sessions::cookie::Key;
use serde::Deserialize;

/// Directory the portal's `config/` lives under, relative to the workspace.
pub const CRATE_DIR: &str = "invoiceme-portal";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: ClientSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Signing key material for the session cookie, at least 64 bytes.
    pub session_secret: Secret<String>,
    /// Mark the session cookie `Secure`; enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector, e.g. `http://tempo:4317`. Spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerSettings {
    pub fn session_key(&self) -> Result<Key, config::ConfigError> {
        Key::try_from(self.session_secret.expose_secret().as_bytes()).map_err(|_| {
            config::ConfigError::Message(
                "server.session_secret must be at least 64 bytes".to_string(),
            )
        })
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    invoiceme_core::config::load_settings(CRATE_DIR)
}

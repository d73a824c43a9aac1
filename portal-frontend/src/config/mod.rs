use serde::Deserialize;
use service_core::config::{config_directory, load_layered};
use service_core::error::AppError;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub school: SchoolSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Cookies are marked `Secure` when served over HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_session_hours() -> i64 {
    24
}

fn default_static_dir() -> String {
    "portal-frontend/static".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL of the REST API, without a trailing slash.
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    1000
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Class and section names students may be enrolled in.
#[derive(Deserialize, Clone, Debug)]
pub struct SchoolSettings {
    pub classes: Vec<String>,
    #[serde(default)]
    pub sections: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let configuration_directory = config_directory("portal-frontend")?;
    load_layered(&configuration_directory)
}

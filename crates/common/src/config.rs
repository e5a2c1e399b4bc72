//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend API access used by the resource loader.
    pub api: ApiConfig,

    /// Region capture defaults.
    pub capture: CaptureDefaults,

    /// Document export defaults.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the system's own backend. Image URLs under this prefix
    /// are fetched with a bearer credential.
    pub base_url: String,

    /// Path of the refresh-credential exchange endpoint.
    pub refresh_path: String,

    /// Opaque refresh credential sent as a cookie to `refresh_path`.
    pub refresh_token: Option<String>,

    /// How long an acquired bearer token is reused.
    pub token_ttl_secs: u64,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Route design-tool image URLs through the backend image proxy.
    pub proxy_images: bool,
}

/// Region capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Minimum drag width/height in display pixels.
    pub min_size_px: f64,

    /// Clip drags that run past the far (right/bottom) frame edge.
    pub clamp_high_edge: bool,
}

/// Document export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Project name used when the caller does not supply one.
    pub default_project_name: String,

    /// Candidate logo images for the page header, tried in order.
    pub logo_urls: Vec<String>,

    /// Maximum height of a frame preview on the page (points).
    pub preview_max_height: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "tagmap=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            refresh_token: None,
            token_ttl_secs: 120,
            request_timeout_secs: 30,
            proxy_images: true,
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            min_size_px: 10.0,
            clamp_high_edge: false,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            default_project_name: "Project".to_string(),
            logo_urls: vec![],
            preview_max_height: 320.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl ApiConfig {
    /// Whether `url` points at the system's own backend.
    pub fn is_own_backend(&self, url: &str) -> bool {
        !self.base_url.is_empty() && url.starts_with(self.base_url.trim_end_matches('/'))
    }

    /// Join a path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    ///
    /// `TAGMAP_API_URL` and `TAGMAP_REFRESH_TOKEN` override the file.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let mut config = Self::default();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        config.apply_env();
        config
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TAGMAP_API_URL") {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(token) = std::env::var("TAGMAP_REFRESH_TOKEN") {
            if !token.trim().is_empty() {
                self.api.refresh_token = Some(token);
            }
        }
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("tagmap").join("config.json")
}

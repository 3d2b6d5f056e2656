//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable holding the remote backend URL
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the remote backend API key
pub const KEY_ENV: &str = "SUPABASE_PUBLISHABLE_KEY";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Local fallback
    pub data_dir: String,
    pub seed_posts: bool,
    /// Treat every user as an admin when running on local storage
    pub local_admin: bool,

    // Remote backend
    #[serde(default)]
    pub remote: RemoteConfig,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: ".youfirst-data".to_string(),
            seed_posts: true,
            local_admin: false,
            remote: RemoteConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Override remote credentials from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(URL_ENV).ok(), std::env::var(KEY_ENV).ok());
    }

    /// Override remote credentials; blank values are ignored
    pub fn apply_overrides(&mut self, url: Option<String>, api_key: Option<String>) {
        if let Some(url) = url.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Remote URL taken from environment");
            self.remote.url = Some(url);
        }
        if let Some(key) = api_key.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Remote API key taken from environment");
            self.remote.api_key = Some(key);
        }
    }
}

/// Hosted backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: 15,
        }
    }
}

impl RemoteConfig {
    /// URL and key, only when both are present and non-blank
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        Some((url, key))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

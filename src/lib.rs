//! youfirst-content: content store for the YouFirst property-management site
//!
//! Blog posts, site settings and contact submissions are read and written
//! through one facade, [`store::ContentStore`], backed either by a hosted
//! PostgREST database or by a local JSON data directory when no remote
//! credentials are configured.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;
pub mod storage;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main application handle
#[derive(Debug, Clone)]
pub struct App {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
}

impl App {
    /// Load configuration from `_config.yml` in `base_dir` (or `config_path`),
    /// then apply environment overrides.
    pub fn new<P: AsRef<Path>>(base_dir: P, config_path: Option<&Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = match config_path {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => base_dir.join(path),
            None => base_dir.join("_config.yml"),
        };

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self { config, base_dir })
    }

    /// Open the content store for this configuration
    pub fn open_store(&self) -> Result<store::ContentStore> {
        Ok(store::ContentStore::open(&self.config, &self.base_dir)?)
    }
}

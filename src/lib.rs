//! folio-rs: a personal portfolio and content server
//!
//! Serves pages, blog posts, project writeups and PDF notes straight from a
//! content directory. Nothing is pre-generated or cached: every request reads
//! fresh from storage, parses front matter, and renders through the embedded
//! theme.

pub mod commands;
pub mod config;
pub mod content;
pub mod feed;
pub mod helpers;
pub mod search;
pub mod server;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::Path;

use content::ContentStore;

/// The main Folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content directory (holds the per-kind subdirectories)
    pub content_dir: std::path::PathBuf,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
        })
    }

    /// Build a content store over the configured directories
    pub fn store(&self) -> ContentStore {
        ContentStore::new(&self.content_dir, &self.config.dirs)
    }

    /// Path of the theme preference state file
    pub fn theme_state_path(&self) -> std::path::PathBuf {
        self.base_dir.join(&self.config.theme.state_file)
    }
}

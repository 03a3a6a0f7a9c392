//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    #[serde(default)]
    pub dirs: ContentDirsConfig,

    // Theme
    #[serde(default)]
    pub theme: ThemeConfig,

    // Feed
    #[serde(default)]
    pub feed: FeedConfig,

    // Navigation shell
    #[serde(default)]
    pub activity_links: Vec<NavLink>,
    #[serde(default)]
    pub social_links: Vec<NavLink>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            email: String::new(),
            language: "en-us".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            dirs: ContentDirsConfig::default(),

            theme: ThemeConfig::default(),
            feed: FeedConfig::default(),

            activity_links: Vec::new(),
            social_links: Vec::new(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Per-kind content subdirectories, relative to `content_dir`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDirsConfig {
    pub pages: String,
    pub blog: String,
    pub projects: String,
    pub notes: String,
    /// Side-car metadata file inside the notes directory
    pub notes_sidecar: String,
}

impl Default for ContentDirsConfig {
    fn default() -> Self {
        Self {
            pages: "pages".to_string(),
            blog: "blog".to_string(),
            projects: "projects".to_string(),
            notes: "notes".to_string(),
            notes_sidecar: "metadata.json".to_string(),
        }
    }
}

/// Theme configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Theme applied when no preference has been persisted yet
    pub default: String,
    /// State file holding the persisted preference, relative to the base dir
    pub state_file: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: "dark".to_string(),
            state_file: ".theme".to_string(),
        }
    }
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Serving path of the feed document
    pub path: String,
    /// Maximum number of items, 0 for unlimited
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: "rss.xml".to_string(),
            limit: 0,
        }
    }
}

/// A navigation entry for the activity bar or the social rail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub icon: String,
}

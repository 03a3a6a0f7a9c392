//! Metadata models for the four content kinds

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::frontmatter::FrontMatter;

/// An external link attached to a page or project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocLink {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<LinkTarget>,
}

/// Target window for an external link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTarget {
    #[serde(rename = "_blank")]
    Blank,
    #[serde(rename = "_self")]
    Slf,
}

/// Metadata of a site page
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    pub tags: Vec<String>,
    pub links: Vec<DocLink>,
}

impl PageMeta {
    /// Normalize front matter into page metadata.
    /// `file_slug` is the filename minus extension and the default slug.
    pub fn from_front_matter(file_slug: &str, fm: FrontMatter) -> Self {
        let slug = fm.slug.unwrap_or_else(|| file_slug.to_string());
        let title = fm.title.unwrap_or_else(|| slug.clone());
        Self {
            slug,
            title,
            description: fm.description,
            order: fm.order.unwrap_or(0),
            tags: fm.tags,
            links: fm.links,
        }
    }
}

/// Metadata of a blog post
#[derive(Debug, Clone, Serialize)]
pub struct PostMeta {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Local>>,
    pub tags: Vec<String>,
}

impl PostMeta {
    pub fn from_front_matter(file_slug: &str, fm: FrontMatter) -> Self {
        let date = fm.parse_date();
        let slug = fm.slug.unwrap_or_else(|| file_slug.to_string());
        let title = fm.title.unwrap_or_else(|| slug.clone());
        Self {
            slug,
            title,
            description: fm.description,
            date,
            tags: fm.tags,
        }
    }
}

/// Metadata of a project writeup
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMeta {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub links: Vec<DocLink>,
}

impl ProjectMeta {
    pub fn from_front_matter(file_slug: &str, fm: FrontMatter) -> Self {
        let slug = fm.slug.unwrap_or_else(|| file_slug.to_string());
        let title = fm.title.unwrap_or_else(|| slug.clone());
        Self {
            slug,
            title,
            description: fm.description,
            tags: fm.tags,
            links: fm.links,
        }
    }
}

/// A PDF note on the shelf
///
/// Notes carry no embedded front matter; metadata comes from the side-car
/// file when present, otherwise the title is derived from the filename.
#[derive(Debug, Clone, Serialize)]
pub struct NoteFile {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<DateTime<Local>>,
    /// Original filename inside the notes directory
    pub file_name: String,
}

/// A fully loaded document: metadata plus the raw markup body.
/// The body is read only when a single document is requested, never
/// during listing.
#[derive(Debug, Clone)]
pub struct Document<M> {
    pub meta: M,
    pub body: String,
}

/// Derive a display title from a filename-based slug: underscores and
/// hyphens become spaces, every word is capitalized.
pub fn humanize_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

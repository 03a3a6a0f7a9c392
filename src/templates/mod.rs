//! Embedded UI theme using the Tera template engine
//!
//! All templates are compiled into the binary; the shell (activity bar,
//! sidebar, search modal, theme switcher) lives in the layout and its
//! partials, the views fill the content block.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{NavLink, SiteConfig};
use crate::content::{NoteFile, PageMeta, PostMeta, ProjectMeta};
use crate::helpers::date::full_date;
use crate::helpers::url::{encode_segment, url_for};
use crate::theme::Theme;

/// Template renderer with the embedded theme loaded
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // The templates generate HTML themselves; escaping happens where
        // values are interpolated, not globally
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("home.html", include_str!("folio/home.html")),
            ("page.html", include_str!("folio/page.html")),
            ("blog.html", include_str!("folio/blog.html")),
            ("post.html", include_str!("folio/post.html")),
            ("project.html", include_str!("folio/project.html")),
            ("notes.html", include_str!("folio/notes.html")),
            // Partials
            (
                "partials/activitybar.html",
                include_str!("folio/partials/activitybar.html"),
            ),
            (
                "partials/sidebar.html",
                include_str!("folio/partials/sidebar.html"),
            ),
            (
                "partials/search.html",
                include_str!("folio/partials/search.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::html::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    Ok(tera::Value::String(crate::helpers::html::truncate(
        &s, length, None,
    )))
}

/// Tera filter: escape interpolated text
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::html::html_escape(&s)))
}

/// Data structures for template context

/// Site-wide shell data, identical on every view
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
    pub theme: String,
    pub feed_href: String,
    pub activity_links: Vec<NavLink>,
    pub social_links: Vec<NavLink>,
}

impl SiteData {
    pub fn new(config: &SiteConfig, theme: Theme) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
            theme: theme.as_str().to_string(),
            feed_href: url_for(config, &config.feed.path),
            activity_links: config.activity_links.clone(),
            social_links: config.social_links.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageItemData {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub links: Vec<crate::content::DocLink>,
    pub href: String,
}

pub fn page_item(config: &SiteConfig, meta: &PageMeta) -> PageItemData {
    PageItemData {
        slug: meta.slug.clone(),
        title: meta.title.clone(),
        description: meta.description.clone(),
        tags: meta.tags.clone(),
        links: meta.links.clone(),
        href: url_for(config, &encode_segment(&meta.slug)),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostItemData {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub href: String,
}

pub fn post_item(config: &SiteConfig, meta: &PostMeta) -> PostItemData {
    PostItemData {
        slug: meta.slug.clone(),
        title: meta.title.clone(),
        description: meta.description.clone(),
        date: meta.date.as_ref().map(full_date),
        tags: meta.tags.clone(),
        href: url_for(config, &format!("blog/{}", encode_segment(&meta.slug))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectItemData {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub links: Vec<crate::content::DocLink>,
    pub href: String,
}

pub fn project_item(config: &SiteConfig, meta: &ProjectMeta) -> ProjectItemData {
    ProjectItemData {
        slug: meta.slug.clone(),
        title: meta.title.clone(),
        description: meta.description.clone(),
        tags: meta.tags.clone(),
        links: meta.links.clone(),
        href: url_for(config, &format!("projects/{}", encode_segment(&meta.slug))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteItemData {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub href: String,
}

pub fn note_item(config: &SiteConfig, note: &NoteFile) -> NoteItemData {
    NoteItemData {
        slug: note.slug.clone(),
        title: note.title.clone(),
        description: note.description.clone(),
        tags: note.tags.clone(),
        date: note.date.as_ref().map(full_date),
        href: url_for(config, &format!("api/notes/{}", encode_segment(&note.slug))),
    }
}

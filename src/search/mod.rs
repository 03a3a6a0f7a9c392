//! Metadata search
//!
//! A pure, synchronous filter over already-materialized records. There is no
//! index and no ranking at this scale; an empty query yields no results so
//! the UI stays quiet until the user types.

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{NoteFile, PageMeta, PostMeta};
use crate::helpers::url::{encode_segment, url_for};

/// Which shelf a searchable record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Page,
    Post,
    Note,
    Social,
}

/// A searchable record with everything the modal renders
#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    pub kind: SearchKind,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub href: String,
}

/// Search results grouped per category
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub pages: Vec<SearchRecord>,
    pub posts: Vec<SearchRecord>,
    pub notes: Vec<SearchRecord>,
    pub social: Vec<SearchRecord>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
            && self.posts.is_empty()
            && self.notes.is_empty()
            && self.social.is_empty()
    }
}

/// Materialize searchable records from loaded metadata and the configured
/// social entries
pub fn build_records(
    config: &SiteConfig,
    pages: &[PageMeta],
    posts: &[PostMeta],
    notes: &[NoteFile],
) -> Vec<SearchRecord> {
    let mut records = Vec::new();

    for page in pages {
        records.push(SearchRecord {
            kind: SearchKind::Page,
            title: page.title.clone(),
            description: page.description.clone(),
            tags: page.tags.clone(),
            href: url_for(config, &encode_segment(&page.slug)),
        });
    }

    for post in posts {
        records.push(SearchRecord {
            kind: SearchKind::Post,
            title: post.title.clone(),
            description: post.description.clone(),
            tags: post.tags.clone(),
            href: url_for(config, &format!("blog/{}", encode_segment(&post.slug))),
        });
    }

    for note in notes {
        records.push(SearchRecord {
            kind: SearchKind::Note,
            title: note.title.clone(),
            description: note.description.clone(),
            tags: note.tags.clone(),
            href: url_for(config, &format!("api/notes/{}", encode_segment(&note.slug))),
        });
    }

    for link in &config.social_links {
        records.push(SearchRecord {
            kind: SearchKind::Social,
            title: link.label.clone(),
            description: None,
            tags: Vec::new(),
            href: link.href.clone(),
        });
    }

    records
}

/// Case-insensitive substring filter over title, description and tags.
/// A blank query matches nothing.
pub fn search(records: &[SearchRecord], query: &str) -> SearchResults {
    let needle = query.trim().to_lowercase();
    let mut results = SearchResults::default();
    if needle.is_empty() {
        return results;
    }

    for record in records {
        if !matches(record, &needle) {
            continue;
        }
        let bucket = match record.kind {
            SearchKind::Page => &mut results.pages,
            SearchKind::Post => &mut results.posts,
            SearchKind::Note => &mut results.notes,
            SearchKind::Social => &mut results.social,
        };
        bucket.push(record.clone());
    }

    results
}

fn matches(record: &SearchRecord, needle: &str) -> bool {
    let haystack = format!(
        "{} {} {}",
        record.title,
        record.description.as_deref().unwrap_or(""),
        record.tags.join(" ")
    )
    .to_lowercase();
    haystack.contains(needle)
}

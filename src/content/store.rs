//! Content repository accessor
//!
//! One store per site; it holds only directory paths and reads fresh from
//! storage on every call. Listing enumerates a kind's directory and parses
//! each document's front matter; bodies are loaded only by the single-slug
//! getters.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::ContentDirsConfig;

use super::error::{ContentError, Result};
use super::frontmatter::{parse_date_string, FrontMatter};
use super::model::{humanize_slug, Document, NoteFile, PageMeta, PostMeta, ProjectMeta};

const MARKDOWN_EXT: &str = "md";
const NOTE_EXT: &str = "pdf";

/// Validate a slug taken from untrusted request input.
///
/// Slugs must be bare identifiers: no path separators, no parent-directory
/// references. This runs before any path is constructed from the slug.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains('/') && !slug.contains('\\') && !slug.contains("..")
}

fn check_slug(slug: &str) -> Result<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ContentError::InvalidSlug(slug.to_string()))
    }
}

/// Accessor over the per-kind content directories
#[derive(Debug, Clone)]
pub struct ContentStore {
    pages_dir: PathBuf,
    blog_dir: PathBuf,
    projects_dir: PathBuf,
    notes_dir: PathBuf,
    sidecar_path: PathBuf,
}

impl ContentStore {
    pub fn new(content_dir: &Path, dirs: &ContentDirsConfig) -> Self {
        let notes_dir = content_dir.join(&dirs.notes);
        Self {
            pages_dir: content_dir.join(&dirs.pages),
            blog_dir: content_dir.join(&dirs.blog),
            projects_dir: content_dir.join(&dirs.projects),
            sidecar_path: notes_dir.join(&dirs.notes_sidecar),
            notes_dir,
        }
    }

    /// List page metadata, sorted by ascending `order`.
    /// Ties keep enumeration (name-sorted) order.
    pub async fn list_pages(&self) -> Result<Vec<PageMeta>> {
        let mut pages = self
            .list_documents(&self.pages_dir, PageMeta::from_front_matter)
            .await?;
        pages.sort_by_key(|p| p.order);
        Ok(pages)
    }

    /// List blog post metadata, newest first.
    /// Undated posts rank as oldest; equal dates break by title.
    pub async fn list_posts(&self) -> Result<Vec<PostMeta>> {
        let mut posts = self
            .list_documents(&self.blog_dir, PostMeta::from_front_matter)
            .await?;
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
        Ok(posts)
    }

    /// List project metadata, sorted alphabetically by title
    pub async fn list_projects(&self) -> Result<Vec<ProjectMeta>> {
        let mut projects = self
            .list_documents(&self.projects_dir, ProjectMeta::from_front_matter)
            .await?;
        projects.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(projects)
    }

    /// Load a single page with its body
    pub async fn get_page(&self, slug: &str) -> Result<Option<Document<PageMeta>>> {
        self.get_document(&self.pages_dir, slug, PageMeta::from_front_matter)
            .await
    }

    /// Load a single blog post with its body
    pub async fn get_post(&self, slug: &str) -> Result<Option<Document<PostMeta>>> {
        self.get_document(&self.blog_dir, slug, PostMeta::from_front_matter)
            .await
    }

    /// Load a single project with its body
    pub async fn get_project(&self, slug: &str) -> Result<Option<Document<ProjectMeta>>> {
        self.get_document(&self.projects_dir, slug, ProjectMeta::from_front_matter)
            .await
    }

    /// List PDF notes, sorted by title.
    ///
    /// Metadata comes from the side-car file when an entry matches the
    /// lowercased slug; otherwise the title is humanized from the filename.
    /// A missing side-car yields empty metadata, not an error.
    pub async fn list_notes(&self) -> Result<Vec<NoteFile>> {
        let entries = match list_dir_sorted(&self.notes_dir).await? {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let sidecar = self.load_sidecar().await?;

        let mut notes = Vec::new();
        for file_name in entries {
            let Some(slug) = strip_extension(&file_name, NOTE_EXT) else {
                continue;
            };
            notes.push(build_note(slug, &file_name, &sidecar));
        }

        notes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(notes)
    }

    /// Resolve the file path of a note attachment.
    /// Validates the slug first; does not check for existence.
    pub fn note_path(&self, slug: &str) -> Result<PathBuf> {
        check_slug(slug)?;
        Ok(self.notes_dir.join(format!("{}.{}", slug, NOTE_EXT)))
    }

    async fn load_sidecar(&self) -> Result<HashMap<String, SidecarEntry>> {
        let raw = match tokio::fs::read_to_string(&self.sidecar_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<HashMap<String, SidecarEntry>>(&raw) {
            Ok(map) => {
                // Keys are matched case-insensitively on the slug
                Ok(map
                    .into_iter()
                    .map(|(k, v)| (k.to_lowercase(), v))
                    .collect())
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed notes side-car {:?}: {}", self.sidecar_path, e);
                Ok(HashMap::new())
            }
        }
    }

    async fn list_documents<M>(
        &self,
        dir: &Path,
        normalize: fn(&str, FrontMatter) -> M,
    ) -> Result<Vec<M>> {
        let entries = match list_dir_sorted(dir).await? {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let mut docs = Vec::new();
        for file_name in entries {
            let Some(slug) = strip_extension(&file_name, MARKDOWN_EXT) else {
                continue;
            };
            let source = tokio::fs::read_to_string(dir.join(&file_name)).await?;
            let (fm, _) = FrontMatter::parse(&source);
            docs.push(normalize(slug, fm));
        }

        Ok(docs)
    }

    async fn get_document<M>(
        &self,
        dir: &Path,
        slug: &str,
        normalize: fn(&str, FrontMatter) -> M,
    ) -> Result<Option<Document<M>>> {
        check_slug(slug)?;

        let path = dir.join(format!("{}.{}", slug, MARKDOWN_EXT));
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (fm, body) = FrontMatter::parse(&source);
        Ok(Some(Document {
            meta: normalize(slug, fm),
            body: body.to_string(),
        }))
    }
}

/// Optional per-note metadata from the side-car file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SidecarEntry {
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    date: Option<String>,
}

fn build_note(slug: &str, file_name: &str, sidecar: &HashMap<String, SidecarEntry>) -> NoteFile {
    let entry = sidecar.get(&slug.to_lowercase());
    let title = entry
        .and_then(|e| e.title.clone())
        .unwrap_or_else(|| humanize_slug(slug));
    NoteFile {
        slug: slug.to_string(),
        title,
        description: entry.and_then(|e| e.description.clone()),
        tags: entry.map(|e| e.tags.clone()).unwrap_or_default(),
        date: entry
            .and_then(|e| e.date.as_deref())
            .and_then(parse_date_string),
        file_name: file_name.to_string(),
    }
}

/// Enumerate a directory's file names, name-sorted for deterministic
/// ordering. `Ok(None)` when the directory does not exist.
async fn list_dir_sorted(dir: &Path) -> Result<Option<Vec<String>>> {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        if entry.file_type().await?.is_file() {
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
    }

    names.sort();
    Ok(Some(names))
}

/// Match a filename against an extension (case-insensitive) and return the
/// stem as the slug
fn strip_extension<'a>(file_name: &'a str, ext: &str) -> Option<&'a str> {
    let (stem, file_ext) = file_name.rsplit_once('.')?;
    if file_ext.eq_ignore_ascii_case(ext) && !stem.is_empty() {
        Some(stem)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentDirsConfig;
    use std::fs;
    use tempfile::TempDir;

    fn fixture_store(tmp: &TempDir) -> ContentStore {
        ContentStore::new(tmp.path(), &ContentDirsConfig::default())
    }

    fn write_doc(tmp: &TempDir, kind: &str, name: &str, content: &str) {
        let dir = tmp.path().join(kind);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("hello-world_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("a\\b"));
        assert!(!is_valid_slug("../etc/passwd"));
        assert!(!is_valid_slug(".."));
    }

    #[tokio::test]
    async fn test_missing_directories_list_empty() {
        let tmp = TempDir::new().unwrap();
        let store = fixture_store(&tmp);
        assert!(store.list_pages().await.unwrap().is_empty());
        assert!(store.list_posts().await.unwrap().is_empty());
        assert!(store.list_projects().await.unwrap().is_empty());
        assert!(store.list_notes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pages_sorted_by_order() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "pages", "zeta.md", "---\ntitle: Zeta\norder: 1\n---\nz");
        write_doc(&tmp, "pages", "alpha.md", "---\ntitle: Alpha\norder: 3\n---\na");
        write_doc(&tmp, "pages", "mid.md", "---\ntitle: Mid\norder: 1\n---\nm");

        let store = fixture_store(&tmp);
        let pages = store.list_pages().await.unwrap();
        let titles: Vec<_> = pages.iter().map(|p| p.title.as_str()).collect();
        // order 1 entries keep name-sorted enumeration order (mid < zeta)
        assert_eq!(titles, vec!["Mid", "Zeta", "Alpha"]);
    }

    #[tokio::test]
    async fn test_posts_sorted_date_desc_undated_last() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "blog", "old.md", "---\ntitle: Old\ndate: 2023-01-01\n---\nx");
        write_doc(&tmp, "blog", "new.md", "---\ntitle: New\ndate: 2024-06-01\n---\nx");
        write_doc(&tmp, "blog", "undated.md", "---\ntitle: Undated\n---\nx");

        let store = fixture_store(&tmp);
        let posts = store.list_posts().await.unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old", "Undated"]);
    }

    #[tokio::test]
    async fn test_posts_date_tie_breaks_by_title() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "blog", "b.md", "---\ntitle: Beta\ndate: 2024-01-01\n---\nx");
        write_doc(&tmp, "blog", "a.md", "---\ntitle: Alpha\ndate: 2024-01-01\n---\nx");

        let store = fixture_store(&tmp);
        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts[0].title, "Alpha");
        assert_eq!(posts[1].title, "Beta");
    }

    #[tokio::test]
    async fn test_projects_sorted_by_title() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "projects", "one.md", "---\ntitle: Zapper\n---\nx");
        write_doc(&tmp, "projects", "two.md", "---\ntitle: Anvil\n---\nx");

        let store = fixture_store(&tmp);
        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects[0].title, "Anvil");
        assert_eq!(projects[1].title, "Zapper");
    }

    #[tokio::test]
    async fn test_listing_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "blog", "a.md", "---\ntitle: A\ndate: 2024-01-01\n---\nx");
        write_doc(&tmp, "blog", "b.md", "---\ntitle: B\n---\nx");

        let store = fixture_store(&tmp);
        let first = store.list_posts().await.unwrap();
        let second = store.list_posts().await.unwrap();
        let firsts: Vec<_> = first.iter().map(|p| (&p.slug, &p.title)).collect();
        let seconds: Vec<_> = second.iter().map(|p| (&p.slug, &p.title)).collect();
        assert_eq!(firsts, seconds);
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "pages", "about.md", "---\ntitle: About Me\n---\nHello there.");

        let store = fixture_store(&tmp);
        let doc = store.get_page("about").await.unwrap().unwrap();
        assert_eq!(doc.meta.slug, "about");
        assert_eq!(doc.meta.title, "About Me");
        assert!(doc.body.contains("Hello there."));

        assert!(store.get_page("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_rejects_traversal_before_fs_access() {
        // No directories exist at all: a traversal slug must still fail with
        // InvalidSlug, not report NotFound
        let tmp = TempDir::new().unwrap();
        let store = fixture_store(&tmp);

        for slug in ["../secret", "a/b", "a\\b"] {
            match store.get_post(slug).await {
                Err(ContentError::InvalidSlug(_)) => {}
                other => panic!("expected InvalidSlug for {:?}, got {:?}", slug, other.is_ok()),
            }
            assert!(store.note_path(slug).is_err());
        }
    }

    #[tokio::test]
    async fn test_non_matching_extensions_skipped() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "pages", "about.md", "---\ntitle: About\n---\nx");
        write_doc(&tmp, "pages", "notes.txt", "not markdown");
        write_doc(&tmp, "pages", "draft.markdown", "also skipped");

        let store = fixture_store(&tmp);
        let pages = store.list_pages().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slug, "about");
    }

    #[tokio::test]
    async fn test_notes_sidecar_merge_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "notes", "Linear_Algebra.pdf", "%PDF-1.4");
        write_doc(&tmp, "notes", "calculus-basics.pdf", "%PDF-1.4");
        write_doc(
            &tmp,
            "notes",
            "metadata.json",
            r#"{"linear_algebra": {"title": "Linear Algebra II", "tags": ["math"], "date": "2024-02-01"}}"#,
        );

        let store = fixture_store(&tmp);
        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 2);

        let merged = notes.iter().find(|n| n.slug == "Linear_Algebra").unwrap();
        assert_eq!(merged.title, "Linear Algebra II");
        assert_eq!(merged.tags, vec!["math"]);
        assert!(merged.date.is_some());

        let fallback = notes.iter().find(|n| n.slug == "calculus-basics").unwrap();
        assert_eq!(fallback.title, "Calculus Basics");
        assert!(fallback.tags.is_empty());
        assert!(fallback.date.is_none());
    }

    #[tokio::test]
    async fn test_notes_without_sidecar() {
        let tmp = TempDir::new().unwrap();
        write_doc(&tmp, "notes", "memo.PDF", "%PDF-1.4");

        let store = fixture_store(&tmp);
        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Memo");
        assert_eq!(notes[0].file_name, "memo.PDF");
    }
}

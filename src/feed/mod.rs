//! RSS 2.0 feed builder
//!
//! A deterministic transform from collected (metadata, body) pairs to the
//! feed document. Collection reads blog posts and notes fresh from the
//! store; any error while collecting aborts the whole generation, there is
//! no partial feed.

use chrono::{DateTime, Local};
use std::fmt::Write as _;

use crate::config::SiteConfig;
use crate::content::{is_valid_slug, ContentStore, NoteFile, PostMeta, Result};
use crate::helpers::date::rfc2822;
use crate::helpers::url::{encode_segment, full_url_for};

/// Channel-level feed data
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    pub link: String,
    pub feed_url: String,
    pub language: String,
}

impl FeedChannel {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            link: config.url.trim_end_matches('/').to_string(),
            feed_url: full_url_for(config, &config.feed.path),
            language: config.language.clone(),
        }
    }
}

/// A single feed entry, derived at request time and never persisted
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Permalink identifier; the absolute link itself
    pub guid: String,
    pub pub_date: DateTime<Local>,
    pub categories: Vec<String>,
    pub content_html: Option<String>,
}

/// Escape the five reserved characters for XML text and attribute values
fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape reserved characters inside an HTML content block
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap a value in CDATA, splitting any embedded `]]>` terminator
fn wrap_cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}

/// Turn a raw document body into an HTML content block: blank-line-separated
/// paragraphs, line breaks within a paragraph preserved, markup escaped.
pub fn format_content(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let normalized = content.replace("\r\n", "\n");
    let mut blocks = Vec::new();
    for block in normalized.split("\n\n") {
        let block = block.trim_matches('\n');
        if block.is_empty() {
            continue;
        }
        blocks.push(format!("<p>{}</p>", escape_html(block).replace('\n', "<br/>")));
    }

    blocks.join("")
}

/// Build a feed item from a blog post
pub fn blog_item(
    config: &SiteConfig,
    meta: &PostMeta,
    body: &str,
    now: DateTime<Local>,
) -> FeedItem {
    let link = full_url_for(config, &format!("blog/{}", encode_segment(&meta.slug)));
    let description = meta.description.clone().unwrap_or_default();

    let mut content = String::from("<div>");
    if let Some(desc) = &meta.description {
        let _ = write!(content, "<p>{}</p>", escape_html(desc));
    }
    content.push_str(&format_content(body));
    let _ = write!(
        content,
        r#"<p><a href="{}">Read more on the website</a></p></div>"#,
        link
    );

    FeedItem {
        title: meta.title.clone(),
        description,
        guid: link.clone(),
        link,
        pub_date: meta.date.unwrap_or(now),
        categories: meta.tags.clone(),
        content_html: Some(content),
    }
}

/// Build a feed item from a PDF note
pub fn note_item(
    config: &SiteConfig,
    note: &NoteFile,
    modified: Option<DateTime<Local>>,
    now: DateTime<Local>,
) -> FeedItem {
    let link = full_url_for(config, &format!("api/notes/{}", encode_segment(&note.slug)));
    let shelf = full_url_for(config, "notes");

    let content = format!(
        r#"<div><p>This PDF note lives on the <a href="{}">Notes</a> shelf.</p><p><a href="{}">Download the PDF</a></p></div>"#,
        shelf, link
    );

    let mut categories = vec!["notes".to_string()];
    categories.extend(note.tags.iter().cloned());

    FeedItem {
        title: format!("{} (Note)", note.title),
        description: format!("New PDF note available: {}", note.title),
        guid: link.clone(),
        link,
        pub_date: note.date.or(modified).unwrap_or(now),
        categories,
        content_html: Some(content),
    }
}

/// Gather feed items from blog posts and notes.
/// Propagates every I/O error so the caller aborts the whole document.
pub async fn collect_items(
    store: &ContentStore,
    config: &SiteConfig,
    now: DateTime<Local>,
) -> Result<Vec<FeedItem>> {
    let mut items = Vec::new();

    for meta in store.list_posts().await? {
        // Front matter can override a slug to something that maps to no
        // file; such posts are listed but have no feed body.
        if !is_valid_slug(&meta.slug) {
            continue;
        }
        if let Some(doc) = store.get_post(&meta.slug).await? {
            items.push(blog_item(config, &doc.meta, &doc.body, now));
        }
    }

    for note in store.list_notes().await? {
        let modified = match tokio::fs::metadata(store.note_path(&note.slug)?).await {
            Ok(md) => md.modified().ok().map(DateTime::<Local>::from),
            Err(_) => None,
        };
        items.push(note_item(config, &note, modified, now));
    }

    Ok(items)
}

/// Serialize the feed document.
/// Items are sorted by publish timestamp descending first; `limit` of 0
/// means unlimited.
pub fn build_feed(
    channel: &FeedChannel,
    mut items: Vec<FeedItem>,
    limit: usize,
    now: DateTime<Local>,
) -> String {
    items.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    if limit > 0 {
        items.truncate(limit);
    }

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:atom="http://www.w3.org/2005/Atom">"#,
    );
    xml.push('\n');
    xml.push_str("<channel>\n");
    let _ = writeln!(xml, "<title>{}</title>", wrap_cdata(&channel.title));
    let _ = writeln!(
        xml,
        "<description>{}</description>",
        wrap_cdata(&channel.description)
    );
    let _ = writeln!(xml, "<link>{}</link>", escape_xml(&channel.link));
    let _ = writeln!(xml, "<language>{}</language>", escape_xml(&channel.language));
    let _ = writeln!(
        xml,
        "<lastBuildDate>{}</lastBuildDate>",
        rfc2822(&now)
    );
    let _ = writeln!(
        xml,
        r#"<atom:link href="{}" rel="self" type="application/rss+xml"/>"#,
        escape_xml(&channel.feed_url)
    );

    for item in &items {
        xml.push_str(&item_xml(item));
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

fn item_xml(item: &FeedItem) -> String {
    let mut xml = String::new();
    xml.push_str("<item>\n");
    let _ = writeln!(xml, "<title>{}</title>", wrap_cdata(&item.title));
    let _ = writeln!(
        xml,
        "<description>{}</description>",
        wrap_cdata(&item.description)
    );
    if let Some(content) = &item.content_html {
        let _ = writeln!(
            xml,
            "<content:encoded>{}</content:encoded>",
            wrap_cdata(content)
        );
    }
    let _ = writeln!(xml, "<link>{}</link>", escape_xml(&item.link));
    let _ = writeln!(
        xml,
        r#"<guid isPermaLink="true">{}</guid>"#,
        escape_xml(&item.guid)
    );
    let _ = writeln!(xml, "<pubDate>{}</pubDate>", rfc2822(&item.pub_date));
    for category in &item.categories {
        let _ = writeln!(xml, "<category>{}</category>", wrap_cdata(category));
    }
    xml.push_str("</item>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn channel() -> FeedChannel {
        FeedChannel {
            title: "Test Site".to_string(),
            description: "A test".to_string(),
            link: "https://example.com".to_string(),
            feed_url: "https://example.com/rss.xml".to_string(),
            language: "en-us".to_string(),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn item(title: &str, date: DateTime<Local>) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            description: String::new(),
            link: "https://example.com/blog/x".to_string(),
            guid: "https://example.com/blog/x".to_string(),
            pub_date: date,
            categories: Vec::new(),
            content_html: None,
        }
    }

    #[test]
    fn test_empty_channel_is_well_formed() {
        let xml = build_feed(&channel(), Vec::new(), 0, at(2024, 1, 1));
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<channel>"));
        assert!(xml.contains("</channel>"));
        assert!(xml.contains(r#"<rss version="2.0""#));
        assert!(xml.contains(r#"rel="self""#));
        assert!(!xml.contains("<item>"));
    }

    #[test]
    fn test_items_sorted_by_date_descending() {
        let items = vec![
            item("old", at(2023, 1, 1)),
            item("new", at(2024, 6, 1)),
            item("mid", at(2023, 8, 1)),
        ];
        let xml = build_feed(&channel(), items, 0, at(2024, 7, 1));
        let new_pos = xml.find("new").unwrap();
        let mid_pos = xml.find("mid").unwrap();
        let old_pos = xml.find("old").unwrap();
        assert!(new_pos < mid_pos && mid_pos < old_pos);
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let items = vec![item("old", at(2023, 1, 1)), item("new", at(2024, 1, 1))];
        let xml = build_feed(&channel(), items, 1, at(2024, 7, 1));
        assert!(xml.contains("new"));
        assert!(!xml.contains("old"));
    }

    #[test]
    fn test_title_with_reserved_character_is_escaped() {
        let mut entry = item("Tips & Tricks", at(2024, 1, 1));
        entry.content_html = Some(format_content("first paragraph\n\nsecond paragraph"));
        let xml = build_feed(&channel(), vec![entry], 0, at(2024, 1, 2));
        // CDATA protects the raw title; nothing leaks as bare markup
        assert!(xml.contains("<![CDATA[Tips & Tricks]]>"));
        assert!(xml.contains("<p>first paragraph</p><p>second paragraph</p>"));
    }

    #[test]
    fn test_format_content_paragraphs_and_breaks() {
        let html = format_content("line one\nline two\n\nnext block");
        assert_eq!(html, "<p>line one<br/>line two</p><p>next block</p>");
    }

    #[test]
    fn test_format_content_escapes_markup() {
        let html = format_content("a < b & c > d");
        assert_eq!(html, "<p>a &lt; b &amp; c &gt; d</p>");
    }

    #[test]
    fn test_format_content_empty() {
        assert_eq!(format_content("   \n  "), "");
    }

    #[test]
    fn test_wrap_cdata_protects_terminator() {
        let wrapped = wrap_cdata("before ]]> after");
        assert!(!wrapped.contains("]]> after]]>"));
        assert!(wrapped.starts_with("<![CDATA["));
        assert!(wrapped.ends_with("]]>"));
    }

    #[test]
    fn test_escape_xml_all_reserved() {
        assert_eq!(escape_xml(r#"<&>"'"#), "&lt;&amp;&gt;&quot;&apos;");
    }

    #[test]
    fn test_blog_item_links_and_date_fallback() {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        let now = at(2024, 5, 5);
        let meta = PostMeta {
            slug: "hello world".to_string(),
            title: "Hello".to_string(),
            description: Some("Greetings".to_string()),
            date: None,
            tags: vec!["intro".to_string()],
        };
        let entry = blog_item(&config, &meta, "body text", now);
        assert_eq!(entry.link, "https://example.com/blog/hello%20world");
        assert_eq!(entry.guid, entry.link);
        assert_eq!(entry.pub_date, now);
        assert_eq!(entry.categories, vec!["intro"]);
        let content = entry.content_html.unwrap();
        assert!(content.contains("<p>Greetings</p>"));
        assert!(content.contains("Read more on the website"));
    }

    #[test]
    fn test_note_item_uses_modified_time() {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        let now = at(2024, 5, 5);
        let modified = at(2024, 3, 3);
        let note = NoteFile {
            slug: "algebra".to_string(),
            title: "Algebra".to_string(),
            description: None,
            tags: vec!["math".to_string()],
            date: None,
            file_name: "algebra.pdf".to_string(),
        };
        let entry = note_item(&config, &note, Some(modified), now);
        assert_eq!(entry.title, "Algebra (Note)");
        assert_eq!(entry.pub_date, modified);
        assert_eq!(entry.link, "https://example.com/api/notes/algebra");
        assert_eq!(entry.categories, vec!["notes", "math"]);
    }
}

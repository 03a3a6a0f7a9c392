//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Scaffold a config file, the content directories and sample documents
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("content/pages"))?;
    fs::create_dir_all(target_dir.join("content/blog"))?;
    fs::create_dir_all(target_dir.join("content/projects"))?;
    fs::create_dir_all(target_dir.join("content/notes"))?;

    let config_content = r#"# Folio configuration

# Site
title: Folio
description: ''
author: John Doe
email: ''
language: en-us

# URL
url: http://example.com
root: /

# Directory
content_dir: content
dirs:
  pages: pages
  blog: blog
  projects: projects
  notes: notes
  notes_sidecar: metadata.json

# Theme
theme:
  default: dark
  state_file: .theme

# Feed
feed:
  path: rss.xml
  limit: 0

# Navigation
activity_links: []
social_links:
  - label: GitHub
    href: https://github.com/username
    icon: mdi:github
"#;

    fs::write(target_dir.join("_config.yml"), config_content)?;

    let sample_page = r#"---
title: About
order: 1
description: Who I am and what I do
links:
  - label: GitHub
    href: https://github.com/username
    target: _blank
---

Hello! This page lives in `content/pages/about.md`. Edit it to introduce
yourself.
"#;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
tags:
  - meta
---

Welcome to your new site. Drop markdown files into `content/blog` and they
show up on the blog immediately; there is no build step.

Add PDF files under `content/notes` to fill the notes shelf, with an optional
`metadata.json` side-car for titles and tags.
"#,
        now.format("%Y-%m-%d")
    );

    let sample_project = r#"---
title: Sample Project
description: A placeholder project writeup
tags:
  - rust
links:
  - label: Source
    href: https://github.com/username/sample
    target: _blank
---

Describe the project here.
"#;

    fs::write(target_dir.join("content/pages/about.md"), sample_page)?;
    fs::write(target_dir.join("content/blog/hello-world.md"), sample_post)?;
    fs::write(
        target_dir.join("content/projects/sample-project.md"),
        sample_project,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_scaffolds_loadable_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let folio = crate::Folio::new(tmp.path()).unwrap();
        let store = folio.store();

        let pages = store.list_pages().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "About");

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].date.is_some());

        assert!(store.list_notes().await.unwrap().is_empty());
    }
}

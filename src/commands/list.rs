//! List site content

use anyhow::Result;

use crate::Folio;

/// List content metadata by kind
pub async fn run(folio: &Folio, kind: &str) -> Result<()> {
    let store = folio.store();

    match kind {
        "page" | "pages" => {
            let pages = store.list_pages().await?;
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {:>3}  {} [{}]", page.order, page.title, page.slug);
            }
        }
        "post" | "posts" | "blog" => {
            let posts = store.list_posts().await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let date = post
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "undated".to_string());
                println!("  {} - {} [{}]", date, post.title, post.slug);
            }
        }
        "project" | "projects" => {
            let projects = store.list_projects().await?;
            println!("Projects ({}):", projects.len());
            for project in projects {
                println!("  {} [{}]", project.title, project.slug);
            }
        }
        "note" | "notes" => {
            let notes = store.list_notes().await?;
            println!("Notes ({}):", notes.len());
            for note in notes {
                println!("  {} [{}]", note.title, note.file_name);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown kind: {}. Available: pages, posts, projects, notes",
                kind
            );
        }
    }

    Ok(())
}

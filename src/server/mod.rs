//! HTTP server
//!
//! Every handler reads fresh from the content store; there is no shared
//! mutable state between requests apart from the theme context, which is the
//! one write-through preference.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use tera::Context;
use tower_http::trace::TraceLayer;

use crate::content::{ContentError, MarkdownRenderer};
use crate::feed::{self, FeedChannel};
use crate::search::{self, SearchResults};
use crate::templates::{self, SiteData, TemplateRenderer};
use crate::theme::{Theme, ThemeContext};
use crate::Folio;

/// Shared server state
struct AppState {
    folio: Folio,
    theme: ThemeContext,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
}

/// Handler failure, mapped onto the response taxonomy: 400 for rejected
/// input, 404 for absent resources, 500 (logged) for everything else
enum AppError {
    BadRequest(&'static str),
    NotFound,
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

impl From<ContentError> for AppError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::InvalidSlug(_) => AppError::BadRequest("Invalid slug"),
            ContentError::Io(e) => AppError::Internal(e.into()),
        }
    }
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let default_theme = folio
        .config
        .theme
        .default
        .parse()
        .unwrap_or(Theme::Dark);

    let state = Arc::new(AppState {
        theme: ThemeContext::init(folio.theme_state_path(), default_theme),
        templates: TemplateRenderer::new()?,
        markdown: MarkdownRenderer::new(),
        folio: folio.clone(),
    });

    let feed_route = format!("/{}", folio.config.feed.path.trim_start_matches('/'));

    let app = Router::new()
        .route("/", get(home))
        .route("/blog", get(blog_index))
        .route("/blog/:slug", get(post_view))
        .route("/projects/:slug", get(project_view))
        .route("/notes", get(notes_index))
        .route("/api/notes/:slug", get(note_file))
        .route("/api/search", get(api_search))
        .route(&feed_route, get(rss_feed))
        .route("/theme/:name", post(set_theme))
        .route("/:slug", get(page_view))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn render_view(
    state: &AppState,
    template: &str,
    fill: impl FnOnce(&mut Context),
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert(
        "site",
        &SiteData::new(&state.folio.config, state.theme.current()),
    );
    fill(&mut ctx);
    let html = state
        .templates
        .render(template, &ctx)
        .map_err(AppError::Internal)?;
    Ok(Html(html))
}

async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let store = state.folio.store();
    let config = &state.folio.config;

    let pages: Vec<_> = store
        .list_pages()
        .await?
        .iter()
        .map(|m| templates::page_item(config, m))
        .collect();
    let posts: Vec<_> = store
        .list_posts()
        .await?
        .iter()
        .take(5)
        .map(|m| templates::post_item(config, m))
        .collect();
    let projects: Vec<_> = store
        .list_projects()
        .await?
        .iter()
        .map(|m| templates::project_item(config, m))
        .collect();

    render_view(&state, "home.html", |ctx| {
        ctx.insert("pages", &pages);
        ctx.insert("posts", &posts);
        ctx.insert("projects", &projects);
    })
}

async fn page_view(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let doc = state
        .folio
        .store()
        .get_page(&slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let content = state
        .markdown
        .render(&doc.body)
        .map_err(AppError::Internal)?;
    let item = templates::page_item(&state.folio.config, &doc.meta);

    render_view(&state, "page.html", |ctx| {
        ctx.insert("page", &item);
        ctx.insert("content", &content);
    })
}

async fn blog_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let config = &state.folio.config;
    let posts: Vec<_> = state
        .folio
        .store()
        .list_posts()
        .await?
        .iter()
        .map(|m| templates::post_item(config, m))
        .collect();

    render_view(&state, "blog.html", |ctx| {
        ctx.insert("posts", &posts);
    })
}

async fn post_view(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let doc = state
        .folio
        .store()
        .get_post(&slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let content = state
        .markdown
        .render(&doc.body)
        .map_err(AppError::Internal)?;
    let item = templates::post_item(&state.folio.config, &doc.meta);

    render_view(&state, "post.html", |ctx| {
        ctx.insert("post", &item);
        ctx.insert("content", &content);
    })
}

async fn project_view(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let doc = state
        .folio
        .store()
        .get_project(&slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let content = state
        .markdown
        .render(&doc.body)
        .map_err(AppError::Internal)?;
    let item = templates::project_item(&state.folio.config, &doc.meta);

    render_view(&state, "project.html", |ctx| {
        ctx.insert("project", &item);
        ctx.insert("content", &content);
    })
}

async fn notes_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let config = &state.folio.config;
    let notes: Vec<_> = state
        .folio
        .store()
        .list_notes()
        .await?
        .iter()
        .map(|n| templates::note_item(config, n))
        .collect();

    render_view(&state, "notes.html", |ctx| {
        ctx.insert("notes", &notes);
    })
}

/// Serve a PDF note attachment
async fn note_file(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    // Slug validation happens before any filesystem access
    let path = state.folio.store().note_path(&slug)?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(r#"inline; filename="{}.pdf""#, slug),
        ),
        (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
    ];

    Ok((headers, bytes).into_response())
}

/// Generate the syndication feed
async fn rss_feed(State(state): State<Arc<AppState>>) -> Response {
    let config = &state.folio.config;
    let store = state.folio.store();
    let now = Local::now();

    match feed::collect_items(&store, config, now).await {
        Ok(items) => {
            let channel = FeedChannel::from_config(config);
            let xml = feed::build_feed(&channel, items, config.feed.limit, now);
            (
                [
                    (
                        header::CONTENT_TYPE,
                        "application/rss+xml; charset=utf-8",
                    ),
                    (header::CACHE_CONTROL, "public, max-age=3600"),
                ],
                xml,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Feed generation failed: {:#}", anyhow::Error::from(e));
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Search over freshly loaded metadata
async fn api_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let store = state.folio.store();
    let config = &state.folio.config;

    let pages = store.list_pages().await?;
    let posts = store.list_posts().await?;
    let notes = store.list_notes().await?;

    let records = search::build_records(config, &pages, &posts, &notes);
    let results = search::search(&records, params.q.as_deref().unwrap_or(""));
    Ok(Json(results))
}

/// Switch the UI theme and persist the preference
async fn set_theme(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let theme: Theme = name
        .parse()
        .map_err(|_| AppError::BadRequest("Unknown theme"))?;
    state
        .theme
        .set(theme)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(StatusCode::NO_CONTENT)
}

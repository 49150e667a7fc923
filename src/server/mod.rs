//! Blog server: generated pages, fallback rendering, load more and preview

mod fallback;

pub use fallback::{FallbackRegistry, Lookup};

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::CmsClientExt;
use crate::content::post_path;
use crate::generator::{is_not_found, post_file, Generator};
use crate::helpers::{encode_component, load_more_url};
use crate::pagination::PostList;
use crate::preview::{PreviewMode, PREVIEW_COOKIE};
use crate::Blog;

/// Server state
pub struct ServerState {
    generator: Arc<Generator>,
    public_dir: PathBuf,
    fallback: Arc<FallbackRegistry>,
}

impl ServerState {
    pub fn new(blog: &Blog, generator: Generator) -> Self {
        Self {
            generator: Arc::new(generator),
            public_dir: blog.public_dir.clone(),
            fallback: Arc::new(FallbackRegistry::from_config(&blog.config.fallback)),
        }
    }
}

/// Start the blog server
pub async fn start(blog: &Blog, generator: Generator, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(blog, generator));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// All routes of the blog
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .route("/api/posts", get(load_more_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn preview_mode(headers: &HeaderMap) -> PreviewMode {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    PreviewMode::from_cookie_header(cookie)
}

/// Home page; rendered live in preview mode
async fn home_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let preview = preview_mode(request.headers());
    if !preview.is_active() {
        return static_handler(State(state), request).await;
    }

    let generator = &state.generator;
    let rendered = match generator.first_page(&preview).await {
        Ok(list) => generator.render_home(&list, &preview),
        Err(e) => Err(e),
    };
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => cms_failure(&e),
    }
}

/// A post page: generated file, live preview, or fallback
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_valid_uid(&uid) {
        return not_found(&state);
    }

    let preview = preview_mode(&headers);
    if preview.is_active() {
        return match state.generator.render_post_on_demand(&uid, &preview).await {
            Ok(html) => Html(html).into_response(),
            Err(e) if is_not_found(&e) => not_found(&state),
            Err(e) => cms_failure(&e),
        };
    }

    let file = state.public_dir.join(post_file(&uid));
    if let Ok(html) = tokio::fs::read_to_string(&file).await {
        return Html(html).into_response();
    }

    match state.fallback.claim(&uid).await {
        Lookup::Missing => not_found(&state),
        lookup => {
            if lookup == Lookup::Started {
                tokio::spawn(fallback::resolve(
                    state.generator.clone(),
                    state.fallback.clone(),
                    uid,
                ));
            }
            match state.generator.render_loading() {
                Ok(html) => Html(html).into_response(),
                Err(e) => server_error(&e),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoadMoreParams {
    cursor: String,
}

/// Next batch of the home page listing as markup plus the following cursor
async fn load_more_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<LoadMoreParams>,
) -> Response {
    let generator = &state.generator;
    let mut list = PostList::resume(&params.cursor);

    if let Err(e) = list.load_more(generator.client()).await {
        tracing::warn!("Failed to load more posts: {}", e);
        return (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    match generator.render_post_list_fragment(list.results()) {
        Ok(html) => Json(serde_json::json!({
            "html": html,
            "next_page": list.next_page(),
            "load_more_url": list.next_page().map(load_more_url),
        }))
        .into_response(),
        Err(e) => server_error(&e),
    }
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    token: String,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

/// Enter preview mode and jump to the previewed document
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PreviewParams>,
) -> Response {
    let preview = PreviewMode::from_ref(Some(params.token.as_str()));
    if !preview.is_active() {
        return (StatusCode::BAD_REQUEST, "Missing preview token").into_response();
    }

    let mut location = "/".to_string();
    if let Some(id) = params.document_id.as_deref().filter(|id| !id.is_empty()) {
        match state.generator.client().get_by_id(id, &preview).await {
            Ok(document) => {
                if let Some(uid) = document.uid {
                    location = post_path(&uid);
                }
            }
            Err(e) => tracing::warn!("Failed to resolve preview document {}: {}", id, e),
        }
    }

    let cookie = format!(
        "{}={}; Path=/; SameSite=Lax",
        PREVIEW_COOKIE,
        encode_component(&params.token)
    );
    ([(header::SET_COOKIE, cookie)], Redirect::temporary(&location)).into_response()
}

/// Leave preview mode
async fn exit_preview_handler() -> Response {
    let cookie = format!("{}=; Path=/; Max-Age=0; SameSite=Lax", PREVIEW_COOKIE);
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

/// Serve generated files from the public directory
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn cms_failure(e: &anyhow::Error) -> Response {
    tracing::warn!("CMS request failed: {:#}", e);
    (StatusCode::BAD_GATEWAY, "CMS unavailable").into_response()
}

fn server_error(e: &anyhow::Error) -> Response {
    tracing::error!("Render failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// uids are slugs; anything else never reaches the filesystem
fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

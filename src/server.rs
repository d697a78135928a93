//! Static file server for the front-end: public assets, ES modules, JSON
//! data, and an index fallback for client-side routes.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

const INDEX: &str = "index.html";
const NO_CACHE: &str = "no-cache";
const ASSET_CACHE: &str = "public, max-age=3600";

/// Directories the server is allowed to read from.
#[derive(Debug, Clone)]
pub struct AssetRoots {
    pub public: PathBuf,
    pub src: PathBuf,
    pub data: PathBuf,
}

impl AssetRoots {
    /// `public/`, `src/` and `data/` under `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self { public: root.join("public"), src: root.join("src"), data: root.join("data") }
    }

    fn index(&self) -> PathBuf {
        self.public.join(INDEX)
    }
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("path escapes its root")]
    BadPath,

    #[error("not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServeError {
    fn from_io(e: std::io::Error) -> Self {
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => ServeError::NotFound,
            _ => ServeError::Io(e),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServeError::BadPath => (StatusCode::BAD_REQUEST, "Bad Request"),
            ServeError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            ServeError::Io(e) => {
                error!(error = %e, "Failed to read asset");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        (status, [(header::CACHE_CONTROL, NO_CACHE)], body).into_response()
    }
}

/// Content-Type by file extension, case-insensitive.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") | Some("map") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("webmanifest") => "application/manifest+json; charset=utf-8",
        Some("woff2") => "font/woff2",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// Join a decoded, root-relative path onto `base` without leaving it.
///
/// Works lexically: `.` is skipped, `..` pops a segment and fails at the root,
/// absolute paths and NUL bytes fail. An empty result (the root itself) fails too.
pub fn safe_join(base: &Path, rel: &str) -> Option<PathBuf> {
    if rel.contains('\0') {
        return None;
    }
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    let mut joined = base.to_path_buf();
    joined.extend(parts);
    Some(joined)
}

pub fn router(roots: AssetRoots) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/{*path}", get(asset))
        .with_state(Arc::new(roots))
}

async fn index(State(roots): State<Arc<AssetRoots>>) -> Result<Response, ServeError> {
    send_file(&roots.index(), true).await
}

#[instrument(level = "debug", skip(roots))]
async fn asset(State(roots): State<Arc<AssetRoots>>, UrlPath(path): UrlPath<String>) -> Result<Response, ServeError> {
    let path = path.trim_start_matches('/');
    if path == INDEX {
        return send_file(&roots.index(), true).await;
    }

    let explicit = if path.starts_with("assets/")
        || path == "manifest.webmanifest"
        || path == "favicon.ico"
        || path == "robots.txt"
    {
        Some((&roots.public, path))
    } else if let Some(rest) = path.strip_prefix("public/") {
        Some((&roots.public, rest))
    } else if let Some(rest) = path.strip_prefix("src/") {
        Some((&roots.src, rest))
    } else if let Some(rest) = path.strip_prefix("data/") {
        Some((&roots.data, rest))
    } else {
        None
    };

    if let Some((base, rel)) = explicit {
        let file = guarded(base, rel)?;
        let is_index = file == roots.index();
        return send_file(&file, is_index).await;
    }

    // Client-side route unless the file really exists under public/.
    let file = guarded(&roots.public, path)?;
    match tokio::fs::metadata(&file).await {
        Ok(meta) if meta.is_file() => {
            let is_index = file == roots.index();
            send_file(&file, is_index).await
        }
        _ => {
            debug!(path, "No such asset, serving index");
            send_file(&roots.index(), true).await
        }
    }
}

fn guarded(base: &Path, rel: &str) -> Result<PathBuf, ServeError> {
    safe_join(base, rel).ok_or_else(|| {
        warn!(base = %base.display(), path = rel, "Rejected path outside its root");
        ServeError::BadPath
    })
}

async fn send_file(file: &Path, is_index: bool) -> Result<Response, ServeError> {
    let meta = tokio::fs::metadata(file).await.map_err(ServeError::from_io)?;
    if !meta.is_file() {
        return Err(ServeError::NotFound);
    }
    let body = tokio::fs::read(file).await.map_err(ServeError::from_io)?;
    let cache = if is_index { NO_CACHE } else { ASSET_CACHE };
    debug!(file = %file.display(), bytes = body.len(), "Serving file");
    Ok(([(header::CONTENT_TYPE, content_type(file)), (header::CACHE_CONTROL, cache)], body).into_response())
}

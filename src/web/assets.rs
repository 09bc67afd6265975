//! Static dashboard files.

use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use super::{ApiError, AppState};

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "text/plain",
    }
}

/// Map a request path onto a file under `root`. `/` serves `index.html`; any path that
/// could step outside `root` is refused.
pub fn resolve(root: &Path, request_path: &str) -> Result<PathBuf, ApiError> {
    let relative = request_path.strip_prefix('/').unwrap_or(request_path);
    if relative.is_empty() {
        return Ok(root.join("index.html"));
    }

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ApiError::Forbidden("Forbidden".into()));
            }
        }
    }
    Ok(resolved)
}

/// Fallback handler for every path that is not an API route.
pub async fn serve_file(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let path = resolve(&state.web_root, uri.path())?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type(&path))],
            bytes,
        )
            .into_response()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "static file not served");
            Err(ApiError::NotFound("Not found".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_serves_index() {
        let root = Path::new("/srv/web");
        assert_eq!(resolve(root, "/").unwrap(), PathBuf::from("/srv/web/index.html"));
        assert_eq!(resolve(root, "/app.js").unwrap(), PathBuf::from("/srv/web/app.js"));
        assert_eq!(
            resolve(root, "/./css/site.css").unwrap(),
            PathBuf::from("/srv/web/css/site.css")
        );
    }

    #[test]
    fn traversal_is_forbidden() {
        let root = Path::new("/srv/web");
        for path in ["/../secret.txt", "/css/../../etc/passwd", "//etc/passwd"] {
            let err = resolve(root, path).unwrap_err();
            assert_eq!(err.status(), StatusCode::FORBIDDEN, "{path}");
        }
    }

    #[test]
    fn unknown_extensions_are_plain_text() {
        assert_eq!(content_type(Path::new("a/notes.md")), "text/plain");
        assert_eq!(content_type(Path::new("index.html")), "text/html");
    }
}

//! Static page serving for the browser front end.

use std::path::{Path, PathBuf};

use crate::core::Response;

/// Map a request path to a file under `static_dir`.
///
/// `/` and `/app` name the two pages; any other path is decoded and
/// stripped of `.`/`..` segments before joining.
pub fn resolve_static_path(static_dir: &Path, uri_path: &str) -> Option<PathBuf> {
    match uri_path {
        "/" => return Some(static_dir.join("index.html")),
        "/app" => return Some(static_dir.join("app.html")),
        _ => {}
    }

    let decoded = percent_encoding::percent_decode_str(uri_path).decode_utf8_lossy();

    let mut path = static_dir.to_path_buf();
    let mut segments = 0;
    for segment in decoded.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\0') {
            continue;
        }
        path.push(segment);
        segments += 1;
    }

    (segments > 0).then_some(path)
}

/// Read a static file; `None` when it does not exist or is not a regular file.
pub async fn serve_static(static_dir: &Path, uri_path: &str) -> Option<Response> {
    let file_path = resolve_static_path(static_dir, uri_path)?;

    let metadata = tokio::fs::metadata(&file_path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    match tokio::fs::read(&file_path).await {
        Ok(contents) => {
            let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
            let builder = if mime.essence_str() == "text/html" {
                Response::builder().html()
            } else {
                Response::builder().content_type(mime.as_ref())
            };
            Some(builder.body(contents).build())
        }
        Err(e) => {
            tracing::warn!(path = %file_path.display(), error = %e, "failed to read static file");
            None
        }
    }
}

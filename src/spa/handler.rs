//! Handler construction and response dispatch

use super::prefix::MountPrefix;
use super::resolver::ResolvedTarget;
use super::INDEX_DOCUMENT;
use crate::error::{Result, SpaError};
use crate::fs::{FileSystem, SubFs, ROOT};
use crate::http::{self, mime};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode, Uri};
use std::convert::Infallible;
use std::io;
use tracing::{debug, error, info};

/// Serves a single-page application from a filesystem sub-directory
///
/// Built once at startup and then shared (usually behind an `Arc`) by every
/// connection. Requests never mutate it.
#[derive(Debug)]
pub struct SpaHandler<F> {
    root: SubFs<F>,
    prefix: MountPrefix,
}

impl<F: FileSystem> SpaHandler<F> {
    /// Build a handler serving `sub_dir` of `fs` under `mount_prefix`
    ///
    /// Fails with [`SpaError::Configuration`] when `sub_dir` is not a
    /// directory of `fs` or has no `index.html`.
    pub async fn new(fs: F, sub_dir: &str, mount_prefix: &str) -> Result<Self> {
        let dir = normalize_sub_dir(sub_dir);
        let root = SubFs::new(fs, &dir).await.map_err(|e| {
            SpaError::Configuration(format!(
                "sub-directory '{sub_dir}' cannot be opened as a directory: {e}"
            ))
        })?;

        match root.stat(INDEX_DOCUMENT).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(SpaError::Configuration(format!(
                    "'{INDEX_DOCUMENT}' in '{sub_dir}' is not a regular file"
                )))
            }
            Err(e) => {
                return Err(SpaError::Configuration(format!(
                    "'{INDEX_DOCUMENT}' not found in '{sub_dir}': {e}"
                )))
            }
        }

        let prefix = MountPrefix::new(mount_prefix);
        info!(prefix = %prefix, root = %root.dir(), "SPA handler ready");
        Ok(Self { root, prefix })
    }

    pub const fn prefix(&self) -> &MountPrefix {
        &self.prefix
    }

    /// Content root the handler resolves against
    pub const fn root(&self) -> &SubFs<F> {
        &self.root
    }

    /// Entry point matching `hyper::service::service_fn`
    pub async fn handle<B>(
        &self,
        req: Request<B>,
    ) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
        let (parts, _) = req.into_parts();
        Ok(self.serve(&parts.method, &parts.uri).await)
    }

    /// Answer one request
    pub async fn serve(&self, method: &Method, uri: &Uri) -> Response<Full<Bytes>> {
        if let Some(resp) = check_http_method(method) {
            return resp;
        }
        let is_head = *method == Method::HEAD;

        let target = self.resolve(uri.path(), uri.query()).await;
        debug!(path = uri.path(), target = ?target, "resolved");

        match target {
            ResolvedTarget::Redirect(location) => {
                http::build_redirect_response(&location, StatusCode::MOVED_PERMANENTLY)
            }
            ResolvedTarget::ServeFile(path) | ResolvedTarget::ServeIndex(path) => {
                match self.load(&path).await {
                    Ok((served, content)) => {
                        http::build_file_response(content, &mime::content_type(served), is_head)
                    }
                    Err(err) => {
                        error!(path = uri.path(), error = %err, "failed to serve");
                        http::build_error_response(err.status_code())
                    }
                }
            }
        }
    }

    /// Read a resolved target, falling back to the root index if it vanished
    async fn load<'a>(&self, path: &'a str) -> Result<(&'a str, Bytes)> {
        match self.root.read(path).await {
            Ok(content) => Ok((path, content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound && path != INDEX_DOCUMENT => {
                debug!(path, "target disappeared, serving fallback");
                self.load_fallback().await.map(|content| (INDEX_DOCUMENT, content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found_error()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_fallback(&self) -> Result<Bytes> {
        self.root.read(INDEX_DOCUMENT).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                not_found_error()
            } else {
                e.into()
            }
        })
    }
}

fn not_found_error() -> SpaError {
    SpaError::NotFound(format!("fallback document '{INDEX_DOCUMENT}' is missing"))
}

/// Strip `./` and surrounding slashes; an empty result is the root
fn normalize_sub_dir(sub_dir: &str) -> String {
    let mut dir = sub_dir;
    while let Some(rest) = dir.strip_prefix("./") {
        dir = rest;
    }
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        ROOT.to_string()
    } else {
        dir.to_string()
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            debug!(%method, "method not allowed");
            Some(http::build_405_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use http_body_util::BodyExt;

    fn tree() -> MemoryFs {
        MemoryFs::builder()
            .file("ui/index.html", "test index")
            .file("ui/assets/style.css", "css style file")
            .file("ui/assets/app.js", "console.log(1)")
            .file("empty/readme.txt", "no index here")
            .build()
            .unwrap()
    }

    async fn body(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_normalize_sub_dir() {
        assert_eq!(normalize_sub_dir(""), ".");
        assert_eq!(normalize_sub_dir("."), ".");
        assert_eq!(normalize_sub_dir("./"), ".");
        assert_eq!(normalize_sub_dir("/"), ".");
        assert_eq!(normalize_sub_dir("./testdata/ui/"), "testdata/ui");
        assert_eq!(normalize_sub_dir("testdata/ui"), "testdata/ui");
    }

    #[tokio::test]
    async fn test_new_rejects_missing_sub_dir() {
        let err = SpaHandler::new(tree(), "dist", "/").await.unwrap_err();
        assert!(matches!(err, SpaError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn test_new_rejects_file_as_sub_dir() {
        let err = SpaHandler::new(tree(), "ui/index.html", "/")
            .await
            .unwrap_err();
        assert!(matches!(err, SpaError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn test_new_requires_root_index() {
        let err = SpaHandler::new(tree(), "empty", "/").await.unwrap_err();
        assert!(matches!(err, SpaError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn test_serves_file_with_content_type() {
        let h = SpaHandler::new(tree(), "ui", "").await.unwrap();
        let resp = h
            .serve(&Method::GET, &Uri::from_static("/assets/style.css"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/css; charset=utf-8");
        assert_eq!(resp.headers()["content-length"], "14");
        assert_eq!(body(resp).await, "css style file");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let h = SpaHandler::new(tree(), "ui", "").await.unwrap();
        let resp = h.serve(&Method::HEAD, &Uri::from_static("/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "10");
        assert_eq!(body(resp).await, "");
    }

    #[tokio::test]
    async fn test_rejects_other_methods() {
        let h = SpaHandler::new(tree(), "ui", "").await.unwrap();
        let resp = h.serve(&Method::POST, &Uri::from_static("/")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");

        let resp = h.serve(&Method::OPTIONS, &Uri::from_static("/")).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_handle_wraps_serve() {
        let h = SpaHandler::new(tree(), "ui", "/app").await.unwrap();
        let req = Request::get("/app/fruit/banana").body(()).unwrap();
        let resp = h.handle(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "test index");
    }
}

//! Request path resolution
//!
//! Maps a request path onto the content root and decides what to answer with.
//! Resolution only reads the filesystem, so it can run for any number of
//! requests at once.

use super::handler::SpaHandler;
use super::prefix::MountPrefix;
use super::INDEX_DOCUMENT;
use crate::fs::{self, FileSystem, ROOT};
use std::io;
use tracing::debug;

/// Outcome of resolving one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Serve the file at this path
    ServeFile(String),
    /// Serve this `index.html`, either of the requested directory or the root fallback
    ServeIndex(String),
    /// Redirect permanently to this location
    Redirect(String),
}

impl ResolvedTarget {
    /// The root `index.html` every unmatched path falls back to
    pub fn fallback() -> Self {
        Self::ServeIndex(INDEX_DOCUMENT.to_string())
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::ServeIndex(path) if path == INDEX_DOCUMENT)
    }
}

/// Request path mapped onto the content root
#[derive(Debug, PartialEq, Eq)]
pub(super) struct FsPath {
    pub path: String,
    /// The decoded request path ended with `/`
    pub trailing_slash: bool,
}

/// Turn the path left after prefix stripping into a filesystem path
///
/// Returns `None` when the path cannot name a node (bad percent-encoding,
/// empty or dot segments). `/` maps to the root. The trailing slash is read
/// after decoding, so `docs%2F` is the same as `docs/`.
pub(super) fn to_fs_path(rest: &str) -> Option<FsPath> {
    let decoded = urlencoding::decode(rest).ok()?;
    let trimmed = decoded.trim_start_matches('/');
    let (trimmed, trailing_slash) = match trimmed.strip_suffix('/') {
        Some(dir) => (dir, true),
        None => (trimmed, decoded.ends_with('/')),
    };
    if trimmed.is_empty() {
        return Some(FsPath {
            path: ROOT.to_string(),
            trailing_slash,
        });
    }
    fs::valid_path(trimmed).then(|| FsPath {
        path: trimmed.to_string(),
        trailing_slash,
    })
}

impl<F: FileSystem> SpaHandler<F> {
    /// Decide what to answer for a request path
    ///
    /// `path` is the full request path, mount prefix included. `query` is kept
    /// on redirects.
    pub async fn resolve(&self, path: &str, query: Option<&str>) -> ResolvedTarget {
        let rest = self.prefix().strip(path);

        let Some(FsPath {
            path: fs_path,
            trailing_slash,
        }) = to_fs_path(&rest)
        else {
            debug!(path, "unresolvable path, serving fallback");
            return ResolvedTarget::fallback();
        };

        match self.root().stat(&fs_path).await {
            Ok(meta) if meta.is_dir() => self.resolve_dir(fs_path, trailing_slash, query).await,
            Ok(_) if !trailing_slash => ResolvedTarget::ServeFile(fs_path),
            // A file addressed like a directory does not exist
            Ok(_) => ResolvedTarget::fallback(),
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!(path, error = %err, "stat failed, serving fallback");
                }
                ResolvedTarget::fallback()
            }
        }
    }

    async fn resolve_dir(
        &self,
        dir: String,
        trailing_slash: bool,
        query: Option<&str>,
    ) -> ResolvedTarget {
        let index = fs::join(&dir, INDEX_DOCUMENT);
        match self.root().stat(&index).await {
            Ok(meta) if meta.is_file() => {
                if trailing_slash || dir == ROOT {
                    ResolvedTarget::ServeIndex(index)
                } else {
                    ResolvedTarget::Redirect(redirect_location(self.prefix(), &dir, query))
                }
            }
            // A directory without its own index is treated as unresolved
            _ => ResolvedTarget::fallback(),
        }
    }
}

/// Location for the canonical trailing-slash form of a directory URL
///
/// Built from the mount prefix and the resolved directory, so the result is
/// always an absolute path on the same host.
fn redirect_location(prefix: &MountPrefix, dir: &str, query: Option<&str>) -> String {
    let encoded: Vec<_> = dir.split('/').map(urlencoding::encode).collect();
    let mut location = format!("{}/{}/", prefix.as_str(), encoded.join("/"));
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(q);
    }
    location
}

//! Read-only filesystem abstraction
//!
//! The SPA handler only talks to [`FileSystem`]. Backends:
//! - [`DiskFs`]: a directory on the local disk
//! - [`MemoryFs`]: an immutable in-memory tree, also used for `rust-embed` bundles
//! - [`SubFs`]: any backend re-rooted at one of its sub-directories
//!
//! Paths are unrooted and slash-separated. `.` names the root, e.g.
//! `assets/style.css`. See [`valid_path`] for the exact rules.

mod disk;
mod memory;
mod sub;

pub use disk::DiskFs;
pub use memory::{MemoryFs, MemoryFsBuilder};
pub use sub::SubFs;

use async_trait::async_trait;
use hyper::body::Bytes;
use std::io;
use std::sync::Arc;

/// Path of the root directory
pub const ROOT: &str = ".";

/// Kind of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeKind {
    File,
    Dir,
}

/// Result of a `stat` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub kind: NodeKind,
    /// Size in bytes, 0 for directories
    pub len: u64,
}

impl Metadata {
    pub const fn file(len: u64) -> Self {
        Self {
            kind: NodeKind::File,
            len,
        }
    }

    pub const fn dir() -> Self {
        Self {
            kind: NodeKind::Dir,
            len: 0,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }
}

/// Entry returned by `read_dir`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

/// Read-only tree of files and directories
///
/// Implementations must allow concurrent calls from many tasks without
/// external locking.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Look up a node by path
    async fn stat(&self, path: &str) -> io::Result<Metadata>;

    /// Read the full contents of a file
    async fn read(&self, path: &str) -> io::Result<Bytes>;

    /// List a directory, sorted by name
    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>>;
}

#[async_trait]
impl<F: FileSystem + ?Sized> FileSystem for Arc<F> {
    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        (**self).stat(path).await
    }

    async fn read(&self, path: &str) -> io::Result<Bytes> {
        (**self).read(path).await
    }

    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        (**self).read_dir(path).await
    }
}

/// Check whether `path` is a valid filesystem path
///
/// `.` is the root. Otherwise the path must not start or end with `/`, and
/// every element must be non-empty, not `.` or `..`, and free of `\`.
///
/// # Examples
/// ```
/// use spa_server::fs::valid_path;
/// assert!(valid_path("."));
/// assert!(valid_path("assets/style.css"));
/// assert!(!valid_path("/assets"));
/// assert!(!valid_path("assets/../secret"));
/// ```
pub fn valid_path(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    !path.is_empty()
        && path
            .split('/')
            .all(|elem| !elem.is_empty() && elem != "." && elem != ".." && !elem.contains('\\'))
}

/// Join a directory path and a relative path
pub fn join(dir: &str, name: &str) -> String {
    match (dir, name) {
        (ROOT, name) => name.to_string(),
        (dir, ROOT) => dir.to_string(),
        (dir, name) => format!("{dir}/{name}"),
    }
}

/// Parent directory of a path, `.` for top-level entries
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or(ROOT, |(parent, _)| parent)
}

/// Build the error returned for paths rejected by [`valid_path`]
pub(crate) fn invalid_path(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid path '{path}'"),
    )
}

pub(crate) fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("'{path}' does not exist"))
}

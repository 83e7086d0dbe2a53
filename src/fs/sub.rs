//! Re-rooting wrapper

use super::{invalid_path, join, valid_path, DirEntry, FileSystem, Metadata};
use async_trait::async_trait;
use hyper::body::Bytes;
use std::io;

/// View of a sub-directory of another filesystem
///
/// Paths passed to a `SubFs` are relative to `dir`, so `index.html` on a
/// `SubFs` rooted at `ui` reads `ui/index.html` from the inner filesystem.
#[derive(Debug, Clone)]
pub struct SubFs<F> {
    inner: F,
    dir: String,
}

impl<F: FileSystem> SubFs<F> {
    /// Re-root `inner` at `dir`, which must be an existing directory
    pub async fn new(inner: F, dir: &str) -> io::Result<Self> {
        if !valid_path(dir) {
            return Err(invalid_path(dir));
        }
        let meta = inner.stat(dir).await?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{dir}' is not a directory"),
            ));
        }
        Ok(Self {
            inner,
            dir: dir.to_string(),
        })
    }

    /// Sub-directory this view is rooted at
    pub fn dir(&self) -> &str {
        &self.dir
    }

    fn full_path(&self, path: &str) -> io::Result<String> {
        if valid_path(path) {
            Ok(join(&self.dir, path))
        } else {
            Err(invalid_path(path))
        }
    }
}

#[async_trait]
impl<F: FileSystem> FileSystem for SubFs<F> {
    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        self.inner.stat(&self.full_path(path)?).await
    }

    async fn read(&self, path: &str) -> io::Result<Bytes> {
        self.inner.read(&self.full_path(path)?).await
    }

    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        self.inner.read_dir(&self.full_path(path)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;

    fn tree() -> MemoryFs {
        MemoryFs::builder()
            .file("testdata/ui/index.html", "test index")
            .file("testdata/ui/assets/style.css", "css style file")
            .file("secret.txt", "outside")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_reroots_paths() {
        let sub = SubFs::new(tree(), "testdata/ui").await.unwrap();
        assert_eq!(sub.dir(), "testdata/ui");
        assert!(sub.stat(".").await.unwrap().is_dir());
        assert_eq!(sub.read("index.html").await.unwrap(), "test index");
        assert_eq!(
            sub.read("assets/style.css").await.unwrap(),
            "css style file"
        );
    }

    #[tokio::test]
    async fn test_cannot_escape_root() {
        let sub = SubFs::new(tree(), "testdata/ui").await.unwrap();
        let err = sub.read("../../secret.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_root_sub_is_identity() {
        let sub = SubFs::new(tree(), ".").await.unwrap();
        assert_eq!(sub.read("secret.txt").await.unwrap(), "outside");
    }

    #[tokio::test]
    async fn test_rejects_missing_or_file_dir() {
        let err = SubFs::new(tree(), "nope").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        let err = SubFs::new(tree(), "secret.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = SubFs::new(tree(), "/testdata").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}

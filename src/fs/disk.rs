//! Local disk backend

use super::{invalid_path, valid_path, DirEntry, FileSystem, Metadata, NodeKind, ROOT};
use async_trait::async_trait;
use hyper::body::Bytes;
use std::io;
use std::path::PathBuf;
use tokio::fs;

/// Directory tree on the local disk. Symlinks are followed.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a slash path onto a native path below the root
    fn native_path(&self, path: &str) -> io::Result<PathBuf> {
        if !valid_path(path) {
            return Err(invalid_path(path));
        }
        if path == ROOT {
            return Ok(self.root.clone());
        }
        Ok(path
            .split('/')
            .fold(self.root.clone(), |acc, elem| acc.join(elem)))
    }
}

#[async_trait]
impl FileSystem for DiskFs {
    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        let meta = fs::metadata(self.native_path(path)?).await?;
        if meta.is_dir() {
            Ok(Metadata::dir())
        } else {
            Ok(Metadata::file(meta.len()))
        }
    }

    async fn read(&self, path: &str) -> io::Result<Bytes> {
        let native = self.native_path(path)?;
        if fs::metadata(&native).await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{path}' is a directory"),
            ));
        }
        fs::read(native).await.map(Bytes::from)
    }

    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let mut dir = fs::read_dir(self.native_path(path)?).await?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            // Non UTF-8 names cannot be addressed through slash paths
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            // metadata() follows symlinks, file_type() does not
            let kind = if fs::metadata(entry.path()).await?.is_dir() {
                NodeKind::Dir
            } else {
                NodeKind::File
            };
            entries.push(DirEntry { name, kind });
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, DiskFs) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "test index").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/style.css"), "css style file").unwrap();
        let fs = DiskFs::new(dir.path());
        (dir, fs)
    }

    #[tokio::test]
    async fn test_stat() {
        let (_dir, fs) = fixture();
        assert!(fs.stat(".").await.unwrap().is_dir());
        assert!(fs.stat("assets").await.unwrap().is_dir());
        let meta = fs.stat("assets/style.css").await.unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len, 14);
        let err = fs.stat("missing").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read() {
        let (_dir, fs) = fixture();
        assert_eq!(fs.read("index.html").await.unwrap(), "test index");
        assert!(fs.read("assets").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_invalid_paths() {
        let (_dir, fs) = fixture();
        let err = fs.stat("../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = fs.read("/index.html").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_read_dir() {
        let (_dir, fs) = fixture();
        let entries = fs.read_dir(".").await.unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry {
                    name: "assets".to_string(),
                    kind: NodeKind::Dir
                },
                DirEntry {
                    name: "index.html".to_string(),
                    kind: NodeKind::File
                },
            ]
        );
    }
}

//! In-memory backend
//!
//! Holds every file in a map keyed by slash path. Directories are implicit:
//! each ancestor of a file is a directory and the root always exists.

use super::{
    invalid_path, not_found, parent, valid_path, DirEntry, FileSystem, Metadata, NodeKind, ROOT,
};
use async_trait::async_trait;
use hyper::body::Bytes;
use rust_embed::RustEmbed;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

/// Immutable in-memory tree
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<String, Bytes>,
    dirs: BTreeSet<String>,
}

/// Collects files for a [`MemoryFs`]
#[derive(Debug, Default)]
pub struct MemoryFsBuilder {
    files: BTreeMap<String, Bytes>,
}

impl MemoryFsBuilder {
    /// Add a file. A later call with the same path replaces the contents.
    #[must_use]
    pub fn file(mut self, path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Validate paths and derive the directory set
    pub fn build(self) -> io::Result<MemoryFs> {
        let mut dirs = BTreeSet::from([ROOT.to_string()]);
        for path in self.files.keys() {
            if path == ROOT || !valid_path(path) {
                return Err(invalid_path(path));
            }
            let mut dir = parent(path);
            while dir != ROOT {
                dirs.insert(dir.to_string());
                dir = parent(dir);
            }
        }
        if let Some(conflict) = dirs.iter().find(|d| self.files.contains_key(*d)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{conflict}' is used both as a file and a directory"),
            ));
        }
        Ok(MemoryFs {
            files: self.files,
            dirs,
        })
    }
}

impl MemoryFs {
    pub fn builder() -> MemoryFsBuilder {
        MemoryFsBuilder::default()
    }

    /// Load every file of a `rust-embed` bundle
    pub fn from_embed<E: RustEmbed>() -> io::Result<Self> {
        E::iter()
            .filter_map(|name| E::get(&name).map(|file| (name, file)))
            .fold(Self::builder(), |builder, (name, file)| {
                builder.file(name.into_owned(), Bytes::from(file.data.into_owned()))
            })
            .build()
    }

    fn check(path: &str) -> io::Result<()> {
        if valid_path(path) {
            Ok(())
        } else {
            Err(invalid_path(path))
        }
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        Self::check(path)?;
        if let Some(contents) = self.files.get(path) {
            return Ok(Metadata::file(contents.len() as u64));
        }
        if self.dirs.contains(path) {
            return Ok(Metadata::dir());
        }
        Err(not_found(path))
    }

    async fn read(&self, path: &str) -> io::Result<Bytes> {
        Self::check(path)?;
        if let Some(contents) = self.files.get(path) {
            // Bytes clones share the same buffer
            return Ok(contents.clone());
        }
        if self.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{path}' is a directory"),
            ));
        }
        Err(not_found(path))
    }

    async fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        Self::check(path)?;
        if !self.dirs.contains(path) {
            return Err(not_found(path));
        }
        let child_name = |child: &str| -> Option<String> {
            if child == ROOT || parent(child) != path {
                return None;
            }
            child.rsplit('/').next().map(ToString::to_string)
        };
        let mut entries: Vec<DirEntry> = self
            .dirs
            .iter()
            .filter_map(|d| {
                child_name(d.as_str()).map(|name| DirEntry {
                    name,
                    kind: NodeKind::Dir,
                })
            })
            .chain(self.files.keys().filter_map(|f| {
                child_name(f.as_str()).map(|name| DirEntry {
                    name,
                    kind: NodeKind::File,
                })
            }))
            .collect();
        entries.sort();
        Ok(entries)
    }
}

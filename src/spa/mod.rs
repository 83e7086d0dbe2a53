//! Single-page application handler
//!
//! Serves a front-end bundle from a [`FileSystem`](crate::fs::FileSystem):
//! existing files are served as-is, directory URLs are canonicalized with a
//! trailing slash, and every other path gets the root `index.html` so the
//! client-side router can take over.

mod handler;
mod prefix;
mod resolver;

pub use handler::SpaHandler;
pub use prefix::MountPrefix;
pub use resolver::ResolvedTarget;

/// Document served for directories and as the fallback for unmatched paths
pub const INDEX_DOCUMENT: &str = "index.html";

//! Single-page application static server
//!
//! Serves a front-end bundle under a URL prefix. Existing files are served
//! directly, directory URLs are canonicalized, and every other path falls back
//! to the root `index.html` so the client-side router can handle it.
//!
//! The handler works over any [`fs::FileSystem`]: a directory on disk, an
//! in-memory tree, or assets embedded into the binary.

pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod logger;
pub mod server;
pub mod spa;

pub use error::{Result, SpaError};
pub use spa::SpaHandler;

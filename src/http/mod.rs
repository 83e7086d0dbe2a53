//! HTTP protocol layer module
//!
//! Response builders and content type detection used by the SPA handler,
//! decoupled from path resolution.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_500_response, build_error_response,
    build_file_response, build_options_response, build_redirect_response,
};

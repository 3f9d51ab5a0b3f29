//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality shared by the
//! dispatcher's synthetic responses and the static-asset backend.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_400_response, build_404_response, build_405_response,
    build_416_response, build_502_response, build_504_response, build_api_not_found_response,
    build_health_response, build_options_response, build_version_response,
};

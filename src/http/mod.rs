//! HTTP protocol layer module
//!
//! Response builders, query string extraction and body collection, kept free
//! of account-specific logic.

pub mod body;
pub mod query;
pub mod response;

// Re-export commonly used items
pub use body::{read_body, BodyError};
pub use response::{
    build_400_response, build_404_response, build_405_response, build_408_response,
    build_413_response, build_empty_response, build_json_response, set_server_header,
};

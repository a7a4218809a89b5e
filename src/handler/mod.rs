//! Request handler module
//!
//! Dispatches requests on the accounts collection to the create, read and
//! delete handlers and maps their failures to responses.

pub mod accounts;
pub mod error;
pub mod router;

// Re-export main entry point
pub use router::handle_request;

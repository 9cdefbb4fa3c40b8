//! Web handlers module
//!
//! HTTP request handlers organized by resource. Each one extracts its input,
//! calls a service and renders the result through [`crate::web::responses`].

pub mod domains;
pub mod endpoints;
pub mod health;
pub mod lines;
pub mod providers;
pub mod stats;
pub mod stream_paths;
pub mod streams;

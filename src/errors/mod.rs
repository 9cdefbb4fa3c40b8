//! Centralized error handling
//!
//! Application errors are layered the same way the code is:
//!
//! - **Repository Errors**: database access, constraint violations, missing rows
//! - **Probe Errors**: live stream probing (see [`crate::services::stream_prober`])
//! - **Application Errors**: what services return and the web layer renders
//!
//! # Usage
//!
//! ```rust
//! use stream_endpoint_manager::errors::{AppError, AppResult};
//!
//! fn example_function(status: i32) -> AppResult<i32> {
//!     if status != 0 && status != 1 {
//!         return Err(AppError::validation("status must be 0 or 1"));
//!     }
//!     Ok(status)
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

//! Store abstractions used by the endpoint engine
//!
//! The regeneration controller and the endpoint service never talk to the
//! database directly. They depend on the two traits defined here, which the
//! SeaORM repositories in [`crate::database::repositories`] implement and the
//! unit tests replace with mocks.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stream_endpoint_manager::repositories::{BaseEntityStore, EndpointStore};
//!
//! async fn count_lines(store: &dyn BaseEntityStore) -> usize {
//!     store.list_lines().await.map(|lines| lines.len()).unwrap_or_default()
//! }
//! ```

pub mod traits;

pub use traits::*;

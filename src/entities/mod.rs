//! SeaORM entities for the catalog and the derived endpoint table

pub mod prelude;

pub mod domains;
pub mod endpoints;
pub mod lines;
pub mod providers;
pub mod stream_paths;
pub mod streams;

//! Employee directory core: ingestion, the in-memory snapshot store and
//! the queries served from it.

pub mod index;
pub mod loader;
pub mod mapper;
pub mod query;
pub mod store;

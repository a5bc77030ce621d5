//! Functional core for paged query caching.
//!
//! Pure types and transitions shared by the cache, the query controller, and
//! fetcher implementations. Nothing in this crate performs I/O or reads a clock.

pub mod cache;
pub mod query;

//! In-memory paged result cache.
//!
//! The store is a plain single-owner data structure: callers that share it
//! across tasks wrap it in their own lock, the way [`QueryController`] does.
//!
//! [`QueryController`]: crate::controller::QueryController

mod memory;

pub use memory::{CacheEntry, PagedResultCache};

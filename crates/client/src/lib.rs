//! pagedquery_client - HTTP page fetcher for pagedquery.

pub mod error;
pub mod fetcher;

pub use error::{ClientError, Result};
pub use fetcher::HttpPageFetcher;

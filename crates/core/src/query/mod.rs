mod error;
mod params;
mod state;
mod traits;
mod types;

pub use error::{FetchError, FetchResult};
pub use params::{dependency_key, FetchParams, DEPENDENCY_KEY_PREFIX};
pub use state::{owner_id_from_value, QueryState, DEFAULT_SORT_FIELD};
pub use traits::{fetch_fn, FetchFn, PageFetcher};
pub use types::{PaginatedResponse, Pagination, SortDirection};

use std::future::Future;

use async_trait::async_trait;

use super::{FetchParams, FetchResult, PaginatedResponse};

/// Source of paginated data behind a query controller.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetches one page for the given parameters.
    async fn fetch(&self, params: FetchParams) -> FetchResult<PaginatedResponse<T>>;
}

/// Adapts an async closure into a [`PageFetcher`].
///
/// # Examples
///
/// ```
/// use pagedquery_core::query::{fetch_fn, FetchError, FetchParams, PageFetcher, PaginatedResponse};
///
/// let fetcher = fetch_fn(|params: FetchParams| async move {
///     Ok::<_, FetchError>(PaginatedResponse::new(vec![params.page], 1, 1))
/// });
/// # let _: &dyn PageFetcher<u32> = &fetcher;
/// ```
pub struct FetchFn<F>(F);

/// Wraps `f` so it can be used wherever a [`PageFetcher`] is expected.
pub fn fetch_fn<F>(f: F) -> FetchFn<F> {
    FetchFn(f)
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FetchFn<F>
where
    T: Send + 'static,
    F: Fn(FetchParams) -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<PaginatedResponse<T>>> + Send,
{
    async fn fetch(&self, params: FetchParams) -> FetchResult<PaginatedResponse<T>> {
        (self.0)(params).await
    }
}

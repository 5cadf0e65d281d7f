use crate::error::ApiError;
use crate::search::page::ListResponse;
use async_trait::async_trait;

/// Query parameters in endpoint names, in the order they are sent
pub type QueryParams = Vec<(&'static str, String)>;

/// Client-side state that can be turned into one page request
pub trait ListQuery: Clone + Send + Sync + 'static {
    fn page(&self) -> u32;

    /// Move to `page`; values below 1 become 1
    fn set_page(&mut self, page: u32);

    /// Full parameter set for a request, including `page` and `page_size`
    fn to_params(&self, page_size: u32) -> QueryParams;
}

/// Common trait for every paginated listing endpoint.
/// The search view, the dashboard tabs and test doubles all plug in here.
#[async_trait]
pub trait ListSource<T: Send>: Send + Sync {
    /// Fetch one page of records
    async fn fetch(&self, params: &QueryParams) -> Result<ListResponse<T>, ApiError>;

    /// Get the name of the source, for logs
    fn source_name(&self) -> &'static str;
}

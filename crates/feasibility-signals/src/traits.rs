use async_trait::async_trait;
use feasibility_core::{PricePoint, Snippet};

use crate::error::ProviderError;
use crate::types::{MarketSeriesRequest, NewsRequest};

/// Raw price history for an industry proxy. An empty vector is a valid
/// answer meaning "no data".
#[async_trait]
pub trait MarketSeriesFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_series(
        &self,
        request: MarketSeriesRequest,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}

/// Headline and summary snippets about an industry, newest first or in any
/// order the provider returns them.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_news(&self, request: NewsRequest) -> Result<Vec<Snippet>, ProviderError>;
}

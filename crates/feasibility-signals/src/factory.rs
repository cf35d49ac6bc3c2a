use std::sync::Arc;

use crate::config::{MarketDataConfig, NewsConfig};
use crate::error::ProviderError;
use crate::providers::{NewsApiFetcher, YahooChartFetcher};
use crate::traits::{MarketSeriesFetcher, NewsFetcher};

pub fn build_market_fetcher(
    cfg: MarketDataConfig,
) -> Result<Arc<dyn MarketSeriesFetcher>, ProviderError> {
    match cfg {
        MarketDataConfig::YahooChart(c) => Ok(Arc::new(YahooChartFetcher::new(c)?)),
    }
}

pub fn build_news_fetcher(cfg: NewsConfig) -> Result<Arc<dyn NewsFetcher>, ProviderError> {
    match cfg {
        NewsConfig::NewsApi(c) => Ok(Arc::new(NewsApiFetcher::new(c)?)),
    }
}

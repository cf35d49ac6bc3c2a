//! Orchestration over the feasibility scorer: gathers raw market and news
//! signals with bounded, time-limited fetches and exposes single, batch,
//! ranking and recommendation entry points.

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{BatchRow, EngineBuilder, EngineInfo, FeasibilityEngine, Recommendation};
pub use error::EngineError;

pub use feasibility_core::*;
pub use feasibility_ideas::{
    build_idea_source, DeterministicStub, GeneratedIdea, IdeaGenerationRequest, IdeaSource,
    IdeaSourceConfig, OpenAiChatConfig, ProviderError as IdeaProviderError, DEFAULT_CHAT_MODEL,
};
pub use feasibility_signals::{
    build_market_fetcher, build_news_fetcher, industry_proxy, LexiconPolarity, MarketDataConfig,
    MarketSeriesFetcher, MarketSeriesRequest, MarketWindow, NewsApiConfig, NewsConfig,
    NewsFetcher, NewsRequest, ProviderError as SignalProviderError, YahooChartConfig,
};

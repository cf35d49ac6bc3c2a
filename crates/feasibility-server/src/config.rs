use std::time::Duration;

use feasibility_engine::{
    build_idea_source, build_market_fetcher, build_news_fetcher, EngineConfig, EngineError,
    FeasibilityEngine, IdeaSourceConfig, MarketDataConfig, MarketWindow, NewsApiConfig,
    NewsConfig, OpenAiChatConfig, SignalName, YahooChartConfig, DEFAULT_CHAT_MODEL,
};
use tracing::warn;

/// Everything `feasibilityd` needs to build its engine. Environment
/// variables are read here and nowhere else.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub engine: EngineConfig,
    pub market: Option<MarketDataConfig>,
    pub news: Option<NewsConfig>,
    pub ideas: IdeaSourceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::offline()
    }
}

impl ServerConfig {
    /// No network collaborators: market and news signals stay unavailable
    /// unless supplied, and ideas come from the deterministic stub.
    pub fn offline() -> Self {
        Self {
            engine: EngineConfig::default(),
            market: None,
            news: None,
            ideas: IdeaSourceConfig::Stub,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();
        let mut engine = EngineConfig {
            fetch_timeout: Duration::from_millis(env_u64(
                &lookup,
                "FEASIBILITY_FETCH_TIMEOUT_MS",
                5_000,
                50,
                120_000,
            )),
            max_concurrency: env_usize(&lookup, "FEASIBILITY_MAX_CONCURRENCY", 4, 1, 64),
            news_limit: env_usize(&lookup, "FEASIBILITY_NEWS_LIMIT", 20, 1, 100),
            market_window: env_string(&lookup, "FEASIBILITY_MARKET_WINDOW")
                .and_then(|raw| {
                    let parsed = MarketWindow::parse(&raw);
                    if parsed.is_none() {
                        warn!(value = %raw, "unknown FEASIBILITY_MARKET_WINDOW, using default");
                    }
                    parsed
                })
                .unwrap_or(defaults.market_window),
            scoring: defaults.scoring,
        };
        for name in SignalName::ALL {
            let var = format!("FEASIBILITY_WEIGHT_{}", name.as_str().to_ascii_uppercase());
            let default = engine.scoring.weights.weight(name);
            engine
                .scoring
                .weights
                .set(name, env_f64(&lookup, &var, default, 0.0, 10.0));
        }

        let market = match env_string(&lookup, "FEASIBILITY_MARKET_PROVIDER")
            .unwrap_or_else(|| "yahoo".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "none" | "off" | "disabled" => None,
            other => {
                if other != "yahoo" {
                    warn!(provider = other, "unknown market provider, using yahoo");
                }
                let mut cfg = YahooChartConfig::new();
                if let Some(url) = env_string(&lookup, "FEASIBILITY_YAHOO_BASE_URL") {
                    cfg.base_url = url;
                }
                cfg.timeout = engine.fetch_timeout;
                Some(MarketDataConfig::YahooChart(cfg))
            }
        };

        let news = env_string(&lookup, "NEWS_API_KEY").map(|key| {
            let mut cfg = NewsApiConfig::new(key);
            if let Some(url) = env_string(&lookup, "FEASIBILITY_NEWS_BASE_URL") {
                cfg.base_url = url;
            }
            cfg.timeout = engine.fetch_timeout;
            cfg.page_size = engine.news_limit;
            NewsConfig::NewsApi(cfg)
        });

        let openai_key = env_string(&lookup, "OPENAI_API_KEY");
        let source = env_string(&lookup, "FEASIBILITY_IDEA_SOURCE").map(|s| s.to_ascii_lowercase());
        let ideas = match (source.as_deref(), openai_key) {
            (Some("stub"), _) | (None, None) => IdeaSourceConfig::Stub,
            (_, key) => {
                let model = env_string(&lookup, "FEASIBILITY_OPENAI_MODEL")
                    .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
                let mut cfg = OpenAiChatConfig::new(key.unwrap_or_default(), model);
                if let Some(url) = env_string(&lookup, "OPENAI_BASE_URL") {
                    cfg.base_url = url;
                }
                IdeaSourceConfig::OpenAiChat(cfg)
            }
        };

        Self {
            engine,
            market,
            news,
            ideas,
        }
    }

    pub fn build_engine(&self) -> Result<FeasibilityEngine, EngineError> {
        let mut builder = FeasibilityEngine::builder(self.engine.clone())
            .idea_source(build_idea_source(self.ideas.clone())?);
        if let Some(cfg) = &self.market {
            builder = builder.market_fetcher(build_market_fetcher(cfg.clone())?);
        }
        if let Some(cfg) = &self.news {
            builder = builder.news_fetcher(build_news_fetcher(cfg.clone())?);
        }
        builder.build()
    }
}

fn env_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_usize<F>(lookup: &F, name: &str, default: usize, min: usize, max: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    env_string(lookup, name)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

fn env_u64<F>(lookup: &F, name: &str, default: u64, min: u64, max: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    env_string(lookup, name)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

fn env_f64<F>(lookup: &F, name: &str, default: f64, min: f64, max: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    env_string(lookup, name)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
        .clamp(min, max)
}

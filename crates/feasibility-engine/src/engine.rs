use std::collections::HashMap;
use std::sync::Arc;

use feasibility_core::{
    normalize_industry, rank_outcomes, CompetitionTable, CoreError, FeasibilityAssessment,
    FeasibilityScorer, IdeaContext, IdeaRequest, MarketSeries, RankedIdea, SentimentInput,
    SignalBundle, StaticCompetitionTable, TextPolarity,
};
use feasibility_ideas::{DeterministicStub, GeneratedIdea, IdeaGenerationRequest, IdeaSource};
use feasibility_signals::{
    LexiconPolarity, MarketSeriesFetcher, MarketSeriesRequest, NewsFetcher, NewsRequest,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Names of the collaborators wired into an engine, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    pub market_provider: Option<&'static str>,
    pub news_provider: Option<&'static str>,
    pub idea_source: &'static str,
    pub polarity_model: &'static str,
    pub competition_table: &'static str,
    pub fetch_timeout_ms: u64,
    pub max_concurrency: usize,
}

/// One input row of a batch. `Rejected` rows failed before reaching the
/// scorer, e.g. while decoding caller arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchRow {
    Request(IdeaRequest),
    Rejected { idea_text: String, error: CoreError },
}

impl BatchRow {
    pub const fn request(&self) -> Option<&IdeaRequest> {
        match self {
            Self::Request(request) => Some(request),
            Self::Rejected { .. } => None,
        }
    }
}

/// Output of a generate-then-rank call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub source: &'static str,
    pub generated: Vec<GeneratedIdea>,
    pub ranked: Vec<RankedIdea>,
}

pub struct EngineBuilder {
    config: EngineConfig,
    market: Option<Arc<dyn MarketSeriesFetcher>>,
    news: Option<Arc<dyn NewsFetcher>>,
    ideas: Option<Arc<dyn IdeaSource>>,
    polarity: Option<Arc<dyn TextPolarity>>,
    competition: Option<Arc<dyn CompetitionTable>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn market_fetcher(mut self, fetcher: Arc<dyn MarketSeriesFetcher>) -> Self {
        self.market = Some(fetcher);
        self
    }

    #[must_use]
    pub fn news_fetcher(mut self, fetcher: Arc<dyn NewsFetcher>) -> Self {
        self.news = Some(fetcher);
        self
    }

    #[must_use]
    pub fn idea_source(mut self, source: Arc<dyn IdeaSource>) -> Self {
        self.ideas = Some(source);
        self
    }

    #[must_use]
    pub fn polarity(mut self, model: Arc<dyn TextPolarity>) -> Self {
        self.polarity = Some(model);
        self
    }

    #[must_use]
    pub fn competition_table(mut self, table: Arc<dyn CompetitionTable>) -> Self {
        self.competition = Some(table);
        self
    }

    pub fn build(self) -> Result<FeasibilityEngine, EngineError> {
        self.config.validate()?;
        let polarity = self
            .polarity
            .unwrap_or_else(|| Arc::new(LexiconPolarity::new()));
        let competition = self
            .competition
            .unwrap_or_else(|| Arc::new(StaticCompetitionTable));
        let ideas = self.ideas.unwrap_or_else(|| Arc::new(DeterministicStub));

        let info = EngineInfo {
            market_provider: self.market.as_ref().map(|m| m.name()),
            news_provider: self.news.as_ref().map(|n| n.name()),
            idea_source: ideas.name(),
            polarity_model: polarity.name(),
            competition_table: competition.name(),
            fetch_timeout_ms: u64::try_from(self.config.fetch_timeout.as_millis())
                .unwrap_or(u64::MAX),
            max_concurrency: self.config.max_concurrency,
        };
        let scorer = FeasibilityScorer::new(self.config.scoring, polarity, competition)?;
        info!(
            market = ?info.market_provider,
            news = ?info.news_provider,
            ideas = info.idea_source,
            "feasibility engine ready"
        );

        Ok(FeasibilityEngine {
            config: self.config,
            scorer,
            market: self.market,
            news: self.news,
            ideas,
            info,
        })
    }
}

/// Async facade over the synchronous scorer. Fetches raw signals through the
/// configured collaborators, never holds state between calls, and degrades a
/// failed or slow fetch to an unavailable sub-score.
pub struct FeasibilityEngine {
    config: EngineConfig,
    scorer: FeasibilityScorer,
    market: Option<Arc<dyn MarketSeriesFetcher>>,
    news: Option<Arc<dyn NewsFetcher>>,
    ideas: Arc<dyn IdeaSource>,
    info: EngineInfo,
}

impl FeasibilityEngine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder {
            config,
            market: None,
            news: None,
            ideas: None,
            polarity: None,
            competition: None,
        }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn scorer(&self) -> &FeasibilityScorer {
        &self.scorer
    }

    pub const fn info(&self) -> &EngineInfo {
        &self.info
    }

    /// Fills the gaps in `supplied` by fetching market and news data for
    /// `industry` concurrently. Entries already present are never refetched.
    pub async fn gather_signals(&self, industry: &str, supplied: SignalBundle) -> SignalBundle {
        let SignalBundle { sentiment, market } = supplied;
        let market_fut = async {
            match market {
                Some(series) => Some(series),
                None => self.fetch_market(industry).await,
            }
        };
        let news_fut = async {
            match sentiment {
                Some(input) => Some(input),
                None => self.fetch_news(industry).await,
            }
        };
        let (market, sentiment) = tokio::join!(market_fut, news_fut);
        SignalBundle { sentiment, market }
    }

    async fn fetch_market(&self, industry: &str) -> Option<MarketSeries> {
        let fetcher = self.market.as_ref()?;
        let request = MarketSeriesRequest::for_industry(industry, self.config.market_window);
        let symbol = request.industry_proxy.clone();

        match timeout(self.config.fetch_timeout, fetcher.fetch_series(request)).await {
            Ok(Ok(points)) if points.is_empty() => {
                debug!(provider = fetcher.name(), %symbol, "market series empty");
                None
            }
            Ok(Ok(points)) => match MarketSeries::new(points) {
                Ok(series) => Some(series),
                Err(err) => {
                    warn!(provider = fetcher.name(), %symbol, error = %err, "market series rejected");
                    None
                }
            },
            Ok(Err(err)) => {
                warn!(provider = fetcher.name(), %symbol, error = %err, "market fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    provider = fetcher.name(),
                    %symbol,
                    timeout = ?self.config.fetch_timeout,
                    "market fetch timed out"
                );
                None
            }
        }
    }

    async fn fetch_news(&self, industry: &str) -> Option<SentimentInput> {
        let fetcher = self.news.as_ref()?;
        let request = NewsRequest {
            industry: industry.to_string(),
            query: None,
            limit: self.config.news_limit,
        };

        match timeout(self.config.fetch_timeout, fetcher.fetch_news(request)).await {
            Ok(Ok(snippets)) if snippets.is_empty() => {
                debug!(provider = fetcher.name(), industry, "no news snippets");
                None
            }
            Ok(Ok(snippets)) => Some(SentimentInput { snippets }),
            Ok(Err(err)) => {
                warn!(provider = fetcher.name(), industry, error = %err, "news fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    provider = fetcher.name(),
                    industry,
                    timeout = ?self.config.fetch_timeout,
                    "news fetch timed out"
                );
                None
            }
        }
    }

    /// Validates first, so a malformed request never triggers a fetch.
    pub async fn assess(
        &self,
        request: &IdeaRequest,
        supplied: SignalBundle,
    ) -> Result<FeasibilityAssessment, EngineError> {
        request.validate()?;
        let signals = self.gather_signals(&request.industry, supplied).await;
        Ok(self.scorer.assess(request, &signals)?)
    }

    /// Scores independent requests, one row per input. Signals are fetched
    /// once per distinct industry with bounded concurrency, then every row is
    /// scored and ranked; invalid rows become failed rows.
    pub async fn assess_batch(
        &self,
        requests: Vec<IdeaRequest>,
        supplied: SignalBundle,
    ) -> Vec<RankedIdea> {
        let rows = requests.into_iter().map(BatchRow::Request).collect();
        self.assess_rows(rows, supplied).await
    }

    /// Like [`Self::assess_batch`], but rows the caller already rejected
    /// keep their position and surface as failed rows.
    pub async fn assess_rows(
        &self,
        rows: Vec<BatchRow>,
        supplied: SignalBundle,
    ) -> Vec<RankedIdea> {
        let mut industries: Vec<(String, String)> = Vec::new();
        for request in rows.iter().filter_map(BatchRow::request) {
            if request.validate().is_err() {
                continue;
            }
            let key = normalize_industry(&request.industry);
            if !industries.iter().any(|(k, _)| *k == key) {
                industries.push((key, request.industry.clone()));
            }
        }
        debug!(
            rows = rows.len(),
            industries = industries.len(),
            "batch fetch plan"
        );

        let bundles: HashMap<String, SignalBundle> = stream::iter(industries)
            .map(|(key, industry)| {
                let supplied = supplied.clone();
                async move {
                    let bundle = self.gather_signals(&industry, supplied).await;
                    (key, bundle)
                }
            })
            .buffered(self.config.max_concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect();

        let empty = SignalBundle::empty();
        let outcomes: Vec<(String, Result<FeasibilityAssessment, CoreError>)> = rows
            .into_iter()
            .map(|row| match row {
                BatchRow::Request(request) => {
                    let signals = bundles
                        .get(&normalize_industry(&request.industry))
                        .unwrap_or(&empty);
                    let result = self.scorer.assess(&request, signals);
                    (request.idea_text, result)
                }
                BatchRow::Rejected { idea_text, error } => (idea_text, Err(error)),
            })
            .collect();
        rank_outcomes(outcomes)
    }

    /// Ranks ideas that share one context; signals are gathered once.
    pub async fn rank(
        &self,
        ideas: &[String],
        context: &IdeaContext,
        supplied: SignalBundle,
    ) -> Vec<RankedIdea> {
        if ideas.is_empty() {
            return Vec::new();
        }
        let signals = self.gather_signals(&context.industry, supplied).await;
        self.scorer.rank(ideas, context, &signals)
    }

    /// Asks the idea source for candidates and ranks them.
    pub async fn recommend(
        &self,
        context: &IdeaContext,
        count: usize,
        supplied: SignalBundle,
    ) -> Result<Recommendation, EngineError> {
        let request = IdeaGenerationRequest::new(&context.industry, &context.target_market)
            .with_count(count);
        let generated = self.ideas.generate(request).await?;
        if generated.is_empty() {
            warn!(source = self.ideas.name(), "idea source returned no candidates");
        }
        let texts: Vec<String> = generated.iter().map(|idea| idea.text.clone()).collect();
        let ranked = self.rank(&texts, context, supplied).await;
        Ok(Recommendation {
            source: self.ideas.name(),
            generated,
            ranked,
        })
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feasibility_engine::{
    BatchRow, CoreError, EngineConfig, FeasibilityEngine, IdeaContext, IdeaRequest, MarketSeries, MarketSeriesFetcher,
    MarketSeriesRequest, NewsFetcher, NewsRequest, PricePoint, SentimentInput, SignalBundle,
    SignalName, SignalProviderError, Snippet,
};

struct RisingMarket {
    calls: AtomicUsize,
}

impl RisingMarket {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MarketSeriesFetcher for RisingMarket {
    fn name(&self) -> &'static str {
        "rising"
    }

    async fn fetch_series(
        &self,
        _request: MarketSeriesRequest,
    ) -> Result<Vec<PricePoint>, SignalProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..30u32)
            .map(|day| PricePoint {
                timestamp_ms: i64::from(day) * 86_400_000,
                price: 100.0 + f64::from(day),
            })
            .collect())
    }
}

struct FailingMarket;

#[async_trait]
impl MarketSeriesFetcher for FailingMarket {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_series(
        &self,
        _request: MarketSeriesRequest,
    ) -> Result<Vec<PricePoint>, SignalProviderError> {
        Err(SignalProviderError::Api {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

struct CheerfulNews {
    calls: AtomicUsize,
}

impl CheerfulNews {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl NewsFetcher for CheerfulNews {
    fn name(&self) -> &'static str {
        "cheerful"
    }

    async fn fetch_news(&self, _request: NewsRequest) -> Result<Vec<Snippet>, SignalProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            Snippet::new("Demand surge brings record growth"),
            Snippet::new("Analysts optimistic about strong expansion"),
        ])
    }
}

struct SlowNews;

#[async_trait]
impl NewsFetcher for SlowNews {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch_news(&self, _request: NewsRequest) -> Result<Vec<Snippet>, SignalProviderError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(vec![Snippet::new("too late to matter")])
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        fetch_timeout: Duration::from_millis(100),
        max_concurrency: 2,
        ..EngineConfig::default()
    }
}

fn recycled_electronics() -> IdeaRequest {
    IdeaRequest::new(
        "A subscription box for recycled electronics parts",
        "sustainability",
    )
    .with_investment(20_000.0)
    .with_target_roi(0.3)
}

#[tokio::test]
async fn no_fetchers_scores_on_text_and_financials_only() {
    let engine = FeasibilityEngine::builder(EngineConfig::default())
        .build()
        .expect("engine");
    let out = engine
        .assess(&recycled_electronics(), SignalBundle::empty())
        .await
        .expect("assessment");

    assert!(!out.sub_score(SignalName::Sentiment).expect("sentiment").available);
    assert!(!out.sub_score(SignalName::MarketTrend).expect("market").available);
    assert!(out.composite_score > 0.0 && out.composite_score < 1.0);
    assert_eq!(out.sentiment_label.as_str(), "neutral");
    assert_eq!(out.market_outlook.as_str(), "neutral");
    let weight_sum: f64 = out.explanation.iter().map(|c| c.weight).sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn fetched_signals_become_available() {
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(RisingMarket::new())
        .news_fetcher(CheerfulNews::new())
        .build()
        .expect("engine");
    let out = engine
        .assess(
            &IdeaRequest::new("A cloud analytics platform", "technology"),
            SignalBundle::empty(),
        )
        .await
        .expect("assessment");

    assert!(out.sub_score(SignalName::MarketTrend).expect("market").available);
    assert!(out.sub_score(SignalName::Sentiment).expect("sentiment").available);
    assert_eq!(out.market_outlook.as_str(), "bullish");
    assert_eq!(out.sentiment_label.as_str(), "positive");
}

#[tokio::test]
async fn slow_fetch_times_out_to_unavailable() {
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(RisingMarket::new())
        .news_fetcher(Arc::new(SlowNews))
        .build()
        .expect("engine");

    let started = std::time::Instant::now();
    let out = engine
        .assess(
            &IdeaRequest::new("A cloud analytics platform", "technology"),
            SignalBundle::empty(),
        )
        .await
        .expect("assessment");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!out.sub_score(SignalName::Sentiment).expect("sentiment").available);
    assert!(out.sub_score(SignalName::MarketTrend).expect("market").available);
}

#[tokio::test]
async fn failed_fetch_degrades_instead_of_failing() {
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(Arc::new(FailingMarket))
        .build()
        .expect("engine");
    let out = engine
        .assess(&recycled_electronics(), SignalBundle::empty())
        .await
        .expect("assessment");
    assert!(out.missing_signals().contains(&SignalName::MarketTrend));
}

#[tokio::test]
async fn supplied_bundle_suppresses_fetching() {
    let market = RisingMarket::new();
    let news = CheerfulNews::new();
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(market.clone())
        .news_fetcher(news.clone())
        .build()
        .expect("engine");

    let supplied = SignalBundle {
        sentiment: Some(SentimentInput::from_texts(["Retail slump deepens"])),
        market: Some(
            MarketSeries::new(vec![
                PricePoint {
                    timestamp_ms: 0,
                    price: 100.0,
                },
                PricePoint {
                    timestamp_ms: 1,
                    price: 80.0,
                },
            ])
            .expect("series"),
        ),
    };
    let out = engine
        .assess(&IdeaRequest::new("A neighborhood bakery", "food"), supplied)
        .await
        .expect("assessment");

    assert_eq!(market.calls.load(Ordering::SeqCst), 0);
    assert_eq!(news.calls.load(Ordering::SeqCst), 0);
    assert_eq!(out.market_outlook.as_str(), "bearish");
    assert_eq!(out.sentiment_label.as_str(), "negative");
}

#[tokio::test]
async fn invalid_request_fails_before_fetching() {
    let market = RisingMarket::new();
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(market.clone())
        .build()
        .expect("engine");
    let err = engine
        .assess(&IdeaRequest::new("  ", "technology"), SignalBundle::empty())
        .await
        .expect_err("blank idea");
    assert_eq!(err.kind(), "input_validation");
    assert_eq!(market.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_isolates_invalid_row_and_dedups_fetches() {
    let market = RisingMarket::new();
    let news = CheerfulNews::new();
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(market.clone())
        .news_fetcher(news.clone())
        .build()
        .expect("engine");

    let rows = engine
        .assess_batch(
            vec![
                IdeaRequest::new("A cloud analytics platform for clinics", "Technology"),
                IdeaRequest::new("", "technology"),
                IdeaRequest::new("A marketplace for used textbooks", "tech"),
                IdeaRequest::new("A solar panel leasing service", "energy"),
            ],
            SignalBundle::empty(),
        )
        .await;

    assert_eq!(rows.len(), 4);
    let failed = rows.iter().find(|r| r.input_index == 1).expect("row 2");
    assert_eq!(failed.error().map(|e| e.kind.as_str()), Some("input_validation"));
    assert_eq!(failed.rank, 4);
    assert!(rows
        .iter()
        .filter(|r| r.input_index != 1)
        .all(|r| r.assessment().is_some()));

    // technology and tech collapse to one fetch group, energy is the other
    assert_eq!(market.calls.load(Ordering::SeqCst), 2);
    assert_eq!(news.calls.load(Ordering::SeqCst), 2);

    let ranks: Vec<usize> = rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn rejected_rows_keep_their_slot() {
    let market = RisingMarket::new();
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(market.clone())
        .build()
        .expect("engine");

    let rows = engine
        .assess_rows(
            vec![
                BatchRow::Rejected {
                    idea_text: "A bakery".to_string(),
                    error: CoreError::InvalidInput {
                        field: "target_roi",
                        reason: "supply either target_roi or target_roi_percent, not both"
                            .to_string(),
                    },
                },
                BatchRow::Request(IdeaRequest::new(
                    "A cloud analytics platform for clinics",
                    "technology",
                )),
            ],
            SignalBundle::empty(),
        )
        .await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].input_index, 1);
    assert!(rows[0].assessment().is_some());
    assert_eq!(rows[1].input_index, 0);
    assert_eq!(rows[1].idea_text, "A bakery");
    assert_eq!(rows[1].error().map(|e| e.kind.as_str()), Some("input_validation"));
    assert_eq!(market.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ranking_is_stable_across_calls() {
    let engine = FeasibilityEngine::builder(fast_config())
        .market_fetcher(RisingMarket::new())
        .news_fetcher(CheerfulNews::new())
        .build()
        .expect("engine");
    let ideas = vec![
        "A cloud analytics platform".to_string(),
        "A cloud analytics platform".to_string(),
        "A neighborhood hardware store".to_string(),
    ];
    let context = IdeaContext {
        industry: "technology".to_string(),
        ..IdeaContext::default()
    };

    let first = engine.rank(&ideas, &context, SignalBundle::empty()).await;
    let second = engine.rank(&ideas, &context, SignalBundle::empty()).await;
    assert_eq!(first, second);

    let order: Vec<usize> = first.iter().map(|r| r.input_index).collect();
    let pos0 = order.iter().position(|i| *i == 0).expect("idea 0");
    let pos1 = order.iter().position(|i| *i == 1).expect("idea 1");
    assert!(pos0 < pos1, "tied ideas keep input order");

    assert!(engine
        .rank(&[], &context, SignalBundle::empty())
        .await
        .is_empty());
}

#[tokio::test]
async fn recommend_ranks_stub_ideas() {
    let engine = FeasibilityEngine::builder(fast_config())
        .build()
        .expect("engine");
    let context = IdeaContext {
        industry: "healthcare".to_string(),
        target_market: "clinics".to_string(),
        initial_investment: Some(50_000.0),
        target_roi: Some(0.25),
    };
    let rec = engine
        .recommend(&context, 3, SignalBundle::empty())
        .await
        .expect("recommendation");

    assert_eq!(rec.source, "stub");
    assert_eq!(rec.generated.len(), 3);
    assert_eq!(rec.ranked.len(), 3);
    let scores: Vec<f64> = rec
        .ranked
        .iter()
        .filter_map(|r| r.assessment().map(|a| a.composite_score))
        .collect();
    assert_eq!(scores.len(), 3);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn single_and_batch_records_share_shape() {
    let engine = FeasibilityEngine::builder(EngineConfig::default())
        .build()
        .expect("engine");
    let request = recycled_electronics();
    let single = engine
        .assess(&request, SignalBundle::empty())
        .await
        .expect("assessment")
        .record(request.idea_text.clone());
    let batch = engine
        .assess_batch(vec![request], SignalBundle::empty())
        .await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].record(), single);
}

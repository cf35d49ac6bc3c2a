use std::sync::Arc;

use tracing::{debug, error};

use crate::composite::aggregate;
use crate::config::ScoringConfig;
use crate::error::CoreError;
use crate::ethics::evaluate_ethics;
use crate::market::{evaluate_market, MarketReading};
use crate::rank::rank_outcomes;
use crate::risk::evaluate_risk;
use crate::scalability::{evaluate_competition, evaluate_scalability};
use crate::sentiment::{evaluate_sentiment, SentimentReading};
use crate::traits::{CompetitionTable, TextPolarity};
use crate::types::{
    FeasibilityAssessment, IdeaContext, IdeaRequest, RankedIdea, SignalBundle, SignalName,
    SubScore,
};

/// Synchronous, stateless composite scorer. Holds only configuration and
/// the two local capabilities; every call is a pure function of its inputs.
#[derive(Clone)]
pub struct FeasibilityScorer {
    config: ScoringConfig,
    polarity: Arc<dyn TextPolarity>,
    competition: Arc<dyn CompetitionTable>,
}

impl FeasibilityScorer {
    pub fn new(
        config: ScoringConfig,
        polarity: Arc<dyn TextPolarity>,
        competition: Arc<dyn CompetitionTable>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            config,
            polarity,
            competition,
        })
    }

    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn assess(
        &self,
        request: &IdeaRequest,
        signals: &SignalBundle,
    ) -> Result<FeasibilityAssessment, CoreError> {
        request.validate()?;
        let cfg = &self.config;

        let sentiment = signals.sentiment.as_ref().map_or_else(
            || SentimentReading {
                sub_score: SubScore::unavailable(SignalName::Sentiment),
                label: Default::default(),
                mean_polarity: None,
            },
            |input| evaluate_sentiment(input, self.polarity.as_ref(), cfg),
        );
        let market = signals.market.as_ref().map_or_else(
            || MarketReading {
                sub_score: SubScore::unavailable(SignalName::MarketTrend),
                outlook: Default::default(),
                simple_return: None,
                volatility: None,
            },
            |series| evaluate_market(series, cfg),
        );
        let risk = evaluate_risk(request, cfg);
        let competition = evaluate_competition(
            &request.industry,
            &request.idea_text,
            self.competition.as_ref(),
        );
        let scalability = evaluate_scalability(&request.idea_text);
        let ethics = evaluate_ethics(&request.idea_text);

        let sub_scores = vec![
            sentiment.sub_score,
            market.sub_score,
            risk.risk,
            risk.complexity,
            competition,
            scalability,
            ethics.sub_score,
        ];

        let broken: Vec<SignalName> = sub_scores
            .iter()
            .filter(|s| !s.name.is_signed() && !s.available)
            .map(|s| s.name)
            .collect();
        if !broken.is_empty() {
            error!(?broken, "always-available estimator reported unavailable");
            return Err(CoreError::ConfigInvariant(format!(
                "always-available signals reported unavailable: {broken:?}"
            )));
        }

        let agg = aggregate(&sub_scores, &cfg.weights).inspect_err(|err| {
            if matches!(err, CoreError::ConfigInvariant(_)) {
                error!(error = %err, "composite rejected");
            }
        })?;
        debug!(
            composite = agg.composite_score,
            risk = risk.risk.value,
            markers = ?risk.complexity_markers,
            sentiment_available = sentiment.sub_score.available,
            market_available = market.sub_score.available,
            "idea assessed"
        );

        Ok(FeasibilityAssessment {
            composite_score: agg.composite_score,
            risk_level: risk.level,
            market_outlook: market.outlook,
            market_volatility: market.volatility,
            sentiment_label: sentiment.label,
            sub_scores,
            ethical_flag: ethics.flag,
            ethical_concerns: ethics
                .concerns
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            explanation: agg.explanation,
        })
    }

    /// Scores every idea against the same context and signals, then ranks.
    /// A failing idea becomes a failed row instead of aborting the call.
    pub fn rank(
        &self,
        ideas: &[String],
        context: &IdeaContext,
        signals: &SignalBundle,
    ) -> Vec<RankedIdea> {
        let outcomes = ideas
            .iter()
            .map(|idea| {
                let request = context.request_for(idea.clone());
                (idea.clone(), self.assess(&request, signals))
            })
            .collect();
        rank_outcomes(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolarityError;
    use crate::scalability::StaticCompetitionTable;
    use crate::types::{MarketSeries, PricePoint, RiskLevel, SentimentInput};

    struct FixedPolarity(f64);

    impl TextPolarity for FixedPolarity {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn polarity(&self, _text: &str) -> Result<f64, PolarityError> {
            Ok(self.0)
        }
    }

    fn scorer() -> FeasibilityScorer {
        FeasibilityScorer::new(
            ScoringConfig::default(),
            Arc::new(FixedPolarity(0.4)),
            Arc::new(StaticCompetitionTable),
        )
        .expect("valid scorer")
    }

    fn series(first: f64, last: f64) -> MarketSeries {
        MarketSeries::new(vec![
            PricePoint {
                timestamp_ms: 0,
                price: first,
            },
            PricePoint {
                timestamp_ms: 1,
                price: last,
            },
        ])
        .expect("series")
    }

    #[test]
    fn recycled_electronics_scenario() {
        let request = IdeaRequest::new(
            "A subscription box for recycled electronics parts",
            "sustainability",
        )
        .with_investment(20_000.0)
        .with_target_roi(0.3);
        let out = scorer()
            .assess(&request, &SignalBundle::empty())
            .expect("assessment");

        let mut available = out.available_signals();
        available.retain(|n| *n != SignalName::Ethical);
        assert_eq!(
            available,
            vec![
                SignalName::Risk,
                SignalName::Complexity,
                SignalName::Competition,
                SignalName::Scalability,
            ]
        );
        assert!(matches!(out.risk_level, RiskLevel::Low | RiskLevel::Medium));
        assert!(out.composite_score > 0.0 && out.composite_score < 1.0);
        let weight_sum: f64 = out.explanation.iter().map(|c| c.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
        assert!(!out.ethical_flag);
    }

    #[test]
    fn invalid_request_fails_fast() {
        let err = scorer()
            .assess(&IdeaRequest::new("", "technology"), &SignalBundle::empty())
            .expect_err("empty idea");
        assert_eq!(err.kind(), "input_validation");
    }

    #[test]
    fn supplied_signals_become_available() {
        let signals = SignalBundle {
            sentiment: Some(SentimentInput::from_texts(["growth ahead"])),
            market: Some(series(100.0, 115.0)),
        };
        let out = scorer()
            .assess(&IdeaRequest::new("A cloud platform", "technology"), &signals)
            .expect("assessment");
        assert!(out.sub_score(SignalName::Sentiment).is_some_and(|s| s.available));
        assert!(out.sub_score(SignalName::MarketTrend).is_some_and(|s| s.available));
        assert_eq!(out.market_outlook.as_str(), "bullish");
        assert_eq!(out.sentiment_label.as_str(), "positive");
    }

    #[test]
    fn higher_return_never_lowers_the_market_contribution() {
        let s = scorer();
        let request = IdeaRequest::new("A cloud platform", "technology");
        let mut last = f64::NEG_INFINITY;
        for end in [70.0, 95.0, 100.0, 104.0, 130.0] {
            let signals = SignalBundle {
                sentiment: None,
                market: Some(series(100.0, end)),
            };
            let out = s.assess(&request, &signals).expect("assessment");
            let c = out
                .explanation
                .iter()
                .find(|c| c.signal == SignalName::MarketTrend)
                .map(|c| c.contribution)
                .expect("market contribution");
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn scorer_refuses_config_with_nan_risk_reference() {
        let mut config = ScoringConfig::default();
        config.risk.investment_reference = f64::NAN;
        let err = FeasibilityScorer::new(
            config,
            Arc::new(FixedPolarity(0.4)),
            Arc::new(StaticCompetitionTable),
        )
        .err()
        .expect("nan reference rejected");
        assert_eq!(err.kind(), "configuration_invariant");
    }

    #[test]
    fn market_volatility_is_reported_without_moving_risk() {
        let s = scorer();
        let request = IdeaRequest::new("A cloud platform", "technology");
        let calm = s.assess(&request, &SignalBundle::empty()).expect("calm");
        let choppy_series = MarketSeries::new(
            [100.0, 110.0, 99.0]
                .into_iter()
                .zip(0_i64..)
                .map(|(price, timestamp_ms)| PricePoint {
                    timestamp_ms,
                    price,
                })
                .collect(),
        )
        .expect("series");
        let choppy = s
            .assess(
                &request,
                &SignalBundle {
                    sentiment: None,
                    market: Some(choppy_series),
                },
            )
            .expect("choppy");
        assert_eq!(calm.market_volatility, None);
        assert!(choppy.market_volatility.is_some_and(|v| v > 0.1));
        assert_eq!(
            calm.sub_score(SignalName::Risk),
            choppy.sub_score(SignalName::Risk)
        );
    }

    #[test]
    fn ethical_flag_is_metadata_only() {
        let s = scorer();
        let flagged = s
            .assess(
                &IdeaRequest::new("A misleading cloud platform", "technology"),
                &SignalBundle::empty(),
            )
            .expect("flagged still scores");
        assert!(flagged.ethical_flag);
        assert_eq!(flagged.ethical_concerns, vec!["deception".to_string()]);
        assert!(flagged.composite_score > 0.0);
    }

    #[test]
    fn rank_isolates_invalid_rows() {
        let ideas = vec![
            "A cloud platform for clinics".to_string(),
            String::new(),
            "A local bakery".to_string(),
        ];
        let ranked = scorer().rank(&ideas, &IdeaContext::default(), &SignalBundle::empty());
        assert_eq!(ranked.len(), 3);
        let failed = ranked.iter().find(|r| r.input_index == 1).expect("row 2");
        assert_eq!(failed.error().map(|e| e.kind.as_str()), Some("input_validation"));
        assert_eq!(failed.rank, 3);
        assert!(ranked
            .iter()
            .filter(|r| r.input_index != 1)
            .all(|r| r.assessment().is_some()));
    }
}

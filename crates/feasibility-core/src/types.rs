use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound for `target_roi`, expressed as a fraction (10.0 = 1000 %).
pub const MAX_TARGET_ROI: f64 = 10.0;
/// Lower bound for `target_roi`; a total loss is the worst sane target.
pub const MIN_TARGET_ROI: f64 = -1.0;

/// One idea to assess. `target_roi` is a fraction: 0.30 means 30 %.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaRequest {
    pub idea_text: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub target_market: String,
    #[serde(default)]
    pub initial_investment: Option<f64>,
    #[serde(default)]
    pub target_roi: Option<f64>,
}

impl IdeaRequest {
    pub fn new(idea_text: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            idea_text: idea_text.into(),
            industry: industry.into(),
            target_market: String::new(),
            initial_investment: None,
            target_roi: None,
        }
    }

    #[must_use]
    pub fn with_target_market(mut self, target_market: impl Into<String>) -> Self {
        self.target_market = target_market.into();
        self
    }

    #[must_use]
    pub fn with_investment(mut self, initial_investment: f64) -> Self {
        self.initial_investment = Some(initial_investment);
        self
    }

    #[must_use]
    pub fn with_target_roi(mut self, target_roi: f64) -> Self {
        self.target_roi = Some(target_roi);
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.idea_text.trim().is_empty() {
            return Err(CoreError::invalid("idea_text", "must not be empty"));
        }
        if let Some(investment) = self.initial_investment {
            if !investment.is_finite() || investment < 0.0 {
                return Err(CoreError::invalid(
                    "initial_investment",
                    format!("must be a finite non-negative amount, got {investment}"),
                ));
            }
        }
        if let Some(roi) = self.target_roi {
            if !roi.is_finite() || !(MIN_TARGET_ROI..=MAX_TARGET_ROI).contains(&roi) {
                return Err(CoreError::invalid(
                    "target_roi",
                    format!(
                        "must be a fraction within [{MIN_TARGET_ROI}, {MAX_TARGET_ROI}], got {roi}"
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Shared parameters applied to every idea of a ranking call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaContext {
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub target_market: String,
    #[serde(default)]
    pub initial_investment: Option<f64>,
    #[serde(default)]
    pub target_roi: Option<f64>,
}

impl IdeaContext {
    pub fn request_for(&self, idea_text: impl Into<String>) -> IdeaRequest {
        IdeaRequest {
            idea_text: idea_text.into(),
            industry: self.industry.clone(),
            target_market: self.target_market.clone(),
            initial_investment: self.initial_investment,
            target_roi: self.target_roi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
}

impl Snippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp_ms: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentInput {
    pub snippets: Vec<Snippet>,
}

impl SentimentInput {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            snippets: texts.into_iter().map(Snippet::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Chronological price observations. Construction rejects unordered or
/// duplicate timestamps and non-finite prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct MarketSeries {
    points: Vec<PricePoint>,
}

impl MarketSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, CoreError> {
        for pair in points.windows(2) {
            if let [prev, next] = pair {
                if next.timestamp_ms <= prev.timestamp_ms {
                    return Err(CoreError::InvalidSeries(format!(
                        "timestamps must be strictly increasing ({} then {})",
                        prev.timestamp_ms, next.timestamp_ms
                    )));
                }
            }
        }
        if let Some(bad) = points.iter().find(|p| !p.price.is_finite()) {
            return Err(CoreError::InvalidSeries(format!(
                "non-finite price at {}",
                bad.timestamp_ms
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<PricePoint>> for MarketSeries {
    type Error = CoreError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<MarketSeries> for Vec<PricePoint> {
    fn from(series: MarketSeries) -> Self {
        series.points
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RawSignal {
    Sentiment(SentimentInput),
    Market(MarketSeries),
}

/// Pre-fetched raw signals. A present entry suppresses the matching fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    #[serde(default)]
    pub sentiment: Option<SentimentInput>,
    #[serde(default)]
    pub market: Option<MarketSeries>,
}

impl SignalBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signal: RawSignal) {
        match signal {
            RawSignal::Sentiment(input) => self.sentiment = Some(input),
            RawSignal::Market(series) => self.market = Some(series),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalName {
    Sentiment,
    MarketTrend,
    Risk,
    Complexity,
    Competition,
    Scalability,
    Ethical,
}

impl SignalName {
    pub const ALL: [Self; 7] = [
        Self::Sentiment,
        Self::MarketTrend,
        Self::Risk,
        Self::Complexity,
        Self::Competition,
        Self::Scalability,
        Self::Ethical,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::MarketTrend => "market_trend",
            Self::Risk => "risk",
            Self::Complexity => "complexity",
            Self::Competition => "competition",
            Self::Scalability => "scalability",
            Self::Ethical => "ethical",
        }
    }

    /// Signed signals live in [-1, 1]; every other signal in [0, 1].
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Sentiment | Self::MarketTrend)
    }

    /// Higher raw value means a worse idea.
    pub const fn is_inverted(self) -> bool {
        matches!(self, Self::Risk | Self::Complexity | Self::Competition)
    }

    pub const fn range(self) -> (f64, f64) {
        if self.is_signed() {
            (-1.0, 1.0)
        } else {
            (0.0, 1.0)
        }
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: SignalName,
    pub value: f64,
    pub confidence: f64,
    pub available: bool,
}

impl SubScore {
    /// Clamps `value` into the signal's declared range and `confidence` into [0, 1].
    pub fn available(name: SignalName, value: f64, confidence: f64) -> Self {
        let (lo, hi) = name.range();
        Self {
            name,
            value: value.clamp(lo, hi),
            confidence: confidence.clamp(0.0, 1.0),
            available: true,
        }
    }

    pub const fn unavailable(name: SignalName) -> Self {
        Self {
            name,
            value: 0.0,
            confidence: 0.0,
            available: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketOutlook {
    Bearish,
    #[default]
    Neutral,
    Bullish,
}

impl MarketOutlook {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
            Self::Bullish => "bullish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub signal: SignalName,
    /// Weight after re-normalization over the available subset.
    pub weight: f64,
    /// Sub-score mapped onto [0, 1] with higher meaning more feasible.
    pub value: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityAssessment {
    pub composite_score: f64,
    pub risk_level: RiskLevel,
    pub market_outlook: MarketOutlook,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_volatility: Option<f64>,
    pub sentiment_label: SentimentLabel,
    pub sub_scores: Vec<SubScore>,
    pub ethical_flag: bool,
    #[serde(default)]
    pub ethical_concerns: Vec<String>,
    pub explanation: Vec<Contribution>,
}

impl FeasibilityAssessment {
    pub fn sub_score(&self, name: SignalName) -> Option<&SubScore> {
        self.sub_scores.iter().find(|s| s.name == name)
    }

    pub fn available_signals(&self) -> Vec<SignalName> {
        self.sub_scores
            .iter()
            .filter(|s| s.available)
            .map(|s| s.name)
            .collect()
    }

    pub fn missing_signals(&self) -> Vec<SignalName> {
        self.sub_scores
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.name)
            .collect()
    }

    pub fn record(&self, idea: impl Into<String>) -> AssessmentRecord {
        AssessmentRecord {
            idea: idea.into(),
            score: Some(self.composite_score),
            risk_level: Some(self.risk_level),
            market_outlook: Some(self.market_outlook),
            sentiment_label: Some(self.sentiment_label),
            ethical_flag: Some(self.ethical_flag),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub kind: String,
    pub message: String,
}

impl From<&CoreError> for RowError {
    fn from(err: &CoreError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankOutcome {
    Scored { assessment: FeasibilityAssessment },
    Failed { error: RowError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedIdea {
    pub rank: usize,
    /// Position of the idea in the caller's input sequence.
    pub input_index: usize,
    pub idea_text: String,
    #[serde(flatten)]
    pub outcome: RankOutcome,
}

impl RankedIdea {
    pub const fn assessment(&self) -> Option<&FeasibilityAssessment> {
        match &self.outcome {
            RankOutcome::Scored { assessment } => Some(assessment),
            RankOutcome::Failed { .. } => None,
        }
    }

    pub const fn error(&self) -> Option<&RowError> {
        match &self.outcome {
            RankOutcome::Scored { .. } => None,
            RankOutcome::Failed { error } => Some(error),
        }
    }

    pub fn record(&self) -> AssessmentRecord {
        match &self.outcome {
            RankOutcome::Scored { assessment } => assessment.record(self.idea_text.clone()),
            RankOutcome::Failed { error } => AssessmentRecord {
                idea: self.idea_text.clone(),
                score: None,
                risk_level: None,
                market_outlook: None,
                sentiment_label: None,
                ethical_flag: None,
                error: Some(error.message.clone()),
            },
        }
    }
}

/// Flat export row shared by single and batch results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub idea: String,
    pub score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub market_outlook: Option<MarketOutlook>,
    pub sentiment_label: Option<SentimentLabel>,
    pub ethical_flag: Option<bool>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_idea_text() {
        let err = IdeaRequest::new("   ", "technology")
            .validate()
            .expect_err("blank text");
        assert_eq!(err.kind(), "input_validation");
    }

    #[test]
    fn rejects_negative_investment_and_wild_roi() {
        assert!(IdeaRequest::new("x", "")
            .with_investment(-1.0)
            .validate()
            .is_err());
        assert!(IdeaRequest::new("x", "")
            .with_target_roi(25.0)
            .validate()
            .is_err());
        assert!(IdeaRequest::new("x", "")
            .with_target_roi(f64::NAN)
            .validate()
            .is_err());
        assert!(IdeaRequest::new("x", "")
            .with_investment(0.0)
            .with_target_roi(-1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn market_series_rejects_duplicate_timestamps() {
        let points = vec![
            PricePoint {
                timestamp_ms: 1,
                price: 10.0,
            },
            PricePoint {
                timestamp_ms: 1,
                price: 11.0,
            },
        ];
        assert!(MarketSeries::new(points).is_err());
    }

    #[test]
    fn market_series_deserialization_validates_order() {
        let raw = r#"[{"timestamp_ms":2,"price":1.0},{"timestamp_ms":1,"price":2.0}]"#;
        assert!(serde_json::from_str::<MarketSeries>(raw).is_err());

        let raw = r#"[{"timestamp_ms":1,"price":1.0},{"timestamp_ms":2,"price":2.0}]"#;
        let series: MarketSeries = serde_json::from_str(raw).expect("ordered series");
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn sub_score_clamps_into_declared_range() {
        let s = SubScore::available(SignalName::MarketTrend, -3.0, 4.0);
        assert!((s.value + 1.0).abs() < f64::EPSILON);
        assert!((s.confidence - 1.0).abs() < f64::EPSILON);

        let s = SubScore::available(SignalName::Risk, -0.5, 0.5);
        assert!(s.value.abs() < f64::EPSILON);
    }
}

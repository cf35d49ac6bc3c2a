use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::SignalName;

/// Aggregation weights per signal. Only the available subset is used and it
/// is re-normalized to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub sentiment: f64,
    pub market_trend: f64,
    pub risk: f64,
    pub complexity: f64,
    pub competition: f64,
    pub scalability: f64,
    /// Zero by default: the ethical estimate is reported, not scored.
    pub ethical: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            sentiment: 0.15,
            market_trend: 0.15,
            risk: 0.25,
            complexity: 0.10,
            competition: 0.15,
            scalability: 0.20,
            ethical: 0.0,
        }
    }
}

impl WeightTable {
    pub const fn weight(&self, name: SignalName) -> f64 {
        match name {
            SignalName::Sentiment => self.sentiment,
            SignalName::MarketTrend => self.market_trend,
            SignalName::Risk => self.risk,
            SignalName::Complexity => self.complexity,
            SignalName::Competition => self.competition,
            SignalName::Scalability => self.scalability,
            SignalName::Ethical => self.ethical,
        }
    }

    pub fn set(&mut self, name: SignalName, weight: f64) {
        let slot = match name {
            SignalName::Sentiment => &mut self.sentiment,
            SignalName::MarketTrend => &mut self.market_trend,
            SignalName::Risk => &mut self.risk,
            SignalName::Complexity => &mut self.complexity,
            SignalName::Competition => &mut self.competition,
            SignalName::Scalability => &mut self.scalability,
            SignalName::Ethical => &mut self.ethical,
        };
        *slot = weight;
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for name in SignalName::ALL {
            let w = self.weight(name);
            if !w.is_finite() || w < 0.0 {
                return Err(CoreError::ConfigInvariant(format!(
                    "weight for {name} must be finite and non-negative, got {w}"
                )));
            }
        }
        // Risk and the text heuristics are always available, so they alone
        // must be able to carry a score.
        let always = self.risk + self.complexity + self.competition + self.scalability;
        if always <= 0.0 {
            return Err(CoreError::ConfigInvariant(
                "always-available signals carry zero total weight".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    pub sentiment_negative: f64,
    pub sentiment_positive: f64,
    /// Applied to the raw simple return, not to the squashed trend value.
    pub outlook_bearish: f64,
    pub outlook_bullish: f64,
    pub risk_low: f64,
    pub risk_medium: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            sentiment_negative: -0.1,
            sentiment_positive: 0.1,
            outlook_bearish: -0.05,
            outlook_bullish: 0.05,
            risk_low: 0.33,
            risk_medium: 0.66,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Investment mapped linearly from 0 to this amount, clipped.
    pub investment_reference: f64,
    /// ROI fraction at which the unrealistic-return penalty reaches one half.
    pub roi_high_water: f64,
    /// Width of the logistic ramp around `roi_high_water`.
    pub roi_softness: f64,
    pub investment_weight: f64,
    pub roi_weight: f64,
    pub complexity_weight: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            investment_reference: 1_000_000.0,
            roi_high_water: 1.0,
            roi_softness: 0.25,
            investment_weight: 0.4,
            roi_weight: 0.3,
            complexity_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Saturation {
    pub sentiment_snippets: usize,
    pub market_points: usize,
    /// Return magnitude mapped to tanh(1); 0.10 puts a 20 % move near 0.96.
    pub market_return_scale: f64,
    pub sentiment_polarity_scale: f64,
    pub complexity_markers: usize,
}

impl Default for Saturation {
    fn default() -> Self {
        Self {
            sentiment_snippets: 10,
            market_points: 30,
            market_return_scale: 0.10,
            sentiment_polarity_scale: 1.0,
            complexity_markers: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: WeightTable,
    #[serde(default)]
    pub thresholds: LabelThresholds,
    #[serde(default)]
    pub risk: RiskParams,
    #[serde(default)]
    pub saturation: Saturation,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.weights.validate()?;

        let t = &self.thresholds;
        require_finite(&[
            ("sentiment_negative", t.sentiment_negative),
            ("sentiment_positive", t.sentiment_positive),
            ("outlook_bearish", t.outlook_bearish),
            ("outlook_bullish", t.outlook_bullish),
            ("risk_low", t.risk_low),
            ("risk_medium", t.risk_medium),
        ])?;
        if t.sentiment_negative > t.sentiment_positive {
            return Err(CoreError::ConfigInvariant(
                "sentiment_negative threshold exceeds sentiment_positive".to_string(),
            ));
        }
        if t.outlook_bearish > t.outlook_bullish {
            return Err(CoreError::ConfigInvariant(
                "outlook_bearish threshold exceeds outlook_bullish".to_string(),
            ));
        }
        if t.risk_low > t.risk_medium {
            return Err(CoreError::ConfigInvariant(
                "risk_low threshold exceeds risk_medium".to_string(),
            ));
        }

        let r = &self.risk;
        require_finite(&[
            ("investment_reference", r.investment_reference),
            ("roi_high_water", r.roi_high_water),
            ("roi_softness", r.roi_softness),
            ("investment_weight", r.investment_weight),
            ("roi_weight", r.roi_weight),
            ("complexity_weight", r.complexity_weight),
        ])?;
        if r.investment_weight < 0.0 || r.roi_weight < 0.0 {
            return Err(CoreError::ConfigInvariant(
                "risk term weights must be non-negative".to_string(),
            ));
        }
        let term_weights = r.investment_weight + r.roi_weight + r.complexity_weight;
        if r.complexity_weight <= 0.0 || term_weights <= 0.0 {
            return Err(CoreError::ConfigInvariant(
                "risk complexity term must carry positive weight".to_string(),
            ));
        }
        if r.investment_reference <= 0.0 || r.roi_softness <= 0.0 {
            return Err(CoreError::ConfigInvariant(
                "risk reference scale and roi softness must be positive".to_string(),
            ));
        }

        let s = &self.saturation;
        require_finite(&[
            ("market_return_scale", s.market_return_scale),
            ("sentiment_polarity_scale", s.sentiment_polarity_scale),
        ])?;
        if s.market_return_scale <= 0.0 || s.sentiment_polarity_scale <= 0.0 {
            return Err(CoreError::ConfigInvariant(
                "saturation scales must be positive".to_string(),
            ));
        }
        if s.sentiment_snippets == 0 || s.market_points == 0 || s.complexity_markers == 0 {
            return Err(CoreError::ConfigInvariant(
                "saturation counts must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}

fn require_finite(fields: &[(&str, f64)]) -> Result<(), CoreError> {
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, v)) => Err(CoreError::ConfigInvariant(format!(
            "{name} must be finite, got {v}"
        ))),
        None => Ok(()),
    }
}

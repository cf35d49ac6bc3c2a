use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::normalize::{logistic, normalize, saturating_ratio};
use crate::text::TextFeatures;
use crate::types::{IdeaRequest, RiskLevel, SignalName, SubScore};

const REGULATORY: &[&str] = &[
    "regulat*",
    "compliance",
    "licens*",
    "fda",
    "hipaa",
    "medical",
    "clinic*",
    "pharma*",
    "insurance",
    "banking",
    "lending",
    "financial advice",
];

const HARDWARE: &[&str] = &[
    "hardware",
    "device*",
    "manufactur*",
    "robot*",
    "sensor*",
    "electronics",
    "drone*",
    "vehicle*",
    "factory",
];

const MULTI_STAKEHOLDER: &[&str] = &[
    "marketplace",
    "two-sided",
    "supply chain",
    "logistics",
    "partners",
    "partnership*",
    "network of",
    "government",
];

const ADVANCED_TECH: &[&str] = &[
    "ai",
    "machine learning",
    "artificial intelligence",
    "blockchain",
    "cybersecurity",
    "quantum",
    "biotech*",
];

const MARKER_FAMILIES: [(&str, &[&str]); 4] = [
    ("regulatory", REGULATORY),
    ("hardware", HARDWARE),
    ("multi_stakeholder", MULTI_STAKEHOLDER),
    ("advanced_tech", ADVANCED_TECH),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityProfile {
    pub score: f64,
    /// `family:term` for every distinct marker that matched.
    pub markers: Vec<String>,
}

/// Bounded count of complexity markers over a saturation constant.
pub fn assess_complexity(idea_text: &str, cfg: &ScoringConfig) -> ComplexityProfile {
    let features = TextFeatures::new(idea_text);
    let markers: Vec<String> = MARKER_FAMILIES
        .iter()
        .flat_map(|(family, terms)| {
            features
                .matches(terms)
                .into_iter()
                .map(move |term| format!("{family}:{term}"))
        })
        .collect();
    let score = saturating_ratio(markers.len(), cfg.saturation.complexity_markers);
    ComplexityProfile { score, markers }
}

/// Unrealistic-return penalty: a logistic ramp centered on the high-water mark.
pub fn roi_risk(target_roi: f64, cfg: &ScoringConfig) -> f64 {
    logistic((target_roi - cfg.risk.roi_high_water) / cfg.risk.roi_softness)
}

pub fn investment_risk(initial_investment: f64, cfg: &ScoringConfig) -> f64 {
    normalize(initial_investment, 0.0, cfg.risk.investment_reference, true)
}

pub fn risk_level(risk: f64, cfg: &ScoringConfig) -> RiskLevel {
    if risk < cfg.thresholds.risk_low {
        RiskLevel::Low
    } else if risk < cfg.thresholds.risk_medium {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTerms {
    pub investment: Option<f64>,
    pub roi: Option<f64>,
    pub complexity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskReading {
    pub risk: SubScore,
    pub complexity: SubScore,
    pub level: RiskLevel,
    pub terms: RiskTerms,
    pub complexity_markers: Vec<String>,
}

/// Risk is the weighted mean of the terms that are present. Missing
/// investment or ROI drops that term and re-normalizes the rest, so the
/// result is always available.
pub fn evaluate_risk(request: &IdeaRequest, cfg: &ScoringConfig) -> RiskReading {
    let profile = assess_complexity(&request.idea_text, cfg);
    let terms = RiskTerms {
        investment: request.initial_investment.map(|v| investment_risk(v, cfg)),
        roi: request.target_roi.map(|v| roi_risk(v, cfg)),
        complexity: profile.score,
    };

    let p = &cfg.risk;
    let weighted = [
        terms.investment.map(|v| (v, p.investment_weight)),
        terms.roi.map(|v| (v, p.roi_weight)),
        Some((terms.complexity, p.complexity_weight)),
    ];
    let (sum, total_weight) = weighted
        .iter()
        .flatten()
        .fold((0.0_f64, 0.0_f64), |(s, w), &(v, wt)| (s + v * wt, w + wt));
    let all_weight = p.investment_weight + p.roi_weight + p.complexity_weight;

    let risk = if total_weight > 0.0 { sum / total_weight } else { 0.0 };
    let confidence = if all_weight > 0.0 {
        total_weight / all_weight
    } else {
        0.0
    };
    let complexity_confidence = if profile.markers.is_empty() { 0.5 } else { 1.0 };

    RiskReading {
        risk: SubScore::available(SignalName::Risk, risk, confidence),
        complexity: SubScore::available(
            SignalName::Complexity,
            profile.score,
            complexity_confidence,
        ),
        level: risk_level(risk, cfg),
        terms,
        complexity_markers: profile.markers,
    }
}

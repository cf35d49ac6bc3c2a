use serde::{Deserialize, Serialize};

use crate::text::TextFeatures;
use crate::types::{SignalName, SubScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlag {
    Deception,
    Harm,
    Illegality,
    Exploitation,
}

impl RedFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deception => "deception",
            Self::Harm => "harm",
            Self::Illegality => "illegality",
            Self::Exploitation => "exploitation",
        }
    }
}

const RED_FLAGS: [(RedFlag, &[&str]); 4] = [
    (
        RedFlag::Deception,
        &[
            "scam*",
            "fraud*",
            "deceptive",
            "misleading",
            "ponzi",
            "pyramid scheme",
            "fake reviews",
        ],
    ),
    (
        RedFlag::Harm,
        &["harmful", "dangerous", "weapon*", "addictive", "self-harm"],
    ),
    (
        RedFlag::Illegality,
        &[
            "illegal",
            "counterfeit",
            "launder*",
            "tax evasion",
            "evade",
            "unlicensed",
            "black market",
        ],
    ),
    (
        RedFlag::Exploitation,
        &["exploitative", "exploit", "manipulat*", "predatory", "unethical"],
    ),
];

/// Softer warning words; they lower the impact estimate without raising the flag.
const CAUTION_MARKERS: &[&str] = &["controversial", "questionable", "borderline", "risky"];

const STRONG_BENEFIT: &[&str] = &[
    "sustainable",
    "ethical",
    "recycl*",
    "accessib*",
    "helpful",
    "beneficial",
    "improve*",
    "support*",
    "efficiently",
];

const MILD_BENEFIT: &[&str] = &["efficient", "convenient", "innovative", "modern", "manage"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthicalReading {
    pub flag: bool,
    pub concerns: Vec<RedFlag>,
    /// Ethical-impact estimate in [0, 1]; higher is better.
    pub sub_score: SubScore,
}

/// Always computed and never blocks scoring.
pub fn evaluate_ethics(idea_text: &str) -> EthicalReading {
    let features = TextFeatures::new(idea_text);
    let concerns: Vec<RedFlag> = RED_FLAGS
        .iter()
        .filter(|(_, terms)| features.any(terms))
        .map(|(flag, _)| *flag)
        .collect();

    let impact = if concerns.len() > 1 {
        0.0
    } else if !concerns.is_empty() {
        0.2
    } else if features.any(CAUTION_MARKERS) {
        0.3
    } else if features.any(STRONG_BENEFIT) {
        0.9
    } else if features.any(MILD_BENEFIT) {
        0.7
    } else {
        0.5
    };

    EthicalReading {
        flag: !concerns.is_empty(),
        concerns,
        sub_score: SubScore::available(SignalName::Ethical, impact, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misleading_advice_is_flagged() {
        let r = evaluate_ethics(
            "A mobile app that helps small businesses go bankrupt by providing misleading financial advice",
        );
        assert!(r.flag);
        assert_eq!(r.concerns, vec![RedFlag::Deception]);
        assert!(r.sub_score.value < 0.3);
    }

    #[test]
    fn sustainable_idea_is_clean_and_positive() {
        let r = evaluate_ethics(
            "A sustainable mobile app that helps small businesses manage their finances efficiently",
        );
        assert!(!r.flag);
        assert!(r.concerns.is_empty());
        assert!((r.sub_score.value - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn multiple_categories_bottom_out() {
        let r = evaluate_ethics("An illegal scam selling counterfeit weapons");
        assert!(r.concerns.len() >= 3);
        assert!(r.sub_score.value.abs() < f64::EPSILON);
    }

    #[test]
    fn caution_words_do_not_raise_the_flag() {
        let r = evaluate_ethics("A controversial dating concept");
        assert!(!r.flag);
        assert!((r.sub_score.value - 0.3).abs() < f64::EPSILON);
    }
}

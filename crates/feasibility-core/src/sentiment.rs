use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::normalize::{normalize_signed, saturating_ratio};
use crate::traits::TextPolarity;
use crate::types::{SentimentInput, SentimentLabel, SignalName, SubScore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentReading {
    pub sub_score: SubScore,
    pub label: SentimentLabel,
    /// Unweighted mean polarity before squashing; `None` when unavailable.
    pub mean_polarity: Option<f64>,
}

impl SentimentReading {
    const fn unavailable() -> Self {
        Self {
            sub_score: SubScore::unavailable(SignalName::Sentiment),
            label: SentimentLabel::Neutral,
            mean_polarity: None,
        }
    }
}

pub fn sentiment_label(polarity: f64, cfg: &ScoringConfig) -> SentimentLabel {
    if polarity < cfg.thresholds.sentiment_negative {
        SentimentLabel::Negative
    } else if polarity > cfg.thresholds.sentiment_positive {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    }
}

pub fn evaluate_sentiment(
    input: &SentimentInput,
    model: &dyn TextPolarity,
    cfg: &ScoringConfig,
) -> SentimentReading {
    if input.is_empty() {
        return SentimentReading::unavailable();
    }

    let mut polarities = Vec::with_capacity(input.snippets.len());
    let mut failures = 0usize;
    for snippet in &input.snippets {
        let text = snippet.text.trim();
        if text.is_empty() {
            continue;
        }
        match model.polarity(text) {
            Ok(p) if p.is_finite() => polarities.push(p.clamp(-1.0, 1.0)),
            Ok(p) => {
                failures += 1;
                debug!(model = model.name(), polarity = p, "discarding non-finite polarity");
            }
            Err(err) => {
                failures += 1;
                debug!(model = model.name(), error = %err, "snippet polarity failed");
            }
        }
    }

    if polarities.is_empty() && failures > 0 {
        warn!(
            model = model.name(),
            failures, "polarity model failed on every snippet; sentiment unavailable"
        );
        return SentimentReading::unavailable();
    }

    let mean = if polarities.is_empty() {
        0.0
    } else {
        polarities.iter().sum::<f64>() / polarities.len() as f64
    };
    let confidence = saturating_ratio(polarities.len(), cfg.saturation.sentiment_snippets);
    let value = normalize_signed(mean, cfg.saturation.sentiment_polarity_scale);

    SentimentReading {
        sub_score: SubScore::available(SignalName::Sentiment, value, confidence),
        label: sentiment_label(mean, cfg),
        mean_polarity: Some(mean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolarityError;
    use crate::types::Snippet;

    struct WordPolarity;

    impl TextPolarity for WordPolarity {
        fn name(&self) -> &'static str {
            "word"
        }

        fn polarity(&self, text: &str) -> Result<f64, PolarityError> {
            if text.contains("boom") {
                Ok(0.8)
            } else if text.contains("bust") {
                Ok(-0.6)
            } else if text.contains("error") {
                Err(PolarityError("unparseable".to_string()))
            } else {
                Ok(0.0)
            }
        }
    }

    #[test]
    fn empty_input_is_unavailable() {
        let out = evaluate_sentiment(
            &SentimentInput::default(),
            &WordPolarity,
            &ScoringConfig::default(),
        );
        assert!(!out.sub_score.available);
        assert_eq!(out.label, SentimentLabel::Neutral);
    }

    #[test]
    fn averages_and_labels() {
        let input = SentimentInput::from_texts(["boom times", "boom again", "bust"]);
        let out = evaluate_sentiment(&input, &WordPolarity, &ScoringConfig::default());
        assert!(out.sub_score.available);
        let mean = out.mean_polarity.expect("mean");
        assert!((mean - (0.8 + 0.8 - 0.6) / 3.0).abs() < 1e-12);
        assert_eq!(out.label, SentimentLabel::Positive);
        assert!((out.sub_score.confidence - 0.3).abs() < 1e-12);
    }

    #[test]
    fn confidence_saturates_at_ten_snippets() {
        let input = SentimentInput::from_texts(vec!["bust"; 25]);
        let out = evaluate_sentiment(&input, &WordPolarity, &ScoringConfig::default());
        assert!((out.sub_score.confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(out.label, SentimentLabel::Negative);
    }

    #[test]
    fn blank_snippets_score_neutral_with_zero_confidence() {
        let input = SentimentInput {
            snippets: vec![Snippet::new("  "), Snippet::new("")],
        };
        let out = evaluate_sentiment(&input, &WordPolarity, &ScoringConfig::default());
        assert!(out.sub_score.available);
        assert!(out.sub_score.value.abs() < f64::EPSILON);
        assert!(out.sub_score.confidence.abs() < f64::EPSILON);
        assert_eq!(out.label, SentimentLabel::Neutral);
    }

    #[test]
    fn model_failing_everywhere_is_unavailable() {
        let input = SentimentInput::from_texts(["error one", "error two"]);
        let out = evaluate_sentiment(&input, &WordPolarity, &ScoringConfig::default());
        assert!(!out.sub_score.available);
    }

    #[test]
    fn boundary_polarity_is_neutral() {
        let cfg = ScoringConfig::default();
        assert_eq!(sentiment_label(0.1, &cfg), SentimentLabel::Neutral);
        assert_eq!(sentiment_label(-0.1, &cfg), SentimentLabel::Neutral);
    }
}

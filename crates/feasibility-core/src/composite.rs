use crate::config::WeightTable;
use crate::error::CoreError;
use crate::normalize::to_unit;
use crate::types::{Contribution, SubScore};

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub composite_score: f64,
    pub explanation: Vec<Contribution>,
}

/// Sub-score mapped onto [0, 1] with higher meaning more feasible.
pub fn oriented_value(score: &SubScore) -> f64 {
    let unit = if score.name.is_signed() {
        to_unit(score.value)
    } else {
        score.value.clamp(0.0, 1.0)
    };
    if score.name.is_inverted() {
        1.0 - unit
    } else {
        unit
    }
}

/// Weighted mean over the available sub-scores. Each available weight is
/// divided by the sum of available weights, so the relative emphasis of the
/// remaining signals is preserved when some are missing.
pub fn aggregate(sub_scores: &[SubScore], weights: &WeightTable) -> Result<Aggregate, CoreError> {
    let available: Vec<&SubScore> = sub_scores.iter().filter(|s| s.available).collect();
    if let Some(broken) = available.iter().find(|s| !s.value.is_finite()) {
        return Err(CoreError::ConfigInvariant(format!(
            "{} sub-score is available but not finite ({})",
            broken.name, broken.value
        )));
    }
    if available.is_empty() {
        return Err(CoreError::InsufficientSignal {
            missing: sub_scores.iter().map(|s| s.name).collect(),
        });
    }

    let total: f64 = available.iter().map(|s| weights.weight(s.name)).sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(CoreError::ConfigInvariant(format!(
            "available signals carry no usable weight (sum {total})"
        )));
    }

    let explanation: Vec<Contribution> = available
        .iter()
        .map(|s| {
            let weight = weights.weight(s.name) / total;
            let value = oriented_value(s);
            Contribution {
                signal: s.name,
                weight,
                value,
                contribution: weight * value,
            }
        })
        .collect();
    let composite_score = explanation
        .iter()
        .map(|c| c.contribution)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    Ok(Aggregate {
        composite_score,
        explanation,
    })
}

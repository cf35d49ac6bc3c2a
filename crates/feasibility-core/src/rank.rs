use crate::error::CoreError;
use crate::types::{FeasibilityAssessment, RankOutcome, RankedIdea, RowError};

/// Orders per-idea outcomes by composite score, descending.
///
/// The sort is stable, so equal scores keep their input order. Failed rows
/// follow every scored row, also in input order. Ranks run from 1 to N.
pub fn rank_outcomes(
    outcomes: Vec<(String, Result<FeasibilityAssessment, CoreError>)>,
) -> Vec<RankedIdea> {
    let mut scored = Vec::new();
    let mut failed = Vec::new();
    for (input_index, (idea_text, result)) in outcomes.into_iter().enumerate() {
        match result {
            Ok(assessment) => scored.push((input_index, idea_text, assessment)),
            Err(err) => failed.push((input_index, idea_text, RowError::from(&err))),
        }
    }

    scored.sort_by(|a, b| b.2.composite_score.total_cmp(&a.2.composite_score));

    let scored_rows = scored
        .into_iter()
        .map(|(input_index, idea_text, assessment)| {
            (input_index, idea_text, RankOutcome::Scored { assessment })
        });
    let failed_rows = failed
        .into_iter()
        .map(|(input_index, idea_text, error)| (input_index, idea_text, RankOutcome::Failed { error }));

    scored_rows
        .chain(failed_rows)
        .enumerate()
        .map(|(pos, (input_index, idea_text, outcome))| RankedIdea {
            rank: pos + 1,
            input_index,
            idea_text,
            outcome,
        })
        .collect()
}

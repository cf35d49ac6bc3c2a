use crate::error::PolarityError;

/// Scores a piece of text on [-1, 1], negative to positive.
pub trait TextPolarity: Send + Sync {
    fn name(&self) -> &'static str;

    fn polarity(&self, text: &str) -> Result<f64, PolarityError>;
}

/// Competition intensity in [0, 1] for an industry, looked up by its
/// normalized name. `None` means the table has no entry.
pub trait CompetitionTable: Send + Sync {
    fn name(&self) -> &'static str;

    fn lookup(&self, industry: &str) -> Option<f64>;
}

use std::time::Duration;

use feasibility_core::ScoringConfig;
use feasibility_signals::MarketWindow;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    /// Upper bound for each individual market or news fetch.
    pub fetch_timeout: Duration,
    /// Distinct-industry fetch groups in flight during a batch call.
    pub max_concurrency: usize,
    pub market_window: MarketWindow,
    pub news_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            fetch_timeout: Duration::from_secs(5),
            max_concurrency: 4,
            market_window: MarketWindow::OneYear,
            news_limit: 20,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.scoring.validate()?;
        if self.fetch_timeout.is_zero() {
            return Err(EngineError::Config("fetch_timeout must be positive".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(EngineError::Config("max_concurrency must be at least 1".to_string()));
        }
        if self.news_limit == 0 {
            return Err(EngineError::Config("news_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

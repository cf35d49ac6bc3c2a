//! Feasibility scoring for business ideas.
//!
//! Every estimator here is synchronous and deterministic. Sub-scores whose
//! upstream data is missing are marked unavailable and the composite score
//! re-normalizes the weights of whatever remains.

pub mod composite;
pub mod config;
pub mod error;
pub mod ethics;
pub mod market;
pub mod normalize;
pub mod rank;
pub mod risk;
pub mod scalability;
pub mod scorer;
pub mod sentiment;
mod text;
pub mod traits;
pub mod types;

pub use composite::{aggregate, Aggregate};
pub use config::*;
pub use error::{CoreError, PolarityError};
pub use ethics::{evaluate_ethics, EthicalReading, RedFlag};
pub use market::{evaluate_market, return_volatility, MarketReading};
pub use normalize::{normalize, normalize_signed, to_unit};
pub use rank::rank_outcomes;
pub use risk::{evaluate_risk, RiskReading};
pub use scalability::{normalize_industry, StaticCompetitionTable, DEFAULT_COMPETITION};
pub use scorer::FeasibilityScorer;
pub use sentiment::{evaluate_sentiment, SentimentReading};
pub use traits::*;
pub use types::*;

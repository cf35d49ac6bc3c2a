use thiserror::Error;

use crate::types::SignalName;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid input: {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("invalid market series: {0}")]
    InvalidSeries(String),

    #[error("simple return is undefined for a zero starting price")]
    DivisionUndefined,

    #[error("no available signal to score; missing: {}", join_names(.missing))]
    InsufficientSignal { missing: Vec<SignalName> },

    #[error("configuration invariant violated: {0}")]
    ConfigInvariant(String),
}

impl CoreError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable tag, used in batch rows and RPC error data.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } | Self::InvalidSeries(_) => "input_validation",
            Self::DivisionUndefined => "signal_unavailable",
            Self::InsufficientSignal { .. } => "insufficient_signal",
            Self::ConfigInvariant(_) => "configuration_invariant",
        }
    }
}

fn join_names(names: &[SignalName]) -> String {
    if names.is_empty() {
        return "none".to_string();
    }
    names
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure reported by a text polarity model for a single snippet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("polarity model failed: {0}")]
pub struct PolarityError(pub String);

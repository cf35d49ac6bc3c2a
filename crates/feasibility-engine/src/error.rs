use feasibility_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("idea source failed: {0}")]
    IdeaSource(#[from] feasibility_ideas::ProviderError),

    #[error("signal provider setup failed: {0}")]
    SignalProvider(#[from] feasibility_signals::ProviderError),

    #[error("engine configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(err) => err.kind(),
            Self::IdeaSource(_) => "idea_source",
            Self::SignalProvider(_) => "signal_provider",
            Self::Config(_) => "configuration_invariant",
        }
    }
}

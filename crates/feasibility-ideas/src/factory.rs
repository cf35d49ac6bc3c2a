use std::sync::Arc;

use crate::config::IdeaSourceConfig;
use crate::error::ProviderError;
use crate::providers::{DeterministicStub, OpenAiChatIdeaSource};
use crate::traits::IdeaSource;

pub fn build_idea_source(cfg: IdeaSourceConfig) -> Result<Arc<dyn IdeaSource>, ProviderError> {
    match cfg {
        IdeaSourceConfig::OpenAiChat(c) => Ok(Arc::new(OpenAiChatIdeaSource::new(c)?)),
        IdeaSourceConfig::Stub => Ok(Arc::new(DeterministicStub)),
    }
}

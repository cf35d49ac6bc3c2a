use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{GeneratedIdea, IdeaGenerationRequest};

/// Produces candidate idea texts for an industry and target market. The
/// scorer treats the output as opaque strings.
#[async_trait]
pub trait IdeaSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        request: IdeaGenerationRequest,
    ) -> Result<Vec<GeneratedIdea>, ProviderError>;
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_IDEA_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaGenerationRequest {
    pub industry: String,
    pub target_market: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

const fn default_count() -> usize {
    DEFAULT_IDEA_COUNT
}

impl IdeaGenerationRequest {
    pub fn new(industry: impl Into<String>, target_market: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            target_market: target_market.into(),
            count: DEFAULT_IDEA_COUNT,
        }
    }

    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIdea {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl GeneratedIdea {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rationale: None,
        }
    }

    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

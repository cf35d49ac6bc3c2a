use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiChatConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com".to_string(),
            model: model.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Chosen once at startup; a missing key selects `Stub` explicitly rather
/// than falling back at call time.
#[derive(Debug, Clone)]
pub enum IdeaSourceConfig {
    OpenAiChat(OpenAiChatConfig),
    Stub,
}

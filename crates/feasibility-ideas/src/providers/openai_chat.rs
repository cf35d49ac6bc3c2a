use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAiChatConfig;
use crate::error::ProviderError;
use crate::traits::IdeaSource;
use crate::types::{GeneratedIdea, IdeaGenerationRequest};

#[derive(Clone)]
pub struct OpenAiChatIdeaSource {
    config: OpenAiChatConfig,
    client: Client,
}

impl OpenAiChatIdeaSource {
    pub fn new(config: OpenAiChatConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("chat api key is empty".to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn prompt(request: &IdeaGenerationRequest) -> String {
        format!(
            "Generate {} innovative business ideas in the {} industry targeting {}. \
             Format each idea as a numbered list item starting with the number followed by a period.",
            request.count,
            request.industry.trim(),
            request.target_market.trim()
        )
    }
}

#[async_trait::async_trait]
impl IdeaSource for OpenAiChatIdeaSource {
    fn name(&self) -> &'static str {
        "openai_chat"
    }

    async fn generate(
        &self,
        request: IdeaGenerationRequest,
    ) -> Result<Vec<GeneratedIdea>, ProviderError> {
        if request.count == 0 {
            return Err(ProviderError::Config("idea count must be positive".to_string()));
        }

        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: Self::prompt(&request),
            }],
        };
        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let parsed: ChatResponse = res.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("chat completion has no content".to_string())
            })?;
        let ideas = parse_numbered_list(&content, request.count);
        debug!(model = %self.config.model, ideas = ideas.len(), "ideas generated");
        Ok(ideas)
    }
}

/// One idea per non-blank line, with a leading "N." or "N)" marker and list
/// bullets removed.
fn parse_numbered_list(content: &str, limit: usize) -> Vec<GeneratedIdea> {
    content
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(GeneratedIdea::new)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let rest = if digits > 0 {
        let after = line.get(digits..).unwrap_or_default();
        // "3.5x faster" is text, not a marker: the delimiter must be followed
        // by whitespace or a letter.
        match after.strip_prefix(['.', ')']) {
            Some(body)
                if body
                    .chars()
                    .next()
                    .is_none_or(|c| c.is_whitespace() || c.is_alphabetic()) =>
            {
                body
            }
            _ => line,
        }
    } else {
        line.strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
            .unwrap_or(line)
    };
    rest.trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

use feasibility_core::Snippet;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::NewsApiConfig;
use crate::error::ProviderError;
use crate::traits::NewsFetcher;
use crate::types::NewsRequest;

#[derive(Clone)]
pub struct NewsApiFetcher {
    config: NewsApiConfig,
    client: Client,
}

impl NewsApiFetcher {
    pub fn new(config: NewsApiConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("news api key is empty".to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn everything_url(&self) -> String {
        format!(
            "{}/v2/everything",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl NewsFetcher for NewsApiFetcher {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    async fn fetch_news(&self, request: NewsRequest) -> Result<Vec<Snippet>, ProviderError> {
        let terms = request.search_terms();
        if terms.is_empty() {
            return Err(ProviderError::Config("news query is empty".to_string()));
        }
        let page_size = request.limit.clamp(1, 100).min(self.config.page_size.max(1));
        let page_size_param = page_size.to_string();

        let res = self
            .client
            .get(self.everything_url())
            .header("X-Api-Key", &self.config.api_key)
            .query(&[
                ("q", terms.as_str()),
                ("language", self.config.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size_param.as_str()),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let parsed: EverythingResponse = res.json().await?;
        let snippets = snippets_from_articles(parsed, page_size)?;
        debug!(query = %terms, snippets = snippets.len(), "news fetched");
        Ok(snippets)
    }
}

/// Title and description joined into one snippet per article; articles with
/// neither are skipped.
fn snippets_from_articles(
    parsed: EverythingResponse,
    limit: usize,
) -> Result<Vec<Snippet>, ProviderError> {
    if parsed.status != "ok" {
        return Err(ProviderError::InvalidResponse(format!(
            "news status {}: {}",
            parsed.status,
            parsed.message.unwrap_or_default()
        )));
    }
    Ok(parsed
        .articles
        .into_iter()
        .filter_map(|a| {
            let parts: Vec<String> = [a.title, a.description]
                .into_iter()
                .flatten()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| Snippet::new(parts.join(". ")))
        })
        .take(limit)
        .collect())
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_title_and_description() {
        let raw = r#"{
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {"title": "Solar installs surge", "description": "Record quarter for rooftop panels"},
                {"title": null, "description": null},
                {"title": "Grid upgrade stalls", "description": ""}
            ]
        }"#;
        let parsed: EverythingResponse = serde_json::from_str(raw).expect("parse news");
        let snippets = snippets_from_articles(parsed, 10).expect("snippets");
        assert_eq!(snippets.len(), 2);
        assert_eq!(
            snippets[0].text,
            "Solar installs surge. Record quarter for rooftop panels"
        );
        assert_eq!(snippets[1].text, "Grid upgrade stalls");
    }

    #[test]
    fn error_status_is_invalid_response() {
        let raw = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid"}"#;
        let parsed: EverythingResponse = serde_json::from_str(raw).expect("parse news");
        let err = snippets_from_articles(parsed, 10).expect_err("error status");
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn respects_limit() {
        let raw = r#"{"status":"ok","articles":[{"title":"a"},{"title":"b"},{"title":"c"}]}"#;
        let parsed: EverythingResponse = serde_json::from_str(raw).expect("parse news");
        assert_eq!(snippets_from_articles(parsed, 2).expect("snippets").len(), 2);
    }
}

use crate::error::ProviderError;
use crate::traits::IdeaSource;
use crate::types::{GeneratedIdea, IdeaGenerationRequest};

/// Template-based ideas with no network access. Output depends only on the
/// request, so repeated calls return identical lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicStub;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "{Industry} SaaS for {market} analytics",
        "Pattern: industry plus market pain points",
    ),
    ("{Industry} marketplace for {market}", "Two-sided network idea"),
    ("AI assistant for {market} in {industry}", "Assistive productivity"),
    (
        "Subscription service delivering {industry} essentials to {market}",
        "Recurring revenue from repeat needs",
    ),
    (
        "Online training platform teaching {market} about {industry}",
        "Digital content scales without inventory",
    ),
];

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl DeterministicStub {
    pub fn ideas(request: &IdeaGenerationRequest) -> Vec<GeneratedIdea> {
        let industry = request.industry.trim();
        let industry = if industry.is_empty() { "general" } else { industry };
        let market = request.target_market.trim();
        let market = if market.is_empty() { "small businesses" } else { market };
        let industry_title = title_case(industry);

        TEMPLATES
            .iter()
            .take(request.count.max(1))
            .map(|(template, rationale)| {
                let text = template
                    .replace("{Industry}", &industry_title)
                    .replace("{industry}", industry)
                    .replace("{market}", market);
                GeneratedIdea::new(text).with_rationale(*rationale)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl IdeaSource for DeterministicStub {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn generate(
        &self,
        request: IdeaGenerationRequest,
    ) -> Result<Vec<GeneratedIdea>, ProviderError> {
        Ok(Self::ideas(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_templates_from_request() {
        let ideas = DeterministicStub::ideas(&IdeaGenerationRequest::new("real estate", "renters"));
        assert_eq!(ideas.len(), 5);
        assert_eq!(ideas[0].text, "Real Estate SaaS for renters analytics");
        assert_eq!(ideas[2].text, "AI assistant for renters in real estate");
        assert!(ideas.iter().all(|i| i.rationale.is_some()));
    }

    #[test]
    fn count_is_capped_and_at_least_one() {
        let base = IdeaGenerationRequest::new("food", "students");
        assert_eq!(DeterministicStub::ideas(&base.clone().with_count(2)).len(), 2);
        assert_eq!(DeterministicStub::ideas(&base.clone().with_count(0)).len(), 1);
        assert_eq!(DeterministicStub::ideas(&base.with_count(50)).len(), TEMPLATES.len());
    }

    #[tokio::test]
    async fn generate_is_repeatable() {
        let req = IdeaGenerationRequest::new("healthcare", "clinics");
        let a = DeterministicStub.generate(req.clone()).await.expect("first");
        let b = DeterministicStub.generate(req).await.expect("second");
        assert_eq!(a, b);
    }
}

use feasibility_core::normalize_industry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketWindow {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
}

impl MarketWindow {
    /// Range token understood by chart-style quote APIs.
    pub const fn range(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1mo" | "one_month" => Some(Self::OneMonth),
            "3mo" | "three_months" => Some(Self::ThreeMonths),
            "6mo" | "six_months" => Some(Self::SixMonths),
            "1y" | "one_year" => Some(Self::OneYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSeriesRequest {
    pub industry_proxy: String,
    pub window: MarketWindow,
}

impl MarketSeriesRequest {
    pub fn for_industry(industry: &str, window: MarketWindow) -> Self {
        Self {
            industry_proxy: industry_proxy(industry).to_string(),
            window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRequest {
    pub industry: String,
    /// Free-text query; the industry name is used when absent.
    pub query: Option<String>,
    pub limit: usize,
}

impl NewsRequest {
    pub fn search_terms(&self) -> String {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map_or_else(|| self.industry.trim().to_string(), ToString::to_string)
    }
}

const SECTOR_PROXIES: &[(&str, &str)] = &[
    ("technology", "XLK"),
    ("software", "XLK"),
    ("healthcare", "XLV"),
    ("biotech", "XLV"),
    ("finance", "XLF"),
    ("fintech", "XLF"),
    ("consumer", "XLP"),
    ("retail", "XLP"),
    ("food", "XLP"),
    ("ecommerce", "XLP"),
    ("energy", "XLE"),
    ("sustainability", "XLE"),
    ("industrials", "XLI"),
    ("manufacturing", "XLI"),
    ("logistics", "XLI"),
    ("aerospace", "XLI"),
    ("utilities", "XLU"),
    ("materials", "XLB"),
    ("real estate", "XLRE"),
    ("communication", "XLC"),
    ("media", "XLC"),
    ("entertainment", "XLC"),
];

/// Broad-market fallback when an industry has no sector fund.
pub const DEFAULT_PROXY: &str = "SPY";

/// Sector ETF standing in for an industry's market trend.
pub fn industry_proxy(industry: &str) -> &'static str {
    let key = normalize_industry(industry);
    SECTOR_PROXIES
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(DEFAULT_PROXY, |(_, symbol)| *symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxies_follow_sector_and_fall_back_to_spy() {
        assert_eq!(industry_proxy("Technology"), "XLK");
        assert_eq!(industry_proxy("tech"), "XLK");
        assert_eq!(industry_proxy("Real-Estate"), "XLRE");
        assert_eq!(industry_proxy("underwater basket weaving"), "SPY");
    }

    #[test]
    fn search_terms_prefer_explicit_query() {
        let mut req = NewsRequest {
            industry: " healthcare ".to_string(),
            query: None,
            limit: 10,
        };
        assert_eq!(req.search_terms(), "healthcare");
        req.query = Some("telehealth startups".to_string());
        assert_eq!(req.search_terms(), "telehealth startups");
        req.query = Some("   ".to_string());
        assert_eq!(req.search_terms(), "healthcare");
    }

    #[test]
    fn window_parsing() {
        assert_eq!(MarketWindow::parse("6MO"), Some(MarketWindow::SixMonths));
        assert_eq!(MarketWindow::parse("decade"), None);
        assert_eq!(MarketWindow::default().range(), "1y");
    }
}

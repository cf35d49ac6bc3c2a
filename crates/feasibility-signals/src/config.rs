use std::time::Duration;

#[derive(Debug, Clone)]
pub struct YahooChartConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl YahooChartConfig {
    pub fn new() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("feasibility-signals/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for YahooChartConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: usize,
    pub language: String,
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://newsapi.org".to_string(),
            timeout: Duration::from_secs(10),
            page_size: 20,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum MarketDataConfig {
    YahooChart(YahooChartConfig),
}

#[derive(Debug, Clone)]
pub enum NewsConfig {
    NewsApi(NewsApiConfig),
}

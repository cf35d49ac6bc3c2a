use feasibility_core::PricePoint;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::YahooChartConfig;
use crate::error::ProviderError;
use crate::traits::MarketSeriesFetcher;
use crate::types::MarketSeriesRequest;

/// Daily closes from the public chart endpoint.
#[derive(Clone)]
pub struct YahooChartFetcher {
    config: YahooChartConfig,
    client: Client,
}

impl YahooChartFetcher {
    pub fn new(config: YahooChartConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

#[async_trait::async_trait]
impl MarketSeriesFetcher for YahooChartFetcher {
    fn name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_series(
        &self,
        request: MarketSeriesRequest,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let symbol = request.industry_proxy.trim();
        if symbol.is_empty() {
            return Err(ProviderError::Config("market proxy symbol is empty".to_string()));
        }

        let res = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", request.window.range()), ("interval", "1d")])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let parsed: ChartResponse = res.json().await?;
        let points = closes_from_chart(parsed)?;
        debug!(symbol, points = points.len(), "market series fetched");
        Ok(points)
    }
}

/// Pairs timestamps with closing prices, dropping gaps, and returns them in
/// strictly increasing time order.
fn closes_from_chart(parsed: ChartResponse) -> Result<Vec<PricePoint>, ProviderError> {
    if let Some(err) = parsed.chart.error {
        return Err(ProviderError::InvalidResponse(format!(
            "chart error {}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        )));
    }
    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut points: Vec<PricePoint> = timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            close
                .filter(|p| p.is_finite())
                .map(|price| PricePoint {
                    timestamp_ms: ts.saturating_mul(1000),
                    price,
                })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp_ms);
    points.dedup_by_key(|p| p.timestamp_ms);
    Ok(points)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_closes_and_skips_gaps() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000200, 1700000000, 1700000100],
                    "indicators": {"quote": [{"close": [103.5, 100.0, null]}]}
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(raw).expect("parse chart");
        let points = closes_from_chart(parsed).expect("points");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp_ms, 1_700_000_000_000);
        assert!((points[0].price - 100.0).abs() < f64::EPSILON);
        assert!((points[1].price - 103.5).abs() < f64::EPSILON);
    }

    #[test]
    fn chart_error_is_invalid_response() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let parsed: ChartResponse = serde_json::from_str(raw).expect("parse chart");
        let err = closes_from_chart(parsed).expect_err("chart error");
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn empty_result_is_no_data() {
        let raw = r#"{"chart":{"result":[],"error":null}}"#;
        let parsed: ChartResponse = serde_json::from_str(raw).expect("parse chart");
        assert!(closes_from_chart(parsed).expect("empty").is_empty());
    }
}

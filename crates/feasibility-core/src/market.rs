use tracing::debug;

use crate::config::ScoringConfig;
use crate::error::CoreError;
use crate::normalize::{normalize_signed, saturating_ratio};
use crate::types::{MarketOutlook, MarketSeries, SignalName, SubScore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketReading {
    pub sub_score: SubScore,
    pub outlook: MarketOutlook,
    pub simple_return: Option<f64>,
    /// Sample standard deviation of step-to-step returns. Reported only;
    /// it never feeds the risk estimate.
    pub volatility: Option<f64>,
}

impl MarketReading {
    const fn unavailable() -> Self {
        Self {
            sub_score: SubScore::unavailable(SignalName::MarketTrend),
            outlook: MarketOutlook::Neutral,
            simple_return: None,
            volatility: None,
        }
    }
}

/// `(last - first) / first` over the series.
pub fn simple_return(series: &MarketSeries) -> Result<f64, CoreError> {
    let (Some(first), Some(last)) = (series.points().first(), series.points().last()) else {
        return Err(CoreError::InvalidSeries("series is empty".to_string()));
    };
    if first.price == 0.0 {
        return Err(CoreError::DivisionUndefined);
    }
    Ok((last.price - first.price) / first.price)
}

/// Sample standard deviation of the successive simple returns. Steps from a
/// zero or non-finite price are skipped; fewer than two usable steps gives
/// `None`.
pub fn return_volatility(series: &MarketSeries) -> Option<f64> {
    let returns: Vec<f64> = series
        .points()
        .windows(2)
        .filter_map(|pair| match pair {
            [prev, next] if prev.price != 0.0 => Some((next.price - prev.price) / prev.price),
            _ => None,
        })
        .filter(|r| r.is_finite())
        .collect();
    if returns.len() < 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

pub fn market_outlook(simple_return: f64, cfg: &ScoringConfig) -> MarketOutlook {
    if simple_return < cfg.thresholds.outlook_bearish {
        MarketOutlook::Bearish
    } else if simple_return > cfg.thresholds.outlook_bullish {
        MarketOutlook::Bullish
    } else {
        MarketOutlook::Neutral
    }
}

pub fn evaluate_market(series: &MarketSeries, cfg: &ScoringConfig) -> MarketReading {
    if series.len() < 2 {
        debug!(points = series.len(), "market series too short for a trend");
        return MarketReading::unavailable();
    }

    let r = match simple_return(series) {
        Ok(r) if r.is_finite() => r,
        Ok(r) => {
            debug!(simple_return = r, "non-finite market return");
            return MarketReading::unavailable();
        }
        Err(err) => {
            debug!(error = %err, "market trend unavailable");
            return MarketReading::unavailable();
        }
    };

    let value = normalize_signed(r, cfg.saturation.market_return_scale);
    let confidence = saturating_ratio(series.len(), cfg.saturation.market_points);

    MarketReading {
        sub_score: SubScore::available(SignalName::MarketTrend, value, confidence),
        outlook: market_outlook(r, cfg),
        simple_return: Some(r),
        volatility: return_volatility(series),
    }
}

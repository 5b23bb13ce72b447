//! Yahoo Finance price provider.
//!
//! Fetches daily bars from the v8 chart API with a blocking client. Every
//! request is bounded by the configured timeout; there are no retries, so a
//! slow or failing symbol costs at most one timeout before the batch moves on.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(timeout_secs: u64) -> Result<Self, ScreenerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScreenerError::ProviderUnavailable {
                symbol: "*".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Calendar window wide enough to hold `lookback_days` trading days.
    fn chart_url(symbol: &str, end: NaiveDate, lookback_days: usize) -> String {
        let span = ChronoDuration::days(lookback_days as i64 * 2 + 7);
        let start = end - span;
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = (end + ChronoDuration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "{CHART_URL}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }
}

/// Turn a chart response into bars. Days without a close are dropped; a date
/// that appears twice keeps its last quote.
fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, ScreenerError> {
    let unavailable = |reason: String| ScreenerError::ProviderUnavailable {
        symbol: symbol.to_string(),
        reason,
    };

    let Some(result) = resp.chart.result else {
        return match resp.chart.error {
            Some(err) if err.code == "Not Found" => Err(ScreenerError::NoData {
                symbol: symbol.to_string(),
            }),
            Some(err) => Err(unavailable(format!("{}: {}", err.code, err.description))),
            None => Err(unavailable("empty result with no error".into())),
        };
    };

    let Some(data) = result.into_iter().next() else {
        return Err(ScreenerError::NoData {
            symbol: symbol.to_string(),
        });
    };
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| unavailable("no quote data".into()))?;

    let mut by_date = BTreeMap::new();
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| unavailable(format!("invalid timestamp: {}", ts)))?;

        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let open = quote.open.get(i).copied().flatten().unwrap_or(close);
        let high = quote.high.get(i).copied().flatten().unwrap_or(close);
        let low = quote.low.get(i).copied().flatten().unwrap_or(close);
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

        by_date.insert(
            date,
            PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            },
        );
    }

    Ok(by_date.into_values().collect())
}

impl DataPort for YahooAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> Result<PriceSeries, ScreenerError> {
        let unavailable = |reason: String| ScreenerError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let url = Self::chart_url(symbol, Utc::now().date_naive(), lookback_days);
        debug!(symbol, url = %url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScreenerError::NoData {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| unavailable(format!("failed to parse response: {}", e)))?;

        let bars = parse_response(symbol, chart)?;
        let skip = bars.len().saturating_sub(lookback_days);
        PriceSeries::new(bars.into_iter().skip(skip).collect()).map_err(|source| {
            ScreenerError::InvalidSeries {
                symbol: symbol.to_string(),
                source,
            }
        })
    }
}

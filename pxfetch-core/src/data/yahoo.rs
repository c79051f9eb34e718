//! Yahoo Finance data provider.
//!
//! Fetches daily bars plus dividend and split events from Yahoo's v8 chart API
//! and returns them in the provider's own row layout. One request per fetch;
//! failures are reported, never retried.
//!
//! Prices are auto-adjusted: open/high/low/close are scaled by `adjclose / close`
//! so the whole row is dividend- and split-adjusted.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use super::request::{HistoryRequest, Window};
use crate::config::YahooConfig;
use chrono::{Days, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Seconds to wait when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Yahoo Finance v8 chart API response.
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
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
    events: Option<Events>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct Events {
    dividends: Option<HashMap<String, DividendEvent>>,
    splits: Option<HashMap<String, SplitEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &YahooConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the chart API URL for a symbol and window.
    ///
    /// The exchange offset is unknown until the response arrives, so a date
    /// range is widened by a day on each side; `parse_response` trims it back
    /// to `[start, end)` in exchange-local dates.
    fn chart_url(&self, symbol: &str, window: Window) -> String {
        let span = match window {
            Window::Lookback(period) => format!("range={period}"),
            Window::Range { start, end } => {
                let start_ts = midnight_utc(start.checked_sub_days(Days::new(1)).unwrap_or(start));
                let end_ts = midnight_utc(end.checked_add_days(Days::new(1)).unwrap_or(end));
                format!("period1={start_ts}&period2={end_ts}")
            }
        };
        format!(
            "{}/{symbol}?{span}&interval=1d&events=div%2Csplits",
            self.base_url
        )
    }

    /// Parse the chart API response into RawBars, joining events onto their day.
    ///
    /// With a `Window::Range`, only bars whose exchange-local date falls in
    /// `[start, end)` are kept.
    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
        window: Window,
    ) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => DataError::Provider(format!("{}: {}", err.code, err.description)),
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A valid symbol with nothing in the window comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        };

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut dividends: HashMap<NaiveDate, f64> = HashMap::new();
        let mut splits: HashMap<NaiveDate, f64> = HashMap::new();
        if let Some(events) = data.events {
            for ev in events.dividends.into_iter().flat_map(|m| m.into_values()) {
                *dividends.entry(local_date(ev.date, offset)?).or_default() += ev.amount;
            }
            for ev in events.splits.into_iter().flat_map(|m| m.into_values()) {
                if ev.denominator == 0.0 {
                    return Err(DataError::ResponseFormatChanged(format!(
                        "split with zero denominator at {}",
                        ev.date
                    )));
                }
                splits.insert(local_date(ev.date, offset)?, ev.numerator / ev.denominator);
            }
        }

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = local_date(ts, offset)?;
            if let Window::Range { start, end } = window {
                if date < start || date >= end {
                    continue;
                }
            }

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Skip bars where all OHLCV are None (holidays/non-trading days)
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                warn!(symbol, %date, "skipping empty bar");
                continue;
            }

            let ratio = adjustment_ratio(close, adj_close);
            let scale = |v: Option<f64>| v.map_or(f64::NAN, |x| x * ratio);

            bars.push(RawBar {
                date,
                open: scale(open),
                high: scale(high),
                low: scale(low),
                close: scale(close),
                volume: volume.unwrap_or(0),
                dividends: dividends.get(&date).copied().unwrap_or(0.0),
                stock_splits: splits.get(&date).copied().unwrap_or(0.0),
            });
        }

        if bars.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, request: &HistoryRequest) -> Result<FetchResult, DataError> {
        let symbol = request.symbol.as_str();
        let window = request.window(chrono::Local::now().date_naive())?;
        let url = self.chart_url(symbol, window);
        debug!(%url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok());
        if let Some(err) = status_error(resp.status(), retry_after, symbol) {
            return Err(err);
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let bars = Self::parse_response(symbol, chart, window)?;
        debug!(symbol, rows = bars.len(), "chart parsed");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }
}

/// Map a non-success HTTP status to its error; `None` for success.
fn status_error(status: StatusCode, retry_after: Option<&str>, symbol: &str) -> Option<DataError> {
    if status.is_success() {
        return None;
    }
    let err = match status {
        StatusCode::NOT_FOUND => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        StatusCode::UNAUTHORIZED => {
            DataError::AuthenticationRequired("Yahoo Finance requires authentication".into())
        }
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        _ => DataError::Provider(format!("HTTP {status} for {symbol}")),
    };
    Some(err)
}

/// Auto-adjust factor for a row; 1.0 when either close is missing or unusable.
fn adjustment_ratio(close: Option<f64>, adj_close: Option<f64>) -> f64 {
    match (close, adj_close) {
        (Some(c), Some(a)) if c != 0.0 && c.is_finite() && a.is_finite() => a / c,
        _ => 1.0,
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Exchange-local calendar date of a UTC epoch timestamp.
fn local_date(ts: i64, gmtoffset: i64) -> Result<NaiveDate, DataError> {
    chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.naive_utc().date())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
}

//! Deterministic synthetic provider for offline runs and tests.
//!
//! Produces a simple random walk from a starting price of 100.0, seeded from the
//! symbol name so the same request always yields the same bars.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use super::request::HistoryRequest;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every this many bars the walk pays a dividend.
const DIVIDEND_EVERY: usize = 63;

/// Offline provider that fabricates plausible daily bars.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    today: NaiveDate,
}

impl SyntheticProvider {
    /// Provider whose lookback windows end on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, request: &HistoryRequest) -> Result<FetchResult, DataError> {
        let (start, end) = request.date_range(self.today)?;
        let bars = generate_bars(&request.symbol, start, end);
        if bars.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: request.symbol.clone(),
            });
        }
        Ok(FetchResult {
            symbol: request.symbol.clone(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}

/// Generate weekday bars from `start` (inclusive) up to `end` (exclusive).
pub fn generate_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;

    for current in start.iter_days().take_while(|d| *d < end) {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        let dividends = if (bars.len() + 1) % DIVIDEND_EVERY == 0 {
            (close * 0.002 * 100.0).round() / 100.0
        } else {
            0.0
        };

        bars.push(RawBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
            dividends,
            stock_splits: 0.0,
        });

        price = close;
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let a = generate_bars("SPY", d(2024, 1, 1), d(2024, 3, 31));
        let b = generate_bars("SPY", d(2024, 1, 1), d(2024, 3, 31));
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_get_different_data() {
        let spy = generate_bars("SPY", d(2024, 1, 1), d(2024, 1, 31));
        let qqq = generate_bars("QQQ", d(2024, 1, 1), d(2024, 1, 31));
        assert_ne!(spy[0].close, qqq[0].close);
    }

    #[test]
    fn end_date_is_excluded() {
        // 2024-01-05 is a Friday
        let bars = generate_bars("AAPL", d(2024, 1, 1), d(2024, 1, 5));
        assert_eq!(bars.len(), 4);
        assert_eq!(bars.last().unwrap().date, d(2024, 1, 4));
    }

    #[test]
    fn skips_weekends_and_keeps_order() {
        let bars = generate_bars("AAPL", d(2024, 1, 1), d(2024, 1, 14));
        assert_eq!(bars.len(), 10);
        for w in bars.windows(2) {
            assert!(w[0].date < w[1].date);
        }
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn pays_periodic_dividends() {
        let bars = generate_bars("AAPL", d(2024, 1, 1), d(2024, 12, 31));
        let paying = bars.iter().filter(|b| b.dividends > 0.0).count();
        assert_eq!(paying, bars.len() / DIVIDEND_EVERY);
    }

    #[test]
    fn weekend_only_window_is_empty_result() {
        let provider = SyntheticProvider::new(d(2024, 6, 30));
        let req = HistoryRequest::new("AAPL")
            .unwrap()
            .with_start(d(2024, 6, 29))
            .with_end(d(2024, 7, 1));
        assert!(matches!(
            provider.fetch(&req),
            Err(DataError::EmptyResult { .. })
        ));
    }
}

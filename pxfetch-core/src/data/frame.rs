//! Price history as a polars DataFrame, and the reshape into the export layout.
//!
//! Provider layout: `Date, Open, High, Low, Close, Volume, Dividends, Stock Splits`
//! Export layout:   `Date, Open, High, Low, Close, Adj Close, Volume`
//!
//! Providers hand over prices that are already dividend/split adjusted, so
//! `Adj Close` in the export is a copy of `Close`. Downstream readers rely on
//! this layout.

use super::provider::{DataError, RawBar};
use chrono::NaiveDate;
use polars::prelude::*;

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const ADJ_CLOSE: &str = "Adj Close";
pub const VOLUME: &str = "Volume";
pub const DIVIDENDS: &str = "Dividends";
pub const STOCK_SPLITS: &str = "Stock Splits";

/// Column order of a freshly fetched history.
pub const PROVIDER_COLUMNS: [&str; 8] = [
    DATE,
    OPEN,
    HIGH,
    LOW,
    CLOSE,
    VOLUME,
    DIVIDENDS,
    STOCK_SPLITS,
];

/// Column order of the exported file.
pub const EXPORT_COLUMNS: [&str; 7] = [DATE, OPEN, HIGH, LOW, CLOSE, ADJ_CLOSE, VOLUME];

/// Convert raw bars to a DataFrame in provider layout.
pub fn history_frame(bars: &[RawBar]) -> Result<DataFrame, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| DataError::Frame("epoch date out of range".into()))?;
    let dates = bars
        .iter()
        .map(|b| {
            i32::try_from((b.date - epoch).num_days())
                .map_err(|_| DataError::Frame(format!("date out of range: {}", b.date)))
        })
        .collect::<Result<Vec<i32>, _>>()?;
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();
    let dividends: Vec<f64> = bars.iter().map(|b| b.dividends).collect();
    let splits: Vec<f64> = bars.iter().map(|b| b.stock_splits).collect();

    let df = DataFrame::new(vec![
        Column::new(DATE.into(), dates).cast(&DataType::Date)?,
        Column::new(OPEN.into(), opens),
        Column::new(HIGH.into(), highs),
        Column::new(LOW.into(), lows),
        Column::new(CLOSE.into(), closes),
        Column::new(VOLUME.into(), volumes),
        Column::new(DIVIDENDS.into(), dividends),
        Column::new(STOCK_SPLITS.into(), splits),
    ])?;
    Ok(df)
}

/// Reshape a provider-layout frame into the export layout.
///
/// Volume is set aside, the corporate-action columns and Volume are dropped,
/// then `Adj Close` (a copy of `Close`) and the saved Volume are appended.
pub fn reshape_for_export(history: DataFrame) -> Result<DataFrame, DataError> {
    let volume = history.column(VOLUME)?.clone();

    let mut df = history.drop(STOCK_SPLITS)?.drop(DIVIDENDS)?.drop(VOLUME)?;

    let adj_close = df.column(CLOSE)?.clone().with_name(ADJ_CLOSE.into());
    df.with_column(adj_close)?;
    df.with_column(volume)?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bars() -> Vec<RawBar> {
        vec![
            RawBar {
                date: NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
                open: 414.0,
                high: 417.5,
                low: 411.1,
                close: 413.7,
                volume: 15_440_200,
                dividends: 0.0,
                stock_splits: 0.0,
            },
            RawBar {
                date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                open: 412.0,
                high: 416.9,
                low: 410.2,
                close: 416.6,
                volume: 15_109_300,
                dividends: 0.75,
                stock_splits: 0.0,
            },
        ]
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    #[test]
    fn history_frame_has_provider_layout() {
        let df = history_frame(&sample_bars()).unwrap();
        assert_eq!(names(&df), PROVIDER_COLUMNS);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column(DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn reshape_produces_export_layout() {
        let df = reshape_for_export(history_frame(&sample_bars()).unwrap()).unwrap();
        assert_eq!(names(&df), EXPORT_COLUMNS);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn adj_close_duplicates_close() {
        let df = reshape_for_export(history_frame(&sample_bars()).unwrap()).unwrap();
        let close: Vec<Option<f64>> = df.column(CLOSE).unwrap().f64().unwrap().into_iter().collect();
        let adj: Vec<Option<f64>> = df
            .column(ADJ_CLOSE)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(close, adj);
    }

    #[test]
    fn volume_survives_the_drop() {
        let df = reshape_for_export(history_frame(&sample_bars()).unwrap()).unwrap();
        let vol: Vec<Option<u64>> = df.column(VOLUME).unwrap().u64().unwrap().into_iter().collect();
        assert_eq!(vol, vec![Some(15_440_200), Some(15_109_300)]);
    }

    #[test]
    fn reshape_requires_provider_columns() {
        let df = history_frame(&sample_bars()).unwrap().drop(DIVIDENDS).unwrap();
        assert!(matches!(reshape_for_export(df), Err(DataError::Frame(_))));
    }
}

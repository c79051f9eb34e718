//! Read an exported file back into typed rows.

use super::frame::EXPORT_COLUMNS;
use super::provider::DataError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One exported trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Adj Close")]
    pub adj_close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

/// An export file loaded into memory, oldest row first.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub path: PathBuf,
    pub rows: Vec<PriceRow>,
}

impl PriceHistory {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows from `start` through `end` inclusive. Both dates must be trading days
    /// present in the file.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<&[PriceRow], DataError> {
        let find = |date: NaiveDate| {
            self.rows
                .iter()
                .position(|r| r.date == date)
                .ok_or_else(|| DataError::InvalidRequest(format!("date {date} not found")))
        };
        let start_idx = find(start)?;
        let end_idx = find(end)?;
        if start_idx > end_idx {
            return Err(DataError::InvalidRequest(
                "start date must be before end date".into(),
            ));
        }
        Ok(&self.rows[start_idx..=end_idx])
    }
}

/// Load an export written by [`export_history`](super::export::export_history).
pub fn load_export(path: &Path) -> Result<PriceHistory, DataError> {
    let parse_err = |reason: String| DataError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| match e.kind() {
        csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            DataError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
        _ => parse_err(e.to_string()),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| parse_err(format!("header: {e}")))?;
    if headers.iter().ne(EXPORT_COLUMNS) {
        return Err(parse_err(format!(
            "unexpected header '{}', expected '{}'",
            headers.iter().collect::<Vec<_>>().join(","),
            EXPORT_COLUMNS.join(",")
        )));
    }

    let rows = reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| parse_err(format!("row {}: {e}", i + 1))))
        .collect::<Result<Vec<PriceRow>, _>>()?;

    Ok(PriceHistory {
        path: path.to_path_buf(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-05-13,414.0,417.5,411.1,413.7,413.7,15440200
2024-05-14,412.0,416.9,410.2,416.6,416.6,15109300
2024-05-15,417.9,423.8,417.3,423.1,423.1,22239500
";

    fn write_sample(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("MSFT.csv");
        fs::write(&path, body).unwrap();
        path
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn loads_rows() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_export(&write_sample(dir.path(), SAMPLE)).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.rows[0].date, d(13));
        assert_eq!(history.rows[2].volume, 22_239_500);
        assert_eq!(history.rows[1].adj_close, 416.6);
    }

    #[test]
    fn rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(
            dir.path(),
            "Date,Open,High,Low,Close,Volume,Dividends,Stock Splits\n",
        );
        assert!(matches!(load_export(&path), Err(DataError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_export(&dir.path().join("NONE.csv")),
            Err(DataError::FileNotFound { .. })
        ));
    }

    #[test]
    fn between_slices_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_export(&write_sample(dir.path(), SAMPLE)).unwrap();
        let rows = history.between(d(13), d(14)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].date, d(14));
    }

    #[test]
    fn between_rejects_unknown_or_inverted_dates() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_export(&write_sample(dir.path(), SAMPLE)).unwrap();
        assert!(history.between(d(12), d(14)).is_err());
        assert!(history.between(d(15), d(13)).is_err());
    }
}

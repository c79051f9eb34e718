//! Fetch-and-export and delete: the two filesystem-facing operations.
//!
//! Export writes `{out_dir}/{SYMBOL}.csv`. Writes are atomic (write to .tmp,
//! rename into place); an existing export for the same symbol is overwritten.

use super::frame::{history_frame, reshape_for_export};
use super::provider::{DataError, DataProvider, DataSource};
use super::request::HistoryRequest;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a successful export produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub symbol: String,
    pub path: PathBuf,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub source: DataSource,
}

impl ExportSummary {
    /// Bare file name of the export, e.g. `AAPL.csv`.
    pub fn file_name(&self) -> String {
        export_filename(&self.symbol)
    }
}

/// File name an export for `symbol` is written under.
pub fn export_filename(symbol: &str) -> String {
    format!("{symbol}.csv")
}

/// Fetch a history, reshape it into the export layout and write it to `out_dir`.
pub fn export_history(
    provider: &dyn DataProvider,
    request: &HistoryRequest,
    out_dir: &Path,
) -> Result<ExportSummary, DataError> {
    let fetched = provider.fetch(request)?;

    let (Some(first), Some(last)) = (fetched.bars.first(), fetched.bars.last()) else {
        return Err(DataError::EmptyResult {
            symbol: request.symbol.clone(),
        });
    };
    let (first_date, last_date) = (first.date, last.date);

    let history = history_frame(&fetched.bars)?;
    let mut export = reshape_for_export(history)?;

    fs::create_dir_all(out_dir).map_err(|e| DataError::FileWrite {
        path: out_dir.to_path_buf(),
        reason: format!("failed to create dir: {e}"),
    })?;
    let path = out_dir.join(export_filename(&request.symbol));
    write_csv(&mut export, &path)?;

    info!(
        symbol = %request.symbol,
        provider = provider.name(),
        rows = export.height(),
        path = %path.display(),
        "exported price history"
    );

    Ok(ExportSummary {
        symbol: request.symbol.clone(),
        path,
        rows: export.height(),
        first_date,
        last_date,
        source: fetched.source,
    })
}

/// Write a DataFrame as comma-delimited text with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let write_err = |reason: String| DataError::FileWrite {
        path: path.to_path_buf(),
        reason,
    };

    let tmp_path = path.with_extension("csv.tmp");
    let mut file =
        fs::File::create(&tmp_path).map_err(|e| write_err(format!("create file: {e}")))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| write_err(format!("write csv: {e}")))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        write_err(format!("atomic rename failed: {e}"))
    })
}

/// Remove an export file.
pub fn delete_export(path: &Path) -> Result<(), DataError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "removed file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(DataError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(DataError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::SyntheticProvider;

    fn request(symbol: &str) -> HistoryRequest {
        HistoryRequest::new(symbol)
            .unwrap()
            .with_start(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .with_end(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
    }

    #[test]
    fn export_file_is_named_after_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SyntheticProvider::default();

        let summary = export_history(&provider, &request("msft"), dir.path()).unwrap();

        assert_eq!(summary.symbol, "MSFT");
        assert_eq!(summary.file_name(), "MSFT.csv");
        assert_eq!(summary.path, dir.path().join("MSFT.csv"));
        assert!(summary.path.exists());
        assert!(!dir.path().join("MSFT.csv.tmp").exists());
        assert_eq!(summary.rows, 23);
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(summary.source, DataSource::Synthetic);
    }

    #[test]
    fn export_header_matches_layout() {
        let dir = tempfile::tempdir().unwrap();
        let summary =
            export_history(&SyntheticProvider::default(), &request("SPY"), dir.path()).unwrap();

        let content = fs::read_to_string(&summary.path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, "Date,Open,High,Low,Close,Adj Close,Volume");
        assert!(content.lines().nth(1).unwrap().starts_with("2024-01-01,"));
    }

    #[test]
    fn export_creates_missing_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let summary =
            export_history(&SyntheticProvider::default(), &request("QQQ"), &nested).unwrap();
        assert!(summary.path.starts_with(&nested));
    }

    #[test]
    fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let summary =
            export_history(&SyntheticProvider::default(), &request("IBM"), dir.path()).unwrap();

        delete_export(&summary.path).unwrap();
        assert!(!summary.path.exists());
    }

    #[test]
    fn delete_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = delete_export(&dir.path().join("NOPE.csv")).unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }

    #[test]
    fn delete_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = delete_export(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}

//! CSV file series provider.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with a header row. The date
//! column is `date` (any case); the value column is `close`, falling back to
//! `adj close` / `adj_close` when no close column is present.

use crate::domain::error::AnalyticsError;
use crate::domain::series::RawObservation;
use crate::ports::data_port::SeriesProvider;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Path of the file backing `ticker`. File stems match case-insensitively,
    /// so `aapl.csv` serves `AAPL`.
    fn csv_path(&self, ticker: &str) -> Option<PathBuf> {
        let exact = self.base_path.join(format!("{}.csv", ticker));
        if exact.is_file() {
            return Some(exact);
        }
        fs::read_dir(&self.base_path)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == "csv")
                    && path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .is_some_and(|stem| stem.eq_ignore_ascii_case(ticker))
            })
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace(['_', ' '], "")
}

fn find_columns(headers: &csv::StringRecord) -> Result<(usize, usize), AnalyticsError> {
    let names: Vec<String> = headers.iter().map(normalize_header).collect();
    let date_col = names
        .iter()
        .position(|h| h == "date")
        .ok_or_else(|| AnalyticsError::DataSource {
            reason: "missing date column".into(),
        })?;
    let value_col = names
        .iter()
        .position(|h| h == "close")
        .or_else(|| names.iter().position(|h| h == "adjclose"))
        .ok_or_else(|| AnalyticsError::DataSource {
            reason: "missing close column".into(),
        })?;
    Ok((date_col, value_col))
}

/// Empty or unparsable cells become NaN and are handled by preprocessing.
fn parse_value(cell: Option<&str>) -> f64 {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

impl SeriesProvider for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, AnalyticsError> {
        let path = self
            .csv_path(ticker)
            .ok_or_else(|| AnalyticsError::UnknownTicker {
                ticker: ticker.to_string(),
                suggestions: Vec::new(),
            })?;
        let content = fs::read_to_string(&path).map_err(|e| AnalyticsError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| AnalyticsError::DataSource {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let (date_col, value_col) = find_columns(&headers)?;

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| AnalyticsError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = match NaiveDate::parse_from_str(date_str, DATE_FORMAT) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(ticker, row = i + 2, date = date_str, "skipping row: {}", e);
                    continue;
                }
            };

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            rows.push(RawObservation {
                date,
                value: parse_value(record.get(value_col)),
            });
        }

        tracing::debug!(ticker, rows = rows.len(), path = %path.display(), "loaded prices");
        Ok(rows)
    }

    fn list_tickers(&self) -> Result<Vec<String>, AnalyticsError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| AnalyticsError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AnalyticsError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_uppercase());
            }
        }

        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}

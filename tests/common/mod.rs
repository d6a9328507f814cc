#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stockscope::domain::error::AnalyticsError;
pub use stockscope::domain::series::RawObservation;
use stockscope::ports::data_port::SeriesProvider;

pub struct MockSeriesProvider {
    pub data: HashMap<String, Vec<RawObservation>>,
    pub errors: HashMap<String, String>,
}

impl MockSeriesProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_rows(mut self, ticker: &str, rows: Vec<RawObservation>) -> Self {
        self.data.insert(ticker.to_string(), rows);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl SeriesProvider for MockSeriesProvider {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, AnalyticsError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AnalyticsError::DataSource {
                reason: reason.clone(),
            });
        }
        let rows = self
            .data
            .get(ticker)
            .ok_or_else(|| AnalyticsError::UnknownTicker {
                ticker: ticker.to_string(),
                suggestions: Vec::new(),
            })?;
        Ok(rows
            .iter()
            .filter(|r| start_date.is_none_or(|s| r.date >= s))
            .filter(|r| end_date.is_none_or(|e| r.date <= e))
            .cloned()
            .collect())
    }

    fn list_tickers(&self) -> Result<Vec<String>, AnalyticsError> {
        let mut tickers: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily rows starting 2024-01-01.
pub fn daily_rows(values: &[f64]) -> Vec<RawObservation> {
    let start = date(2024, 1, 1);
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| RawObservation {
            date: start + chrono::Duration::days(i as i64),
            value,
        })
        .collect()
}

pub fn csv_text(rows: &[RawObservation]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for r in rows {
        out.push_str(&format!(
            "{},{v},{v},{v},{v},1000\n",
            r.date,
            v = r.value
        ));
    }
    out
}

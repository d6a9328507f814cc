//! Monthly macro (CPI) records in `MMYY,actual,forecast` form.
//!
//! Loading is line-tolerant: a malformed line is recorded as skipped and the
//! rest of the file still loads.

use crate::domain::error::AnalyticsError;
use crate::domain::series::{preprocess, RawObservation, Series};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct MacroRecord {
    pub date: NaiveDate,
    pub code: String,
    pub actual: f64,
    pub forecast: f64,
}

impl MacroRecord {
    /// Actual minus forecast.
    pub fn surprise(&self) -> f64 {
        self.actual - self.forecast
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacroLoad {
    pub records: Vec<MacroRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl MacroLoad {
    /// Keep records whose month falls inside `start..=end`; either bound may
    /// be open.
    pub fn retain_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.records
            .retain(|r| start.is_none_or(|s| r.date >= s) && end.is_none_or(|e| r.date <= e));
    }

    pub fn actual_series(&self) -> Result<Series, AnalyticsError> {
        let raw = self
            .records
            .iter()
            .map(|r| RawObservation {
                date: r.date,
                value: r.actual,
            })
            .collect();
        preprocess(raw, 1)
    }
}

fn malformed(line: &str, reason: impl Into<String>) -> AnalyticsError {
    AnalyticsError::MalformedRecord {
        line: line.to_string(),
        reason: reason.into(),
    }
}

/// `"0324"` is March 2024, returned as the first of the month.
pub fn parse_mmyy(code: &str) -> Result<NaiveDate, AnalyticsError> {
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed(code, "date code must be four digits MMYY"));
    }
    let month: u32 = code[..2]
        .parse()
        .map_err(|_| malformed(code, "invalid month"))?;
    let year: i32 = code[2..]
        .parse()
        .map_err(|_| malformed(code, "invalid year"))?;
    NaiveDate::from_ymd_opt(2000 + year, month, 1)
        .ok_or_else(|| malformed(code, format!("month {} out of range", month)))
}

/// `NaN` and `inf` parse as f64 but are rejected like any other bad number.
fn parse_value(line: &str, field: &str, raw: &str) -> Result<f64, AnalyticsError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(malformed(line, format!("invalid {} value '{}'", field, raw))),
    }
}

pub fn parse_record(line: &str) -> Result<MacroRecord, AnalyticsError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let [code, actual, forecast] = fields.as_slice() else {
        return Err(malformed(
            line,
            format!("expected 3 fields, found {}", fields.len()),
        ));
    };

    let date = parse_mmyy(code).map_err(|e| match e {
        AnalyticsError::MalformedRecord { reason, .. } => malformed(line, reason),
        other => other,
    })?;
    let actual = parse_value(line, "actual", actual)?;
    let forecast = parse_value(line, "forecast", forecast)?;

    Ok(MacroRecord {
        date,
        code: code.to_string(),
        actual,
        forecast,
    })
}

pub fn parse_records(text: &str) -> MacroLoad {
    let mut load = MacroLoad::default();

    for (i, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        match parse_record(raw) {
            Ok(record) => load.records.push(record),
            Err(e) => load.skipped.push(SkippedLine {
                line_number: i + 1,
                reason: e.to_string(),
            }),
        }
    }

    load.records.sort_by_key(|r| r.date);
    load
}

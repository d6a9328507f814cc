//! Configuration validation.
//!
//! Checks every analytics setting before a run starts.

use crate::domain::error::AnalyticsError;
use crate::domain::segmentation::TieBreak;
use crate::domain::ticker::parse_allocation;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const MIN_STARTING_BALANCE: f64 = 1_000.0;
pub const MAX_STARTING_BALANCE: f64 = 10_000_000.0;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    validate_sma(config)?;
    validate_classifier(config)?;
    validate_tie_break(config)?;
    validate_portfolio(config)?;
    validate_fuzzy(config)?;
    Ok(())
}

fn validate_sma(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if config.get_int("sma", "window", 5) < 1 {
        return Err(AnalyticsError::config_invalid(
            "sma",
            "window",
            "window must be at least 1",
        ));
    }
    if config.get_int("sma", "resync_every", 0) < 0 {
        return Err(AnalyticsError::config_invalid(
            "sma",
            "resync_every",
            "resync_every must be non-negative",
        ));
    }
    Ok(())
}

fn validate_classifier(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    let tolerance = config.get_double("classifier", "tolerance", 1e-4);
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(AnalyticsError::config_invalid(
            "classifier",
            "tolerance",
            "tolerance must be non-negative",
        ));
    }
    if let Some(raw) = config.get_string("classifier", "horizons") {
        parse_horizons(&raw)
            .map_err(|reason| AnalyticsError::config_invalid("classifier", "horizons", reason))?;
    }
    Ok(())
}

fn validate_tie_break(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if let Some(raw) = config.get_string("trends", "tie_break") {
        raw.parse::<TieBreak>()
            .map_err(|reason| AnalyticsError::config_invalid("trends", "tie_break", reason))?;
    }
    Ok(())
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    let balance = config.get_double("portfolio", "starting_balance", 100_000.0);
    if !(MIN_STARTING_BALANCE..=MAX_STARTING_BALANCE).contains(&balance) {
        return Err(AnalyticsError::config_invalid(
            "portfolio",
            "starting_balance",
            format!(
                "starting_balance must be between {} and {}",
                MIN_STARTING_BALANCE, MAX_STARTING_BALANCE
            ),
        ));
    }

    if let Some(raw) = config.get_string("portfolio", "allocation") {
        parse_allocation(&raw).map_err(|e| {
            AnalyticsError::config_invalid("portfolio", "allocation", e.to_string())
        })?;
    }

    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(AnalyticsError::config_invalid(
                "portfolio",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

fn validate_fuzzy(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if config.get_int("fuzzy", "max_distance", 3) < 1 {
        return Err(AnalyticsError::config_invalid(
            "fuzzy",
            "max_distance",
            "max_distance must be at least 1",
        ));
    }
    Ok(())
}

/// Parse `3, 6, 12` into positive horizons.
pub fn parse_horizons(raw: &str) -> Result<Vec<usize>, String> {
    let horizons: Vec<usize> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(h) if h > 0 => Ok(h),
            _ => Err(format!("invalid horizon '{}'", s)),
        })
        .collect::<Result<_, _>>()?;
    if horizons.is_empty() {
        return Err("at least one horizon is required".to_string());
    }
    Ok(horizons)
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, AnalyticsError> {
    match config.get_string("portfolio", field) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AnalyticsError::config_invalid(
                    "portfolio",
                    field,
                    format!("invalid {} format, expected YYYY-MM-DD", field),
                )
            }),
    }
}

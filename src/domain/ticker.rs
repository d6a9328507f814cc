//! Ticker input parsing and lookup.
//!
//! Parses user-entered tickers and `TICKER:PERCENT` allocations, and resolves
//! a ticker against the known symbol list. Unknown tickers come
//! back with fuzzy suggestions attached.

use crate::domain::error::AnalyticsError;
use crate::domain::fuzzy::suggest;
use crate::domain::portfolio::PortfolioAllocation;

fn is_ticker_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-')
}

pub fn parse_ticker(input: &str) -> Result<String, AnalyticsError> {
    let ticker = input.trim().to_uppercase();
    if ticker.is_empty() || !ticker.chars().all(is_ticker_char) {
        return Err(AnalyticsError::UnknownTicker {
            ticker,
            suggestions: Vec::new(),
        });
    }
    Ok(ticker)
}

/// Parse `AAPL:40, TSLA:60` into an allocation of whole-percent weights.
pub fn parse_allocation(input: &str) -> Result<PortfolioAllocation, AnalyticsError> {
    let mut entries: Vec<(String, u32)> = Vec::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (ticker, pct) = token.split_once(':').ok_or_else(|| {
            AnalyticsError::invalid_allocation(format!("expected TICKER:PERCENT, got '{}'", token))
        })?;
        let pct: u32 = pct.trim().parse().map_err(|_| {
            AnalyticsError::invalid_allocation(format!("invalid percentage in '{}'", token))
        })?;
        if pct > 100 {
            return Err(AnalyticsError::invalid_allocation(format!(
                "percentage in '{}' exceeds 100",
                token
            )));
        }
        entries.push((parse_ticker(ticker)?, pct));
    }

    let borrowed: Vec<(&str, u32)> = entries.iter().map(|(t, w)| (t.as_str(), *w)).collect();
    PortfolioAllocation::from_percentages(&borrowed)
}

/// Return the parsed ticker if it is known, otherwise an `UnknownTicker` error
/// carrying the known symbols within `max_distance` edits.
pub fn resolve_ticker<S: AsRef<str>>(
    input: &str,
    known: &[S],
    max_distance: usize,
) -> Result<String, AnalyticsError> {
    let ticker = match parse_ticker(input) {
        Ok(t) => t,
        Err(_) => {
            return Err(AnalyticsError::UnknownTicker {
                ticker: input.trim().to_uppercase(),
                suggestions: suggest(input, known, max_distance),
            });
        }
    };

    if known.iter().any(|k| k.as_ref() == ticker) {
        return Ok(ticker);
    }

    Err(AnalyticsError::UnknownTicker {
        suggestions: suggest(&ticker, known, max_distance),
        ticker,
    })
}

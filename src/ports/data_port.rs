//! Series provider port.

use crate::domain::error::AnalyticsError;
use crate::domain::series::RawObservation;
use chrono::NaiveDate;

/// Source of already-fetched price observations.
///
/// Implementations return rows as stored; ordering, de-duplication and gap
/// trimming happen in [`crate::domain::series::preprocess`]. An unknown ticker
/// should be reported as `AnalyticsError::UnknownTicker`.
pub trait SeriesProvider {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, AnalyticsError>;

    fn list_tickers(&self) -> Result<Vec<String>, AnalyticsError>;
}

//! Request-level analytics: preprocess raw rows, then run one engine.
//!
//! These functions are what a presentation layer calls. Each takes the rows a
//! [`SeriesProvider`](crate::ports::data_port::SeriesProvider) returned plus
//! the user's parameters, and returns a structured result.

use crate::domain::classifier::{
    classify_horizons, ClassificationResult, DEFAULT_HORIZONS, DEFAULT_SLOPE_TOLERANCE,
};
use crate::domain::error::AnalyticsError;
use crate::domain::fuzzy::DEFAULT_MAX_DISTANCE;
use crate::domain::portfolio::{aggregate, PortfolioAllocation, PortfolioSimulation};
use crate::domain::profit::{maximize_series_profit, ProfitPlan};
use crate::domain::segmentation::{longest_trends, segment, TieBreak, TrendSegment};
use crate::domain::series::{preprocess, RawObservation, Series};
use crate::domain::sma::{compute_sma_with_resync, SmaSnapshot};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const DEFAULT_SMA_WINDOW: usize = 5;
pub const DEFAULT_STARTING_BALANCE: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub sma_window: usize,
    pub sma_resync_every: Option<usize>,
    pub slope_tolerance: f64,
    pub horizons: Vec<usize>,
    pub tie_break: TieBreak,
    pub starting_balance: f64,
    pub max_distance: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sma_window: DEFAULT_SMA_WINDOW,
            sma_resync_every: None,
            slope_tolerance: DEFAULT_SLOPE_TOLERANCE,
            horizons: DEFAULT_HORIZONS.to_vec(),
            tie_break: TieBreak::First,
            starting_balance: DEFAULT_STARTING_BALANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmaReport {
    pub series: Series,
    pub sma: Vec<Option<f64>>,
    pub snapshot: Option<SmaSnapshot>,
}

pub fn run_sma(
    raw: Vec<RawObservation>,
    window: usize,
    resync_every: Option<usize>,
) -> Result<SmaReport, AnalyticsError> {
    let series = preprocess(raw, window)?;
    let values = series.values();
    let sma = compute_sma_with_resync(&values, window, resync_every)?;
    let snapshot = SmaSnapshot::latest(&values, &sma, window);
    Ok(SmaReport {
        series,
        sma,
        snapshot,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub series: Series,
    pub segments: Vec<TrendSegment>,
    pub longest_up: Option<TrendSegment>,
    pub longest_down: Option<TrendSegment>,
}

pub fn run_trends(
    raw: Vec<RawObservation>,
    tie_break: TieBreak,
) -> Result<TrendReport, AnalyticsError> {
    let series = preprocess(raw, 1)?;
    let segments = segment(&series.values());
    let longest = longest_trends(&segments, tie_break);
    let longest_up = longest.up.cloned();
    let longest_down = longest.down.cloned();
    Ok(TrendReport {
        series,
        segments,
        longest_up,
        longest_down,
    })
}

pub fn run_profit(raw: Vec<RawObservation>) -> Result<(Series, ProfitPlan), AnalyticsError> {
    let series = preprocess(raw, 1)?;
    let plan = maximize_series_profit(&series)?;
    Ok((series, plan))
}

pub fn run_classification(
    series: &Series,
    horizons: &[usize],
    tolerance: f64,
) -> Vec<ClassificationResult> {
    classify_horizons(&series.values(), horizons, tolerance)
}

pub fn run_portfolio(
    raw_by_ticker: BTreeMap<String, Vec<RawObservation>>,
    allocation: &PortfolioAllocation,
    starting_balance: f64,
) -> Result<PortfolioSimulation, AnalyticsError> {
    let mut prices = BTreeMap::new();
    for (ticker, raw) in raw_by_ticker {
        prices.insert(ticker, preprocess(raw, 2)?);
    }
    aggregate(&prices, allocation, starting_balance)
}

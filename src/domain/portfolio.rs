//! Weighted portfolio returns and compounded value curve.

use crate::domain::error::AnalyticsError;
use crate::domain::series::Series;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Absolute slack allowed when checking that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Ticker weights in insertion order. Weights are in (0, 1] and sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioAllocation {
    entries: Vec<(String, f64)>,
}

impl PortfolioAllocation {
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self, AnalyticsError> {
        if entries.is_empty() {
            return Err(AnalyticsError::invalid_allocation("no tickers allocated"));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());
        for (ticker, weight) in entries {
            let ticker = ticker.trim().to_uppercase();
            if ticker.is_empty() {
                return Err(AnalyticsError::invalid_allocation("empty ticker"));
            }
            if !seen.insert(ticker.clone()) {
                return Err(AnalyticsError::invalid_allocation(format!(
                    "duplicate ticker {}",
                    ticker
                )));
            }
            if !(weight.is_finite() && weight > 0.0 && weight <= 1.0) {
                return Err(AnalyticsError::invalid_allocation(format!(
                    "weight for {} must be in (0, 1], got {}",
                    ticker, weight
                )));
            }
            normalized.push((ticker, weight));
        }

        let total: f64 = normalized.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalyticsError::invalid_allocation(format!(
                "weights sum to {:.1}%, expected 100%",
                total * 100.0
            )));
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// Build from whole-percent weights. Entries with an empty ticker or a
    /// zero weight are dropped before validation.
    pub fn from_percentages(entries: &[(&str, u32)]) -> Result<Self, AnalyticsError> {
        let total: u64 = entries
            .iter()
            .filter(|(t, w)| !t.trim().is_empty() && *w > 0)
            .map(|(_, w)| u64::from(*w))
            .sum();
        if total != 100 {
            return Err(AnalyticsError::invalid_allocation(format!(
                "weights sum to {}%, expected 100%",
                total
            )));
        }

        Self::new(
            entries
                .iter()
                .filter(|(t, w)| !t.trim().is_empty() && *w > 0)
                .map(|(t, w)| (t.to_string(), *w as f64 / 100.0))
                .collect(),
        )
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, w)| *w)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioPoint {
    pub date: NaiveDate,
    pub portfolio_return: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStats {
    pub mean_return: f64,
    pub std_dev: f64,
    pub total_return: f64,
    pub final_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSimulation {
    pub starting_balance: f64,
    pub points: Vec<PortfolioPoint>,
    pub stats: PortfolioStats,
}

impl PortfolioSimulation {
    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.portfolio_return).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Simple returns keyed by the date of the later observation.
pub fn simple_returns(series: &Series) -> Result<HashMap<NaiveDate, f64>, AnalyticsError> {
    let points = series.points();
    let mut returns = HashMap::with_capacity(points.len().saturating_sub(1));
    for (i, w) in points.windows(2).enumerate() {
        let r = w[1].value / w[0].value - 1.0;
        if !r.is_finite() {
            return Err(AnalyticsError::NonFiniteInput { index: i + 1 });
        }
        returns.insert(w[1].date, r);
    }
    Ok(returns)
}

pub fn aggregate(
    prices_by_ticker: &BTreeMap<String, Series>,
    allocation: &PortfolioAllocation,
    starting_balance: f64,
) -> Result<PortfolioSimulation, AnalyticsError> {
    if !(starting_balance.is_finite() && starting_balance > 0.0) {
        return Err(AnalyticsError::invalid_allocation(format!(
            "starting balance must be positive, got {}",
            starting_balance
        )));
    }

    let mut asset_returns = Vec::with_capacity(allocation.len());
    for (ticker, weight) in allocation.entries() {
        let series = prices_by_ticker.get(ticker).ok_or_else(|| {
            AnalyticsError::invalid_allocation(format!("no price series for {}", ticker))
        })?;
        asset_returns.push((*weight, simple_returns(series)?));
    }

    // Dates where every asset has a defined return.
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for (_, returns) in &asset_returns {
        let dates: BTreeSet<NaiveDate> = returns.keys().copied().collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }
    let timeline = common.unwrap_or_default();
    if timeline.is_empty() {
        return Err(AnalyticsError::InsufficientData { have: 0, need: 1 });
    }

    let mut points = Vec::with_capacity(timeline.len());
    let mut value = starting_balance;
    for date in timeline {
        let portfolio_return: f64 = asset_returns
            .iter()
            .map(|(weight, returns)| weight * returns[&date])
            .sum();
        value *= 1.0 + portfolio_return;
        points.push(PortfolioPoint {
            date,
            portfolio_return,
            value,
        });
    }

    let stats = compute_stats(&points);
    Ok(PortfolioSimulation {
        starting_balance,
        points,
        stats,
    })
}

fn compute_stats(points: &[PortfolioPoint]) -> PortfolioStats {
    let n = points.len() as f64;
    let mean_return = points.iter().map(|p| p.portfolio_return).sum::<f64>() / n;

    let std_dev = if points.len() > 1 {
        let var = points
            .iter()
            .map(|p| (p.portfolio_return - mean_return).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        var.sqrt()
    } else {
        0.0
    };

    let first = points.first().map(|p| p.value).unwrap_or(0.0);
    let final_value = points.last().map(|p| p.value).unwrap_or(0.0);
    let total_return = if first > 0.0 {
        final_value / first - 1.0
    } else {
        0.0
    };

    PortfolioStats {
        mean_return,
        std_dev,
        total_return,
        final_value,
    }
}

//! Unlimited-transaction profit optimizer.
//!
//! Valley-then-peak scan: skip while the price is non-increasing to find a
//! buy, then ride while it is non-decreasing to find the sell. The result
//! equals the sum of all positive day-over-day deltas, which is optimal when
//! transactions are free and positions cannot overlap.

use crate::domain::error::AnalyticsError;
use crate::domain::series::Series;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub buy_index: usize,
    pub buy_date: NaiveDate,
    pub buy_price: f64,
    pub sell_index: usize,
    pub sell_date: NaiveDate,
    pub sell_price: f64,
}

impl Trade {
    pub fn profit(&self) -> f64 {
        self.sell_price - self.buy_price
    }

    pub fn holding_days(&self) -> i64 {
        (self.sell_date - self.buy_date).num_days()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfitPlan {
    pub total_profit: f64,
    pub trades: Vec<Trade>,
}

/// Buy/sell index pairs with `sell > buy` in price.
fn valley_peak_pairs(prices: &[f64]) -> Vec<(usize, usize)> {
    let n = prices.len();
    let mut pairs = Vec::new();
    if n < 2 {
        return pairs;
    }

    let mut i = 0;
    while i < n - 1 {
        while i < n - 1 && prices[i + 1] <= prices[i] {
            i += 1;
        }
        let buy = i;

        while i < n - 1 && prices[i + 1] >= prices[i] {
            i += 1;
        }
        let sell = i;

        if prices[sell] > prices[buy] {
            pairs.push((buy, sell));
        }
    }

    pairs
}

pub fn maximize_profit(prices: &[f64], dates: &[NaiveDate]) -> Result<ProfitPlan, AnalyticsError> {
    if prices.len() != dates.len() {
        return Err(AnalyticsError::InsufficientData {
            have: dates.len(),
            need: prices.len(),
        });
    }
    if let Some(index) = prices.iter().position(|p| !p.is_finite()) {
        return Err(AnalyticsError::NonFiniteInput { index });
    }

    let trades: Vec<Trade> = valley_peak_pairs(prices)
        .into_iter()
        .map(|(buy, sell)| Trade {
            buy_index: buy,
            buy_date: dates[buy],
            buy_price: prices[buy],
            sell_index: sell,
            sell_date: dates[sell],
            sell_price: prices[sell],
        })
        .collect();

    let total_profit = trades.iter().map(Trade::profit).sum();
    Ok(ProfitPlan {
        total_profit,
        trades,
    })
}

pub fn maximize_series_profit(series: &Series) -> Result<ProfitPlan, AnalyticsError> {
    maximize_profit(&series.values(), &series.dates())
}

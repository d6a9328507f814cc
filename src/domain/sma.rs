//! Simple Moving Average over a sliding window.
//!
//! O(n) running-sum implementation.
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) entries are undefined.
//!
//! The running sum is accumulated in f64 without compensation, so rounding
//! error grows with series length. [`compute_sma_with_resync`] can rebuild the
//! window sum from scratch at a fixed cadence when that matters.

use crate::domain::error::AnalyticsError;

pub fn compute_sma(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    compute_sma_with_resync(values, window, None)
}

/// Same as [`compute_sma`], but recomputes the window sum every `resync_every`
/// steps. `None` (or `Some(0)`) disables resynchronization.
pub fn compute_sma_with_resync(
    values: &[f64],
    window: usize,
    resync_every: Option<usize>,
) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let n = values.len();
    if window == 0 || window > n {
        return Err(AnalyticsError::InvalidWindow { window, len: n });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(AnalyticsError::NonFiniteInput { index });
    }

    let resync_every = resync_every.filter(|&k| k > 0);
    let inv_window = 1.0 / window as f64;
    let mut out = vec![None; n];

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum * inv_window);

    for i in window..n {
        let step = i - window + 1;
        match resync_every {
            Some(k) if step % k == 0 => {
                sum = values[i + 1 - window..=i].iter().sum();
            }
            _ => {
                sum += values[i] - values[i - window];
            }
        }
        out[i] = Some(sum * inv_window);
    }

    Ok(out)
}

/// Headline numbers for the most recent bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SmaSnapshot {
    pub window: usize,
    pub latest_close: f64,
    pub latest_sma: Option<f64>,
    pub close_minus_sma: Option<f64>,
}

impl SmaSnapshot {
    pub fn latest(values: &[f64], sma: &[Option<f64>], window: usize) -> Option<Self> {
        let latest_close = *values.last()?;
        let latest_sma = sma.last().copied().flatten();
        Some(Self {
            window,
            latest_close,
            latest_sma,
            close_minus_sma: latest_sma.map(|s| latest_close - s),
        })
    }
}

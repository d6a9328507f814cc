//! Linear-trend classification from an OLS slope over a trailing window.

use std::fmt;

/// Deadband around zero slope that still counts as stable.
pub const DEFAULT_SLOPE_TOLERANCE: f64 = 1e-4;

pub const DEFAULT_HORIZONS: [usize; 3] = [3, 6, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLabel {
    Uptrend,
    Downtrend,
    Stable,
    InsufficientData,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendLabel::Uptrend => write!(f, "Uptrend"),
            TrendLabel::Downtrend => write!(f, "Downtrend"),
            TrendLabel::Stable => write!(f, "Stable"),
            TrendLabel::InsufficientData => write!(f, "Insufficient data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub horizon: usize,
    pub window_used: usize,
    pub slope: Option<f64>,
    pub label: TrendLabel,
}

impl ClassificationResult {
    /// True when the requested horizon was longer than the available history.
    pub fn is_clipped(&self) -> bool {
        self.window_used < self.horizon
    }
}

/// OLS slope of `y` against step index `0..n`. `None` when fewer than two
/// points make the denominator zero.
pub fn ols_slope(y: &[f64]) -> Option<f64> {
    let n = y.len();
    if n < 2 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (yi - y_mean);
        den += dx * dx;
    }

    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

pub fn label_for(slope: Option<f64>, tolerance: f64) -> TrendLabel {
    match slope {
        Some(s) if s.is_finite() && s > tolerance => TrendLabel::Uptrend,
        Some(s) if s.is_finite() && s < -tolerance => TrendLabel::Downtrend,
        Some(s) if s.is_finite() => TrendLabel::Stable,
        _ => TrendLabel::InsufficientData,
    }
}

pub fn classify(values: &[f64], horizon: usize, tolerance: f64) -> ClassificationResult {
    let n = values.len();
    let window_used = horizon.min(n);

    if n < 2 {
        return ClassificationResult {
            horizon,
            window_used,
            slope: None,
            label: TrendLabel::InsufficientData,
        };
    }

    let slope = ols_slope(&values[n - window_used..]);
    ClassificationResult {
        horizon,
        window_used,
        slope,
        label: label_for(slope, tolerance),
    }
}

pub fn classify_horizons(
    values: &[f64],
    horizons: &[usize],
    tolerance: f64,
) -> Vec<ClassificationResult> {
    horizons
        .iter()
        .map(|&h| classify(values, h, tolerance))
        .collect()
}

//! Plain-text rendering of analytics results for the terminal.
//!
//! Each function returns a `String` so callers decide where it goes.

use crate::domain::analysis::{SmaReport, TrendReport};
use crate::domain::classifier::{ClassificationResult, TrendLabel};
use crate::domain::macro_data::MacroRecord;
use crate::domain::portfolio::PortfolioSimulation;
use crate::domain::profit::ProfitPlan;
use crate::domain::segmentation::TrendSegment;
use crate::domain::series::Series;

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "NaN".to_string(),
    }
}

pub fn format_sma(ticker: &str, report: &SmaReport, tail: usize) -> String {
    let mut out = String::new();
    let points = report.series.points();
    let window = report.snapshot.as_ref().map(|s| s.window).unwrap_or(0);
    let skip = points.len().saturating_sub(tail);

    out.push_str(&format!("{} SMA({}) latest values\n", ticker, window));
    out.push_str(&format!(
        "{:<12} {:>14} {:>14}\n",
        "date",
        "close",
        format!("sma_{}", window)
    ));
    for (point, sma) in points.iter().zip(&report.sma).skip(skip) {
        out.push_str(&format!(
            "{:<12} {:>14.4} {:>14}\n",
            point.date.to_string(),
            point.value,
            fmt_opt(*sma, 4)
        ));
    }

    if let Some(snap) = &report.snapshot {
        out.push('\n');
        out.push_str(&format!(
            "Latest SMA ({}): {}\n",
            snap.window,
            fmt_opt(snap.latest_sma, 4)
        ));
        if let Some(delta) = snap.close_minus_sma {
            out.push_str(&format!("Close - SMA:     {:+.4}\n", delta));
        }
    }
    out
}

fn format_segment(series: &Series, seg: &TrendSegment) -> String {
    let points = series.points();
    format!(
        "{:<5} {} .. {}  {:>4} pts  {:+.4}",
        seg.direction.to_string(),
        points[seg.start_index].date,
        points[seg.end_index].date,
        seg.len(),
        seg.change()
    )
}

fn format_longest(label: &str, series: &Series, seg: Option<&TrendSegment>) -> String {
    match seg {
        Some(seg) => format!("{} {}\n", label, format_segment(series, seg)),
        None => format!("{} none\n", label),
    }
}

pub fn format_trends(ticker: &str, report: &TrendReport) -> String {
    let mut out = format!("{} trend segments ({})\n", ticker, report.segments.len());
    for seg in &report.segments {
        out.push_str(&format!("  {}\n", format_segment(&report.series, seg)));
    }

    out.push('\n');
    out.push_str(&format_longest(
        "Longest uptrend:  ",
        &report.series,
        report.longest_up.as_ref(),
    ));
    out.push_str(&format_longest(
        "Longest downtrend:",
        &report.series,
        report.longest_down.as_ref(),
    ));
    out
}

pub fn format_profit(ticker: &str, plan: &ProfitPlan) -> String {
    let mut out = format!("{} optimal trades ({})\n", ticker, plan.trades.len());
    if plan.trades.is_empty() {
        out.push_str("  no profitable trades in range\n");
    }
    for t in &plan.trades {
        out.push_str(&format!(
            "  buy {} @ {:.4}  sell {} @ {:.4}  profit {:+.4}  held {}d\n",
            t.buy_date,
            t.buy_price,
            t.sell_date,
            t.sell_price,
            t.profit(),
            t.holding_days()
        ));
    }
    out.push_str(&format!("Total profit: {:.4}\n", plan.total_profit));
    out
}

pub fn format_classification(results: &[ClassificationResult]) -> String {
    let mut out = String::new();
    for r in results {
        let clipped = if r.is_clipped() {
            format!(" (requested {})", r.horizon)
        } else {
            String::new()
        };
        match (r.label, r.slope) {
            (TrendLabel::InsufficientData, _) | (_, None) => {
                out.push_str(&format!(
                    "Last {} months{}: {}\n",
                    r.window_used,
                    clipped,
                    TrendLabel::InsufficientData
                ));
            }
            (label, Some(slope)) => {
                out.push_str(&format!(
                    "Last {} months{}: {}  slope {:+.4} pp/month\n",
                    r.window_used, clipped, label, slope
                ));
            }
        }
    }
    out
}

pub fn format_macro_table(records: &[MacroRecord], tail: usize) -> String {
    let mut out = format!(
        "{:<10} {:>10} {:>10} {:>10}\n",
        "month", "actual", "forecast", "surprise"
    );
    let skip = records.len().saturating_sub(tail);
    for r in records.iter().skip(skip) {
        out.push_str(&format!(
            "{:<10} {:>10.2} {:>10.2} {:>+10.2}\n",
            r.date.format("%b %Y").to_string(),
            r.actual,
            r.forecast,
            r.surprise()
        ));
    }
    out
}

pub fn format_portfolio(sim: &PortfolioSimulation, tail: usize) -> String {
    let mut out = format!("{:<12} {:>12} {:>16}\n", "date", "return", "value");
    let skip = sim.points.len().saturating_sub(tail);
    for p in sim.points.iter().skip(skip) {
        out.push_str(&format!(
            "{:<12} {:>11.3}% {:>16.2}\n",
            p.date.to_string(),
            p.portfolio_return * 100.0,
            p.value
        ));
    }

    let s = &sim.stats;
    out.push('\n');
    out.push_str(&format!("Average Daily Return:   {:.3}%\n", s.mean_return * 100.0));
    out.push_str(&format!("Volatility (Std Dev):   {:.3}%\n", s.std_dev * 100.0));
    out.push_str(&format!("Total Portfolio Return: {:.2}%\n", s.total_return * 100.0));
    out.push_str(&format!("Latest Portfolio Value: ${:.2}\n", s.final_value));
    out
}

pub fn format_suggestions(input: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("No tickers close to '{}'\n", input.trim().to_uppercase())
    } else {
        format!("Did you mean: {}\n", suggestions.join(", "))
    }
}

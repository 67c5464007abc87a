//! Period totals and comparison helpers layered on built series.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use calma_core::report::TimeSeriesPoint;

use crate::timeseries::round2;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Total per canonical label across a whole series.
pub fn label_totals(points: &[TimeSeriesPoint]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for point in points {
        for (label, value) in &point.values {
            *totals.entry(label.clone()).or_insert(0.0) += value;
        }
    }
    totals
        .into_iter()
        .map(|(label, total)| (label, round2(total)))
        .collect()
}

/// Period-over-period percentage, one decimal. A zero previous period
/// reads as +100% when anything happened at all, 0% otherwise.
pub fn delta_pct(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        round1((current - previous) / previous * 100.0)
    }
}

/// One row of a period-comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub total: f64,
    pub total_prev: f64,
    pub delta_pct: f64,
}

/// Join a current and a previous period series into per-label summary
/// rows, highest current total first. Labels present in only one period
/// still get a row (the other side totals zero).
pub fn summarize(current: &[TimeSeriesPoint], previous: &[TimeSeriesPoint]) -> Vec<SummaryRow> {
    let cur = label_totals(current);
    let prev = label_totals(previous);

    let mut labels: BTreeSet<String> = cur.keys().cloned().collect();
    labels.extend(prev.keys().cloned());

    let mut rows: Vec<SummaryRow> = labels
        .into_iter()
        .map(|label| {
            let total = cur.get(&label).copied().unwrap_or(0.0);
            let total_prev = prev.get(&label).copied().unwrap_or(0.0);
            SummaryRow {
                delta_pct: delta_pct(total, total_prev),
                label,
                total,
                total_prev,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    rows
}

/// One day of a derived rate series (e.g. average daily rate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatePoint {
    pub date: String,
    pub rate: f64,
}

/// Day-wise rate: revenue ÷ quantity, 0 when the day had no quantity.
/// Both inputs are expected to cover the same range in the same order.
pub fn rate_series(revenue: &[TimeSeriesPoint], quantity: &[TimeSeriesPoint]) -> Vec<RatePoint> {
    revenue
        .iter()
        .zip(quantity)
        .map(|(rev, qty)| {
            let r: f64 = rev.values.values().sum();
            let q: f64 = qty.values.values().sum();
            let rate = if q == 0.0 { 0.0 } else { r / q };
            RatePoint {
                date: rev.date.clone(),
                rate: round2(rate),
            }
        })
        .collect()
}

//! Dense, zero-filled series construction from canonicalized rows.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use calma_core::config::LabelPolicy;
use calma_core::report::{fmt_ddmmyy, DateRange, EntityKey, RawRow, TimeSeriesPoint};

/// Round a monetary aggregate for output. Accumulation stays
/// full-precision; rounding happens once, at point emission.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build one ordered point per calendar day from `range.start` to
/// `range.end` inclusive.
///
/// Entities whose total value across the whole range is exactly zero are
/// dropped entirely (sparse for unused entities); every retained label is
/// present in every point, zero-filled on silent days (dense for used
/// ones). Dates are emitted in the `DD/MM/YY` display form.
pub fn build_series(
    rows: &[RawRow],
    canonical: &HashMap<EntityKey, String>,
    range: &DateRange,
    policy: &LabelPolicy,
) -> Vec<TimeSeriesPoint> {
    // Range totals decide inclusion. A BTreeMap keeps entity order
    // deterministic for the collision suffixing below.
    let mut totals: BTreeMap<EntityKey, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(EntityKey::for_row(row)).or_insert(0.0) += row.value;
    }
    let retained: Vec<EntityKey> = totals
        .into_iter()
        .filter(|(_, total)| *total != 0.0)
        .map(|(key, _)| key)
        .collect();

    let labels = final_labels(&retained, canonical, policy);

    let mut per_label: BTreeMap<String, HashMap<NaiveDate, f64>> = BTreeMap::new();
    for row in rows {
        let key = EntityKey::for_row(row);
        let Some(label) = labels.get(&key) else {
            continue;
        };
        *per_label
            .entry(label.clone())
            .or_default()
            .entry(row.date)
            .or_insert(0.0) += row.value;
    }

    range
        .days()
        .map(|day| {
            let values = per_label
                .iter()
                .map(|(label, by_day)| {
                    (
                        label.clone(),
                        round2(by_day.get(&day).copied().unwrap_or(0.0)),
                    )
                })
                .collect();
            TimeSeriesPoint {
                date: fmt_ddmmyy(day),
                values,
            }
        })
        .collect()
}

/// Final display label per retained entity: umbrella collapse first, then
/// the collision policy. Merging (the default) lets distinct entities sum
/// under one label; with merging off, later colliders — in deterministic
/// entity order — get a numbered suffix and keep their own row.
fn final_labels(
    retained: &[EntityKey],
    canonical: &HashMap<EntityKey, String>,
    policy: &LabelPolicy,
) -> HashMap<EntityKey, String> {
    let mut out = HashMap::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for key in retained {
        let base = canonical.get(key).cloned().unwrap_or_default();
        let mut label = apply_umbrella(base, policy);
        let occurrence = {
            let count = seen.entry(label.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if occurrence > 1 && !policy.merge_collisions {
            label = format!("{label} ({occurrence})");
        }
        out.insert(key.clone(), label);
    }
    out
}

fn apply_umbrella(label: String, policy: &LabelPolicy) -> String {
    let Some(rule) = &policy.umbrella else {
        return label;
    };
    let keeps = label
        .trim()
        .to_lowercase()
        .starts_with(&rule.keep_prefix.to_lowercase());
    if label.is_empty() || !keeps {
        rule.bucket_label.clone()
    } else {
        label
    }
}

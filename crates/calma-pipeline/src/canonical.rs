//! Entity identity grouping and canonical display label resolution.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use calma_core::config::LabelPolicy;
use calma_core::label::normalize_label;
use calma_core::report::{EntityKey, RawRow};

/// Resolve one display label per logical entity for the whole response.
///
/// Rows are grouped by [`EntityKey`] and every distinct raw label seen for
/// a key accumulates its value; the candidate set then resolves in
/// priority order: explicit alias override, locale-looking preference,
/// highest cumulative value. Value comparison always uses the cumulative
/// value across the whole range so the winning label cannot flicker day
/// to day; exact ties break on the lexicographically smaller label.
pub fn resolve_labels(rows: &[RawRow], policy: &LabelPolicy) -> HashMap<EntityKey, String> {
    let mut candidates: HashMap<EntityKey, BTreeMap<String, f64>> = HashMap::new();
    for row in rows {
        let key = EntityKey::for_row(row);
        *candidates
            .entry(key)
            .or_default()
            .entry(row.raw_label.clone())
            .or_insert(0.0) += row.value;
    }

    candidates
        .into_iter()
        .map(|(key, cand)| {
            let label = pick_label(&key, &cand, policy);
            (key, label)
        })
        .collect()
}

fn pick_label(key: &EntityKey, candidates: &BTreeMap<String, f64>, policy: &LabelPolicy) -> String {
    if let Some(alias) = alias_for(key, candidates, policy) {
        return alias;
    }
    let locale: Vec<(&String, f64)> = candidates
        .iter()
        .map(|(label, value)| (label, *value))
        .filter(|(label, _)| policy.is_locale_label(label))
        .collect();
    if locale.is_empty() {
        best_by_value(candidates.iter().map(|(label, value)| (label, *value)))
    } else {
        best_by_value(locale.into_iter())
    }
}

/// Alias lookup: candidates by normalized label first (highest cumulative
/// value preferred), then the raw entity id. An alias hit wins
/// unconditionally.
fn alias_for(
    key: &EntityKey,
    candidates: &BTreeMap<String, f64>,
    policy: &LabelPolicy,
) -> Option<String> {
    let mut ordered: Vec<(&String, f64)> = candidates
        .iter()
        .map(|(label, value)| (label, *value))
        .collect();
    ordered.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    for (label, _) in ordered {
        if let Some(alias) = policy.aliases.get(&normalize_label(label)) {
            return Some(alias.clone());
        }
    }
    key.id().and_then(|id| policy.aliases.get(id)).cloned()
}

fn best_by_value<'a>(pool: impl Iterator<Item = (&'a String, f64)>) -> String {
    let mut best: Option<(&String, f64)> = None;
    for (label, value) in pool {
        let better = match best {
            None => true,
            Some((best_label, best_value)) => {
                value > best_value || (value == best_value && label < best_label)
            }
        };
        if better {
            best = Some((label, value));
        }
    }
    best.map(|(label, _)| label.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: Option<&str>, label: &str, value: f64) -> RawRow {
        RawRow {
            entity_id: id.map(str::to_string),
            raw_label: label.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
            value,
        }
    }

    fn bare_policy() -> LabelPolicy {
        LabelPolicy {
            aliases: HashMap::new(),
            ..LabelPolicy::default()
        }
    }

    #[test]
    fn locale_label_wins_over_higher_revenue_foreign_label() {
        let rows = vec![
            row(Some("A"), "Blue Room", 500.0),
            row(Some("A"), "Quarto Azul", 100.0),
        ];
        let map = resolve_labels(&rows, &bare_policy());
        assert_eq!(
            map.get(&EntityKey::Id("A".to_string())).map(String::as_str),
            Some("Quarto Azul")
        );
    }

    #[test]
    fn highest_cumulative_value_wins_among_locale_candidates() {
        let rows = vec![
            row(Some("A"), "Quarto Azul", 100.0),
            row(Some("A"), "Quarto Azul Superior", 40.0),
            row(Some("A"), "Quarto Azul Superior", 80.0),
            row(Some("A"), "Quarto Azul", 30.0),
        ];
        // Cumulative: "Quarto Azul" 130 vs "Quarto Azul Superior" 120.
        let map = resolve_labels(&rows, &bare_policy());
        assert_eq!(
            map.get(&EntityKey::Id("A".to_string())).map(String::as_str),
            Some("Quarto Azul")
        );
    }

    #[test]
    fn fallback_picks_highest_value_when_nothing_looks_local() {
        let rows = vec![
            row(Some("A"), "Blue Room", 10.0),
            row(Some("A"), "Blue Room Deluxe", 90.0),
        ];
        let map = resolve_labels(&rows, &bare_policy());
        assert_eq!(
            map.get(&EntityKey::Id("A".to_string())).map(String::as_str),
            Some("Blue Room Deluxe")
        );
    }

    #[test]
    fn alias_by_normalized_label_wins_regardless_of_value() {
        let mut policy = bare_policy();
        policy.aliases.insert(
            "habitacion triple planta baja".to_string(),
            "Quarto Triplo – Térreo".to_string(),
        );
        let rows = vec![
            row(Some("A"), "Quarto Grande", 9000.0),
            row(Some("A"), "Habitación Triple   Planta Baja", 1.0),
        ];
        let map = resolve_labels(&rows, &policy);
        assert_eq!(
            map.get(&EntityKey::Id("A".to_string())).map(String::as_str),
            Some("Quarto Triplo – Térreo")
        );
    }

    #[test]
    fn alias_by_entity_id_applies_when_no_label_matches() {
        let mut policy = bare_policy();
        policy
            .aliases
            .insert("SKU-77".to_string(), "Extras".to_string());
        let rows = vec![row(Some("SKU-77"), "Late checkout", 25.0)];
        let map = resolve_labels(&rows, &policy);
        assert_eq!(
            map.get(&EntityKey::Id("SKU-77".to_string()))
                .map(String::as_str),
            Some("Extras")
        );
    }

    #[test]
    fn distinct_ids_never_collapse_even_with_identical_labels() {
        let rows = vec![
            row(Some("A"), "Quarto Azul", 10.0),
            row(Some("B"), "Quarto Azul", 20.0),
        ];
        let map = resolve_labels(&rows, &bare_policy());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn label_keyed_rows_collapse_on_normalized_form() {
        let rows = vec![
            row(None, "Quarto   Azul", 10.0),
            row(None, "quarto azul", 20.0),
        ];
        let map = resolve_labels(&rows, &bare_policy());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn resolution_is_idempotent() {
        let rows = vec![
            row(Some("A"), "Quarto Azul", 100.0),
            row(Some("A"), "Blue Room", 50.0),
            row(None, "Spa day", 30.0),
        ];
        let policy = LabelPolicy::default();
        assert_eq!(resolve_labels(&rows, &policy), resolve_labels(&rows, &policy));
    }

    #[test]
    fn exact_value_ties_break_lexicographically() {
        let rows = vec![
            row(Some("A"), "Quarto B", 50.0),
            row(Some("A"), "Quarto A", 50.0),
        ];
        let map = resolve_labels(&rows, &bare_policy());
        assert_eq!(
            map.get(&EntityKey::Id("A".to_string())).map(String::as_str),
            Some("Quarto A")
        );
    }
}

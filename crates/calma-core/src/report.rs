//! Report-shaped domain types shared across the pipeline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::PipelineError;
use crate::label::normalize_label;

/// Inclusive calendar window bounding both source queries and zero-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PipelineError> {
        if end < start {
            return Err(PipelineError::InvalidRange(format!(
                "end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse the ISO `YYYY-MM-DD` form used at the boundary.
    pub fn parse(start: &str, end: &str) -> Result<Self, PipelineError> {
        let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|e| PipelineError::InvalidRange(format!("start date {start:?}: {e}")))?;
        let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|e| PipelineError::InvalidRange(format!("end date {end:?}: {e}")))?;
        Self::new(start_date, end_date)
    }

    /// Inclusive day count.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day from start to end inclusive, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count() as usize)
    }

    /// The window of equal length ending the day before `start`.
    pub fn previous(&self) -> Self {
        let end = self.start - chrono::Duration::days(1);
        let start = end - chrono::Duration::days(self.day_count() - 1);
        Self { start, end }
    }
}

/// Locale display form used for every emitted point date.
pub fn fmt_ddmmyy(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// One source-reported observation, already shape-normalized by the
/// strategy adapter. Produced fresh per pipeline run and discarded after
/// aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub entity_id: Option<String>,
    pub raw_label: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Canonical internal identity of a reported entity.
///
/// Rows carrying a source id keep it; rows without one key off the
/// normalized label, so "Quarto Azul" and "quarto   Azul" collapse into
/// one entity while distinct ids never do, however similar their labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Id(String),
    Label(String),
}

impl EntityKey {
    pub fn for_row(row: &RawRow) -> Self {
        match row.entity_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Self::Id(id.trim().to_string()),
            _ => Self::Label(normalize_label(&row.raw_label)),
        }
    }

    /// The provided source id, when identity came from one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Label(_) => None,
        }
    }
}

/// One day of a response series: display date plus canonical label → value.
///
/// `values` holds every label retained for the range, zero-filled on days
/// the label was silent; labels whose range total is zero never appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub values: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parse_accepts_iso_and_rejects_inverted_ranges() {
        let range = DateRange::parse("2025-08-01", "2025-08-03").expect("valid range");
        assert_eq!(range.day_count(), 3);

        assert!(DateRange::parse("2025-08-03", "2025-08-01").is_err());
        assert!(DateRange::parse("01/08/2025", "2025-08-03").is_err());
        assert!(DateRange::parse("2025-08-01", "not-a-date").is_err());
    }

    #[test]
    fn days_covers_the_range_inclusive() {
        let range = DateRange::parse("2025-02-27", "2025-03-02").expect("valid range");
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(
            days,
            vec![
                date(2025, 2, 27),
                date(2025, 2, 28),
                date(2025, 3, 1),
                date(2025, 3, 2),
            ]
        );
    }

    #[test]
    fn previous_window_has_equal_length_and_abuts_start() {
        let range = DateRange::parse("2025-08-08", "2025-08-14").expect("valid range");
        let prev = range.previous();
        assert_eq!(prev.day_count(), range.day_count());
        assert_eq!(prev.end, date(2025, 8, 7));
        assert_eq!(prev.start, date(2025, 8, 1));
    }

    #[test]
    fn display_date_is_ddmmyy() {
        assert_eq!(fmt_ddmmyy(date(2025, 8, 1)), "01/08/25");
    }

    #[test]
    fn entity_key_prefers_id_over_label() {
        let row = RawRow {
            entity_id: Some(" SKU-9 ".to_string()),
            raw_label: "Quarto Azul".to_string(),
            date: date(2025, 8, 1),
            value: 1.0,
        };
        assert_eq!(EntityKey::for_row(&row), EntityKey::Id("SKU-9".to_string()));
    }

    #[test]
    fn entity_key_falls_back_to_normalized_label() {
        let mut row = RawRow {
            entity_id: None,
            raw_label: "Quarto   Azul".to_string(),
            date: date(2025, 8, 1),
            value: 1.0,
        };
        let a = EntityKey::for_row(&row);
        row.raw_label = "quarto azul".to_string();
        row.entity_id = Some("  ".to_string());
        let b = EntityKey::for_row(&row);
        assert_eq!(a, b);
        assert_eq!(a, EntityKey::Label("quarto azul".to_string()));
    }
}

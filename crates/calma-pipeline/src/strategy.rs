//! Ordered fetch attempts against the external reporting source.
//!
//! Higher-priority strategies carry richer identity information (stable
//! ids) and must win whenever they yield rows, because later strategies
//! can only key off free-text labels and are more prone to collisions.

use chrono::NaiveDate;
use tracing::{debug, warn};

use calma_core::report::{DateRange, RawRow};
use calma_core::source::{Dimension, Metric, ReportSpec, ReportingSource, SourceRow};

/// One named grouped-report attempt.
#[derive(Debug, Clone)]
pub struct FetchStrategy {
    pub name: &'static str,
    pub dimensions: Vec<Dimension>,
    /// Usable only when at least one response row carries a non-empty
    /// entity id; otherwise the attempt reports no-data and the chain
    /// advances to a label-keyed grouping.
    pub requires_entity_id: bool,
}

impl FetchStrategy {
    /// Group by stable entity id, keeping the label dimension for display.
    pub fn by_entity_id() -> Self {
        Self {
            name: "by-entity-id",
            dimensions: vec![Dimension::EntityId, Dimension::EntityLabel, Dimension::Date],
            requires_entity_id: true,
        }
    }

    /// Group by free-text label only; identity derives from normalization.
    pub fn by_label() -> Self {
        Self {
            name: "by-label",
            dimensions: vec![Dimension::EntityLabel, Dimension::Date],
            requires_entity_id: false,
        }
    }

    pub fn default_chain() -> Vec<Self> {
        vec![Self::by_entity_id(), Self::by_label()]
    }

    /// Run this strategy once. Never panics and never propagates: the
    /// result is a typed outcome the chain decides on.
    pub async fn fetch(
        &self,
        source: &dyn ReportingSource,
        metric: Metric,
        range: &DateRange,
    ) -> StrategyOutcome {
        let spec = ReportSpec {
            dimensions: self.dimensions.clone(),
            metrics: vec![metric],
            range: *range,
        };
        let raw = match source.run_report(&spec).await {
            Ok(rows) => rows,
            Err(err) => return StrategyOutcome::Failed(err),
        };

        let mut rows = Vec::with_capacity(raw.len());
        let mut saw_id = false;
        for item in &raw {
            if let Some(row) = self.adapt(item) {
                saw_id |= row.entity_id.is_some();
                rows.push(row);
            }
        }
        if rows.is_empty() || (self.requires_entity_id && !saw_id) {
            return StrategyOutcome::NoData;
        }
        StrategyOutcome::Rows(rows)
    }

    /// Translate one positional source row into the canonical shape.
    /// A row whose date dimension does not parse as `YYYYMMDD` is skipped
    /// individually; the rest of the response still counts.
    fn adapt(&self, row: &SourceRow) -> Option<RawRow> {
        let mut entity_id = None;
        let mut raw_label = String::new();
        let mut date: Option<NaiveDate> = None;
        for (dimension, value) in self.dimensions.iter().zip(&row.dimensions) {
            match dimension {
                Dimension::EntityId => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        entity_id = Some(trimmed.to_string());
                    }
                }
                Dimension::EntityLabel => raw_label = value.trim().to_string(),
                Dimension::Date => date = NaiveDate::parse_from_str(value, "%Y%m%d").ok(),
            }
        }
        Some(RawRow {
            entity_id,
            raw_label,
            date: date?,
            value: row.metrics.first().copied().unwrap_or(0.0),
        })
    }
}

/// Per-strategy result, explicit in the type rather than implicit in
/// catch-all handlers.
pub enum StrategyOutcome {
    Rows(Vec<RawRow>),
    NoData,
    Failed(anyhow::Error),
}

/// Walk the chain in priority order.
///
/// A failure is treated identically to an empty response: log and
/// advance. The first strategy producing at least one row wins; each
/// strategy runs exactly once per call. Exhaustion — including an absent
/// source — is `None`, which the caller resolves with the synthetic
/// fallback rather than an error.
pub async fn fetch_rows(
    source: Option<&dyn ReportingSource>,
    chain: &[FetchStrategy],
    metric: Metric,
    range: &DateRange,
) -> Option<Vec<RawRow>> {
    let source = source?;
    for strategy in chain {
        match strategy.fetch(source, metric, range).await {
            StrategyOutcome::Rows(rows) => {
                debug!(
                    strategy = strategy.name,
                    metric = metric.as_str(),
                    rows = rows.len(),
                    "fetch strategy produced rows"
                );
                return Some(rows);
            }
            StrategyOutcome::NoData => {
                warn!(
                    strategy = strategy.name,
                    metric = metric.as_str(),
                    "fetch strategy returned no data"
                );
            }
            StrategyOutcome::Failed(err) => {
                warn!(
                    strategy = strategy.name,
                    metric = metric.as_str(),
                    error = %err,
                    "fetch strategy failed"
                );
            }
        }
    }
    None
}

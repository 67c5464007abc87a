//! External reporting source abstraction.
//!
//! The pipeline never constructs credentials or manages client lifecycle;
//! the bootstrap layer hands it a ready [`ReportingSource`] (or nothing,
//! in which case every fetch attempt immediately reports no data).

use anyhow::Result;
use async_trait::async_trait;

use crate::report::DateRange;

/// Dimensions a grouped report may be keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    EntityId,
    EntityLabel,
    Date,
}

/// Metrics the pipeline knows how to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Revenue,
    Quantity,
    Users,
}

impl Metric {
    /// Source-neutral metric name; the client maps it onto whatever its
    /// query language calls the measure.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Quantity => "quantity",
            Self::Users => "users",
        }
    }
}

/// One grouped-report request: dimensions D and metrics M over range R.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub range: DateRange,
}

/// One positional response row: dimension values in request order, then
/// metric values in request order. Date dimensions come back as `YYYYMMDD`.
#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    pub dimensions: Vec<String>,
    pub metrics: Vec<f64>,
}

/// A ready-to-use external reporting client.
#[async_trait]
pub trait ReportingSource: Send + Sync {
    async fn run_report(&self, spec: &ReportSpec) -> Result<Vec<SourceRow>>;
}

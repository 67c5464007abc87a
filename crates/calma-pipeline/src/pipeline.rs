//! The request-scoped aggregation entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use calma_core::config::PipelineConfig;
use calma_core::report::{DateRange, TimeSeriesPoint};
use calma_core::source::{Metric, ReportingSource};
use calma_core::PipelineError;

use crate::cache::TtlCache;
use crate::canonical::resolve_labels;
use crate::strategy::{fetch_rows, FetchStrategy};
use crate::synthetic::synthetic_series;
use crate::timeseries::build_series;

/// Per-call knobs from the boundary layer.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cache_key: String,
    pub ttl: Duration,
    /// Skip the cache read; the fresh result is still written back.
    pub force_refresh: bool,
}

impl RunOptions {
    pub fn new(cache_key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache_key: cache_key.into(),
            ttl,
            force_refresh: false,
        }
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// Metric aggregation pipeline.
///
/// Stateless between runs except for the shared cache; cheap to clone and
/// safe to share across concurrent request tasks. The source is injected
/// at construction — `None` models a deployment without reporting
/// credentials, where every run degrades to the synthetic fallback.
#[derive(Clone)]
pub struct Pipeline {
    source: Option<Arc<dyn ReportingSource>>,
    cache: TtlCache<Vec<TimeSeriesPoint>>,
    chain: Vec<FetchStrategy>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(source: Option<Arc<dyn ReportingSource>>, config: PipelineConfig) -> Self {
        Self {
            source,
            cache: TtlCache::new(),
            chain: FetchStrategy::default_chain(),
            config,
        }
    }

    /// Replace the default strategy chain.
    pub fn with_chain(mut self, chain: Vec<FetchStrategy>) -> Self {
        self.chain = chain;
        self
    }

    /// Run the pipeline for one metric over `start..=end` (ISO `YYYY-MM-DD`
    /// at the boundary).
    ///
    /// The only escaping failure is a malformed range. Source trouble of
    /// any kind degrades through the strategy chain and, ultimately, the
    /// synthetic fallback: callers always get back one point per calendar
    /// day of the range.
    pub async fn run(
        &self,
        start: &str,
        end: &str,
        metric: Metric,
        opts: &RunOptions,
    ) -> Result<Vec<TimeSeriesPoint>, PipelineError> {
        let range = DateRange::parse(start, end)?;

        if !opts.force_refresh {
            if let Some(hit) = self.cache.get(&opts.cache_key, opts.ttl).await {
                debug!(key = %opts.cache_key, "serving cached series");
                return Ok(hit);
            }
        }

        let rows = fetch_rows(self.source.as_deref(), &self.chain, metric, &range).await;
        let points = match rows {
            Some(rows) => {
                let canonical = resolve_labels(&rows, &self.config.policy);
                build_series(&rows, &canonical, &range, &self.config.policy)
            }
            None => {
                info!(
                    key = %opts.cache_key,
                    metric = metric.as_str(),
                    "no real data from any strategy, serving synthetic series"
                );
                synthetic_series(&opts.cache_key, &range, &self.config.synthetic_labels)
            }
        };

        self.cache.set(&opts.cache_key, points.clone()).await;
        Ok(points)
    }
}

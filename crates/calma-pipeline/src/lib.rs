//! Metric aggregation pipeline: strategy-chained fetch against an external
//! reporting source, entity canonicalization, zero-filled series building,
//! TTL memoization and a deterministic synthetic fallback.

pub mod cache;
pub mod canonical;
pub mod pipeline;
pub mod strategy;
pub mod summary;
pub mod synthetic;
pub mod timeseries;

pub use pipeline::{Pipeline, RunOptions};

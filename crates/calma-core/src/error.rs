use thiserror::Error;

/// The only failure the aggregation pipeline reports to its caller.
///
/// Source trouble of any kind (network, auth, quota, empty responses) is
/// recovered internally by the strategy chain and the synthetic fallback;
/// a malformed date range is not recoverable and must reach the boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid date range: {0}")]
    InvalidRange(String),
}

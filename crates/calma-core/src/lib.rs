pub mod config;
pub mod error;
pub mod label;
pub mod report;
pub mod source;

pub use error::PipelineError;
pub use report::{DateRange, EntityKey, RawRow, TimeSeriesPoint};

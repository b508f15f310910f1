//! Application layer module
//!
//! Orchestrates the domain logic against a grading backend: per-line
//! resolution, the process-wide result cache and the batch entry point.

pub mod batch_resolution;
pub mod grading_service;
pub mod query_resolver;
pub mod result_cache;

pub use batch_resolution::BatchResolution;
pub use grading_service::{GradingError, GradingService};
pub use query_resolver::{LineResolution, QueryResolver};
pub use result_cache::ResultCache;

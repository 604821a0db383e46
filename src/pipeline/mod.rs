// Pipeline — orchestrates provider, keyword extraction, scoring and storage.

pub mod analyze;
pub mod batch;

pub use analyze::{Analyzer, PipelineSettings};
pub use batch::{validate_batch_size, BatchFailure, BatchOutcome};

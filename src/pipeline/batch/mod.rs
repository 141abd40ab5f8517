//! Quarterly report batch pipeline.
//!
//! ```text
//! PDF → text → metric prompt → model → sanitize → ResultSet → summary
//! ```
//!
//! Each document is isolated: a failure on one becomes a [`BatchNotice`]
//! and the batch moves on to the next.

pub mod error;
pub mod types;
pub mod summary;
pub mod runner;

pub use error::BatchError;
pub use types::*;
pub use summary::SummaryGenerator;
pub use runner::{run_batch, BatchPipeline};

//! Batch-level errors.
//!
//! Per-document failures never surface here: the pipeline turns them into
//! [`BatchNotice`](super::types::BatchNotice)s and keeps going. Only
//! pre-flight problems stop a run before the first document.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No documents supplied for analysis")]
    EmptyBatch,
}

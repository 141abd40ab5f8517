pub mod document;
pub mod metrics;

pub use document::*;
pub use metrics::*;

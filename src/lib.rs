//! Earnings Analyzer: quarterly metrics from earnings-report PDFs.
//!
//! Each report's text is sent to a language model that returns a fixed set
//! of metrics as JSON. Results are keyed by report label, summarized in one
//! final model call, and exposed through [`session::AnalysisSession`] for
//! the text views in [`report`].

pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod session;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` wins over the defaults.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "earnings_analyzer=debug"
    } else {
        config::default_log_filter()
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

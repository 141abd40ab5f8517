//! Command-line surface.
//!
//! `earnings-analyzer analyze <PATHS>...` runs one batch over the given
//! reports and prints the requested view. Directories expand to the PDF
//! files directly inside them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{AnalyzerConfig, Provider};
use crate::models::SourceDocument;
use crate::pipeline::batch::{BatchOutcome, BatchPipeline, BatchStatusEvent};
use crate::pipeline::extraction::PdfTextExtractor;
use crate::report::{self, View};
use crate::session::AnalysisSession;

/// Progress bar resolution; fractions are mapped onto this many steps.
const PROGRESS_STEPS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "earnings-analyzer")]
#[command(about = "Extract quarterly metrics from earnings-report PDFs and summarize the trend")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a batch of quarterly reports
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// PDF files or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Model provider (defaults to ANALYZER_PROVIDER, then gemini)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (defaults to the provider's default model)
    #[arg(long)]
    pub model: Option<String>,

    /// Gemini API key (defaults to GOOGLE_API_KEY or GEMINI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Ollama endpoint (defaults to OLLAMA_ENDPOINT, then http://localhost:11434)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Which view to print after the run
    #[arg(long, value_enum, default_value_t = View::All)]
    pub view: View,

    /// Print the full batch outcome as JSON instead of a view
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    /// Apply flags on top of the environment-derived configuration.
    pub fn resolve_config(&self, mut config: AnalyzerConfig) -> AnalyzerConfig {
        if let Some(provider) = self.provider {
            if provider != config.provider {
                // Keep an explicitly configured model; otherwise follow the provider.
                if config.model == config.provider.default_model() {
                    config.model = provider.default_model().to_string();
                }
                config.provider = provider;
            }
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze(args) => cmd_analyze(&args),
    }
}

fn cmd_analyze(args: &AnalyzeArgs) -> anyhow::Result<()> {
    let config = args.resolve_config(AnalyzerConfig::from_env_for(args.provider)?);
    let llm = config
        .build_client()
        .context("Model client configuration is invalid")?;

    let paths = collect_report_paths(&args.paths)?;
    let documents = load_documents(&paths);
    if documents.is_empty() {
        bail!("None of the {} report file(s) could be read", paths.len());
    }

    let extractor = PdfTextExtractor;
    let pipeline = BatchPipeline::new(&extractor, llm.as_ref());

    let progress = ProgressBar::new(PROGRESS_STEPS);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {percent:>3}% {wide_msg}")
            .context("Invalid progress bar template")?
            .progress_chars("█▓░"),
    );
    let on_status = |event: BatchStatusEvent| {
        progress.set_position((event.fraction().clamp(0.0, 1.0) * PROGRESS_STEPS as f32) as u64);
        progress.set_message(event.label());
    };

    let outcome = pipeline.run(&documents, Some(&on_status))?;
    progress.finish_with_message("Done!");

    print_notices(&outcome);

    let session = AnalysisSession::new();
    session.store_run(&outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let Some(text) = report::render(&session, args.view) {
        println!("{text}");
    }

    if outcome.results.is_empty() {
        bail!("No report produced usable metrics");
    }
    Ok(())
}

/// Expand the given paths into the list of reports to analyze.
///
/// Files are taken as given, in order. A directory contributes its `*.pdf`
/// entries (any case), sorted by name. Missing paths are an error.
pub fn collect_report_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut reports = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && has_pdf_extension(p))
                .collect();
            entries.sort();
            if entries.is_empty() {
                tracing::warn!(dir = %path.display(), "Directory contains no PDF files");
            }
            reports.extend(entries);
        } else if path.is_file() {
            reports.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }

    if reports.is_empty() {
        bail!("No PDF reports found");
    }
    Ok(reports)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Read every file, reporting the ones that cannot be read and skipping them.
fn load_documents(paths: &[PathBuf]) -> Vec<SourceDocument> {
    paths
        .iter()
        .filter_map(|path| match SourceDocument::from_path(path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                eprintln!(
                    "{} Error reading {}: {e}",
                    style("✗").red(),
                    path.display()
                );
                None
            }
        })
        .collect()
}

fn print_notices(outcome: &BatchOutcome) {
    for notice in &outcome.notices {
        eprintln!("{} {notice}", style("!").yellow());
    }
    if !outcome.notices.is_empty() {
        eprintln!(
            "{} {}/{} reports analyzed",
            style("→").cyan(),
            outcome.documents_analyzed(),
            outcome.documents_total
        );
    }
}

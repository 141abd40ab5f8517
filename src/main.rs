use clap::Parser;

use earnings_analyzer::cli::{self, Cli};
use earnings_analyzer::{config, init_tracing};

fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    cli::run(cli)
}

//! chatline CLI binary entry point.

use chatline::cli::{commands, Cli, Commands};
use chatline::config::ChatConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> chatline::error::Result<()> {
    let mut config = ChatConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.base_url = url;
    }

    match cli.command {
        Commands::Chat(args) => commands::run_chat(config, args.language).await,
        Commands::Translate(args) => commands::run_translate(config, args).await,
        Commands::Health => commands::run_health(config).await,
    }
}

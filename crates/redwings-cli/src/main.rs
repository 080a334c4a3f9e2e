//! RedWings CLI entry point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use redwings_cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::analyze(args).await?,
        Commands::Coach(args) => commands::coach(args).await?,
        Commands::Version => {
            println!("redwings {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

//! hobbes CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hobbes_cli::cmd;
use hobbes_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Install {
            repos,
            tag,
            binary,
            force,
        } => cmd::install::install(&repos, tag.as_deref(), binary.as_deref(), force, quiet).await,
        Commands::Uninstall { packages } => cmd::uninstall::uninstall(&packages, quiet),
        Commands::Update { packages, force } => cmd::update::update(&packages, force, quiet).await,
        Commands::UpgradeAll { force } => cmd::upgrade::upgrade_all(force, quiet).await,
        Commands::List => cmd::list::list(),
        Commands::Info { package } => cmd::info::info(&package),
        Commands::Outdated => cmd::outdated::outdated().await,
        Commands::Search { query, limit } => cmd::search::search(&query, limit).await,
        Commands::Pin { package } => cmd::pin::pin(&package, true, quiet),
        Commands::Unpin { package } => cmd::pin::pin(&package, false, quiet),
    }
}

//! Yogi CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yogi::cli::{preflight, Cli, Commands, ConfigAction, Output};
use yogi::config::Settings;
use yogi::server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("yogi={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    match &cli.command {
        Commands::Serve { host, port } => {
            preflight::check()?;
            let host = host.clone().unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            server::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let rendered = toml::to_string_pretty(&settings)?;
                Output::header("Current configuration");
                println!("{}", rendered);
            }
            ConfigAction::Path => {
                println!("{}", Settings::default_config_path().display());
            }
        },
    }

    Ok(())
}

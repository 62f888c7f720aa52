use anyhow::Context;
use atrium_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Atrium bookstore and restaurant-menu API
#[derive(Debug, Parser)]
#[command(name = "atrium", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load Atrium settings")?;
    atrium_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(env = ?settings.environment, "starting server");
            atrium_app::run(settings).await
        }
        Command::Migrate => {
            let applied = atrium_app::migrate(&settings).await?;
            tracing::info!(applied, "migrate finished");
            Ok(())
        }
    }
}

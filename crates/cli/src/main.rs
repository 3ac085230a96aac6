use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_kernel::settings::Settings;

/// Libris lending-library catalog
#[derive(Parser)]
#[command(name = "libris")]
#[command(about = "Libris lending-library catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the catalog HTTP server
    Serve {
        /// Port override for the HTTP server
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective settings as JSON and exit
    Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load Libris settings")?;

    match cli.command {
        Commands::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            libris_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                env = ?settings.environment,
                port = settings.server.port,
                "libris serve starting"
            );
            libris_app::run(settings).await
        }
    }
}

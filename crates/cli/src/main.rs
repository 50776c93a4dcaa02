use anyhow::Context;
use bookshare_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// bookshare: peer-to-peer book lending backend
#[derive(Debug, Parser)]
#[command(name = "bookshare", version, about)]
struct Cli {
    /// Environment overlay to load (local, staging, production)
    #[arg(long, env = "BOOKSHARE_ENV", default_value = "local", global = true)]
    env: String,

    /// Directory holding base.toml and the environment overlays
    #[arg(long, env = "BOOKSHARE_CONFIG_DIR", default_value = "config", global = true)]
    config_dir: std::path::PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Print the resolved configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from(&cli.config_dir, &cli.env)
        .with_context(|| "failed to load bookshare settings")?;

    match cli.command {
        Command::Serve => bookshare_app::run(settings).await,
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

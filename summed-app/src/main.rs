mod command;
mod terminal;
mod view;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use summed_client::ClientConfig;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::terminal::Terminal;

/// Terminal client for the Summed medical literature summarizer
#[derive(Parser, Debug)]
#[command(name = "summed", version, about)]
struct Cli {
    /// Document service address (overrides SUMMED_SERVICE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Delay before upload and summary requests, in milliseconds (overrides SUMMED_LATENCY_MS)
    #[arg(long)]
    latency_ms: Option<u64>,

    /// How long the upload success banner stays up, in milliseconds
    #[arg(long)]
    banner_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.url {
            config = config.with_base_url(url.clone());
        }
        if let Some(ms) = self.latency_ms {
            config = config.with_simulated_latency(Duration::from_millis(ms));
        }
        if let Some(ms) = self.banner_ms {
            config = config.with_success_banner(Duration::from_millis(ms));
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json)?;

    let config = cli.config()?;
    let mut terminal = Terminal::new(&config)?;
    terminal.run().await
}

//! Terminal client entry point for the Medica assistant.

use anyhow::Context;
use clap::Parser;
use log::info;
use medica_client::HttpBackend;
use medica_config::{DEFAULT_CONFIG_FILE, MedicaConfig};
use medica_core::{Backend, SessionFile, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the Medica TUI.
#[derive(Parser)]
#[command(name = "medica", version)]
struct Cli {
    /// Optional path to a medica.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL override
    #[arg(long)]
    backend_url: Option<String>,
    /// Session document path override
    #[arg(long)]
    session_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => MedicaConfig::load_from_path(path).context("failed to load config")?,
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if local.exists() {
                MedicaConfig::load_from_path(&local).context("failed to load config")?
            } else {
                MedicaConfig::default()
            }
        }
    };
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }
    if let Some(path) = cli.session_path {
        config.session.path = Some(path.display().to_string());
    }
    config.validate().context("invalid config")?;

    info!(
        "starting medica TUI (base_url={}, timeout_secs={})",
        config.backend.base_url, config.backend.timeout_secs
    );
    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::new(&config.backend).context("failed to build backend client")?,
    );
    let session = SessionStore::open(Arc::new(SessionFile::new(config.session.resolve_path())));

    medica_tui::run(backend, session).await
}

use std::io;

use autopdf_cli::config::{self, AppConfig};
use autopdf_cli::{App, Cli, logging};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&config::data_dir(&cli)?)?;

    info!("Initializing AutoPDF");
    let app_config = AppConfig::resolve(&cli, &mut io::stdin().lock(), &mut io::stdout())?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Received Ctrl+C");
            cancel.cancel();
        }
    });

    App::new(app_config).run(cancel).await
}

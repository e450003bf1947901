//! imgtag binary: classify images attached to streamed posts.

use clap::Parser;
use tracing::{error, info};

use imgtag_worker::{init_tracing, runner, Cli, PipelineConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = PipelineConfig::from(&cli);
    info!(
        model = %config.model,
        model_dir = %config.model_dir.display(),
        top_k = config.top_k,
        "Starting imgtag"
    );

    if let Err(e) = runner::run(cli.command, config).await {
        if e.is_startup_error() {
            error!("Failed to start: {}", e);
        } else {
            error!("Stream terminated: {}", e);
        }
        std::process::exit(1);
    }

    info!("imgtag finished");
}

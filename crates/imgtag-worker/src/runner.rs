//! Command entry points wiring configuration to the pipeline.

use std::sync::Arc;

use tokio::io::BufReader;
use tracing::{info, warn};

use imgtag_fetch::{HttpImageFetcher, ImageSource};
use imgtag_vision::{get_model, ImageClassifier, DEFAULT_TOP_K};

use crate::classify::classify_files;
use crate::config::{Command, PipelineConfig};
use crate::driver::{DriverOptions, StreamDriver};
use crate::emitter::ResultEmitter;
use crate::error::WorkerResult;

/// Validate the configuration and load the model once.
pub fn load_model(config: &PipelineConfig) -> WorkerResult<Arc<dyn ImageClassifier>> {
    let name = config.validate()?;

    if config.top_k != DEFAULT_TOP_K {
        warn!(
            top_k = config.top_k,
            "top-k differs from {}; output lines will not match the 12-column loader table",
            DEFAULT_TOP_K
        );
    }

    Ok(get_model(name.as_str(), &config.model_config())?)
}

/// Run the selected command to completion.
pub async fn run(command: Option<Command>, config: PipelineConfig) -> WorkerResult<()> {
    let model = load_model(&config)?;

    match command.unwrap_or(Command::Stream) {
        Command::Stream => {
            let source: Arc<dyn ImageSource> = Arc::new(HttpImageFetcher::from_env()?);
            run_stream(model, source, &config).await
        }
        Command::Classify { paths } => {
            let mut stdout = std::io::stdout().lock();
            classify_files(model.as_ref(), &paths, config.top_k, &mut stdout)?;
            Ok(())
        }
    }
}

/// Classify records from stdin, writing result lines to stdout.
pub async fn run_stream(
    model: Arc<dyn ImageClassifier>,
    source: Arc<dyn ImageSource>,
    config: &PipelineConfig,
) -> WorkerResult<()> {
    let emitter = ResultEmitter::new(std::io::stdout());
    let mut driver = StreamDriver::new(model, source, emitter, DriverOptions::from(config));

    info!("Reading records from stdin");
    driver.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}

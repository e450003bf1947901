//! Tracing setup and per-record logging.
//!
//! Diagnostics always go to stderr; stdout carries only result lines.

use tracing::{debug, info, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use imgtag_models::{MissingImage, Prediction, RecordId};

/// Default filter directives when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,imgtag={},ort=warn", level)
}

/// Install the global subscriber.
///
/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing(verbose: bool) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger keyed by a record identifier.
#[derive(Debug, Clone)]
pub struct RecordLogger {
    record_id: String,
}

impl RecordLogger {
    pub fn new(record_id: &RecordId) -> Self {
        Self {
            record_id: record_id.to_string(),
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// Log why a record has nothing to classify.
    pub fn log_missing_image(&self, reason: MissingImage) {
        match reason {
            MissingImage::NoMedia => info!(
                record_id = %self.record_id,
                "no image found in record id={}", self.record_id
            ),
            MissingImage::NoUrl => info!(
                record_id = %self.record_id,
                "failed to extract image URL for record id={}", self.record_id
            ),
        }
    }

    pub fn log_analyzing(&self) {
        debug!(record_id = %self.record_id, "analyzing record id {}", self.record_id);
    }

    pub fn log_predictions(&self, prediction: &Prediction) {
        info!(
            record_id = %self.record_id,
            "predictions for record id {} = {}", self.record_id, prediction
        );
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!("record", record_id = %self.record_id)
    }
}

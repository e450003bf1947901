//! Stream driver: parse, locate, fetch, classify and emit, one record at a time.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, Instrument};

use imgtag_fetch::ImageSource;
use imgtag_models::{parse_record, Record};
use imgtag_vision::{predict, ImageClassifier, DEFAULT_TOP_K};

use crate::config::PipelineConfig;
use crate::emitter::ResultEmitter;
use crate::error::WorkerResult;
use crate::locator::locate_image_url;
use crate::logging::RecordLogger;
use crate::metrics;

/// Parsed records between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub top_k: usize,
    pub log_predictions: bool,
    pub progress_interval: u64,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            log_predictions: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl From<&PipelineConfig> for DriverOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            top_k: config.top_k,
            log_predictions: config.log_predictions,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Reading,
    /// End of input or a fatal inference error.
    Terminated,
}

/// How one input line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Malformed,
    NoImage,
    FetchFailed,
    /// Classified but nothing to write (empty vocabulary).
    Empty,
    Emitted,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOutcome::Malformed => "malformed",
            RecordOutcome::NoImage => "no_image",
            RecordOutcome::FetchFailed => "fetch_failed",
            RecordOutcome::Empty => "empty",
            RecordOutcome::Emitted => "emitted",
        }
    }
}

/// Running totals for one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Successfully parsed records; drives progress reporting.
    pub parsed: u64,
    pub malformed: u64,
    pub no_image: u64,
    pub fetch_failed: u64,
    pub empty: u64,
    pub emitted: u64,
    pub progress_reports: u64,
}

impl DriverStats {
    fn count(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Malformed => self.malformed += 1,
            RecordOutcome::NoImage => self.no_image += 1,
            RecordOutcome::FetchFailed => self.fetch_failed += 1,
            RecordOutcome::Empty => self.empty += 1,
            RecordOutcome::Emitted => self.emitted += 1,
        }
    }
}

/// Sequential record pipeline.
///
/// One record is fully processed before the next line is read. Bad lines,
/// records without images and failed fetches are logged and skipped; an
/// inference error ends the stream.
pub struct StreamDriver<W: Write> {
    model: Arc<dyn ImageClassifier>,
    source: Arc<dyn ImageSource>,
    emitter: ResultEmitter<W>,
    options: DriverOptions,
    stats: DriverStats,
    state: DriverState,
}

impl<W: Write> StreamDriver<W> {
    pub fn new(
        model: Arc<dyn ImageClassifier>,
        source: Arc<dyn ImageSource>,
        emitter: ResultEmitter<W>,
        options: DriverOptions,
    ) -> Self {
        Self {
            model,
            source,
            emitter,
            options,
            stats: DriverStats::default(),
            state: DriverState::Reading,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    pub fn into_output(self) -> W {
        self.emitter.into_inner()
    }

    /// Consume `input` until end of stream or a fatal error.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> WorkerResult<DriverStats> {
        let result = self.read_lines(input).await;
        self.state = DriverState::Terminated;

        info!(
            parsed = self.stats.parsed,
            malformed = self.stats.malformed,
            no_image = self.stats.no_image,
            fetch_failed = self.stats.fetch_failed,
            empty = self.stats.empty,
            emitted = self.stats.emitted,
            progress_reports = self.stats.progress_reports,
            completed = result.is_ok(),
            "Stream ended"
        );

        result.map(|()| self.stats.clone())
    }

    async fn read_lines<R: AsyncBufRead + Unpin>(&mut self, input: R) -> WorkerResult<()> {
        let mut segments = input.split(b'\n');
        while let Some(segment) = segments.next_segment().await? {
            match std::str::from_utf8(&segment) {
                Ok(line) => {
                    self.process_line(line).await?;
                }
                Err(e) => {
                    self.skip_malformed(&String::from_utf8_lossy(&segment), &e.to_string());
                }
            }
        }
        Ok(())
    }

    /// Handle one input line.
    ///
    /// Only inference failures and output write failures are returned as
    /// errors.
    pub async fn process_line(&mut self, line: &str) -> WorkerResult<RecordOutcome> {
        let record = match parse_record(line) {
            Ok(record) => record,
            Err(e) => return Ok(self.skip_malformed(line, &e.to_string())),
        };

        self.stats.parsed += 1;
        let interval = self.options.progress_interval;
        if interval > 0 && self.stats.parsed % interval == 0 {
            info!(total = self.stats.parsed, "observed a total of {} records", self.stats.parsed);
            self.stats.progress_reports += 1;
            metrics::record_progress_report();
        }

        let logger = RecordLogger::new(&record.id);
        logger.log_analyzing();

        let span = logger.create_span();
        let outcome = self.classify_record(&record, &logger).instrument(span).await?;

        self.stats.count(outcome);
        metrics::record_outcome(outcome);
        Ok(outcome)
    }

    async fn classify_record(
        &mut self,
        record: &Record,
        logger: &RecordLogger,
    ) -> WorkerResult<RecordOutcome> {
        let Some(url) = locate_image_url(record) else {
            return Ok(RecordOutcome::NoImage);
        };

        let Some(image) = self.source.fetch_image(&url).await else {
            return Ok(RecordOutcome::FetchFailed);
        };

        let model_name = self.model.spec().name.as_str();
        let started = Instant::now();
        let prediction = match predict(self.model.as_ref(), &image, self.options.top_k) {
            Ok(prediction) => prediction,
            Err(e) => {
                metrics::record_inference_failure(model_name);
                return Err(e.into());
            }
        };
        metrics::record_inference_duration(model_name, started.elapsed().as_secs_f64());
        drop(image);

        if self.options.log_predictions {
            logger.log_predictions(&prediction);
        }

        if self.emitter.emit(&record.id, Some(&url), &prediction)? {
            Ok(RecordOutcome::Emitted)
        } else {
            Ok(RecordOutcome::Empty)
        }
    }

    fn skip_malformed(&mut self, line: &str, reason: &str) -> RecordOutcome {
        info!("Failed to parse record. Skipping.");
        debug!(line = %line, "Bad record: {}", reason);

        self.stats.count(RecordOutcome::Malformed);
        metrics::record_outcome(RecordOutcome::Malformed);
        RecordOutcome::Malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let config = PipelineConfig {
            top_k: 3,
            log_predictions: true,
            ..PipelineConfig::default()
        };
        let options = DriverOptions::from(&config);

        assert_eq!(options.top_k, 3);
        assert!(options.log_predictions);
        assert_eq!(options.progress_interval, 100);
    }

    #[test]
    fn test_stats_count() {
        let mut stats = DriverStats::default();
        stats.count(RecordOutcome::Emitted);
        stats.count(RecordOutcome::Emitted);
        stats.count(RecordOutcome::NoImage);
        stats.count(RecordOutcome::Malformed);

        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.no_image, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.parsed, 0);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RecordOutcome::FetchFailed.as_str(), "fetch_failed");
        assert_eq!(RecordOutcome::Emitted.as_str(), "emitted");
    }
}

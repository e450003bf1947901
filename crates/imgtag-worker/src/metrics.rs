//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use metrics::{counter, histogram};

use crate::driver::RecordOutcome;

/// Metric names as constants for consistency.
pub mod names {
    pub const RECORDS_TOTAL: &str = "imgtag_records_total";
    pub const PROGRESS_REPORTS_TOTAL: &str = "imgtag_progress_reports_total";
    pub const INFERENCE_DURATION_SECONDS: &str = "imgtag_inference_duration_seconds";
    pub const INFERENCE_FAILURES_TOTAL: &str = "imgtag_inference_failures_total";
}

/// Record how one input line ended.
pub fn record_outcome(outcome: RecordOutcome) {
    let labels = [("outcome", outcome.as_str().to_string())];
    counter!(names::RECORDS_TOTAL, &labels).increment(1);
}

pub fn record_progress_report() {
    counter!(names::PROGRESS_REPORTS_TOTAL).increment(1);
}

/// Record one forward pass.
pub fn record_inference_duration(model: &str, duration_secs: f64) {
    let labels = [("model", model.to_string())];
    histogram!(names::INFERENCE_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_inference_failure(model: &str) {
    let labels = [("model", model.to_string())];
    counter!(names::INFERENCE_FAILURES_TOTAL, &labels).increment(1);
}

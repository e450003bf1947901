//! Streaming image classification worker.
//!
//! This crate provides:
//! - CLI and pipeline configuration
//! - Image URL location inside records
//! - The stream driver coordinating parse, fetch, inference and emission
//! - Comma-joined result emission for the database loader
//! - Local file classification (`imgtag classify`)

pub mod classify;
pub mod config;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod locator;
pub mod logging;
pub mod metrics;
pub mod runner;

pub use config::{Cli, Command, PipelineConfig};
pub use driver::{DriverOptions, DriverState, DriverStats, RecordOutcome, StreamDriver};
pub use emitter::ResultEmitter;
pub use error::{WorkerError, WorkerResult};
pub use locator::locate_image_url;
pub use logging::{init_tracing, RecordLogger};

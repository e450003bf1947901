//! Shared data models for the imgtag pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Input records decoded from newline-delimited JSON
//! - Image references located inside a record's media metadata
//! - Ranked predictions and the comma-joined output line

pub mod output;
pub mod prediction;
pub mod record;

// Re-export common types
pub use output::OutputLine;
pub use prediction::{LabelScore, Prediction};
pub use record::{
    parse_record, ImageReference, MalformedRecord, MediaEntity, MissingImage, Record, RecordId,
    TwitterEntities,
};

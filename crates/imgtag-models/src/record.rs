//! Input record definitions.
//!
//! A record is one social-media post decoded from a single line of input.
//! Only the identifier and the activity-stream media layout
//! (`twitter_entities.media[0].media_url`) are typed; everything else is kept
//! as raw JSON in [`Record::extra`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Unique identifier of a record.
///
/// Activity-stream payloads carry a namespaced string such as
/// `tag:search.twitter.com:2017:884212341`; other producers send a bare
/// integer. Both decode into the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier with any namespace prefix stripped.
    ///
    /// Everything up to and including the final `:` is dropped, so
    /// `tag:search.twitter.com:2017:884212341` becomes `884212341`.
    pub fn short_id(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RecordId(s),
            RawId::Number(n) => RecordId(n.to_string()),
        })
    }
}

/// URL of an image attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(pub String);

impl ImageReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Activity-stream entity block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwitterEntities {
    #[serde(default, deserialize_with = "lenient_entries", skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaEntity>>,
}

/// One attached media item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaEntity {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

/// Why a record has no image to classify.
///
/// Not an error: most posts carry no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingImage {
    /// No `twitter_entities.media` block at all.
    NoMedia,
    /// A media block exists but its first entry has no usable URL.
    NoUrl,
}

impl fmt::Display for MissingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingImage::NoMedia => write!(f, "no media metadata"),
            MissingImage::NoUrl => write!(f, "media metadata without image URL"),
        }
    }
}

/// A decoded input record.
///
/// Created once per input line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub twitter_entities: Option<TwitterEntities>,
    /// Remaining payload fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Locate the image URL using the activity-stream convention.
    pub fn image_reference(&self) -> Result<ImageReference, MissingImage> {
        let media = self
            .twitter_entities
            .as_ref()
            .and_then(|entities| entities.media.as_ref())
            .ok_or(MissingImage::NoMedia)?;

        media
            .first()
            .and_then(|entity| entity.media_url.as_deref())
            .filter(|url| !url.trim().is_empty())
            .map(ImageReference::new)
            .ok_or(MissingImage::NoUrl)
    }
}

/// A line that could not be decoded into a [`Record`].
#[derive(Debug, Error)]
#[error("Malformed record: {0}")]
pub struct MalformedRecord(#[from] pub serde_json::Error);

/// Decode one input line.
///
/// Fails only when the line is not valid JSON or lacks an `id`; records with
/// missing or oddly-shaped media metadata still parse.
pub fn parse_record(line: &str) -> Result<Record, MalformedRecord> {
    Ok(serde_json::from_str(line)?)
}

/// Decode an optional field, mapping any shape mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a media array entry by entry; an oddly-shaped entry becomes an
/// entity without URL instead of discarding its neighbours.
fn lenient_entries<'de, D>(deserializer: D) -> Result<Option<Vec<MediaEntity>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        )),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_activity_stream_record() {
        let line = r#"{"id":"tag:search.twitter.com:2017:884212341","body":"hi","twitter_entities":{"media":[{"media_url":"http://x/y.jpg"}]}}"#;
        let record = parse_record(line).unwrap();

        assert_eq!(record.id.as_str(), "tag:search.twitter.com:2017:884212341");
        assert_eq!(record.id.short_id(), "884212341");
        assert_eq!(
            record.image_reference(),
            Ok(ImageReference::new("http://x/y.jpg"))
        );
        assert_eq!(record.extra.get("body"), Some(&Value::from("hi")));
    }

    #[test]
    fn test_numeric_id() {
        let record = parse_record(r#"{"id":884212341}"#).unwrap();
        assert_eq!(record.id.as_str(), "884212341");
        assert_eq!(record.id.short_id(), "884212341");
    }

    #[test]
    fn test_short_id_without_namespace() {
        assert_eq!(RecordId::from("1").short_id(), "1");
        assert_eq!(RecordId::from("a:").short_id(), "");
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(parse_record("{not json").is_err());
        assert!(parse_record("").is_err());
    }

    #[test]
    fn test_missing_id_is_malformed() {
        assert!(parse_record(r#"{"twitter_entities":{}}"#).is_err());
    }

    #[test]
    fn test_no_media_block() {
        let record = parse_record(r#"{"id":"2"}"#).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoMedia));

        let record = parse_record(r#"{"id":"2","twitter_entities":{"hashtags":[]}}"#).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoMedia));
    }

    #[test]
    fn test_media_without_url() {
        let record = parse_record(r#"{"id":"3","twitter_entities":{"media":[]}}"#).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoUrl));

        let record =
            parse_record(r#"{"id":"3","twitter_entities":{"media":[{"type":"photo"}]}}"#).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoUrl));
    }

    #[test]
    fn test_wrongly_shaped_entities_are_ignored() {
        let record = parse_record(r#"{"id":"4","twitter_entities":"media"}"#).unwrap();
        assert!(record.twitter_entities.is_none());
        assert_eq!(record.image_reference(), Err(MissingImage::NoMedia));

        let record =
            parse_record(r#"{"id":"4","twitter_entities":{"media":[{"media_url":7}]}}"#).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoUrl));
    }

    #[test]
    fn test_bad_later_media_entry_keeps_first_url() {
        let line = r#"{"id":"6","twitter_entities":{"media":[{"media_url":"http://x/y.jpg"},"video"]}}"#;
        let record = parse_record(line).unwrap();
        assert_eq!(
            record.image_reference(),
            Ok(ImageReference::new("http://x/y.jpg"))
        );

        let line = r#"{"id":"6","twitter_entities":{"media":["video",{"media_url":"http://x/y.jpg"}]}}"#;
        let record = parse_record(line).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoUrl));

        let record = parse_record(r#"{"id":"6","twitter_entities":{"media":"none"}}"#).unwrap();
        assert_eq!(record.image_reference(), Err(MissingImage::NoMedia));
    }

    #[test]
    fn test_only_first_media_entry_is_used() {
        let line = r#"{"id":"5","twitter_entities":{"media":[{"media_url":"http://a/1.png"},{"media_url":"http://a/2.png"}]}}"#;
        let record = parse_record(line).unwrap();
        assert_eq!(record.image_reference().unwrap().as_str(), "http://a/1.png");
    }
}

//! Image locator.

use imgtag_models::{ImageReference, Record};

use crate::logging::RecordLogger;

/// Find the image URL of a record, logging why when there is none.
pub fn locate_image_url(record: &Record) -> Option<ImageReference> {
    match record.image_reference() {
        Ok(url) => Some(url),
        Err(reason) => {
            RecordLogger::new(&record.id).log_missing_image(reason);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgtag_models::parse_record;

    #[test]
    fn test_first_media_url() {
        let record = parse_record(
            r#"{"id":"1","twitter_entities":{"media":[{"media_url":"http://x/a.jpg"},{"media_url":"http://x/b.jpg"}]}}"#,
        )
        .unwrap();
        assert_eq!(
            locate_image_url(&record),
            Some(ImageReference::new("http://x/a.jpg"))
        );
    }

    #[test]
    fn test_absent_media() {
        let record = parse_record(r#"{"id":"2"}"#).unwrap();
        assert_eq!(locate_image_url(&record), None);

        let record = parse_record(r#"{"id":"3","twitter_entities":{"hashtags":[]}}"#).unwrap();
        assert_eq!(locate_image_url(&record), None);
    }

    #[test]
    fn test_media_without_url() {
        let record = parse_record(r#"{"id":"4","twitter_entities":{"media":[{"type":"photo"}]}}"#).unwrap();
        assert_eq!(locate_image_url(&record), None);

        let record = parse_record(r#"{"id":"5","twitter_entities":{"media":[]}}"#).unwrap();
        assert_eq!(locate_image_url(&record), None);
    }
}

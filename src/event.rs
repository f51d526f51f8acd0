//! The S3 notification payload delivered by the Lambda runtime, and the
//! trigger extracted from it.

use serde::Deserialize;
use tracing::warn;

use crate::error::HandlerError;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// The object that triggered this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub bucket: String,
    pub key: String,
}

impl TriggerEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        TriggerEvent {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Take the first record of a notification. Any further records are
    /// logged and ignored.
    pub fn from_event(event: &S3Event) -> Result<Self, HandlerError> {
        let record = event
            .records
            .first()
            .ok_or_else(|| HandlerError::InvalidEvent("event contains no records".to_string()))?;

        if event.records.len() > 1 {
            warn!(
                ignored = event.records.len() - 1,
                "event carries more than one record, only the first is processed"
            );
        }

        // Whitespace is significant in object keys
        let bucket = &record.s3.bucket.name;
        let key = &record.s3.object.key;
        if bucket.trim().is_empty() || key.trim().is_empty() {
            return Err(HandlerError::InvalidEvent(
                "record is missing the bucket name or object key".to_string(),
            ));
        }

        Ok(TriggerEvent::new(bucket.as_str(), key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTIFICATION: &str = r#"{
        "Records": [
            {
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "incoming", "arn": "arn:aws:s3:::incoming" },
                    "object": { "key": "batch/data.zip", "size": 1024 }
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_notification() {
        let event: S3Event = serde_json::from_str(NOTIFICATION).unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].event_name.as_deref(), Some("ObjectCreated:Put"));
        assert_eq!(event.records[0].s3.object.size, Some(1024));

        let trigger = TriggerEvent::from_event(&event).unwrap();
        assert_eq!(trigger, TriggerEvent::new("incoming", "batch/data.zip"));
    }

    #[test]
    fn test_first_record_wins() {
        let json = r#"{"Records": [
            {"s3": {"bucket": {"name": "a"}, "object": {"key": "one.zip"}}},
            {"s3": {"bucket": {"name": "b"}, "object": {"key": "two.zip"}}}
        ]}"#;
        let event: S3Event = serde_json::from_str(json).unwrap();
        let trigger = TriggerEvent::from_event(&event).unwrap();
        assert_eq!(trigger, TriggerEvent::new("a", "one.zip"));
    }

    #[test]
    fn test_empty_event_rejected() {
        let event: S3Event = serde_json::from_str("{}").unwrap();
        let err = TriggerEvent::from_event(&event).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidEvent(_)));
    }

    #[test]
    fn test_blank_key_rejected() {
        let json = r#"{"Records": [{"s3": {"bucket": {"name": "a"}, "object": {"key": ""}}}]}"#;
        let event: S3Event = serde_json::from_str(json).unwrap();
        assert!(TriggerEvent::from_event(&event).is_err());
    }

    #[test]
    fn test_whitespace_only_key_rejected() {
        let json = r#"{"Records": [{"s3": {"bucket": {"name": "a"}, "object": {"key": "   "}}}]}"#;
        let event: S3Event = serde_json::from_str(json).unwrap();
        assert!(matches!(
            TriggerEvent::from_event(&event),
            Err(HandlerError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_key_whitespace_preserved() {
        let json = r#"{"Records": [
            {"s3": {"bucket": {"name": "incoming"}, "object": {"key": " batch/data.zip "}}}
        ]}"#;
        let event: S3Event = serde_json::from_str(json).unwrap();
        let trigger = TriggerEvent::from_event(&event).unwrap();
        assert_eq!(trigger.key, " batch/data.zip ");
        assert_eq!(trigger.bucket, "incoming");
    }
}

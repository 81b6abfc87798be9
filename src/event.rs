//! Object-created notification payload consumed by the row filter.
//!
//! Only the fields the pipeline reads are modelled; everything else in the payload is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::store::ObjectLocation;

/// Notification delivered when one or more objects are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ObjectCreatedEvent {
    /// Parse a JSON notification payload.
    pub fn from_json(input: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Build a single-record event for `location`.
    pub fn for_object(location: &ObjectLocation) -> Self {
        Self {
            records: vec![EventRecord {
                event_name: Some("ObjectCreated:Put".to_string()),
                s3: S3Entity {
                    bucket: BucketEntity {
                        name: location.bucket.clone(),
                    },
                    object: ObjectEntity {
                        key: location.key.clone(),
                        size: None,
                    },
                },
            }],
        }
    }

    /// Location of the source object. Only the first record is consumed; keys are used verbatim.
    pub fn source(&self) -> PipelineResult<ObjectLocation> {
        let record = self.records.first().ok_or_else(|| PipelineError::InvalidEvent {
            message: "event contains no records".to_string(),
        })?;
        if self.records.len() > 1 {
            tracing::warn!(
                records = self.records.len(),
                "event carries several records; only the first is processed"
            );
        }
        Ok(ObjectLocation::new(
            record.s3.bucket.name.clone(),
            record.s3.object.key.clone(),
        ))
    }
}

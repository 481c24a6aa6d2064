//! Raw per-sample metadata as read from the study/sample cache on disk.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RawError {
    #[error("raw field '{field}' on sample '{sample_id}' is not string-typed")]
    RawFieldMalformed { sample_id: String, field: String },
}

/// A single sample's free-text metadata, keyed by field name.
///
/// Field order is preserved in `raw_fields` via a `BTreeMap` so that
/// downstream iteration (extraction, textview construction) is deterministic
/// by field key regardless of the order fields appeared in the source JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub sample_id: String,
    pub raw_fields: BTreeMap<String, String>,
}

/// On-disk shape of a cached GSM file, which may carry non-string values
/// (numbers, nulls, nested objects) that this crate rejects at the boundary.
#[derive(Debug, Deserialize)]
struct RawSampleOnDisk {
    sample_id: String,
    raw_fields: BTreeMap<String, Value>,
}

impl RawSample {
    pub fn from_json(bytes: &[u8]) -> Result<Self, RawError> {
        let on_disk: RawSampleOnDisk = serde_json::from_slice(bytes).map_err(|err| {
            RawError::RawFieldMalformed {
                sample_id: "<unknown>".to_string(),
                field: format!("<parse error: {err}>"),
            }
        })?;

        let mut raw_fields = BTreeMap::new();
        for (field, value) in on_disk.raw_fields {
            match value {
                Value::String(s) => {
                    raw_fields.insert(field, s);
                }
                _ => {
                    return Err(RawError::RawFieldMalformed {
                        sample_id: on_disk.sample_id,
                        field,
                    });
                }
            }
        }

        Ok(RawSample {
            sample_id: on_disk.sample_id,
            raw_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_fields() {
        let json = br#"{"sample_id": "GSM1", "raw_fields": {"title": "lung cancer sample"}}"#;
        let sample = RawSample::from_json(json).unwrap();
        assert_eq!(sample.sample_id, "GSM1");
        assert_eq!(sample.raw_fields["title"], "lung cancer sample");
    }

    #[test]
    fn rejects_non_string_field() {
        let json = br#"{"sample_id": "GSM1", "raw_fields": {"age": 42}}"#;
        let err = RawSample::from_json(json).unwrap_err();
        matches!(err, RawError::RawFieldMalformed { .. });
    }
}

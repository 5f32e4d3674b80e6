//! Conversion between typed records and stored documents.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::{Document, DocumentPath};

use super::errors::StoreError;

/// Serialize a record into a document.
pub fn encode<T: Serialize>(path: &DocumentPath, record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::InvalidDocument {
            path: path.to_string(),
            reason: format!("expected an object, got {other}"),
        }),
        Err(e) => Err(StoreError::InvalidDocument {
            path: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Deserialize a stored document into a record.
pub fn decode<T: DeserializeOwned>(path: &DocumentPath, document: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(|e| StoreError::InvalidDocument {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Edge {
        uid: String,
    }

    #[test]
    fn test_decode_reports_path() {
        let path = DocumentPath::parse("users/B/followers/F1").unwrap();
        let err = decode::<Edge>(&path, Document::new()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { ref path, .. } if path == "users/B/followers/F1"));
    }

    #[test]
    fn test_encode_object() {
        let path = DocumentPath::parse("users/B/followers/F1").unwrap();
        let doc = encode(&path, &Edge { uid: "F1".into() }).unwrap();
        assert_eq!(doc["uid"], "F1");
        assert_eq!(decode::<Edge>(&path, doc).unwrap(), Edge { uid: "F1".into() });
    }
}

//! Helpers shared by the application modules.

use atrium_http::Json;
use serde::Serialize;
use serde_json::Value;

/// Fresh document id: a time-ordered UUID string
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// `{"message": ...}` body returned by deletes and other acknowledgements
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

pub fn message(text: impl Into<String>) -> Json<Message> {
    Json(Message {
        message: text.into(),
    })
}

/// Copy the keys of `extra` into `target`, e.g. shared comment paths into a
/// module's OpenAPI paths. Both must be objects.
pub fn extend_object(target: &mut Value, extra: Value) {
    if let (Some(target), Value::Object(extra)) = (target.as_object_mut(), extra) {
        target.extend(extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_uuids() {
        let first = new_id();
        let second = new_id();

        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn extend_object_adds_and_overrides_keys() {
        let mut target = serde_json::json!({ "/a": 1, "/b": 2 });
        extend_object(&mut target, serde_json::json!({ "/b": 3, "/c": 4 }));
        assert_eq!(target, serde_json::json!({ "/a": 1, "/b": 3, "/c": 4 }));

        let mut scalar = serde_json::json!(5);
        extend_object(&mut scalar, serde_json::json!({ "/a": 1 }));
        assert_eq!(scalar, serde_json::json!(5));
    }
}

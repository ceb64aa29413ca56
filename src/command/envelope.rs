//! Uniform success/failure envelope returned by every submission

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form success payload
pub type Payload = Map<String, Value>;

/// Outcome of one submitted command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResultEnvelope {
    Success { payload: Payload },
    Failure { error: String },
}

impl ResultEnvelope {
    pub fn success(payload: Payload) -> Self {
        Self::Success { payload }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Look up a top-level payload key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload().and_then(|p| p.get(key))
    }
}

impl<E: std::fmt::Display> From<std::result::Result<Payload, E>> for ResultEnvelope {
    fn from(result: std::result::Result<Payload, E>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Payload holding a single message
pub fn message(text: impl Into<String>) -> Payload {
    let mut payload = Payload::new();
    payload.insert("message".into(), Value::String(text.into()));
    payload
}

/// Serialize a typed record into a payload map
///
/// Records that serialize to something other than an object are wrapped
/// under `key`.
pub fn to_payload<T: Serialize>(key: &str, record: &T) -> Result<Payload> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut payload = Payload::new();
            payload.insert(key.to_string(), other);
            Ok(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_and_failure_are_exclusive() {
        let ok = ResultEnvelope::success(message("done"));
        assert!(ok.is_success() && !ok.is_failure());
        assert_eq!(ok.get("message"), Some(&json!("done")));
        assert!(ok.error().is_none());

        let failed = ResultEnvelope::failure("boom");
        assert!(failed.is_failure() && !failed.is_success());
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.payload().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let failed = ResultEnvelope::failure("boom");
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value, json!({"outcome": "failure", "error": "boom"}));

        let ok = ResultEnvelope::success(message("hi"));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["payload"]["message"], "hi");
    }

    #[test]
    fn test_to_payload_wraps_non_objects() {
        let payload = to_payload("processes", &vec![1, 2, 3]).unwrap();
        assert_eq!(payload.get("processes"), Some(&json!([1, 2, 3])));

        #[derive(Serialize)]
        struct Weather {
            location: String,
        }
        let payload = to_payload(
            "weather",
            &Weather {
                location: "Paris".into(),
            },
        )
        .unwrap();
        assert_eq!(payload.get("location"), Some(&json!("Paris")));
    }
}

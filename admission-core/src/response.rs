//! The `status` object carried on a denied [`AdmissionResponse`](crate::admission::AdmissionResponse).
use serde::{Deserialize, Serialize};

/// A minimal Kubernetes `Status` object.
///
/// This is a deliberately simplified form of the upstream `Status` type: an
/// admission webhook only ever needs to report a human-readable `message`
/// and an optional machine-readable `reason`, never the full list of
/// causes a general API error can carry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Human-readable description of why the request was rejected.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Machine-readable reason code, e.g. `"InvalidRequest"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl Status {
    /// Build a failure status with the given message and reason.
    pub fn failure(message: &str, reason: &str) -> Self {
        Self {
            message: message.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Status;

    #[test]
    fn failure_status_round_trips() {
        let status = Status::failure("denied", "PolicyViolation");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["message"], "denied");
        assert_eq!(json["reason"], "PolicyViolation");
    }

    #[test]
    fn default_status_serializes_empty() {
        let status = Status::default();
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}

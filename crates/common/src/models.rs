use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest known reachability of a single host.
///
/// This is both the body of `POST /status` and an element of the
/// `GET /status` array, so the serde names are the wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatus {
    /// Address or name of the probed target. Unique per store.
    #[serde(rename = "ip")]
    pub host: String,
    /// Mean round-trip time of the last successful probe, in milliseconds.
    #[serde(rename = "ping_time")]
    pub latency_millis: i32,
    /// When the last successful probe finished (UTC, RFC 3339 on the wire).
    pub last_success: DateTime<Utc>,
}

impl HostStatus {
    pub fn new(host: impl Into<String>, latency_millis: i32, last_success: DateTime<Utc>) -> Self {
        Self {
            host: host.into(),
            latency_millis,
            last_success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_with_wire_names() {
        let status = HostStatus::new(
            "10.0.0.1",
            12,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let value = serde_json::to_value(&status).unwrap();

        assert_eq!(value["ip"], "10.0.0.1");
        assert_eq!(value["ping_time"], 12);
        assert_eq!(value["last_success"], "2024-01-01T00:00:00Z");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_deserializes_offset_timestamp_as_utc() {
        let json = r#"{"ip":"example.org","ping_time":7,"last_success":"2024-01-01T03:00:00+03:00"}"#;
        let status: HostStatus = serde_json::from_str(json).unwrap();

        assert_eq!(status.host, "example.org");
        assert_eq!(status.latency_millis, 7);
        assert_eq!(
            status.last_success,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_missing_and_mistyped_fields() {
        let missing = r#"{"ip":"10.0.0.1","ping_time":12}"#;
        assert!(serde_json::from_str::<HostStatus>(missing).is_err());

        let mistyped = r#"{"ip":"10.0.0.1","ping_time":"fast","last_success":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<HostStatus>(mistyped).is_err());
    }
}

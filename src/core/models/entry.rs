use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Open key-value payload attached to an entry. Shape is up to the caller.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One metered API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    #[serde(with = "local_timestamp")]
    pub timestamp: DateTime<Local>,
    pub service: String,
    pub operation: String,
    pub cost_usd: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

/// ISO-8601 local timestamps. Writes RFC 3339 with offset; also reads the
/// offset-less form (`2025-01-31T10:15:00.123456`) as local time.
mod local_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: '{}'", raw)))
    }

    fn parse(raw: &str) -> Option<DateTime<Local>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn deserialize_with_offset() {
        let json = r#"{
            "timestamp": "2025-03-01T09:30:00.000001+00:00",
            "service": "OpenAI",
            "operation": "completion",
            "cost_usd": 0.03,
            "metadata": {"model": "gpt-4"}
        }"#;
        let entry: UsageEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.service, "OpenAI");
        assert_eq!(entry.metadata["model"], "gpt-4");
        assert_eq!(entry.timestamp.timestamp_subsec_micros(), 1);
    }

    #[test]
    fn deserialize_naive_timestamp_as_local() {
        let json = r#"{
            "timestamp": "2025-01-31T10:15:00.123456",
            "service": "Suno",
            "operation": "music_generation",
            "cost_usd": 0.1,
            "metadata": {}
        }"#;
        let entry: UsageEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp.date_naive().day(), 31);
        assert_eq!(entry.timestamp.hour(), 10);
        assert_eq!(entry.timestamp.minute(), 15);
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let json = r#"{
            "timestamp": "2025-01-31T10:15:00",
            "service": "Exa MCP",
            "operation": "web_search",
            "cost_usd": 0
        }"#;
        let entry: UsageEntry = serde_json::from_str(json).unwrap();
        assert!(entry.metadata.is_empty());
        assert_eq!(entry.cost_usd, 0.0);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let json = r#"{"timestamp":"yesterday","service":"a","operation":"b","cost_usd":0}"#;
        let err = serde_json::from_str::<UsageEntry>(json).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn serialized_timestamp_reparses_to_same_instant() {
        let now = Local::now();
        let entry = UsageEntry {
            timestamp: now,
            service: "HeyGen".into(),
            operation: "video_generation".into(),
            cost_usd: 0.5,
            metadata: Metadata::new(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: UsageEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.timestamp.timestamp_micros(),
            now.timestamp_micros()
        );
    }
}

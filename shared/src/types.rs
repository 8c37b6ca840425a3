//! Common types for the shared crate
//!
//! The remote API is not consistent about how it encodes instants: records
//! written through the REST layer carry RFC 3339 strings, older ones carry
//! epoch milliseconds, and documents that came through Firestore keep the
//! `{_seconds, _nanoseconds}` object. [`Timestamp`] accepts all three.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Instant as sent by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// RFC 3339 / ISO 8601 string
    Iso(String),
    /// Unix milliseconds
    Millis(i64),
    /// Firestore timestamp object
    Firestore {
        #[serde(rename = "_seconds")]
        seconds: i64,
        #[serde(rename = "_nanoseconds", default)]
        nanoseconds: u32,
    },
}

impl Timestamp {
    /// Build an ISO timestamp from a UTC instant
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::Iso(dt.to_rfc3339())
    }

    /// Convert to a UTC instant, `None` when the value cannot be parsed
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Iso(s) => parse_iso(s),
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::Firestore {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(*seconds, *nanoseconds).single(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Deserialize a count that may arrive as a number, a numeric string or junk
///
/// Anything that is not a number becomes `None`.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Deserialize an optional timestamp, mapping anything unreadable to `None`
///
/// Epoch millis may come as a float (`1714557600000.0`).
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map(Timestamp::Millis),
        Some(value @ (serde_json::Value::String(_) | serde_json::Value::Object(_))) => {
            serde_json::from_value(value).ok()
        }
        _ => None,
    })
}

/// Record id that the API may send as `id`, `_id`, `uid` or any mix of them
///
/// Used as `#[serde(flatten, with = "crate::types::record_id")]` so several id
/// keys in one object do not collide. `id` wins, then `_id`, then `uid`.
pub mod record_id {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Number(i64),
    }

    impl IdValue {
        fn into_string(self) -> String {
            match self {
                IdValue::Text(s) => s,
                IdValue::Number(n) => n.to_string(),
            }
        }
    }

    #[derive(Deserialize)]
    struct Ids {
        #[serde(default)]
        id: Option<IdValue>,
        #[serde(default, rename = "_id")]
        object_id: Option<IdValue>,
        #[serde(default)]
        uid: Option<IdValue>,
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids = Ids::deserialize(deserializer)?;
        ids.id
            .or(ids.object_id)
            .or(ids.uid)
            .map(IdValue::into_string)
            .ok_or_else(|| D::Error::missing_field("id"))
    }

    pub fn serialize<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("id", id)?;
        map.end()
    }
}

/// Accepts full RFC 3339 as well as the `YYYY-MM-DDTHH:MM:SS` form without offset
/// (treated as UTC) and bare dates.
fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_encodings() {
        let iso: Timestamp = serde_json::from_str("\"2024-05-01T10:00:00Z\"").unwrap();
        let millis: Timestamp = serde_json::from_str("1714557600000").unwrap();
        let fs: Timestamp =
            serde_json::from_str(r#"{"_seconds":1714557600,"_nanoseconds":0}"#).unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(iso.to_datetime(), Some(expected));
        assert_eq!(millis.to_datetime(), Some(expected));
        assert_eq!(fs.to_datetime(), Some(expected));
    }

    #[derive(Deserialize)]
    struct Stocked {
        #[serde(default, deserialize_with = "lenient_count")]
        stock: Option<i64>,
    }

    #[test]
    fn test_lenient_count() {
        let parse = |s: &str| serde_json::from_str::<Stocked>(s).unwrap().stock;
        assert_eq!(parse(r#"{"stock": 7}"#), Some(7));
        assert_eq!(parse(r#"{"stock": "12"}"#), Some(12));
        assert_eq!(parse(r#"{"stock": 3.0}"#), Some(3));
        assert_eq!(parse(r#"{"stock": "n/a"}"#), None);
        assert_eq!(parse(r#"{"stock": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn test_naive_and_garbage() {
        let naive = Timestamp::Iso("2024-05-01T10:00:00.250".into());
        assert!(naive.to_datetime().is_some());
        let date_only = Timestamp::Iso("2024-05-01".into());
        assert!(date_only.to_datetime().is_some());
        assert!(Timestamp::Iso("yesterday".into()).to_datetime().is_none());
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Record {
        #[serde(flatten, with = "record_id")]
        id: String,
        #[serde(default, deserialize_with = "lenient_timestamp")]
        created_at: Option<Timestamp>,
    }

    #[test]
    fn test_record_id_keys() {
        let parse = |s: &str| serde_json::from_str::<Record>(s).map(|r| r.id);
        assert_eq!(parse(r#"{"_id":"a"}"#).unwrap(), "a");
        assert_eq!(parse(r#"{"uid":"u"}"#).unwrap(), "u");
        assert_eq!(parse(r#"{"_id":"old","id":"new"}"#).unwrap(), "new");
        assert_eq!(parse(r#"{"id":42}"#).unwrap(), "42");
        assert!(parse(r#"{"name":"sin id"}"#).is_err());
    }

    #[test]
    fn test_lenient_timestamp() {
        let parse = |s: &str| serde_json::from_str::<Record>(s).unwrap().created_at;
        assert_eq!(
            parse(r#"{"id":"a","created_at":1714557600000.0}"#),
            Some(Timestamp::Millis(1_714_557_600_000))
        );
        assert_eq!(
            parse(r#"{"id":"a","created_at":{"_seconds":1714557600}}"#),
            Some(Timestamp::Firestore { seconds: 1_714_557_600, nanoseconds: 0 })
        );
        assert_eq!(parse(r#"{"id":"a","created_at":[1,2]}"#), None);
        assert_eq!(parse(r#"{"id":"a","created_at":true}"#), None);
        assert_eq!(parse(r#"{"id":"a"}"#), None);
    }
}

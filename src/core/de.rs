//! Serde helpers for the loosely typed scalars in Fantasy API payloads.
//!
//! The same field shows up as `1`, `"1"` or `true` depending on the endpoint,
//! so typed resources deserialize through these instead of the defaults.

use chrono::NaiveDate;
use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

/// Date format used by game weeks, rosters and league settings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("`{s}`"),
        other => other.to_string(),
    }
}

/// `1`, `"1"`, `true` -> true; `0`, `"0"`, `""`, `false`, null -> false.
pub fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Some(Value::String(s)) => match s.trim() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(D::Error::custom(format!("invalid flag `{other}`"))),
        },
        Some(other) => Err(D::Error::custom(format!("invalid flag {}", describe(&other)))),
    }
}

fn to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer from a JSON number or a numeric string.
pub fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    to_u32(&raw).ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", describe(&raw))))
}

/// Sequence of integers, each a JSON number or a numeric string.
pub fn lenient_u32_seq<'de, D>(deserializer: D) -> std::result::Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(|raw| {
            to_u32(raw).ok_or_else(|| {
                D::Error::custom(format!("expected an integer, got {}", describe(raw)))
            })
        })
        .collect()
}

/// Like [`lenient_u32`], with null and `""` meaning absent.
pub fn opt_lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(raw) => to_u32(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", describe(&raw)))),
    }
}

/// Float from a JSON number or a numeric string; null, `""` and `"-"` are absent.
pub fn opt_lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => match s.trim() {
            "" | "-" => Ok(None),
            t => t
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got `{t}`"))),
        },
        Some(other) => Err(D::Error::custom(format!(
            "expected a number, got {}",
            describe(&other)
        ))),
    }
}

/// String from a JSON string or number.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string, got {}",
            describe(&other)
        ))),
    }
}

/// Like [`lenient_string`], with null meaning absent.
pub fn opt_lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, got {}",
            describe(&other)
        ))),
    }
}

/// `YYYY-MM-DD` date.
pub fn date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "flag")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_lenient_u32")]
        count: Option<u32>,
        #[serde(default, deserialize_with = "opt_lenient_f64")]
        points: Option<f64>,
        #[serde(default, deserialize_with = "opt_lenient_string")]
        label: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Required {
        #[serde(deserialize_with = "lenient_u32")]
        week: u32,
        #[serde(deserialize_with = "lenient_string")]
        id: String,
        #[serde(deserialize_with = "date")]
        start: NaiveDate,
    }

    #[test]
    fn test_flag_variants() {
        for (raw, expected) in [
            (json!(1), true),
            (json!("1"), true),
            (json!(true), true),
            (json!(0), false),
            (json!("0"), false),
            (json!(""), false),
            (json!(false), false),
            (json!(null), false),
        ] {
            let probe: Probe = serde_json::from_value(json!({ "flag": raw.clone() })).unwrap();
            assert_eq!(probe.flag, expected, "flag {raw}");
        }
    }

    #[test]
    fn test_flag_missing_defaults_false() {
        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(!probe.flag);
        assert_eq!(probe.count, None);
        assert_eq!(probe.points, None);
        assert_eq!(probe.label, None);
    }

    #[test]
    fn test_flag_rejects_garbage() {
        assert!(serde_json::from_value::<Probe>(json!({"flag": "maybe"})).is_err());
        assert!(serde_json::from_value::<Probe>(json!({"flag": [1]})).is_err());
    }

    #[test]
    fn test_optional_numbers() {
        let probe: Probe = serde_json::from_value(json!({
            "count": "12",
            "points": "0.04",
            "label": 7
        }))
        .unwrap();
        assert_eq!(probe.count, Some(12));
        assert_eq!(probe.points, Some(0.04));
        assert_eq!(probe.label.as_deref(), Some("7"));

        let probe: Probe = serde_json::from_value(json!({"count": "", "points": "-"})).unwrap();
        assert_eq!(probe.count, None);
        assert_eq!(probe.points, None);

        assert!(serde_json::from_value::<Probe>(json!({"count": "twelve"})).is_err());
        assert!(serde_json::from_value::<Probe>(json!({"points": "lots"})).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "lenient_u32_seq")]
        ids: Vec<u32>,
    }

    #[test]
    fn test_lenient_u32_seq() {
        let parsed: Ids = serde_json::from_value(json!({"ids": ["4", 5, "6"]})).unwrap();
        assert_eq!(parsed.ids, vec![4, 5, 6]);
        assert!(serde_json::from_value::<Ids>(json!({"ids": ["x"]})).is_err());
    }

    #[test]
    fn test_required_lenient_fields() {
        let parsed: Required = serde_json::from_value(json!({
            "week": "3",
            "id": 449,
            "start": "2024-09-05"
        }))
        .unwrap();
        assert_eq!(parsed.week, 3);
        assert_eq!(parsed.id, "449");
        assert_eq!(parsed.start, NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());

        assert!(serde_json::from_value::<Required>(json!({
            "week": -3,
            "id": "449",
            "start": "2024-09-05"
        }))
        .is_err());
        assert!(serde_json::from_value::<Required>(json!({
            "week": 3,
            "id": "449",
            "start": "09/05/2024"
        }))
        .is_err());
    }
}

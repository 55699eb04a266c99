//! Normalizers for the non-standard encodings used by the Fantasy API.
//!
//! The service wraps almost everything in one of three shapes:
//! - counted arrays: `{"count": 2, "0": a, "1": b}`
//! - flattened key arrays: `[{"a": 1}, {"b": 2}, []]`
//! - tuple-wrapped resources: `{"league": [meta, {"teams": ...}]}`
//!
//! Every function here is pure and fails with [`YahooError::Decode`] when the
//! input does not have the expected shape. Nothing is defaulted.

use serde_json::{Map, Value};

use crate::error::{Result, YahooError};


/// Keys the service puts beside the resource key in the top-level payload.
pub const ENVELOPE_METADATA_KEYS: &[&str] =
    &["xml:lang", "yahoo:uri", "time", "copyright", "refresh_rate"];

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_count(count: Option<&Value>) -> Result<usize> {
    let n = match count {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(other) => {
            return Err(YahooError::decode(format!(
                "counted array `count` is a {}",
                kind(other)
            )))
        }
        None => return Err(YahooError::decode("counted array has no `count`")),
    };
    n.and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| YahooError::decode("counted array `count` is not a non-negative integer"))
}

/// `{"count": N, "0": x0, ..}` -> `[x0, .., xN-1]`.
///
/// Every index below `count` must be present.
pub fn decode_counted_array(raw: &Value) -> Result<Vec<&Value>> {
    let map = raw.as_object().ok_or_else(|| {
        YahooError::decode(format!("expected a counted array object, got {}", kind(raw)))
    })?;
    let count = parse_count(map.get("count"))?;

    (0..count)
        .map(|i| {
            map.get(&i.to_string()).ok_or_else(|| {
                YahooError::decode(format!("counted array is missing index {i} of {count}"))
            })
        })
        .collect()
}

/// Inverse of [`decode_counted_array`].
pub fn encode_counted_array<I>(items: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut map = Map::new();
    let mut count = 0usize;
    for (i, item) in items.into_iter().enumerate() {
        map.insert(i.to_string(), item);
        count = i + 1;
    }
    map.insert("count".to_string(), Value::from(count));
    Value::Object(map)
}

/// `[{"a": 1}, {"b": 2}, [], {"a": 3}]` -> `{"a": 3, "b": 2}`.
///
/// Empty-array terminators are skipped. Later keys overwrite earlier ones.
pub fn flatten_keyed_array(raw: &Value) -> Result<Map<String, Value>> {
    let items = raw.as_array().ok_or_else(|| {
        YahooError::decode(format!("expected a flattened key array, got {}", kind(raw)))
    })?;

    let mut merged = Map::new();
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Array(inner) if inner.is_empty() => continue,
            Value::Object(entry) if entry.len() == 1 => {
                for (key, value) in entry {
                    merged.insert(key.clone(), value.clone());
                }
            }
            other => {
                return Err(YahooError::decode(format!(
                    "element {i} of a flattened key array is not a single-key map ({})",
                    kind(other)
                )))
            }
        }
    }
    Ok(merged)
}

/// `[{"position": "C"}, {"position": "LW"}]` with `"position"` -> `["C", "LW"]`.
pub fn flatten_field_array<'a>(raw: &'a Value, field_name: &str) -> Result<Vec<&'a Value>> {
    let items = raw.as_array().ok_or_else(|| {
        YahooError::decode(format!(
            "expected an array of `{field_name}` entries, got {}",
            kind(raw)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.get(field_name).ok_or_else(|| {
                YahooError::decode(format!("element {i} has no `{field_name}` field"))
            })
        })
        .collect()
}

/// `{"<resource_key>": [meta, payload]}` -> `(meta, value[payload_index])`.
///
/// Which index carries the data differs per resource, so callers pass it
/// explicitly. Listing endpoints return a one-element sequence, which is
/// accepted when `payload_index` is 0. Envelope metadata keys next to the
/// resource key are ignored; any other sibling key is an error.
pub fn unwrap_tuple<'a>(
    raw: &'a Value,
    resource_key: &str,
    payload_index: usize,
) -> Result<(&'a Value, &'a Value)> {
    let map = raw.as_object().ok_or_else(|| {
        YahooError::decode(format!(
            "expected `{resource_key}` wrapper object, got {}",
            kind(raw)
        ))
    })?;

    if let Some(unexpected) = map
        .keys()
        .find(|k| k.as_str() != resource_key && !ENVELOPE_METADATA_KEYS.contains(&k.as_str()))
    {
        return Err(YahooError::decode(format!(
            "unexpected key `{unexpected}` beside `{resource_key}`"
        )));
    }

    let value = map
        .get(resource_key)
        .ok_or_else(|| YahooError::decode(format!("missing `{resource_key}` wrapper")))?;
    let parts = value.as_array().ok_or_else(|| {
        YahooError::decode(format!("`{resource_key}` is a {}, not a tuple", kind(value)))
    })?;

    if parts.is_empty() || parts.len() > 2 {
        return Err(YahooError::decode(format!(
            "`{resource_key}` tuple has {} elements",
            parts.len()
        )));
    }
    let payload = parts.get(payload_index).ok_or_else(|| {
        YahooError::decode(format!(
            "`{resource_key}` tuple has no element {payload_index}"
        ))
    })?;

    Ok((&parts[0], payload))
}

/// `raw[key]`, failing unless `raw` is a map holding `key`.
pub fn require<'a>(raw: &'a Value, key: &str) -> Result<&'a Value> {
    raw.as_object()
        .ok_or_else(|| YahooError::decode(format!("expected a map holding `{key}`, got {}", kind(raw))))?
        .get(key)
        .ok_or_else(|| YahooError::decode(format!("missing `{key}`")))
}

/// `raw[index]`, failing unless `raw` is a long enough sequence.
pub fn element(raw: &Value, index: usize) -> Result<&Value> {
    raw.as_array()
        .ok_or_else(|| YahooError::decode(format!("expected a sequence, got {}", kind(raw))))?
        .get(index)
        .ok_or_else(|| YahooError::decode(format!("sequence has no element {index}")))
}

/// Merge a sequence mixing field arrays and plain maps.
///
/// Player and team payloads come as `[[{..}, {..}, []], {"selected_position": ..}]`.
/// Everything lands in one map, later keys winning. Unlike
/// [`flatten_keyed_array`], an element of the inner arrays may carry
/// several keys (`{"headshot": {..}, "image_url": ".."}`).
pub fn merge_mixed(raw: &Value) -> Result<Map<String, Value>> {
    let items = raw.as_array().ok_or_else(|| {
        YahooError::decode(format!("expected a mixed payload sequence, got {}", kind(raw)))
    })?;

    let mut merged = Map::new();
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Array(fields) => merge_fields(&mut merged, fields, i)?,
            Value::Object(map) => merged.extend(map.clone()),
            other => {
                return Err(YahooError::decode(format!(
                    "element {i} of a mixed payload is a {}",
                    kind(other)
                )))
            }
        }
    }
    Ok(merged)
}

fn merge_fields(merged: &mut Map<String, Value>, fields: &[Value], outer: usize) -> Result<()> {
    for (j, field) in fields.iter().enumerate() {
        match field {
            Value::Object(map) => merged.extend(map.clone()),
            Value::Array(empty) if empty.is_empty() => {}
            other => {
                return Err(YahooError::decode(format!(
                    "field {j} of element {outer} in a mixed payload is a {}",
                    kind(other)
                )))
            }
        }
    }
    Ok(())
}

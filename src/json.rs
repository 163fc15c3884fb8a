//! Lenient field extraction for authoring responses that fail strict parsing.

use serde_json::{Map, Value};

/// Find the JSON object in a response, tolerating surrounding prose or fences
pub fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Some(map);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// First finite number under any of `keys`; numeric strings count
pub fn lenient_f64(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|value| {
            let v = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            v.is_finite().then_some(v)
        })
}

/// First non-empty string under any of `keys`
pub fn lenient_str(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|value| value.as_str().map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

//! Shape-tolerant accessors over raw JSON records.
//!
//! Every accessor walks a dotted path and returns `None` on any mismatch
//! (missing key, wrong type, null), so callers never have to branch on
//! the raw shape themselves.

use serde_json::{Map, Value};

/// Walk a dotted path (`"name.common"`) through nested objects
pub fn path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(json, |current, key| current.as_object()?.get(key))
        .filter(|v| !v.is_null())
}

pub fn path_str(json: &Value, key: &str) -> Option<String> {
    path(json, key).and_then(Value::as_str).map(str::to_string)
}

pub fn path_f64(json: &Value, key: &str) -> Option<f64> {
    path(json, key).and_then(Value::as_f64)
}

/// Integers only; floats with a fractional part are rejected
pub fn path_i64(json: &Value, key: &str) -> Option<i64> {
    let value = path(json, key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub fn path_object<'a>(json: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    path(json, key).and_then(Value::as_object)
}

pub fn path_array<'a>(json: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    path(json, key).and_then(Value::as_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_path() {
        let v = json!({"name": {"common": "France", "official": null}});
        assert_eq!(path_str(&v, "name.common").as_deref(), Some("France"));
        assert_eq!(path_str(&v, "name.official"), None);
        assert_eq!(path_str(&v, "name.native"), None);
        assert_eq!(path_str(&v, "name.common.deeper"), None);
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        let v = json!({"area": "big", "population": 12.5, "flags": ["x"]});
        assert_eq!(path_f64(&v, "area"), None);
        assert_eq!(path_i64(&v, "population"), None);
        assert!(path_object(&v, "flags").is_none());
        assert_eq!(path_str(&v, "flags.png"), None);
    }

    #[test]
    fn test_integral_float_is_integer() {
        let v = json!({"population": 67000000.0});
        assert_eq!(path_i64(&v, "population"), Some(67_000_000));
    }
}

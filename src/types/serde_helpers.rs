//! Custom serde deserializers for flexible type handling
//!
//! Provides custom deserializers to handle various input formats from the
//! exchange's endpoints.

use serde::{Deserialize, Deserializer, de};

/// Deserialize an integer that may arrive as either:
/// - a JSON number: `19347`
/// - a string-encoded number: `"19347"` (leading/trailing whitespace ignored)
///
/// The authentication endpoint encodes the five salts as strings, but other
/// deployments of the same backend have been observed returning bare numbers,
/// so both forms are accepted.
///
/// Note: floats, booleans, and non-numeric strings are rejected so that a
/// malformed token response fails loudly instead of descrambling garbage.
pub fn deserialize_flexible_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    // Use an intermediate Value type to handle multiple input types
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInt {
        Int(i64),
        String(String),
    }

    match FlexibleInt::deserialize(deserializer)? {
        FlexibleInt::Int(i) => i32::try_from(i)
            .map_err(|_| de::Error::custom(format!("integer out of 32-bit range: {}", i))),
        FlexibleInt::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| de::Error::custom(format!("invalid integer string: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(deserialize_with = "deserialize_flexible_i32")]
        value: i32,
    }

    #[test]
    fn test_deserialize_string_number() {
        let json = json!({"value": "19347"});
        let result: TestStruct = serde_json::from_value(json).unwrap();
        assert_eq!(result.value, 19347);
    }

    #[test]
    fn test_deserialize_bare_number() {
        let json = json!({"value": 19347});
        let result: TestStruct = serde_json::from_value(json).unwrap();
        assert_eq!(result.value, 19347);
    }

    #[test]
    fn test_deserialize_string_with_whitespace() {
        let json = json!({"value": " 42 "});
        let result: TestStruct = serde_json::from_value(json).unwrap();
        assert_eq!(result.value, 42);
    }

    #[test]
    fn test_deserialize_zero() {
        let json = json!({"value": "0"});
        let result: TestStruct = serde_json::from_value(json).unwrap();
        assert_eq!(result.value, 0);
    }

    #[test]
    fn test_deserialize_negative() {
        let json = json!({"value": "-7"});
        let result: TestStruct = serde_json::from_value(json).unwrap();
        assert_eq!(result.value, -7);
    }

    #[test]
    fn test_deserialize_out_of_range_rejected() {
        let json = json!({"value": 4_294_967_296_i64});
        let result: Result<TestStruct, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_non_numeric_string_rejected() {
        let json = json!({"value": "abc"});
        let result: Result<TestStruct, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_float_rejected() {
        let json = json!({"value": 1.5});
        let result: Result<TestStruct, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_missing_field_rejected() {
        let json = json!({});
        let result: Result<TestStruct, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_null_rejected() {
        let json = json!({"value": null});
        let result: Result<TestStruct, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}

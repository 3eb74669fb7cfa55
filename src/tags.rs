//! Best-effort repair of the `shopify_tags` column.
//!
//! The column must always hold a JSON array. Generated CSVs sometimes carry a
//! bare tag or a quoted string instead, so every input is coerced rather than
//! rejected.

use serde_json::Value;

/// Outcome of repairing one raw tags value.
///
/// Every variant carries (or implies) a serialized JSON array; the variant
/// records how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagRepair {
    /// Absent or blank input.
    Empty,
    /// Input was already a JSON array; re-serialized compactly.
    WellFormed(String),
    /// Input was a JSON string scalar, wrapped into a one-element array.
    Wrapped(String),
    /// Input was valid JSON of another shape (object, number, bool, null).
    Discarded,
    /// Input was not JSON at all; the trimmed text became a single tag.
    Fallback(String),
}

impl TagRepair {
    /// Serialized JSON array for this outcome.
    pub fn json(&self) -> &str {
        match self {
            TagRepair::Empty | TagRepair::Discarded => "[]",
            TagRepair::WellFormed(s) | TagRepair::Wrapped(s) | TagRepair::Fallback(s) => s,
        }
    }

    /// True when the stored value differs in shape from what the CSV held.
    pub fn was_repaired(&self) -> bool {
        matches!(self, TagRepair::Wrapped(_) | TagRepair::Discarded | TagRepair::Fallback(_))
    }
}

fn single_tag(tag: &str) -> String {
    // Serializing a one-element array of &str cannot fail.
    serde_json::to_string(&[tag]).unwrap_or_else(|_| "[]".to_string())
}

/// Coerce a raw tags value into a JSON array of tags.
///
/// Arrays keep their elements as-is, string scalars are wrapped, other JSON
/// shapes become `[]` and unparseable text becomes a single tag.
pub fn repair_tags(raw: Option<&str>) -> TagRepair {
    let s = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return TagRepair::Empty,
    };

    match serde_json::from_str::<Value>(s) {
        Ok(Value::Array(items)) => {
            let compact = Value::Array(items).to_string();
            TagRepair::WellFormed(compact)
        }
        Ok(Value::String(tag)) => TagRepair::Wrapped(single_tag(&tag)),
        Ok(_) => TagRepair::Discarded,
        Err(_) => TagRepair::Fallback(single_tag(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parsed(repair: &TagRepair) -> Vec<Value> {
        match serde_json::from_str::<Value>(repair.json()) {
            Ok(Value::Array(items)) => items,
            other => panic!("not an array: {:?}", other),
        }
    }

    #[test]
    fn test_plain_tag_falls_back() {
        let r = repair_tags(Some("foo-bar"));
        assert_eq!(r, TagRepair::Fallback(r#"["foo-bar"]"#.to_string()));
        assert!(r.was_repaired());
    }

    #[test]
    fn test_array_kept() {
        let r = repair_tags(Some(r#"["a","b"]"#));
        assert_eq!(r.json(), r#"["a","b"]"#);
        assert!(!r.was_repaired());
    }

    #[test]
    fn test_array_is_compacted() {
        let r = repair_tags(Some(r#"  [ "a" ,  "b" ]  "#));
        assert_eq!(r.json(), r#"["a","b"]"#);
    }

    #[test]
    fn test_array_elements_not_coerced() {
        let r = repair_tags(Some(r#"[1, "two", null, {"k": true}]"#));
        assert_eq!(r.json(), r#"[1,"two",null,{"k":true}]"#);
    }

    #[test]
    fn test_array_numbers_keep_their_text() {
        let r = repair_tags(Some("[123456789012345678901234567890, 1.50, -0]"));
        assert_eq!(r.json(), "[123456789012345678901234567890,1.50,-0]");
    }

    #[test]
    fn test_array_object_key_order_kept() {
        let r = repair_tags(Some(r#"[{"b": 1, "a": 2}]"#));
        assert_eq!(r.json(), r#"[{"b":1,"a":2}]"#);
    }

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(repair_tags(None), TagRepair::Empty);
        assert_eq!(repair_tags(Some("")).json(), "[]");
        assert_eq!(repair_tags(Some("   ")).json(), "[]");
        assert!(!repair_tags(None).was_repaired());
    }

    #[test]
    fn test_string_scalar_wrapped() {
        let r = repair_tags(Some(r#""Fiction""#));
        assert_eq!(r, TagRepair::Wrapped(r#"["Fiction"]"#.to_string()));
    }

    #[test]
    fn test_other_shapes_discarded() {
        for raw in ["42", "true", "null", r#"{"a": 1}"#, "3.5"] {
            let r = repair_tags(Some(raw));
            assert_eq!(r, TagRepair::Discarded, "input {}", raw);
            assert_eq!(r.json(), "[]");
        }
    }

    #[test]
    fn test_malformed_json_falls_back_to_trimmed_text() {
        let r = repair_tags(Some(r#"  ["a", "b"  "#));
        assert_eq!(parsed(&r), vec![Value::String(r#"["a", "b""#.to_string())]);
    }

    #[test]
    fn test_non_ascii_written_verbatim() {
        let r = repair_tags(Some("Te Reo Māori"));
        assert_eq!(r.json(), r#"["Te Reo Māori"]"#);
    }

    proptest! {
        #[test]
        fn prop_always_a_json_array(raw in any::<String>()) {
            let r = repair_tags(Some(raw.as_str()));
            let value: Value = serde_json::from_str(r.json()).unwrap();
            prop_assert!(value.is_array());
        }

        #[test]
        fn prop_jsonish_inputs_yield_arrays(raw in r#"[\[\]{}",:a-z0-9 ]{0,24}"#) {
            let r = repair_tags(Some(raw.as_str()));
            let value: Value = serde_json::from_str(r.json()).unwrap();
            prop_assert!(value.is_array());
        }
    }
}

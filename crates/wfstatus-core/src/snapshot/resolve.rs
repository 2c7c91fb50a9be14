//! Expansion of JSON references and canonical key ordering.
//!
//! Engines may emit shared sub-documents once and point at them with
//! `{"$ref": "#/json/pointer"}`. Everything is expanded against the
//! snapshot root before the document is considered canonical.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::SerializationError;

/// Key marking a JSON reference object.
pub const REFERENCE_KEY: &str = "$ref";

/// Returns the reference string if `value` is a `{"$ref": "..."}` object.
fn as_reference(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(REFERENCE_KEY)?.as_str(),
        _ => None,
    }
}

/// Expands every reference in `root`, returning a reference-free copy.
///
/// Fails if a pointer does not resolve, is not a same-document pointer, or
/// leads back to a reference that is still being expanded.
///
/// Each reference is expanded once; later occurrences reuse the result.
pub fn resolve_references(root: &Value) -> Result<Value, SerializationError> {
    let mut expander = Expander {
        root,
        active: Vec::new(),
        expanded: HashMap::new(),
    };
    expander.expand(root)
}

/// Expansion state for a single document.
struct Expander<'a> {
    root: &'a Value,
    /// References currently being expanded, innermost last.
    active: Vec<&'a str>,
    /// Finished expansions keyed by reference.
    expanded: HashMap<&'a str, Value>,
}

impl<'a> Expander<'a> {
    fn expand(&mut self, value: &'a Value) -> Result<Value, SerializationError> {
        if let Some(reference) = as_reference(value) {
            return self.expand_reference(reference);
        }

        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut expanded = Map::new();
                for (key, item) in map {
                    expanded.insert(key.clone(), self.expand(item)?);
                }
                Ok(Value::Object(expanded))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn expand_reference(&mut self, reference: &'a str) -> Result<Value, SerializationError> {
        if self.active.contains(&reference) {
            return Err(SerializationError::ReferenceCycle {
                reference: reference.to_owned(),
            });
        }
        // A cached expansion never reaches an active reference. That path
        // would have failed as a cycle when it was first expanded.
        if let Some(done) = self.expanded.get(reference) {
            return Ok(done.clone());
        }

        let pointer =
            reference
                .strip_prefix('#')
                .ok_or_else(|| SerializationError::UnsupportedReference {
                    reference: reference.to_owned(),
                })?;
        let target = self
            .root
            .pointer(pointer)
            .ok_or_else(|| SerializationError::unresolved(reference))?;

        self.active.push(reference);
        let expanded = self.expand(target);
        self.active.pop();

        let expanded = expanded?;
        self.expanded.insert(reference, expanded.clone());
        Ok(expanded)
    }
}

/// Rebuilds `value` with object keys in lexicographic order.
///
/// Arrays keep their order. The result serializes to the same bytes
/// regardless of how the input maps were ordered. Keys are sorted
/// explicitly because feature unification can enable serde_json's
/// `preserve_order`, which makes `Map` keep insertion order.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::new();
            for (key, item) in entries {
                sorted.insert(key, canonicalize(item));
            }
            Value::Object(sorted)
        }
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_document_without_references_is_unchanged() {
        let doc = json!({"a": [1, 2, {"b": null}], "c": "d"});
        assert_eq!(resolve_references(&doc).unwrap(), doc);
    }

    #[test]
    fn test_expands_references() {
        let doc = json!({
            "shared": {"name": "selection"},
            "nodes": [{"nodeid": "1", "metadata": {"$ref": "#/shared"}}],
        });

        let resolved = resolve_references(&doc).unwrap();
        assert_eq!(resolved["nodes"][0]["metadata"], json!({"name": "selection"}));
    }

    #[test]
    fn test_expands_chained_references() {
        let doc = json!({
            "a": {"$ref": "#/b"},
            "b": {"$ref": "#/c/0"},
            "c": ["value"],
        });

        let resolved = resolve_references(&doc).unwrap();
        assert_eq!(resolved["a"], json!("value"));
        assert_eq!(resolved["b"], json!("value"));
    }

    #[test]
    fn test_pointer_escapes() {
        let doc = json!({"a/b": {"c~d": 7}, "x": {"$ref": "#/a~1b/c~0d"}});
        assert_eq!(resolve_references(&doc).unwrap()["x"], json!(7));
    }

    #[test]
    fn test_unresolved_reference() {
        let doc = json!({"x": {"$ref": "#/missing"}});
        assert!(matches!(
            resolve_references(&doc),
            Err(SerializationError::UnresolvedReference { reference }) if reference == "#/missing"
        ));
    }

    #[test]
    fn test_external_reference_is_unsupported() {
        let doc = json!({"x": {"$ref": "other.json#/a"}});
        assert!(matches!(
            resolve_references(&doc),
            Err(SerializationError::UnsupportedReference { .. })
        ));
    }

    #[test]
    fn test_reference_cycle() {
        let doc = json!({"a": {"$ref": "#/b"}, "b": {"$ref": "#/a"}});
        assert!(matches!(
            resolve_references(&doc),
            Err(SerializationError::ReferenceCycle { .. })
        ));
    }

    #[test]
    fn test_self_containing_reference_is_a_cycle() {
        let doc = json!({"a": {"inner": {"$ref": "#/a"}}});
        assert!(matches!(
            resolve_references(&doc),
            Err(SerializationError::ReferenceCycle { .. })
        ));
    }

    #[test]
    fn test_shared_references_expand_once_per_pointer() {
        const DEPTH: usize = 12;

        let mut doc = Map::new();
        for level in 0..DEPTH {
            let next = format!("#/l{}", level + 1);
            doc.insert(
                format!("l{level}"),
                json!([{"$ref": next.clone()}, {"$ref": next}]),
            );
        }
        doc.insert(format!("l{DEPTH}"), json!("leaf"));
        let doc = Value::Object(doc);

        fn leaves(value: &Value) -> usize {
            match value {
                Value::Array(items) => items.iter().map(leaves).sum(),
                Value::String(s) if s == "leaf" => 1,
                _ => 0,
            }
        }

        let resolved = resolve_references(&doc).unwrap();
        assert_eq!(leaves(&resolved["l0"]), 1 << DEPTH);
        assert_eq!(leaves(&resolved[format!("l{}", DEPTH - 1)]), 2);
        assert_eq!(resolved["l0"][0], resolved["l0"][1]);
    }

    #[test]
    fn test_shared_reference_inside_cycle_still_fails() {
        let doc = json!({
            "a": [{"$ref": "#/b"}, {"$ref": "#/b"}],
            "b": {"next": {"$ref": "#/a"}},
        });
        assert!(matches!(
            resolve_references(&doc),
            Err(SerializationError::ReferenceCycle { .. })
        ));
    }

    #[test]
    fn test_ref_with_siblings_is_plain_data() {
        let doc = json!({"a": {"$ref": "#/missing", "note": "kept"}});
        assert_eq!(resolve_references(&doc).unwrap(), doc);
    }

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let doc = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        let bytes = serde_json::to_string(&canonicalize(doc)).unwrap();
        assert_eq!(bytes, r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#);
    }
}

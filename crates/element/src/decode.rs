//! Plain-JSON element decoder
//!
//! Elements that crossed a serialization boundary arrive as plain data:
//! their variant tag (and any marker identity) is lost. This decoder is
//! the compatibility shim that rebuilds them, normalizing every boundary
//! representation (reserved tag, boundary-id prop) back to the canonical
//! `Boundary` variant so one tree cannot encode the same boundary two
//! different ways.
//!
//! The decoder is total: there is no malformed input, only `Unknown`
//! elements and plain `Json` payloads.

use serde_json::{Map, Value};

use crate::types::{Element, ElementKind, ElementValue, Props};
use crate::wire::{BOUNDARY_ID_PROP, BOUNDARY_NAME};

/// Keys that mark an object as an element description rather than a plain
/// data payload (a `style` object, say). An object with none of these
/// stays opaque JSON.
const ELEMENT_OBJECT_KEYS: &[&str] = &["type", "props", "key"];

/// Decode an arbitrary JSON value into the serializer's input domain.
pub fn element_value_from_json(value: Value) -> ElementValue {
    match value {
        Value::Null => ElementValue::Null,
        Value::Bool(b) => ElementValue::Bool(b),
        Value::Number(n) => ElementValue::Number(n),
        Value::String(s) => ElementValue::String(s),
        Value::Array(items) => {
            ElementValue::List(items.into_iter().map(element_value_from_json).collect())
        }
        Value::Object(map) => {
            if ELEMENT_OBJECT_KEYS.iter().any(|k| map.contains_key(*k)) {
                decode_element(map)
            } else {
                ElementValue::Json(Value::Object(map))
            }
        }
    }
}

/// Decode a props object. Non-object input yields empty props - entry
/// points always pass a mapping, anything else carries no named values.
pub fn props_from_json(value: Value) -> Props {
    let mut props = Props::new();
    if let Value::Object(map) = value {
        for (name, value) in map {
            props.insert(name, element_value_from_json(value));
        }
    }
    props
}

fn decode_element(mut map: Map<String, Value>) -> ElementValue {
    let kind = match map.remove("type") {
        Some(Value::String(tag)) if tag == BOUNDARY_NAME => ElementKind::Boundary,
        Some(Value::String(tag)) => ElementKind::Host(tag),
        // Missing or non-string type: still an element, still serializes.
        _ => ElementKind::Unknown,
    };

    let key = match map.remove("key") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let mut props = Props::new();
    if let Some(Value::Object(prop_map)) = map.remove("props") {
        for (name, value) in prop_map {
            props.insert(name, element_value_from_json(value));
        }
    }

    // Children kept outside props by alternate construction paths.
    let children = map
        .remove("children")
        .map(|v| Box::new(element_value_from_json(v)));

    // Boundary-id marker: normalize to the canonical variant.
    let kind = if props.contains(BOUNDARY_ID_PROP) {
        ElementKind::Boundary
    } else {
        kind
    };

    ElementValue::Element(Box::new(Element {
        kind,
        key,
        props,
        children,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_host_element() {
        let decoded = element_value_from_json(json!({
            "type": "div",
            "key": "item-1",
            "props": {"className": "x", "children": "hello"},
        }));

        let ElementValue::Element(el) = decoded else {
            panic!("expected element");
        };
        assert_eq!(el.tag(), Some("div"));
        assert_eq!(el.key.as_deref(), Some("item-1"));
        assert!(matches!(
            el.props.get("children"),
            Some(ElementValue::String(s)) if s == "hello"
        ));
    }

    #[test]
    fn test_decode_numeric_key_stringifies() {
        let decoded = element_value_from_json(json!({"type": "li", "key": 3}));
        let ElementValue::Element(el) = decoded else {
            panic!("expected element");
        };
        assert_eq!(el.key.as_deref(), Some("3"));
    }

    #[test]
    fn test_decode_missing_type_is_unknown_element() {
        let decoded = element_value_from_json(json!({"props": {"a": 1}}));
        let ElementValue::Element(el) = decoded else {
            panic!("expected element");
        };
        assert!(matches!(el.kind, ElementKind::Unknown));
    }

    #[test]
    fn test_decode_plain_object_stays_json() {
        let decoded = element_value_from_json(json!({"color": "red", "padding": "8px"}));
        assert!(matches!(decoded, ElementValue::Json(_)));
    }

    #[test]
    fn test_decode_normalizes_boundary_representations() {
        // Reserved tag.
        let by_tag = element_value_from_json(json!({"type": "Suspense", "props": {}}));
        let ElementValue::Element(el) = by_tag else {
            panic!("expected element");
        };
        assert!(el.is_boundary());

        // Boundary-id marker prop on an ordinary tag.
        let by_prop = element_value_from_json(json!({
            "type": "div",
            "props": {"boundaryId": "b1"},
        }));
        let ElementValue::Element(el) = by_prop else {
            panic!("expected element");
        };
        assert!(el.is_boundary());
    }

    #[test]
    fn test_decode_top_level_children_land_outside_props() {
        let decoded = element_value_from_json(json!({
            "type": "ul",
            "children": ["a", "b"],
        }));
        let ElementValue::Element(el) = decoded else {
            panic!("expected element");
        };
        assert!(el.children.is_some());
        assert!(el.props.is_empty());
    }

    #[test]
    fn test_props_from_json_non_object_is_empty() {
        assert!(props_from_json(json!(null)).is_empty());
        assert!(props_from_json(json!("x")).is_empty());
        assert_eq!(props_from_json(json!({"a": 1})).len(), 1);
    }
}

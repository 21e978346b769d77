//! Wire-format vocabulary and builders
//!
//! The full wire encoding of an element is the 4-tuple
//! `[marker, type, key, props]`, JSON-compatible and nested arbitrarily.
//! This module also carries the lightweight structural encoding
//! (`{type, props, key}`) used for layout composition, where the receiver
//! needs raw structure rather than the boundary-aware protocol.

use serde_json::{json, Map, Value};

use crate::types::{ElementKind, ElementValue};

/// Output of the serializers. Always JSON-compatible.
pub type WireValue = Value;

/// Discriminant marking "this is a serialized element".
pub const ELEMENT_MARKER: &str = "$";

/// Reserved boundary type name on the wire, and the name/tag the
/// detection fallbacks match against.
pub const BOUNDARY_NAME: &str = "Suspense";

/// Prop carrying the boundary identifier.
pub const BOUNDARY_ID_PROP: &str = "boundaryId";

/// Tag emitted for malformed elements.
pub const UNKNOWN_TAG: &str = "unknown";

/// Type prefix of an opaque client-component reference.
pub const CLIENT_REF_PREFIX: &str = "$L";

/// Placeholder prefix referencing a pending-value entry by id.
pub const PENDING_REF_PREFIX: &str = "$@";

/// Build a wire node: `[marker, type, key, props]`.
pub fn wire_node(type_name: &str, key: Option<&str>, props: Map<String, Value>) -> WireValue {
    Value::Array(vec![
        Value::String(ELEMENT_MARKER.to_string()),
        Value::String(type_name.to_string()),
        key.map(|k| Value::String(k.to_string()))
            .unwrap_or(Value::Null),
        Value::Object(props),
    ])
}

/// Inline error node substituted for a failed subtree. A plain host `div`
/// so the receiver renders it without any special handling.
pub fn error_node(message: &str) -> WireValue {
    json!([
        ELEMENT_MARKER,
        "div",
        null,
        {
            "children": format!("Error: {message}"),
            "style": {
                "color": "red",
                "border": "1px solid red",
                "padding": "8px"
            }
        }
    ])
}

/// Lightweight structural encoding: `{type, props, key}` with children
/// recursively expanded inside `props`.
///
/// No boundary/host distinction and no component invocation: function
/// components appear by name, deferred values as null. Structural output
/// is settled data only.
pub fn to_structural(value: ElementValue) -> WireValue {
    match value {
        ElementValue::Null => Value::Null,
        ElementValue::Bool(b) => Value::Bool(b),
        ElementValue::Number(n) => Value::Number(n),
        ElementValue::String(s) => Value::String(s),
        ElementValue::Json(v) | ElementValue::Serialized(v) => v,
        ElementValue::Lazy(_) => Value::Null,
        ElementValue::List(items) => {
            Value::Array(items.into_iter().map(to_structural).collect())
        }
        ElementValue::Element(el) => {
            let el = *el;
            let type_name = match &el.kind {
                ElementKind::Host(tag) => tag.clone(),
                ElementKind::Component(f) => f.name().to_string(),
                ElementKind::Boundary => BOUNDARY_NAME.to_string(),
                ElementKind::Unknown => UNKNOWN_TAG.to_string(),
            };

            let explicit_children = el.children.map(|b| *b);
            let mut props = Map::new();
            for (name, value) in el.props {
                props.insert(name, to_structural(value));
            }
            if let Some(children) = explicit_children {
                props.insert("children".to_string(), to_structural(children));
            }

            json!({
                "type": type_name,
                "key": el.key,
                "props": props,
            })
        }
    }
}

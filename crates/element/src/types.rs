//! Core element model
//!
//! Key design principles:
//! 1. Closed variant set for element kinds - boundary-ness is tagged at
//!    construction time, not re-derived structurally on every walk
//! 2. Elements are immutable after construction and consumed by the
//!    serializer (transient ownership, no mutation of inputs)
//! 3. Use SmallVec for child lists (most nodes have <4 children)
//! 4. The input domain is total: malformed shapes are `Unknown`, never
//!    an error

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::{ComponentError, ComponentResult};
use crate::wire::{BOUNDARY_ID_PROP, BOUNDARY_NAME};

/// Ordered child list.
pub type Children = Vec<ElementValue>;

type ComponentCallable = dyn Fn(Props) -> BoxFuture<'static, ComponentResult> + Send + Sync;

/// Cloneable handle to a function component.
///
/// `id` is the registry identifier (`module#export`) when the handle was
/// produced through the component registry; it is what lets the serializer
/// recognize client references without invoking them.
#[derive(Clone)]
pub struct ComponentFn {
    id: Option<String>,
    name: String,
    callable: Arc<ComponentCallable>,
}

impl ComponentFn {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Props) -> BoxFuture<'static, ComponentResult> + Send + Sync + 'static,
    {
        Self {
            id: None,
            name: name.into(),
            callable: Arc::new(f),
        }
    }

    /// Wrap a synchronous component function.
    pub fn from_sync<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Props) -> ComponentResult + Send + Sync + 'static,
    {
        Self::new(name, move |props| {
            let out = f(props);
            let fut: BoxFuture<'static, ComponentResult> = Box::pin(std::future::ready(out));
            fut
        })
    }

    /// Handle for a client-registered component. Never invoked on the
    /// producing side; the serializer emits an opaque reference instead.
    pub fn client_stub(identifier: &str) -> Self {
        let name = identifier
            .rsplit('#')
            .next()
            .unwrap_or(identifier)
            .to_string();
        Self::new(name, |_props| {
            let fut: BoxFuture<'static, ComponentResult> = Box::pin(std::future::ready(Err(
                ComponentError::new("client component invoked on the producing side"),
            )));
            fut
        })
        .with_id(identifier)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, props: Props) -> BoxFuture<'static, ComponentResult> {
        (self.callable)(props)
    }
}

impl fmt::Debug for ComponentFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFn")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// A named deferred subtree: a computation whose value is not available at
/// serialization time. The serializer registers it in the pending-value
/// table and emits a placeholder instead of inlining it.
pub struct LazyValue {
    id: Option<String>,
    future: BoxFuture<'static, ComponentResult>,
}

impl LazyValue {
    pub fn new(future: impl Future<Output = ComponentResult> + Send + 'static) -> Self {
        Self {
            id: None,
            future: Box::pin(future),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn into_parts(self) -> (Option<String>, BoxFuture<'static, ComponentResult>) {
        (self.id, self.future)
    }
}

impl fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyValue").field("id", &self.id).finish()
    }
}

/// Element kind - the closed variant set.
#[derive(Debug)]
pub enum ElementKind {
    /// Host element with a string tag (`div`, `ul`, ...).
    Host(String),
    /// Function component, invoked (or referenced) during serialization.
    Component(ComponentFn),
    /// Suspense boundary: an independently deferrable subtree.
    Boundary,
    /// Malformed input. Still serializes - to a generic unknown node.
    Unknown,
}

/// A node in the UI description graph.
///
/// `children` is the explicit child slot used by construction paths that
/// keep children outside `props`; it takes precedence over a `children`
/// prop when both are present.
#[derive(Debug)]
pub struct Element {
    pub kind: ElementKind,
    pub key: Option<String>,
    pub props: Props,
    pub children: Option<Box<ElementValue>>,
}

impl Element {
    pub fn host(tag: impl Into<String>, props: Props) -> Self {
        Self {
            kind: ElementKind::Host(tag.into()),
            key: None,
            props,
            children: None,
        }
    }

    pub fn component(func: ComponentFn, props: Props) -> Self {
        Self {
            kind: ElementKind::Component(func),
            key: None,
            props,
            children: None,
        }
    }

    pub fn boundary(props: Props) -> Self {
        Self {
            kind: ElementKind::Boundary,
            key: None,
            props,
            children: None,
        }
    }

    pub fn unknown(props: Props) -> Self {
        Self {
            kind: ElementKind::Unknown,
            key: None,
            props,
            children: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_children(mut self, children: impl Into<ElementValue>) -> Self {
        self.children = Some(Box::new(children.into()));
        self
    }

    pub fn is_host(&self) -> bool {
        matches!(self.kind, ElementKind::Host(_))
    }

    pub fn is_function_component(&self) -> bool {
        matches!(self.kind, ElementKind::Component(_))
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, ElementKind::Boundary)
    }

    /// Full boundary detection, in priority order:
    /// 1. canonical `Boundary` variant
    /// 2. component whose declared name is the reserved boundary name
    /// 3. host tag equal to the reserved boundary name
    /// 4. props carry the boundary-id marker
    ///
    /// 2-4 are compatibility fallbacks for elements whose variant tag was
    /// lost crossing a serialization boundary. The decoder normalizes
    /// those shapes to the canonical variant; this predicate covers
    /// elements constructed directly.
    pub fn is_boundary_like(&self) -> bool {
        match &self.kind {
            ElementKind::Boundary => return true,
            ElementKind::Component(f) if f.name() == BOUNDARY_NAME => return true,
            ElementKind::Host(tag) if tag == BOUNDARY_NAME => return true,
            _ => {}
        }
        self.props.contains(BOUNDARY_ID_PROP)
    }

    /// Tag name for host elements.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Host(tag) => Some(tag),
            _ => None,
        }
    }
}

/// The serializer's total input domain.
#[derive(Debug)]
pub enum ElementValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Ordered sequence. Index order is a contract with the receiver.
    List(Children),
    Element(Box<Element>),
    /// Arbitrary serializable prop payload (plain data, no elements inside).
    Json(Value),
    /// Deferred subtree, registered in the pending-value table.
    Lazy(LazyValue),
    /// Pre-computed wire output. Passed through unchanged - the fast path
    /// for boundaries materialized in an earlier pass.
    Serialized(Value),
}

impl ElementValue {
    pub fn list(items: impl IntoIterator<Item = ElementValue>) -> Self {
        ElementValue::List(items.into_iter().collect())
    }
}

impl From<bool> for ElementValue {
    fn from(v: bool) -> Self {
        ElementValue::Bool(v)
    }
}

impl From<i64> for ElementValue {
    fn from(v: i64) -> Self {
        ElementValue::Number(v.into())
    }
}

impl From<f64> for ElementValue {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v)
            .map(ElementValue::Number)
            .unwrap_or(ElementValue::Null)
    }
}

impl From<&str> for ElementValue {
    fn from(v: &str) -> Self {
        ElementValue::String(v.to_string())
    }
}

impl From<String> for ElementValue {
    fn from(v: String) -> Self {
        ElementValue::String(v)
    }
}

impl From<Element> for ElementValue {
    fn from(v: Element) -> Self {
        ElementValue::Element(Box::new(v))
    }
}

impl From<Vec<ElementValue>> for ElementValue {
    fn from(v: Vec<ElementValue>) -> Self {
        ElementValue::List(v)
    }
}

/// Insertion-ordered property mapping.
///
/// Re-inserting an existing name replaces the value in place, keeping its
/// original position.
#[derive(Debug, Default)]
pub struct Props {
    entries: Vec<(String, ElementValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ElementValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ElementValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ElementValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<ElementValue> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for Props {
    type Item = (String, ElementValue);
    type IntoIter = std::vec::IntoIter<(String, ElementValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        let host = Element::host("div", Props::new());
        assert!(host.is_host());
        assert!(!host.is_function_component());
        assert_eq!(host.tag(), Some("div"));

        let comp = Element::component(
            ComponentFn::from_sync("Widget", |_| Ok(ElementValue::Null)),
            Props::new(),
        );
        assert!(comp.is_function_component());
        assert!(!comp.is_boundary());

        let boundary = Element::boundary(Props::new());
        assert!(boundary.is_boundary());
        assert!(boundary.is_boundary_like());
    }

    #[test]
    fn test_boundary_detection_fallbacks() {
        // (b) component named after the reserved boundary name
        let by_name = Element::component(
            ComponentFn::from_sync(BOUNDARY_NAME, |_| Ok(ElementValue::Null)),
            Props::new(),
        );
        assert!(by_name.is_boundary_like());

        // (c) host tag equal to the reserved name
        let by_tag = Element::host(BOUNDARY_NAME, Props::new());
        assert!(by_tag.is_boundary_like());

        // (d) boundary-id marker prop
        let by_prop = Element::host("div", Props::new().with(BOUNDARY_ID_PROP, "b1"));
        assert!(by_prop.is_boundary_like());

        let plain = Element::host("div", Props::new());
        assert!(!plain.is_boundary_like());
    }

    #[test]
    fn test_props_insert_replaces_in_place() {
        let mut props = Props::new().with("a", 1i64).with("b", 2i64);
        props.insert("a", 3i64);

        assert_eq!(props.len(), 2);
        let names: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(matches!(
            props.get("a"),
            Some(ElementValue::Number(n)) if n.as_i64() == Some(3)
        ));
    }

    #[test]
    fn test_client_stub_carries_identifier() {
        let stub = ComponentFn::client_stub("app/button#Button");
        assert_eq!(stub.id(), Some("app/button#Button"));
        assert_eq!(stub.name(), "Button");
    }
}

//! Tree Serializer - element tree to wire format
//!
//! The recursive walk that turns an owned element tree into the ordered
//! wire array. Total over its input: malformed shapes become unknown
//! nodes, failing components become inline error nodes, and nothing short
//! of the depth cap stops a render.
//!
//! Design decisions:
//! 1. Sibling subtrees serialize sequentially, in index order. The wire
//!    array position is a contract with the receiving side, and component
//!    side effects (invocation order, counters) must match source order.
//!    Do not parallelize this loop.
//! 2. Deferred subtrees are handed to the pending-value table and replaced
//!    by a placeholder; a later resolution request back-fills them.
//! 3. Client-registered components are never invoked here - they are
//!    emitted as opaque references for the receiving side.

use std::sync::Arc;

use element::error::ComponentResult;
use element::types::{Element, ElementKind, ElementValue, Props};
use element::wire::{
    self, BOUNDARY_ID_PROP, BOUNDARY_NAME, CLIENT_REF_PREFIX, PENDING_REF_PREFIX, UNKNOWN_TAG,
};
use element::WireValue;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::pending::PendingValues;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::stats::RenderStats;

const DEFAULT_MAX_DEPTH: usize = 64;

/// Cheaply cloneable serializer handle over the injected service tables.
#[derive(Clone)]
pub struct Serializer {
    registry: Arc<ComponentRegistry>,
    pending: Arc<PendingValues>,
    stats: Arc<RenderStats>,
    max_depth: usize,
}

impl Serializer {
    pub fn new(
        registry: Arc<ComponentRegistry>,
        pending: Arc<PendingValues>,
        stats: Arc<RenderStats>,
    ) -> Self {
        Self {
            registry,
            pending,
            stats,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Serialize a value to its wire form. Asynchronous - suspends while
    /// awaiting component results - and infallible.
    pub async fn serialize(&self, value: ElementValue) -> WireValue {
        self.serialize_at(value, 0).await
    }

    fn serialize_at(&self, value: ElementValue, depth: usize) -> BoxFuture<'_, WireValue> {
        Box::pin(async move {
            if depth > self.max_depth {
                tracing::error!(depth, "maximum render depth exceeded");
                return wire::error_node("maximum render depth exceeded");
            }

            match value {
                // Already materialized in an earlier pass.
                ElementValue::Serialized(v) => v,
                ElementValue::Null => Value::Null,
                ElementValue::Bool(b) => Value::Bool(b),
                ElementValue::Number(n) => Value::Number(n),
                ElementValue::String(s) => Value::String(s),
                ElementValue::Json(v) => v,
                ElementValue::List(items) => {
                    // Sequential, index order (see module docs).
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.serialize_at(item, depth + 1).await);
                    }
                    Value::Array(out)
                }
                ElementValue::Lazy(lazy) => {
                    let (id, future) = lazy.into_parts();
                    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                    self.defer(id.clone(), future, depth);
                    Value::String(format!("{PENDING_REF_PREFIX}{id}"))
                }
                ElementValue::Element(el) => self.serialize_element(*el, depth).await,
            }
        })
    }

    async fn serialize_element(&self, el: Element, depth: usize) -> WireValue {
        if el.is_boundary_like() {
            return self.serialize_boundary(el, depth).await;
        }

        let Element {
            kind,
            key,
            props,
            children,
        } = el;

        match kind {
            ElementKind::Host(tag) => {
                self.serialize_host(tag, key, props, children, depth).await
            }
            ElementKind::Component(func) => {
                self.serialize_component(func, key, props, depth).await
            }
            // Boundary was handled above; anything else is an unknown
            // shape that still gets a defined wire node.
            ElementKind::Boundary | ElementKind::Unknown => {
                tracing::warn!("serializing unknown element shape");
                let props = self.serialize_props(props, depth).await;
                wire::wire_node(UNKNOWN_TAG, key.as_deref(), props)
            }
        }
    }

    async fn serialize_host(
        &self,
        tag: String,
        key: Option<String>,
        mut props: Props,
        explicit_children: Option<Box<ElementValue>>,
        depth: usize,
    ) -> WireValue {
        // The explicit child slot wins over a `children` prop; the prop is
        // still removed so it cannot appear twice.
        let from_props = props.remove("children");
        let children = explicit_children.map(|b| *b).or(from_props);

        let mut out = self.serialize_props(props, depth).await;
        if let Some(children) = children {
            out.insert(
                "children".to_string(),
                self.serialize_at(children, depth + 1).await,
            );
        }

        wire::wire_node(&tag, key.as_deref(), out)
    }

    async fn serialize_component(
        &self,
        func: element::ComponentFn,
        key: Option<String>,
        props: Props,
        depth: usize,
    ) -> WireValue {
        if let Some(id) = func.id() {
            if self.registry.kind_of(id) == Some(ComponentKind::Client) {
                // Re-rendered on the receiving side; emit the reference.
                let id = id.to_string();
                let out = self.serialize_props(props, depth).await;
                return wire::wire_node(
                    &format!("{CLIENT_REF_PREFIX}{id}"),
                    key.as_deref(),
                    out,
                );
            }
        }

        self.stats.record_invocation(func.name());
        match func.invoke(props).await {
            Ok(value) => self.serialize_at(value, depth + 1).await,
            Err(err) => {
                // Contained: one failing subtree degrades in-band instead
                // of aborting siblings or ancestors.
                tracing::error!(
                    component = func.name(),
                    error = %err,
                    "component render failed, substituting error node"
                );
                self.stats.record_failed_node();
                wire::error_node(err.message())
            }
        }
    }

    async fn serialize_boundary(&self, el: Element, depth: usize) -> WireValue {
        let Element {
            key,
            mut props,
            children,
            ..
        } = el;

        let fallback = props.remove("fallback");
        let from_props = props.remove("children");
        let children = children.map(|b| *b).or(from_props);
        let mut boundary_id = match props.remove(BOUNDARY_ID_PROP) {
            Some(ElementValue::String(id)) => Some(id),
            Some(_) => {
                tracing::warn!("non-string boundary id marker dropped");
                None
            }
            None => None,
        };

        let mut out = self.serialize_props(props, depth).await;

        // Absent source values stay absent: no key at all, not a null.
        if let Some(fallback) = fallback {
            out.insert(
                "fallback".to_string(),
                self.serialize_at(fallback, depth + 1).await,
            );
        }

        match children {
            // Unsettled content: register it and leave the children slot
            // empty until a resolution request back-fills it.
            Some(ElementValue::Lazy(lazy)) => {
                let (lazy_id, future) = lazy.into_parts();
                let id = boundary_id
                    .take()
                    .or(lazy_id)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                self.defer(id.clone(), future, depth);
                boundary_id = Some(id);
            }
            Some(children) => {
                out.insert(
                    "children".to_string(),
                    self.serialize_at(children, depth + 1).await,
                );
            }
            None => {}
        }

        if let Some(id) = boundary_id {
            out.insert(BOUNDARY_ID_PROP.to_string(), Value::String(id));
        }

        wire::wire_node(BOUNDARY_NAME, key.as_deref(), out)
    }

    async fn serialize_props(&self, props: Props, depth: usize) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, value) in props {
            out.insert(name, self.serialize_at(value, depth + 1).await);
        }
        out
    }

    /// Register a deferred subtree: the computation runs now, its
    /// serialized result is retrievable exactly once under `id`.
    fn defer(&self, id: String, future: BoxFuture<'static, ComponentResult>, depth: usize) {
        let serializer = self.clone();
        let computation: BoxFuture<'static, WireValue> = Box::pin(async move {
            match future.await {
                Ok(value) => serializer.serialize_at(value, depth + 1).await,
                Err(err) => {
                    tracing::error!(error = %err, "deferred subtree failed");
                    serializer.stats.record_failed_node();
                    wire::error_node(err.message())
                }
            }
        });
        self.pending.create(id, computation);
    }
}

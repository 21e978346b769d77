//! Render Engine - entry points and session lifecycle
//!
//! The high-level API the host drives. Owns the component registry, the
//! function table, the pending-value bridge and the statistics, and hands
//! serializer handles out over them. Constructed once at host startup and
//! passed by reference - no ambient global state.

use std::sync::Arc;
use std::time::Instant;

use element::decode;
use element::types::{ComponentFn, Element, ElementValue, Props};
use element::wire;
use element::WireValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{RenderError, Result};
use crate::pending::PendingValues;
use crate::registry::{ComponentKind, ComponentRegistry, FunctionTable, ServerFn};
use crate::serializer::Serializer;
use crate::stats::{RenderStats, StatsSnapshot};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub id: String,
    pub max_render_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            max_render_depth: 64,
        }
    }
}

/// Render Engine - owns the process-wide tables and the entry points.
pub struct RenderEngine {
    pub config: EngineConfig,
    components: Arc<ComponentRegistry>,
    functions: Arc<FunctionTable>,
    pending: Arc<PendingValues>,
    stats: Arc<RenderStats>,
}

impl RenderEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            components: Arc::new(ComponentRegistry::new()),
            functions: Arc::new(FunctionTable::new()),
            pending: Arc::new(PendingValues::new()),
            stats: Arc::new(RenderStats::new()),
        }
    }

    /// Register a server or client component under its identifier.
    /// Returns the canonical handle.
    pub fn register_component(
        &self,
        identifier: impl Into<String>,
        func: ComponentFn,
        kind: ComponentKind,
    ) -> ComponentFn {
        self.components.register(identifier, func, kind)
    }

    /// Register a client component by identifier alone (no callable on
    /// this side).
    pub fn register_client_component(&self, identifier: impl Into<String>) {
        self.components.register_client(identifier);
    }

    pub fn register_function(&self, name: impl Into<String>, func: ServerFn) {
        self.functions.register(name, func);
    }

    /// Expose a host-global function in the ambient lookup tier.
    pub fn provide_ambient_function(&self, name: impl Into<String>, func: ServerFn) {
        self.functions.provide_ambient(name, func);
    }

    /// Two-tier function lookup: registered table first, ambient scope
    /// second, `None` when neither holds the name.
    pub fn lookup_function(&self, name: &str) -> Option<ServerFn> {
        self.functions.lookup(name)
    }

    /// Look up, invoke and serialize a function by name.
    pub async fn call_function(&self, name: &str, props: Value) -> Result<WireValue> {
        let func = self
            .lookup_function(name)
            .ok_or_else(|| RenderError::FunctionNotFound(name.to_string()))?;
        match func.invoke(decode::props_from_json(props)).await {
            Ok(value) => Ok(self.serializer().serialize(value).await),
            Err(err) => Err(RenderError::FunctionFailed {
                name: name.to_string(),
                message: err.message().to_string(),
            }),
        }
    }

    /// Build a component element for a registered identifier, for
    /// embedding into a larger tree. Client registrations yield a stub
    /// handle that the serializer turns into an opaque reference.
    pub fn element_for(&self, identifier: &str, props: Props) -> Result<Element> {
        let entry = self
            .components
            .resolve(identifier)
            .ok_or_else(|| RenderError::ComponentNotFound(identifier.to_string()))?;
        let func = entry
            .func
            .unwrap_or_else(|| ComponentFn::client_stub(identifier));
        Ok(Element::component(func, props))
    }

    /// Invoke a registered page/layout component and await its element
    /// tree.
    pub async fn render_page(&self, component_id: &str, props: Value) -> Result<ElementValue> {
        let started = Instant::now();
        let entry = self
            .components
            .resolve(component_id)
            .ok_or_else(|| RenderError::ComponentNotFound(component_id.to_string()))?;
        let func = entry
            .func
            .ok_or_else(|| RenderError::ComponentNotFound(component_id.to_string()))?;

        self.stats.record_invocation(func.name());
        let result = func.invoke(decode::props_from_json(props)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                self.stats.record_render(true);
                tracing::debug!(component = component_id, elapsed_ms, "page rendered");
                Ok(value)
            }
            Err(err) => {
                self.stats.record_render(false);
                tracing::error!(component = component_id, elapsed_ms, error = %err, "page render failed");
                Err(RenderError::RenderFailed {
                    component: component_id.to_string(),
                    message: err.message().to_string(),
                })
            }
        }
    }

    /// Render a page and encode it in the full wire format.
    pub async fn render_page_wire(&self, component_id: &str, props: Value) -> Result<WireValue> {
        let value = self.render_page(component_id, props).await?;
        Ok(self.serializer().serialize(value).await)
    }

    /// Render a page and encode it in the lightweight structural format
    /// (`{type, props, key}`, children expanded inside props) used for
    /// layout composition.
    pub async fn render_page_element(&self, component_id: &str, props: Value) -> Result<WireValue> {
        let value = self.render_page(component_id, props).await?;
        Ok(wire::to_structural(value))
    }

    /// Resolve a deferred value by id, retiring its entry. Exactly one
    /// caller per id succeeds.
    pub async fn resolve_pending(&self, id: &str) -> Result<WireValue> {
        let value = self.pending.resolve_and_remove(id).await?;
        self.stats.record_boundary_resolution();
        tracing::debug!(pending = id, "pending value resolved");
        Ok(value)
    }

    /// Serializer handle over this engine's tables.
    pub fn serializer(&self) -> Serializer {
        Serializer::new(
            self.components.clone(),
            self.pending.clone(),
            self.stats.clone(),
        )
        .with_max_depth(self.config.max_render_depth)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Tear down the render session: orphaned pending entries are dropped,
    /// never retained past their session.
    pub fn end_session(&self) {
        self.pending.clear();
        tracing::debug!(engine = %self.config.id, "session ended");
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use element::wire::BOUNDARY_ID_PROP;
    use element::{ComponentError, LazyValue};
    use serde_json::json;

    fn home_component() -> ComponentFn {
        ComponentFn::from_sync("Home", |mut props: Props| {
            let name = match props.remove("name") {
                Some(ElementValue::String(s)) => s,
                _ => "anonymous".to_string(),
            };
            Ok(ElementValue::from(
                Element::host("div", Props::new().with("className", "home"))
                    .with_children(format!("hello {name}")),
            ))
        })
    }

    #[tokio::test]
    async fn test_render_page_not_found() {
        let engine = RenderEngine::default();
        let result = engine.render_page("app/missing#Missing", json!({})).await;
        assert!(matches!(result, Err(RenderError::ComponentNotFound(_))));
    }

    #[tokio::test]
    async fn test_render_page_wire_end_to_end() {
        let engine = RenderEngine::default();
        engine.register_component("app/home#Home", home_component(), ComponentKind::Server);

        let out = engine
            .render_page_wire("app/home#Home", json!({"name": "world"}))
            .await
            .unwrap();
        assert_eq!(
            out,
            json!(["$", "div", null, {"className": "home", "children": "hello world"}])
        );

        let snap = engine.stats();
        assert_eq!(snap.total, 1);
        assert_eq!(snap.succeeded, 1);
        assert_eq!(snap.invocations["Home"], 1);
    }

    #[tokio::test]
    async fn test_render_page_element_structural() {
        let engine = RenderEngine::default();
        engine.register_component("app/home#Home", home_component(), ComponentKind::Server);

        let out = engine
            .render_page_element("app/home#Home", json!({"name": "world"}))
            .await
            .unwrap();
        assert_eq!(
            out,
            json!({
                "type": "div",
                "key": null,
                "props": {"className": "home", "children": "hello world"},
            })
        );
    }

    #[tokio::test]
    async fn test_root_render_failure_is_typed() {
        let engine = RenderEngine::default();
        engine.register_component(
            "app/broken#Broken",
            ComponentFn::from_sync("Broken", |_| Err(ComponentError::new("boom"))),
            ComponentKind::Server,
        );

        let result = engine.render_page("app/broken#Broken", json!({})).await;
        assert!(matches!(result, Err(RenderError::RenderFailed { .. })));
        assert_eq!(engine.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_boundary_render_and_resolution_flow() {
        let engine = RenderEngine::default();
        engine.register_component(
            "app/feed#Feed",
            ComponentFn::from_sync("Feed", |_| {
                Ok(ElementValue::from(
                    Element::boundary(
                        Props::new()
                            .with("fallback", "Loading feed...")
                            .with(BOUNDARY_ID_PROP, "feed-1"),
                    )
                    .with_children(ElementValue::Lazy(LazyValue::new(async {
                        Ok(ElementValue::from(
                            Element::host("ul", Props::new()).with_children("entries"),
                        ))
                    }))),
                ))
            }),
            ComponentKind::Server,
        );

        let out = engine.render_page_wire("app/feed#Feed", json!({})).await.unwrap();
        assert_eq!(out[1], json!("Suspense"));
        assert_eq!(out[3][BOUNDARY_ID_PROP], json!("feed-1"));
        assert!(out[3].get("children").is_none());
        assert_eq!(engine.pending_count(), 1);

        let resolved = engine.resolve_pending("feed-1").await.unwrap();
        assert_eq!(resolved, json!(["$", "ul", null, {"children": "entries"}]));
        assert_eq!(engine.stats().boundary_resolutions, 1);

        // Retired: a second resolution fails "not found".
        assert!(matches!(
            engine.resolve_pending("feed-1").await,
            Err(RenderError::PendingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_end_session_reaps_pending() {
        let engine = RenderEngine::default();
        let serializer = engine.serializer();
        serializer
            .serialize(ElementValue::Lazy(
                LazyValue::new(async { Ok(ElementValue::Null) }).with_id("orphan"),
            ))
            .await;
        assert_eq!(engine.pending_count(), 1);

        engine.end_session();
        assert_eq!(engine.pending_count(), 0);
        assert!(matches!(
            engine.resolve_pending("orphan").await,
            Err(RenderError::PendingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_function_registration_and_call() {
        let engine = RenderEngine::default();
        engine.register_function(
            "greet",
            ComponentFn::from_sync("greet", |_| Ok(ElementValue::from("hi"))),
        );

        assert!(engine.lookup_function("greet").is_some());
        let out = engine.call_function("greet", json!({})).await.unwrap();
        assert_eq!(out, json!("hi"));

        let missing = engine.call_function("nope", json!({})).await;
        assert!(matches!(missing, Err(RenderError::FunctionNotFound(_))));
    }

    #[tokio::test]
    async fn test_element_for_client_component() {
        let engine = RenderEngine::default();
        engine.register_client_component("app/button#Button");

        let el = engine
            .element_for("app/button#Button", Props::new().with("label", "Go"))
            .unwrap();
        let out = engine.serializer().serialize(el.into()).await;
        assert_eq!(out, json!(["$", "$Lapp/button#Button", null, {"label": "Go"}]));
    }
}

//! Component Registry & Function Lookup
//!
//! Process-wide tables behind DashMap so idempotent registration holds
//! under concurrent drivers. One canonical entry per identifier;
//! re-registration is last-write and never creates a second identity
//! reachable by the same key.

use std::sync::Arc;

use dashmap::DashMap;
use element::ComponentFn;

/// Server function registered by name. Same callable shape as a component.
pub type ServerFn = ComponentFn;

/// Where a component is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Fully resolved on the producing side.
    Server,
    /// Re-invoked on the receiving side; the serializer emits an opaque
    /// reference instead of invoking it.
    Client,
}

/// Canonical registry identifier for a module export.
pub fn component_id(module: &str, export: &str) -> String {
    format!("{module}#{export}")
}

/// One registry entry. `func` is absent for client-only registrations -
/// there is nothing to invoke on this side.
#[derive(Debug, Clone)]
pub struct ComponentEntry {
    pub func: Option<ComponentFn>,
    pub kind: ComponentKind,
    pub registered: bool,
}

/// Component table: identifier → entry. Entries live for the process.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: DashMap<String, ComponentEntry>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) a component. Last write wins for the
    /// callable; the identifier stays the single reachable identity.
    /// Returns the canonical handle with the identifier filled in.
    pub fn register(
        &self,
        identifier: impl Into<String>,
        func: ComponentFn,
        kind: ComponentKind,
    ) -> ComponentFn {
        let identifier = identifier.into();
        let func = func.with_id(identifier.clone());
        tracing::debug!(component = %identifier, ?kind, "registered component");
        self.entries.insert(
            identifier,
            ComponentEntry {
                func: Some(func.clone()),
                kind,
                registered: true,
            },
        );
        func
    }

    /// Register a client component by identifier alone.
    pub fn register_client(&self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        tracing::debug!(component = %identifier, "registered client component");
        self.entries.insert(
            identifier,
            ComponentEntry {
                func: None,
                kind: ComponentKind::Client,
                registered: true,
            },
        );
    }

    pub fn resolve(&self, identifier: &str) -> Option<ComponentEntry> {
        self.entries.get(identifier).map(|e| e.clone())
    }

    pub fn kind_of(&self, identifier: &str) -> Option<ComponentKind> {
        self.entries.get(identifier).map(|e| e.kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One lookup strategy in the function table's resolution chain.
pub trait FunctionResolver: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    fn lookup(&self, name: &str) -> Option<ServerFn>;
}

/// Explicitly registered server functions. Always consulted first.
#[derive(Default)]
pub struct RegisteredFunctions {
    table: DashMap<String, ServerFn>,
}

impl RegisteredFunctions {
    pub fn register(&self, name: impl Into<String>, func: ServerFn) {
        let name = name.into();
        tracing::debug!(function = %name, "registered function");
        self.table.insert(name, func);
    }
}

impl FunctionResolver for RegisteredFunctions {
    fn name(&self) -> &'static str {
        "registered"
    }

    fn lookup(&self, name: &str) -> Option<ServerFn> {
        self.table.get(name).map(|f| f.clone())
    }
}

/// Ambient host-scope functions, consulted only when no explicit
/// registration exists. The host populates this table with the callables
/// it exposes globally.
#[derive(Default)]
pub struct AmbientScope {
    table: DashMap<String, ServerFn>,
}

impl AmbientScope {
    pub fn provide(&self, name: impl Into<String>, func: ServerFn) {
        self.table.insert(name.into(), func);
    }
}

impl FunctionResolver for AmbientScope {
    fn name(&self) -> &'static str {
        "ambient"
    }

    fn lookup(&self, name: &str) -> Option<ServerFn> {
        self.table.get(name).map(|f| f.clone())
    }
}

/// Two-tier dynamic dispatch: an ordered list of resolver strategies,
/// registered table first, ambient scope second. The order is the
/// contract - a registered function always shadows an ambient one of the
/// same name.
pub struct FunctionTable {
    registered: Arc<RegisteredFunctions>,
    ambient: Arc<AmbientScope>,
    resolvers: Vec<Arc<dyn FunctionResolver>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        let registered = Arc::new(RegisteredFunctions::default());
        let ambient = Arc::new(AmbientScope::default());
        let resolvers: Vec<Arc<dyn FunctionResolver>> = vec![registered.clone(), ambient.clone()];
        Self {
            registered,
            ambient,
            resolvers,
        }
    }

    pub fn register(&self, name: impl Into<String>, func: ServerFn) {
        self.registered.register(name, func);
    }

    pub fn provide_ambient(&self, name: impl Into<String>, func: ServerFn) {
        self.ambient.provide(name, func);
    }

    /// Resolve a callable by name. First strategy hit wins; `None` when no
    /// tier holds the name.
    pub fn lookup(&self, name: &str) -> Option<ServerFn> {
        for resolver in &self.resolvers {
            if let Some(func) = resolver.lookup(name) {
                tracing::trace!(function = name, tier = resolver.name(), "function resolved");
                return Some(func);
            }
        }
        None
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

//! Server-Side Element Render Engine
//!
//! Turns declarative element trees into a wire-format representation for a
//! rendering client, and back-fills the asynchronous values produced along
//! the way.
//!
//! # Architecture
//!
//! 1. **Entry points** (`engine`): invoke a registered page/layout
//!    component, producing an element tree
//! 2. **Serializer** (`serializer`): walks the tree depth-first into the
//!    ordered wire array; boundaries become placeholders, client
//!    components become opaque references, failures become inline error
//!    nodes
//! 3. **Registries** (`registry`): component table plus two-tier function
//!    lookup, process-wide and concurrency-safe
//! 4. **Pending bridge** (`pending`): deferred subtrees retrievable
//!    exactly once by identifier

pub mod engine;
pub mod error;
pub mod pending;
pub mod registry;
pub mod serializer;
pub mod stats;

pub use engine::{EngineConfig, RenderEngine};
pub use error::{RenderError, Result};
pub use pending::PendingValues;
pub use registry::{
    component_id, ComponentEntry, ComponentKind, ComponentRegistry, FunctionResolver,
    FunctionTable, ServerFn,
};
pub use serializer::Serializer;
pub use stats::{RenderStats, StatsSnapshot};

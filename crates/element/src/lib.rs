//! Element Model & Wire Vocabulary
//!
//! In-memory UI element descriptions and their wire-format encodings.
//!
//! ## Core Design
//!
//! ```text
//! plain JSON → decode → ElementValue (owned tree) → serializer → WireValue
//!                             ↑
//!                  constructed directly by components
//! ```
//!
//! - **Closed variants**: boundary-ness is a tagged case of `ElementKind`,
//!   decided at construction time; structural detection survives only as a
//!   decoding shim for trees that lost their tags crossing a wire
//! - **Total domain**: malformed input decodes to `Unknown` and serializes
//!   to a defined fallback node; nothing in this crate fails on shape
//! - **Transient ownership**: elements are owned by their parent until the
//!   serializer consumes them; no mutation of constructed trees

pub mod decode;
pub mod error;
pub mod types;
pub mod wire;

pub use error::{ComponentError, ComponentResult};
pub use types::{Children, ComponentFn, Element, ElementKind, ElementValue, LazyValue, Props};
pub use wire::WireValue;

//! folio-core: document tree for the folio markdown pipeline.
//!
//! This crate provides the tree that readers produce, transforms mutate and
//! writers consume, together with the per-node render hints, the definition
//! registry and the diagnostics types shared by every stage.

mod data;
mod definition;
mod diagnostic;
mod document;
pub mod helpers;
mod node;
mod traits;

pub use data::*;
pub use definition::*;
pub use diagnostic::*;
pub use document::*;
pub use node::*;
pub use traits::*;

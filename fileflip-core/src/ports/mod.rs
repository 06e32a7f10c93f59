//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. Services depend
//! only on these traits, not on concrete implementations.

mod catalog;
mod template_store;

pub use catalog::TargetCatalog;
pub use template_store::TemplateStore;

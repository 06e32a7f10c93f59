//! Adapter implementations (hexagonal architecture)
//!
//! Concrete implementations of the port traits.

pub mod catalog;
pub mod memory;
pub mod samples;
pub mod settings_store;

pub use catalog::BuiltinCatalog;
pub use memory::InMemoryTemplateStore;
pub use settings_store::SettingsTemplateStore;

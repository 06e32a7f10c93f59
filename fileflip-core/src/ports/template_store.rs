//! Template store port - persistence of mapping templates

use crate::domain::result::Result;
use crate::domain::MappingTemplate;

/// Storage for the mapping template library
///
/// Implementations must preserve insertion order across `load` calls. Saving a
/// template whose id already exists replaces it in place.
pub trait TemplateStore: Send + Sync {
    /// Return every stored template, in insertion order
    fn load(&self) -> Result<Vec<MappingTemplate>>;

    /// Append a new template or replace the one with the same id
    fn save(&self, template: &MappingTemplate) -> Result<()>;

    /// Remove a template by id, returning whether it existed
    fn delete(&self, id: &str) -> Result<bool>;

    /// Get a template by id
    fn get(&self, id: &str) -> Result<Option<MappingTemplate>> {
        Ok(self.load()?.into_iter().find(|t| t.id == id))
    }
}

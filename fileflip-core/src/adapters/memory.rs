//! In-memory template store (embedding front-ends and tests)

use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::MappingTemplate;
use crate::ports::TemplateStore;

#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: Mutex<Vec<MappingTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<MappingTemplate>) -> Self {
        Self {
            templates: Mutex::new(templates),
        }
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<MappingTemplate>>> {
        self.templates
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn load(&self) -> Result<Vec<MappingTemplate>> {
        Ok(self.guard()?.clone())
    }

    fn save(&self, template: &MappingTemplate) -> Result<()> {
        let mut templates = self.guard()?;
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => templates.push(template.clone()),
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut templates = self.guard()?;
        let before = templates.len();
        templates.retain(|t| t.id != id);
        Ok(templates.len() != before)
    }
}

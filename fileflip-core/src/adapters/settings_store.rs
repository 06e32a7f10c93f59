//! settings.json-backed template store

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::MappingTemplate;
use crate::ports::TemplateStore;

/// Template store persisting to `settings.json` under `mappingTemplates`
///
/// Every call re-reads the file so edits made by another process are picked
/// up; the mutex serializes read-modify-write cycles within this process.
pub struct SettingsTemplateStore {
    fileflip_dir: PathBuf,
    lock: Mutex<()>,
}

impl SettingsTemplateStore {
    pub fn new(fileflip_dir: &Path) -> Self {
        Self {
            fileflip_dir: fileflip_dir.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn load_config(&self) -> Result<Config> {
        Config::load(&self.fileflip_dir).map_err(into_store_error)
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        config.save(&self.fileflip_dir).map_err(into_store_error)
    }
}

/// Keep core errors as they are, wrap anything else as a storage error
fn into_store_error(e: anyhow::Error) -> Error {
    e.downcast::<Error>()
        .unwrap_or_else(|e| Error::storage(format!("{:#}", e)))
}

impl TemplateStore for SettingsTemplateStore {
    fn load(&self) -> Result<Vec<MappingTemplate>> {
        let _guard = self.lock.lock().map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        Ok(self.load_config()?.templates)
    }

    fn save(&self, template: &MappingTemplate) -> Result<()> {
        let _guard = self.lock.lock().map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        let mut config = self.load_config()?;
        match config.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => config.templates.push(template.clone()),
        }
        self.save_config(&config)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        let mut config = self.load_config()?;
        let before = config.templates.len();
        config.templates.retain(|t| t.id != id);
        if config.templates.len() == before {
            return Ok(false);
        }
        self.save_config(&config)?;
        Ok(true)
    }
}

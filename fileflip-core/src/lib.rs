//! FileFlip Core - column mapping for statement conversion
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (TargetSystem, FieldMapping, MappingTemplate, etc.)
//! - **ports**: Trait definitions for external dependencies (TemplateStore, TargetCatalog)
//! - **services**: Resolver and the services built around it
//! - **adapters**: Concrete implementations (settings.json store, built-in catalog, etc.)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use adapters::{BuiltinCatalog, SettingsTemplateStore};
use config::{Config, SETTINGS_FILE};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    DataType, FieldMapping, MappingTemplate, SourceTable, SystemField, TargetSystem,
    Transformation, TransformationKind, ValidationRule,
};
pub use domain::result::{Error, OperationResult, Result};
pub use services::{EntryPoint, LogEvent, LogQuery, LoggingService, Resolution};

/// Main context for FileFlip operations
///
/// Holds the configuration, the template store, the target catalog and
/// all services wired to them.
pub struct FileFlipContext {
    pub config: Config,
    pub store: Arc<SettingsTemplateStore>,
    pub catalog: Arc<BuiltinCatalog>,
    pub mapping_service: MappingService,
    pub template_service: TemplateService,
    pub preview_service: PreviewService,
}

impl FileFlipContext {
    /// Create a new FileFlip context
    ///
    /// A directory without a settings file is treated as a first run and
    /// gets the sample templates.
    pub fn new(fileflip_dir: &Path, logger: Option<Arc<LoggingService>>) -> anyhow::Result<Self> {
        std::fs::create_dir_all(fileflip_dir)
            .with_context(|| format!("Failed to create {}", fileflip_dir.display()))?;
        let first_run = !fileflip_dir.join(SETTINGS_FILE).exists();

        let config = Config::load(fileflip_dir)?;

        let store = Arc::new(SettingsTemplateStore::new(fileflip_dir));
        let catalog = Arc::new(BuiltinCatalog::with_overrides(config.target_systems.clone()));

        let mapping_service = MappingService::new(store.clone(), catalog.clone(), logger.clone());
        let template_service = TemplateService::new(store.clone(), logger.clone());
        let preview_service = PreviewService::new(logger);

        if first_run {
            template_service.seed_samples()?;
        }

        Ok(Self {
            config,
            store,
            catalog,
            mapping_service,
            template_service,
            preview_service,
        })
    }

    /// Target system to use when none is given explicitly
    ///
    /// `FILEFLIP_TARGET_SYSTEM` wins over the saved setting.
    pub fn default_target_system(&self) -> Option<&str> {
        self.config.effective_target_system()
    }
}

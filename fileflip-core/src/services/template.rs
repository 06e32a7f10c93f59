//! Template service - managing the mapping template library

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::samples::sample_templates;
use crate::domain::result::Error;
use crate::domain::{FieldMapping, MappingTemplate};
use crate::ports::TemplateStore;

use super::ids::{IdGenerator, UuidIds};
use super::logging::{LogEvent, LoggingService};
use super::resolver;

/// Fields needed to save the current mappings as a template
#[derive(Debug, Clone, Default)]
pub struct TemplateDraft {
    pub name: String,
    pub description: Option<String>,
    pub target_system: String,
    pub mappings: Vec<FieldMapping>,
    pub document_type: Option<String>,
    pub is_default: bool,
}

/// JSON document written by `export_mappings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingExport {
    pub mappings: Vec<FieldMapping>,
    pub export_date: DateTime<Utc>,
}

/// What an imported JSON document turned out to be
#[derive(Debug, Clone)]
pub enum ImportedMappings {
    /// A bare mapping list (e.g. a previous export)
    Mappings(Vec<FieldMapping>),
    /// A full template, already saved to the library
    Template(MappingTemplate),
}

pub struct TemplateService {
    store: Arc<dyn TemplateStore>,
    logger: Option<Arc<LoggingService>>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn TemplateStore>, logger: Option<Arc<LoggingService>>) -> Self {
        Self { store, logger }
    }

    /// All templates in library order, optionally for one target system
    pub fn list(&self, target_system: Option<&str>) -> Result<Vec<MappingTemplate>> {
        let templates = self.store.load().context("Failed to load mapping templates")?;
        Ok(match target_system {
            Some(id) => templates.into_iter().filter(|t| t.targets(id)).collect(),
            None => templates,
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<MappingTemplate>> {
        Ok(self.store.get(id)?)
    }

    fn require(&self, id: &str) -> Result<MappingTemplate> {
        self.get(id)?
            .ok_or_else(|| Error::not_found(format!("Template '{}'", id)).into())
    }

    /// Save a new template built from the current mappings
    pub fn save_as_template(&self, draft: TemplateDraft) -> Result<MappingTemplate> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::validation("Template name is required").into());
        }
        if draft.mappings.is_empty() {
            return Err(Error::validation("Template must contain at least one mapping").into());
        }

        let mut template = MappingTemplate::new(
            UuidIds.next_id("template"),
            name,
            draft.target_system,
            draft.mappings,
        );
        template.description = draft.description.unwrap_or_else(|| {
            format!("Template created on {}", template.created_at.format("%Y-%m-%d"))
        });
        template.document_type = Some(draft.document_type.unwrap_or_else(|| "custom".to_string()));
        template.is_default = draft.is_default;

        self.store.save(&template)?;
        self.log(LogEvent::for_template("template_saved", &template));
        Ok(template)
    }

    /// Re-save an existing template, bumping `updated_at`
    pub fn update(&self, mut template: MappingTemplate) -> Result<MappingTemplate> {
        let existing = self.require(&template.id)?;
        template.created_at = existing.created_at;
        template.touch();
        self.store.save(&template)?;
        Ok(template)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete(id)?;
        if deleted {
            self.log(LogEvent::new("template_deleted").with_template(id));
        }
        Ok(deleted)
    }

    /// Mappings of a template adapted to `columns`
    ///
    /// Without columns the template's mappings are returned as stored, with
    /// fresh ids.
    pub fn apply(&self, id: &str, columns: Option<&[String]>) -> Result<Vec<FieldMapping>> {
        let template = self.require(id)?;
        let mut ids = UuidIds;
        let mappings = match columns {
            Some(columns) => resolver::adapt_template(&template, columns, &mut ids),
            None => template
                .mappings
                .iter()
                .map(|m| FieldMapping {
                    id: ids.next_id("mapping"),
                    ..m.clone()
                })
                .collect(),
        };
        self.log(LogEvent::for_template("template_applied", &template).with_mapping_count(mappings.len()));
        Ok(mappings)
    }

    /// Serialize a mapping list to the export JSON document
    pub fn export_mappings(&self, mappings: &[FieldMapping]) -> Result<String> {
        if mappings.is_empty() {
            return Err(Error::validation("No mappings to export").into());
        }
        let export = MappingExport {
            mappings: mappings.to_vec(),
            export_date: Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Serialize one stored template
    pub fn export_template(&self, id: &str) -> Result<String> {
        let template = self.require(id)?;
        Ok(serde_json::to_string_pretty(&template)?)
    }

    /// Import a JSON document holding either a mapping list or a template
    ///
    /// Templates are saved under a fresh id with fresh timestamps.
    pub fn import_json(&self, content: &str) -> Result<ImportedMappings> {
        let result = self.parse_import(content);
        if let Err(e) = &result {
            if let Some(logger) = &self.logger {
                let _ = logger.log_error("template_import_failed", "Invalid import format", Some(&e.to_string()));
            }
        }
        result
    }

    fn parse_import(&self, content: &str) -> Result<ImportedMappings> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| Error::validation(format!("Invalid JSON: {}", e)))?;

        let has_mappings = value.get("mappings").map_or(false, |m| m.is_array());
        let is_template = value.get("id").is_some() && value.get("name").is_some();

        if has_mappings && is_template {
            let mut template: MappingTemplate = serde_json::from_value(value)
                .map_err(|e| Error::validation(format!("Invalid template: {}", e)))?;
            let now = Utc::now();
            template.id = UuidIds.next_id("template");
            template.created_at = now;
            template.updated_at = now;
            self.store.save(&template)?;
            self.log(LogEvent::for_template("template_imported", &template));
            return Ok(ImportedMappings::Template(template));
        }

        if has_mappings {
            let mappings: Vec<FieldMapping> = serde_json::from_value(value["mappings"].clone())
                .map_err(|e| Error::validation(format!("Invalid mappings: {}", e)))?;
            return Ok(ImportedMappings::Mappings(mappings));
        }

        Err(Error::validation("Invalid import format: expected a mapping list or a template").into())
    }

    /// Add the sample templates that aren't in the library yet
    ///
    /// Returns the number of templates added.
    pub fn seed_samples(&self) -> Result<usize> {
        let existing = self.store.load()?;
        let mut added = 0;
        for sample in sample_templates() {
            if existing.iter().any(|t| t.id == sample.id) {
                continue;
            }
            self.store.save(&sample)?;
            added += 1;
        }
        Ok(added)
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}

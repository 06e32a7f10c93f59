//! Mapping service - runs the resolver against the stored library

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::result::Error;
use crate::domain::TargetSystem;
use crate::ports::{TargetCatalog, TemplateStore};

use super::ids::UuidIds;
use super::logging::{events, LogEvent, LoggingService};
use super::resolver::{self, Resolution};

/// Resolves mappings for a table using the saved templates and the catalog
pub struct MappingService {
    store: Arc<dyn TemplateStore>,
    catalog: Arc<dyn TargetCatalog>,
    logger: Option<Arc<LoggingService>>,
}

impl MappingService {
    pub fn new(
        store: Arc<dyn TemplateStore>,
        catalog: Arc<dyn TargetCatalog>,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        Self { store, catalog, logger }
    }

    /// Look up a target system, failing with `NotFound` for unknown ids
    pub fn target_system(&self, id: &str) -> Result<TargetSystem> {
        self.catalog
            .target_system(id)
            .ok_or_else(|| Error::not_found(format!("Target system '{}'", id)).into())
    }

    /// Resolve mappings for the columns against a target system
    ///
    /// Logs which path was taken (template or suggestions); logging failures
    /// are ignored.
    pub fn suggest(&self, columns: &[String], target_system_id: &str) -> Result<Resolution> {
        let target = self.target_system(target_system_id)?;
        let library = self.store.load().context("Failed to load mapping templates")?;

        let resolution = resolver::resolve(columns, &target, &library, &mut UuidIds);

        let event = match &resolution.source_template {
            Some(template) => LogEvent::new(events::TEMPLATE_MATCHED).with_template(template.id.clone()),
            None => LogEvent::new(events::MAPPINGS_SUGGESTED),
        };
        self.log(
            event
                .with_target_system(target.id.clone())
                .with_mapping_count(resolution.mappings.len()),
        );

        Ok(resolution)
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::samples::sample_templates;
    use crate::adapters::{BuiltinCatalog, InMemoryTemplateStore};
    use crate::services::logging::{EntryPoint, LogQuery};
    use tempfile::tempdir;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn service(logger: Option<Arc<LoggingService>>) -> MappingService {
        MappingService::new(
            Arc::new(InMemoryTemplateStore::with_templates(sample_templates())),
            Arc::new(BuiltinCatalog::new()),
            logger,
        )
    }

    #[test]
    fn test_unknown_target_system() {
        let err = service(None).suggest(&cols(&["Date"]), "xero").unwrap_err();
        assert!(err.to_string().contains("xero"));
    }

    #[test]
    fn test_sample_invoice_template_matches_with_fallbacks() {
        let columns = cols(&["Description", "Invoice No", "Invoice Date", "Total"]);
        let resolution = service(None).suggest(&columns, "sage").unwrap();

        let template = resolution.source_template.expect("template should qualify");
        assert_eq!(template.id, "template_1");
        let sources: Vec<&str> = resolution.mappings.iter().map(|m| m.source_column.as_str()).collect();
        assert_eq!(sources, vec!["Description", "Invoice No", "Invoice Date", "Total"]);
    }

    #[test]
    fn test_suggest_logs_provenance() {
        let dir = tempdir().unwrap();
        let logger = Arc::new(LoggingService::new(dir.path(), EntryPoint::Cli, "test").unwrap());
        let service = service(Some(Arc::clone(&logger)));

        service.suggest(&cols(&["Posted", "Total"]), "sage").unwrap();
        service.suggest(&cols(&["Description", "Reference", "Date", "Amount"]), "quickbooks").unwrap();

        let suggested = logger.entries(&LogQuery::latest(10).event(events::MAPPINGS_SUGGESTED)).unwrap();
        assert_eq!(suggested.len(), 1);
        assert_eq!(suggested[0].event.target_system.as_deref(), Some("sage"));

        let matched = logger.entries(&LogQuery::latest(10).event(events::TEMPLATE_MATCHED)).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].event.template_id.as_deref(), Some("template_2"));
        assert_eq!(matched[0].event.target_system.as_deref(), Some("quickbooks"));
        assert_eq!(logger.stats().unwrap().template_match_rate(), Some(50.0));
    }
}

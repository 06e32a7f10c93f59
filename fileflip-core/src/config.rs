//! Configuration management
//!
//! Settings live in `settings.json` inside the FileFlip directory:
//! ```json
//! {
//!   "app": { "defaultTargetSystem": "sage", ... },
//!   "mappingTemplates": { "templates": [ ... ] },
//!   "targetSystems": [ ... ]
//! }
//! ```
//! Keys the core doesn't manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::result::Error;
use crate::domain::{MappingTemplate, TargetSystem};

/// Name of the settings file inside the FileFlip directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the default target system
pub const TARGET_SYSTEM_ENV: &str = "FILEFLIP_TARGET_SYSTEM";

/// Raw settings.json structure
///
/// Templates and target systems stay as raw JSON here so one bad entry
/// can't take the rest of the file down with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    mapping_templates: TemplateContainer,
    #[serde(default)]
    target_systems: Vec<Value>,
    #[serde(flatten)]
    other: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_target_system: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TemplateContainer {
    #[serde(default)]
    templates: Vec<Value>,
}

/// FileFlip configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Target system stored in `app.defaultTargetSystem`
    pub default_target_system: Option<String>,
    /// Value of `FILEFLIP_TARGET_SYSTEM` at load time; never saved
    pub target_system_override: Option<String>,
    /// Saved mapping templates, in insertion order
    pub templates: Vec<MappingTemplate>,
    /// User-defined target systems (override built-ins with the same id)
    pub target_systems: Vec<TargetSystem>,
    /// Entries that failed to parse, written back untouched on save
    unreadable_templates: Vec<Value>,
    unreadable_target_systems: Vec<Value>,
}

impl Config {
    /// Load config from the FileFlip directory
    ///
    /// A missing or unparseable settings file yields defaults, and entries
    /// that don't parse are skipped. The default target system can be
    /// overridden with `FILEFLIP_TARGET_SYSTEM`.
    pub fn load(fileflip_dir: &Path) -> Result<Self> {
        let env_override = std::env::var(TARGET_SYSTEM_ENV).ok();
        Self::load_with_override(fileflip_dir, env_override)
    }

    /// Load config with an explicit target system override
    pub fn load_with_override(fileflip_dir: &Path, target_system_override: Option<String>) -> Result<Self> {
        let raw = match read_settings(fileflip_dir)? {
            Some(content) => serde_json::from_str(&content).unwrap_or_default(),
            None => SettingsFile::default(),
        };

        let (templates, unreadable_templates) = split_entries(raw.mapping_templates.templates);
        let (target_systems, unreadable_target_systems) = split_entries(raw.target_systems);

        Ok(Self {
            default_target_system: raw.app.default_target_system,
            target_system_override: target_system_override
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            templates,
            target_systems,
            unreadable_templates,
            unreadable_target_systems,
        })
    }

    /// Target system to use when a command doesn't name one
    pub fn effective_target_system(&self) -> Option<&str> {
        self.target_system_override
            .as_deref()
            .or(self.default_target_system.as_deref())
    }

    /// Number of stored templates that couldn't be read
    pub fn unreadable_template_count(&self) -> usize {
        self.unreadable_templates.len()
    }

    /// Save config to the FileFlip directory, preserving unmanaged settings
    ///
    /// Refuses to overwrite a settings file that isn't valid JSON.
    pub fn save(&self, fileflip_dir: &Path) -> Result<()> {
        let settings_path = fileflip_dir.join(SETTINGS_FILE);
        let mut settings: SettingsFile = match read_settings(fileflip_dir)? {
            Some(content) => serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!(
                    "{} is not valid ({}); refusing to overwrite it",
                    settings_path.display(),
                    e
                ))
            })?,
            None => SettingsFile::default(),
        };

        settings.app.default_target_system = self.default_target_system.clone();
        settings.mapping_templates.templates = join_entries(&self.templates, &self.unreadable_templates)?;
        settings.target_systems = join_entries(&self.target_systems, &self.unreadable_target_systems)?;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }
}

/// Contents of settings.json, or None when there is no file yet
fn read_settings(fileflip_dir: &Path) -> Result<Option<String>> {
    let settings_path = fileflip_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    Ok(Some(content))
}

fn split_entries<T: DeserializeOwned>(entries: Vec<Value>) -> (Vec<T>, Vec<Value>) {
    let mut parsed = Vec::new();
    let mut unreadable = Vec::new();
    for entry in entries {
        match serde_json::from_value(entry.clone()) {
            Ok(item) => parsed.push(item),
            Err(_) => unreadable.push(entry),
        }
    }
    (parsed, unreadable)
}

fn join_entries<T: Serialize>(items: &[T], unreadable: &[Value]) -> Result<Vec<Value>> {
    let mut entries = items
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    entries.extend(unreadable.iter().cloned());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.templates.is_empty());
        assert!(config.target_systems.is_empty());
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_save_preserves_unmanaged_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app": {"theme": "dark"}, "exportFormats": ["csv", "xlsx"]}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.templates.push(MappingTemplate::new("t1", "Bank", "sage", Vec::new()));
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["app"]["theme"], "dark");
        assert_eq!(value["exportFormats"][1], "xlsx");
        assert_eq!(value["mappingTemplates"]["templates"][0]["id"], "t1");

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.templates.len(), 1);
    }

    #[test]
    fn test_unreadable_template_is_skipped_and_kept() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{
                "app": {"theme": "dark"},
                "mappingTemplates": {"templates": [
                    {"id": "good", "name": "Good", "targetSystem": "sage", "mappings": []},
                    {"id": "bad", "name": "Bad", "mappings": [{"id": "m1", "sourceColumn": 7}]}
                ]}
            }"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.unreadable_template_count(), 1);

        config.templates.push(MappingTemplate::new("new", "New", "sage", Vec::new()));
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let ids: Vec<&str> = value["mappingTemplates"]["templates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["good", "new", "bad"]);
        assert_eq!(value["app"]["theme"], "dark");
    }

    #[test]
    fn test_save_refuses_to_overwrite_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.templates.push(MappingTemplate::new("t1", "Bank", "sage", Vec::new()));
        let err = config.save(dir.path()).unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Config(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_target_system_override_is_not_saved() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"app": {"defaultTargetSystem": "sage"}}"#).unwrap();

        let config = Config::load_with_override(dir.path(), Some(" quickbooks ".to_string())).unwrap();
        assert_eq!(config.effective_target_system(), Some("quickbooks"));
        config.save(dir.path()).unwrap();

        let reloaded = Config::load_with_override(dir.path(), None).unwrap();
        assert_eq!(reloaded.default_target_system.as_deref(), Some("sage"));
        assert_eq!(reloaded.effective_target_system(), Some("sage"));

        let blank = Config::load_with_override(dir.path(), Some("  ".to_string())).unwrap();
        assert_eq!(blank.effective_target_system(), Some("sage"));
    }
}

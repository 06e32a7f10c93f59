//! Mapping template domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mapping::FieldMapping;

/// A named, reusable set of field mappings for one target system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Target system id. Templates without one never match a target system.
    #[serde(default)]
    pub target_system: String,
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl MappingTemplate {
    /// Create a template with fresh timestamps
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target_system: impl Into<String>,
        mappings: Vec<FieldMapping>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            target_system: target_system.into(),
            mappings,
            document_type: None,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this template targets the given system
    pub fn targets(&self, target_system_id: &str) -> bool {
        !self.target_system.is_empty() && self.target_system == target_system_id
    }

    /// Mark the template as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

//! Target system domain model

use serde::{Deserialize, Serialize};

/// Value type of a target field (and of the mapping that feeds it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Boolean => "boolean",
        }
    }
}

/// A field in a target system's import schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub required: bool,
    /// Output pattern, e.g. "YYYY-MM-DD" for dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl SystemField {
    /// Create a field with the given id, display name and type
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            data_type,
            required: false,
            format: None,
            category: String::new(),
            example: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }
}

/// Kind of external system documents are exported to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    Accounting,
    Crm,
    Erp,
    #[default]
    Custom,
}

/// An accounting/CRM schema documents are mapped into (Sage, QuickBooks, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSystem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub system_type: SystemType,
    /// Fields in declared order
    #[serde(default)]
    pub fields: Vec<SystemField>,
    #[serde(default)]
    pub document_types: Vec<String>,
}

impl TargetSystem {
    /// Look up a field by id
    pub fn field(&self, id: &str) -> Option<&SystemField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Ids of the fields marked as required
    pub fn required_field_ids(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_deserializes_with_defaults() {
        let field: SystemField =
            serde_json::from_str(r#"{"id": "memo", "name": "Memo"}"#).unwrap();
        assert_eq!(field.data_type, DataType::String);
        assert!(!field.required);
        assert!(field.format.is_none());
    }

    #[test]
    fn test_target_system_type_field_name() {
        let json = r#"{
            "id": "xero",
            "name": "Xero",
            "type": "accounting",
            "fields": [{"id": "date", "name": "Date", "dataType": "date", "required": true}]
        }"#;
        let system: TargetSystem = serde_json::from_str(json).unwrap();
        assert_eq!(system.system_type, SystemType::Accounting);
        assert_eq!(system.field("date").unwrap().data_type, DataType::Date);
        assert_eq!(system.required_field_ids(), vec!["date"]);
    }
}

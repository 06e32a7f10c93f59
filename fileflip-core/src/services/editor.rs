//! Mapping editor - working-set edits on a list of field mappings

use anyhow::Result;

use crate::domain::result::Error;
use crate::domain::{DataType, FieldMapping, Transformation, TransformationKind, ValidationRule, RuleKind};

use super::ids::{IdGenerator, UuidIds};

/// Input for a new mapping
#[derive(Debug, Clone, Default)]
pub struct MappingDraft {
    pub name: String,
    pub description: String,
    pub source_column: String,
    pub target_field: String,
    pub data_type: DataType,
    pub required: bool,
    pub format: Option<String>,
    pub default_value: Option<String>,
}

/// Edits a list of mappings in place
///
/// Every created mapping, transformation and rule gets a fresh id from the
/// editor's id generator.
pub struct MappingEditor {
    mappings: Vec<FieldMapping>,
    ids: Box<dyn IdGenerator + Send>,
}

impl MappingEditor {
    pub fn new(mappings: Vec<FieldMapping>) -> Self {
        Self::with_ids(mappings, Box::new(UuidIds))
    }

    pub fn with_ids(mappings: Vec<FieldMapping>, ids: Box<dyn IdGenerator + Send>) -> Self {
        Self { mappings, ids }
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn into_mappings(self) -> Vec<FieldMapping> {
        self.mappings
    }

    pub fn get(&self, id: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut FieldMapping> {
        self.mappings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::not_found(format!("Mapping '{}'", id)).into())
    }

    /// Add a custom mapping; name, source column and target field are required
    pub fn create(&mut self, draft: MappingDraft) -> Result<&FieldMapping> {
        if draft.name.trim().is_empty()
            || draft.source_column.trim().is_empty()
            || draft.target_field.trim().is_empty()
        {
            return Err(Error::validation("Name, source column and target field are required").into());
        }

        let mut mapping = FieldMapping::new(self.ids.next_id("mapping"), draft.source_column, draft.target_field);
        mapping.name = draft.name;
        mapping.description = draft.description;
        mapping.data_type = draft.data_type;
        mapping.required = draft.required;
        mapping.format = draft.format;
        mapping.default_value = draft.default_value;
        mapping.is_custom = true;

        self.mappings.push(mapping);
        Ok(&self.mappings[self.mappings.len() - 1])
    }

    /// Replace the mapping with the same id
    pub fn update(&mut self, mapping: FieldMapping) -> Result<()> {
        let slot = self.get_mut(&mapping.id)?;
        *slot = mapping;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<FieldMapping> {
        let idx = self
            .mappings
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::not_found(format!("Mapping '{}'", id)))?;
        Ok(self.mappings.remove(idx))
    }

    /// Flip a mapping's active flag, returning the new state
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let mapping = self.get_mut(id)?;
        mapping.active = !mapping.active;
        Ok(mapping.active)
    }

    /// Append a transformation after the existing ones
    ///
    /// Returns the id of the new transformation.
    pub fn add_transformation(
        &mut self,
        mapping_id: &str,
        display_name: &str,
        kind: TransformationKind,
    ) -> Result<String> {
        let id = self.ids.next_id("transform");
        let mapping = self.get_mut(mapping_id)?;
        let mut transformation = Transformation::new(id.clone(), display_name, kind);
        transformation.order = mapping.max_transformation_order().map_or(0, |max| max + 1);
        mapping.transformations.push(transformation);
        Ok(id)
    }

    pub fn remove_transformation(&mut self, mapping_id: &str, transformation_id: &str) -> Result<bool> {
        let mapping = self.get_mut(mapping_id)?;
        let before = mapping.transformations.len();
        mapping.transformations.retain(|t| t.id != transformation_id);
        Ok(mapping.transformations.len() != before)
    }

    /// Attach a validation rule, returning its id
    pub fn add_validation_rule(
        &mut self,
        mapping_id: &str,
        kind: RuleKind,
        error_message: &str,
    ) -> Result<String> {
        let id = self.ids.next_id("validation");
        let mapping = self.get_mut(mapping_id)?;
        mapping
            .validation_rules
            .push(ValidationRule::new(id.clone(), kind, error_message));
        Ok(id)
    }

    pub fn remove_validation_rule(&mut self, mapping_id: &str, rule_id: &str) -> Result<bool> {
        let mapping = self.get_mut(mapping_id)?;
        let before = mapping.validation_rules.len();
        mapping.validation_rules.retain(|r| r.id != rule_id);
        Ok(mapping.validation_rules.len() != before)
    }

    /// Case-insensitive search over name, source column and target field
    pub fn search(&self, query: &str) -> Vec<&FieldMapping> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.mappings.iter().collect();
        }
        self.mappings
            .iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&query)
                    || m.source_column.to_lowercase().contains(&query)
                    || m.target_field.to_lowercase().contains(&query)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RangeConfig, ReplaceConfig, SubstringConfig};
    use crate::services::ids::SequentialIds;

    fn editor() -> MappingEditor {
        let mut amount = FieldMapping::new("m1", "Total", "amount");
        amount.name = "Invoice Amount".to_string();
        let mut date = FieldMapping::new("m2", "Invoice Date", "date");
        date.name = "Date".to_string();
        MappingEditor::with_ids(vec![amount, date], Box::new(SequentialIds::new("edit")))
    }

    fn substring() -> TransformationKind {
        TransformationKind::Substring(SubstringConfig { start: 0, length: Some(4) })
    }

    #[test]
    fn test_create_requires_fields() {
        let mut editor = editor();
        let err = editor
            .create(MappingDraft {
                name: "Tax".to_string(),
                source_column: "VAT".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("required"));
        assert_eq!(editor.mappings().len(), 2);
    }

    #[test]
    fn test_create_custom_mapping() {
        let mut editor = editor();
        let created = editor
            .create(MappingDraft {
                name: "Tax".to_string(),
                source_column: "VAT".to_string(),
                target_field: "tax_code".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(created.id, "mapping_edit_1");
        assert!(created.is_custom);
        assert!(created.active);
    }

    #[test]
    fn test_toggle_update_delete() {
        let mut editor = editor();
        assert!(!editor.toggle("m1").unwrap());
        assert!(editor.toggle("m1").unwrap());

        let mut changed = editor.get("m2").unwrap().clone();
        changed.source_column = "Posted".to_string();
        editor.update(changed).unwrap();
        assert_eq!(editor.get("m2").unwrap().source_column, "Posted");

        let removed = editor.delete("m1").unwrap();
        assert_eq!(removed.target_field, "amount");
        assert!(editor.delete("m1").is_err());
        assert!(editor.toggle("missing").is_err());
    }

    #[test]
    fn test_transformation_order_follows_max() {
        let mut editor = editor();
        let first = editor.add_transformation("m1", "Trim", substring()).unwrap();
        let replace = TransformationKind::Replace(ReplaceConfig {
            find: ",".to_string(),
            replace: String::new(),
            use_regex: false,
        });
        editor.add_transformation("m1", "Commas", replace).unwrap();

        let orders: Vec<i32> = editor.get("m1").unwrap().transformations.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1]);

        assert!(editor.remove_transformation("m1", &first).unwrap());
        assert!(!editor.remove_transformation("m1", &first).unwrap());
        editor.add_transformation("m1", "Again", substring()).unwrap();
        let orders: Vec<i32> = editor.get("m1").unwrap().transformations.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn test_validation_rules() {
        let mut editor = editor();
        let range = RuleKind::Range(RangeConfig { min: Some(0.0), max: None });
        let id = editor.add_validation_rule("m1", range, "Amount must be positive").unwrap();
        assert_eq!(editor.get("m1").unwrap().validation_rules[0].type_name(), "range");

        assert!(editor.remove_validation_rule("m1", &id).unwrap());
        assert!(editor.get("m1").unwrap().validation_rules.is_empty());
        assert!(editor
            .add_validation_rule("missing", RuleKind::Required(Default::default()), "x")
            .is_err());
    }

    #[test]
    fn test_search() {
        let editor = editor();
        assert_eq!(editor.search("  ").len(), 2);
        assert_eq!(editor.search("TOTAL")[0].id, "m1");
        assert_eq!(editor.search("date").len(), 1);
        assert_eq!(editor.search("amount")[0].id, "m1");
        assert!(editor.search("vendor").is_empty());
    }
}

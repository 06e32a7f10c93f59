//! Field mapping domain model
//!
//! A `FieldMapping` binds one source column of a statement table to one field
//! of a target system. Transformations and validation rules are stored with the
//! mapping; the JSON shape matches the front-end's saved templates
//! (`{"type": "...", "config": {...}}`).

use serde::{Deserialize, Deserializer, Serialize};

use super::field::{DataType, SystemField};

/// Regex used to strip currency symbols from amount columns
pub const CURRENCY_SYMBOL_PATTERN: &str = "[$£€]";

fn default_true() -> bool {
    true
}

/// Saved templates write `null` for numeric inputs left blank
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Binding from a source column to a target field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source_column: String,
    /// `SystemField::id` of the target system
    pub target_field: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
    /// Alternative source columns, tried in order when `source_column` is absent
    #[serde(default)]
    pub fallback_columns: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub is_custom: bool,
}

impl FieldMapping {
    /// Create an active mapping with no transformations or rules
    pub fn new(
        id: impl Into<String>,
        source_column: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            source_column: source_column.into(),
            target_field: target_field.into(),
            data_type: DataType::String,
            required: false,
            format: None,
            default_value: None,
            transformations: Vec::new(),
            validation_rules: Vec::new(),
            fallback_columns: Vec::new(),
            active: true,
            is_custom: false,
        }
    }

    /// Create a mapping that feeds `field`, copying its type, requiredness and format
    pub fn for_field(id: impl Into<String>, source_column: &str, field: &SystemField) -> Self {
        let mut mapping = Self::new(id, source_column, field.id.clone());
        mapping.name = field.name.clone();
        mapping.description = format!("Maps {} to {}", source_column, field.name);
        mapping.data_type = field.data_type;
        mapping.required = field.required;
        mapping.format = field.format.clone();
        mapping
    }

    pub fn with_fallbacks<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_columns = fallbacks.into_iter().map(Into::into).collect();
        self
    }

    /// Active transformations in execution order (ascending `order`, stable)
    pub fn ordered_transformations(&self) -> Vec<&Transformation> {
        let mut ordered: Vec<&Transformation> =
            self.transformations.iter().filter(|t| t.active).collect();
        ordered.sort_by_key(|t| t.order);
        ordered
    }

    /// Highest transformation order, if any transformation exists
    pub fn max_transformation_order(&self) -> Option<i32> {
        self.transformations.iter().map(|t| t.order).max()
    }
}

/// An operation applied to a mapped value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(flatten)]
    pub kind: TransformationKind,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Transformation {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: TransformationKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            order: 0,
            active: true,
        }
    }

    /// Regex replacement stripping `$`, `£` and `€`
    pub fn strip_currency_symbols(id: impl Into<String>) -> Self {
        Self::new(
            id,
            "Remove Currency Symbols",
            TransformationKind::Replace(ReplaceConfig {
                find: CURRENCY_SYMBOL_PATTERN.to_string(),
                replace: String::new(),
                use_regex: true,
            }),
        )
    }

    /// Date reformatting from an auto-detected input format
    pub fn format_date(id: impl Into<String>, output_format: impl Into<String>) -> Self {
        Self::new(
            id,
            "Format Date",
            TransformationKind::Format(FormatConfig {
                input_format: FormatConfig::AUTO.to_string(),
                output_format: output_format.into(),
            }),
        )
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Transformation variants with their per-type configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum TransformationKind {
    Replace(ReplaceConfig),
    Format(FormatConfig),
    Substring(SubstringConfig),
    Math(MathConfig),
    Conditional(ConditionalConfig),
    Custom(CustomConfig),
}

impl TransformationKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            TransformationKind::Replace(_) => "replace",
            TransformationKind::Format(_) => "format",
            TransformationKind::Substring(_) => "substring",
            TransformationKind::Math(_) => "math",
            TransformationKind::Conditional(_) => "conditional",
            TransformationKind::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceConfig {
    #[serde(default)]
    pub find: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default)]
    pub use_regex: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatConfig {
    /// "auto" or a `YYYY-MM-DD` style pattern
    #[serde(default = "FormatConfig::auto")]
    pub input_format: String,
    #[serde(default)]
    pub output_format: String,
}

impl FormatConfig {
    pub const AUTO: &'static str = "auto";

    fn auto() -> String {
        Self::AUTO.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathOperation {
    #[default]
    Multiply,
    Divide,
    Add,
    Subtract,
    Round,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathConfig {
    #[serde(default)]
    pub operation: MathOperation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
    #[serde(
        default = "MathConfig::default_decimals",
        deserialize_with = "MathConfig::decimals_or_default"
    )]
    pub decimals: u32,
}

impl MathConfig {
    fn default_decimals() -> u32 {
        2
    }

    fn decimals_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(Self::default_decimals))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalConfig {
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub if_true: String,
    #[serde(default)]
    pub if_false: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomConfig {
    #[serde(default)]
    pub code: String,
}

/// Severity of a failed validation rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// An advisory check attached to a mapping (stored, never executed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub kind: RuleKind,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ValidationRule {
    pub fn new(id: impl Into<String>, kind: RuleKind, error_message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            error_message: error_message.into(),
            severity: Severity::Error,
            active: true,
        }
    }

    /// "`field` is required" error rule
    pub fn required(id: impl Into<String>, field_name: &str) -> Self {
        Self::new(
            id,
            RuleKind::Required(RequiredConfig::default()),
            format!("{} is required", field_name),
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            RuleKind::Required(_) => "required",
            RuleKind::Format(_) => "format",
            RuleKind::Range(_) => "range",
            RuleKind::Regex(_) => "regex",
            RuleKind::Custom(_) => "custom",
        }
    }
}

/// Validation rule variants with their per-type configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum RuleKind {
    Required(RequiredConfig),
    Format(FormatRuleConfig),
    Range(RangeConfig),
    Regex(RegexConfig),
    Custom(CustomConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredConfig {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatRuleConfig {
    /// "date", "number", "email", ...
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegexConfig {
    #[serde(default)]
    pub pattern: String,
}

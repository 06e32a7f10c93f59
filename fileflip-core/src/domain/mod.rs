//! Core domain entities
//!
//! Pure data structures describing target systems, field mappings and
//! templates. No I/O apart from reading sample tables.

mod field;
mod mapping;
mod table;
mod template;
pub mod result;

pub use field::{DataType, SystemField, SystemType, TargetSystem};
pub use mapping::{
    ConditionalConfig, CustomConfig, FieldMapping, FormatConfig, FormatRuleConfig, MathConfig,
    MathOperation, RangeConfig, RegexConfig, ReplaceConfig, RequiredConfig, RuleKind, Severity,
    SubstringConfig, Transformation, TransformationKind, ValidationRule, CURRENCY_SYMBOL_PATTERN,
};
pub use table::SourceTable;
pub use template::MappingTemplate;

//! Preview service - shows what mapped columns look like after transformation
//!
//! Runs the active transformations of each mapping against the first sample
//! row. Validation rules are stored on mappings but never evaluated here.

use std::str::FromStr;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    FieldMapping, FormatConfig, MathConfig, MathOperation, ReplaceConfig, SourceTable,
    SubstringConfig, Transformation, TransformationKind,
};

use super::logging::{LogEvent, LoggingService};

/// One source column in the preview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub source_column: String,
    pub sample_value: Option<String>,
    pub mapped: bool,
    pub target_field: Option<String>,
    pub transformed_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Preview {
    pub rows: Vec<PreviewRow>,
    /// Transformations that could not be applied
    pub warnings: Vec<String>,
}

impl Preview {
    pub fn mapped_count(&self) -> usize {
        self.rows.iter().filter(|r| r.mapped).count()
    }
}

pub struct PreviewService {
    logger: Option<Arc<LoggingService>>,
}

impl PreviewService {
    pub fn new(logger: Option<Arc<LoggingService>>) -> Self {
        Self { logger }
    }

    /// Build the preview, one row per source column in document order
    pub fn preview(&self, table: &SourceTable, mappings: &[FieldMapping]) -> Preview {
        let mut preview = Preview::default();

        for column in &table.column_names {
            let sample = table.sample_value(column).map(str::to_string);
            let mapping = mappings
                .iter()
                .find(|m| m.active && &m.source_column == column);

            let transformed = match (mapping, &sample) {
                (Some(m), Some(value)) => Some(apply_transformations(value, m, &mut preview.warnings)),
                _ => None,
            };

            preview.rows.push(PreviewRow {
                source_column: column.clone(),
                sample_value: sample,
                mapped: mapping.is_some(),
                target_field: mapping.map(|m| m.target_field.clone()),
                transformed_value: transformed,
            });
        }

        if let Some(logger) = &self.logger {
            let _ = logger.log(LogEvent::new("preview_generated").with_mapping_count(preview.mapped_count()));
        }
        preview
    }
}

/// Run a mapping's active transformations, in order, over one value
///
/// Values a transformation can't handle pass through unchanged.
pub fn apply_transformations(value: &str, mapping: &FieldMapping, warnings: &mut Vec<String>) -> String {
    let mut current = value.to_string();
    for transformation in mapping.ordered_transformations() {
        current = apply_transformation(&current, transformation, warnings);
    }
    current
}

fn apply_transformation(value: &str, transformation: &Transformation, warnings: &mut Vec<String>) -> String {
    match &transformation.kind {
        TransformationKind::Replace(cfg) => match replace(value, cfg) {
            Ok(v) => v,
            Err(e) => {
                warnings.push(format!("{}: invalid pattern '{}': {}", label(transformation), cfg.find, e));
                value.to_string()
            }
        },
        TransformationKind::Format(cfg) => match format_date(value, cfg) {
            Ok(formatted) => formatted.unwrap_or_else(|| value.to_string()),
            Err(pattern) => {
                warnings.push(format!("{}: unsupported date pattern '{}'", label(transformation), pattern));
                value.to_string()
            }
        },
        TransformationKind::Substring(cfg) => substring(value, cfg),
        TransformationKind::Math(cfg) => math(value, cfg).unwrap_or_else(|| value.to_string()),
        TransformationKind::Conditional(_) | TransformationKind::Custom(_) => {
            warnings.push(format!(
                "{}: {} transformations are not evaluated in previews",
                label(transformation),
                transformation.type_name()
            ));
            value.to_string()
        }
    }
}

fn label(transformation: &Transformation) -> &str {
    if transformation.display_name.is_empty() {
        &transformation.id
    } else {
        &transformation.display_name
    }
}

fn replace(value: &str, cfg: &ReplaceConfig) -> Result<String, regex::Error> {
    if cfg.use_regex {
        let re = Regex::new(&cfg.find)?;
        Ok(re.replace_all(value, cfg.replace.as_str()).into_owned())
    } else if cfg.find.is_empty() {
        Ok(value.to_string())
    } else {
        Ok(value.replace(&cfg.find, &cfg.replace))
    }
}

/// Translate a `YYYY-MM-DD` style pattern into a chrono format string
///
/// Literal `%` is escaped first so user text never reaches chrono as a
/// specifier.
fn chrono_pattern(pattern: &str) -> String {
    pattern
        .replace('%', "%%")
        .replace("YYYY", "%Y")
        .replace("YY", "%y")
        .replace("MM", "%m")
        .replace("DD", "%d")
}

fn parse_date(s: &str, input_format: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if input_format != FormatConfig::AUTO {
        return NaiveDate::parse_from_str(s, &chrono_pattern(input_format)).ok();
    }

    let formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m-%d-%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
        "%d.%m.%Y",
        "%d %b %Y",
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// `Ok(None)` when the value isn't a date, `Err` with the offending pattern
/// when chrono can't render it
fn format_date(value: &str, cfg: &FormatConfig) -> Result<Option<String>, String> {
    if cfg.output_format.is_empty() {
        return Ok(None);
    }
    let pattern = chrono_pattern(&cfg.output_format);
    if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
        return Err(cfg.output_format.clone());
    }
    Ok(parse_date(value, &cfg.input_format).map(|date| date.format(&pattern).to_string()))
}

fn substring(value: &str, cfg: &SubstringConfig) -> String {
    let chars = value.chars().skip(cfg.start);
    match cfg.length {
        Some(len) => chars.take(len).collect(),
        None => chars.collect(),
    }
}

fn math(value: &str, cfg: &MathConfig) -> Option<String> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    let amount = Decimal::from_str(&cleaned).ok()?;

    let operand = || Decimal::from_f64(cfg.value);

    let result = match cfg.operation {
        MathOperation::Round => amount.round_dp(cfg.decimals),
        MathOperation::Multiply => amount.checked_mul(operand()?)?.normalize(),
        MathOperation::Divide => amount.checked_div(operand()?)?.normalize(),
        MathOperation::Add => amount.checked_add(operand()?)?.normalize(),
        MathOperation::Subtract => amount.checked_sub(operand()?)?.normalize(),
    };
    Some(result.to_string())
}

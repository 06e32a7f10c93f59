//! Column mapping resolver
//!
//! Produces a working set of field mappings for a table's columns and a
//! target system. A saved template is used when one fits the columns well
//! enough; otherwise mappings are suggested from column naming heuristics.
//!
//! Everything here is pure: the template library and target fields are passed
//! in, ids come from the caller's [`IdGenerator`], nothing is logged or stored.

use serde::Serialize;

use crate::domain::{
    DataType, FieldMapping, MappingTemplate, SystemField, TargetSystem, Transformation,
    ValidationRule,
};

use super::ids::IdGenerator;

/// Minimum score (0-100) for a template to be used
pub const TEMPLATE_ACCEPT_THRESHOLD: f64 = 50.0;

/// Contribution of a mapping matched through a fallback column
const FALLBACK_MATCH_WEIGHT: f64 = 0.8;

/// Keyword categories for heuristic matching, in lookup order
pub const KEYWORD_CATEGORIES: &[(&str, &[&str])] = &[
    ("amount", &["total", "sum", "value", "price", "cost", "net", "gross", "inc", "excl"]),
    ("date", &["date", "time", "day", "when"]),
    ("description", &["desc", "narration", "narrative", "details", "particular", "item"]),
    ("reference", &["ref", "invoice", "no", "number", "transaction", "id"]),
    ("contact", &["customer", "supplier", "vendor", "client", "name", "company"]),
    ("account", &["acc", "gl", "ledger", "nominal", "category"]),
];

/// A template together with its compatibility score
#[derive(Debug, Clone, Copy)]
pub struct ScoredTemplate<'a> {
    pub template: &'a MappingTemplate,
    pub score: f64,
}

/// How a source column was picked for a target field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch<'c> {
    /// Normalized column equals the field's normalized name or id
    Exact(&'c str),
    /// Column contains a keyword of the category the field belongs to
    Keyword {
        column: &'c str,
        category: &'static str,
        keyword: &'static str,
    },
}

impl<'c> ColumnMatch<'c> {
    pub fn column(&self) -> &'c str {
        match self {
            ColumnMatch::Exact(column) => column,
            ColumnMatch::Keyword { column, .. } => column,
        }
    }
}

/// Output of [`resolve`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub mappings: Vec<FieldMapping>,
    /// Template the mappings were adapted from, if one qualified
    pub source_template: Option<MappingTemplate>,
    /// Score of `source_template`
    pub score: Option<f64>,
    /// Target fields without an active mapping
    pub unmapped_fields: Vec<String>,
}

impl Resolution {
    pub fn from_template(&self) -> bool {
        self.source_template.is_some()
    }
}

fn has_column(columns: &[impl AsRef<str>], name: &str) -> bool {
    columns.iter().any(|c| c.as_ref() == name)
}

/// Lowercase and drop whitespace, underscores and hyphens
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether a score clears the acceptance threshold
pub fn accepts_score(score: f64) -> bool {
    score >= TEMPLATE_ACCEPT_THRESHOLD
}

/// Score how well a template's mappings fit the columns, from 0 to 100
///
/// Each mapping contributes 1.0 when its source column is present, 0.8 when
/// only a fallback column is present and 0 otherwise. A template without
/// mappings scores 0.
pub fn score_template(template: &MappingTemplate, columns: &[impl AsRef<str>]) -> f64 {
    if template.mappings.is_empty() {
        return 0.0;
    }

    let total: f64 = template
        .mappings
        .iter()
        .map(|m| {
            if has_column(columns, &m.source_column) {
                1.0
            } else if m.fallback_columns.iter().any(|f| has_column(columns, f)) {
                FALLBACK_MATCH_WEIGHT
            } else {
                0.0
            }
        })
        .sum();

    (100.0 * total / template.mappings.len() as f64).clamp(0.0, 100.0)
}

/// Pick the highest-scoring template for the target system
///
/// Ties go to the template that comes first in `templates`. Returns `None`
/// when no template targets the system or the best score is below
/// [`TEMPLATE_ACCEPT_THRESHOLD`].
pub fn find_best_template<'a>(
    templates: &'a [MappingTemplate],
    target_system_id: &str,
    columns: &[impl AsRef<str>],
) -> Option<ScoredTemplate<'a>> {
    let mut best: Option<ScoredTemplate<'a>> = None;

    for template in templates.iter().filter(|t| t.targets(target_system_id)) {
        let score = score_template(template, columns);
        if best.map_or(true, |b| score > b.score) {
            best = Some(ScoredTemplate { template, score });
        }
    }

    best.filter(|b| accepts_score(b.score))
}

/// Rebind a template's mappings to the columns of the current document
///
/// Returns exactly one mapping per template mapping, each with a fresh id.
/// Mappings whose primary and fallback columns are all missing are kept but
/// deactivated so they can be configured by hand.
pub fn adapt_template(
    template: &MappingTemplate,
    columns: &[impl AsRef<str>],
    ids: &mut dyn IdGenerator,
) -> Vec<FieldMapping> {
    template
        .mappings
        .iter()
        .map(|mapping| {
            let mut adapted = mapping.clone();
            adapted.id = ids.next_id("mapping");

            if has_column(columns, &mapping.source_column) {
                return adapted;
            }

            match mapping.fallback_columns.iter().find(|f| has_column(columns, f)) {
                Some(fallback) => {
                    adapted.source_column = fallback.clone();
                    adapted.active = true;
                    adapted.description =
                        format!("Maps {} to {} (auto-adapted)", fallback, mapping.target_field);
                }
                None => {
                    adapted.active = false;
                    adapted.description = if mapping.description.is_empty() {
                        "(needs configuration)".to_string()
                    } else {
                        format!("{} (needs configuration)", mapping.description)
                    };
                }
            }
            adapted
        })
        .collect()
}

/// Find the source column for a target field
///
/// Exact (normalized) name/id matches win over keyword matches; within each
/// pass the first column in document order wins.
pub fn match_source_column<'c>(field: &SystemField, columns: &'c [impl AsRef<str>]) -> Option<ColumnMatch<'c>> {
    let name_norm = normalize_name(&field.name);
    let id_norm = normalize_name(&field.id);

    for column in columns {
        let column = column.as_ref();
        let column_norm = normalize_name(column);
        if !column_norm.is_empty() && (column_norm == name_norm || column_norm == id_norm) {
            return Some(ColumnMatch::Exact(column));
        }
    }

    let id_lower = field.id.to_lowercase();
    let name_lower = field.name.to_lowercase();
    let &(category, keywords) = KEYWORD_CATEGORIES
        .iter()
        .find(|(category, _)| id_lower.contains(category) || name_lower.contains(category))?;

    for &keyword in keywords {
        for column in columns {
            let column = column.as_ref();
            if column.to_lowercase().contains(keyword) {
                return Some(ColumnMatch::Keyword {
                    column,
                    category,
                    keyword,
                });
            }
        }
    }

    None
}

/// Suggest mappings for the target fields from column names alone
///
/// Fields are visited in declared order; fields without a matching column
/// get no mapping.
pub fn suggest_mappings_from_scratch(
    target_fields: &[SystemField],
    columns: &[impl AsRef<str>],
    ids: &mut dyn IdGenerator,
) -> Vec<FieldMapping> {
    let mut suggested = Vec::new();

    for field in target_fields {
        let Some(found) = match_source_column(field, columns) else {
            continue;
        };

        let mut mapping = FieldMapping::for_field(ids.next_id("mapping"), found.column(), field);

        if field.data_type == DataType::Date {
            if let Some(format) = &field.format {
                mapping
                    .transformations
                    .push(Transformation::format_date(ids.next_id("transform"), format.clone()));
            }
        }

        if field.data_type == DataType::Number {
            if field.required {
                mapping
                    .validation_rules
                    .push(ValidationRule::required(ids.next_id("validation"), &field.name));
            }
            mapping
                .transformations
                .push(Transformation::strip_currency_symbols(ids.next_id("transform")));
        }

        suggested.push(mapping);
    }

    suggested
}

/// Resolve mappings for a table against a target system
///
/// Uses the best qualifying template from `library` (adapted to `columns`),
/// falling back to heuristic suggestions when none qualifies.
pub fn resolve(
    columns: &[impl AsRef<str>],
    target: &TargetSystem,
    library: &[MappingTemplate],
    ids: &mut dyn IdGenerator,
) -> Resolution {
    let (mappings, source_template, score) = match find_best_template(library, &target.id, columns) {
        Some(best) => (
            adapt_template(best.template, columns, ids),
            Some(best.template.clone()),
            Some(best.score),
        ),
        None => (suggest_mappings_from_scratch(&target.fields, columns, ids), None, None),
    };

    let unmapped_fields = target
        .fields
        .iter()
        .filter(|f| !mappings.iter().any(|m| m.active && m.target_field == f.id))
        .map(|f| f.id.clone())
        .collect();

    Resolution {
        mappings,
        source_template,
        score,
        unmapped_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RuleKind, SystemType, TransformationKind};
    use crate::services::ids::{SequentialIds, UuidIds};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn template(id: &str, system: &str, mappings: Vec<FieldMapping>) -> MappingTemplate {
        MappingTemplate::new(id, id, system, mappings)
    }

    fn m(id: &str, source: &str, target: &str) -> FieldMapping {
        FieldMapping::new(id, source, target)
    }

    fn four_mapping_template() -> MappingTemplate {
        template(
            "invoice",
            "sage",
            vec![
                m("m1", "Description", "description"),
                m("m2", "Reference", "reference"),
                m("m3", "Date", "date"),
                m("m4", "Amount", "amount").with_fallbacks(["Total", "Grand Total"]),
            ],
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sage() -> TargetSystem {
        TargetSystem {
            id: "sage".to_string(),
            name: "Sage".to_string(),
            system_type: SystemType::Accounting,
            fields: vec![
                SystemField::new("description", "Description", DataType::String).required(),
                SystemField::new("date", "Transaction Date", DataType::Date)
                    .required()
                    .with_format("YYYY-MM-DD"),
                SystemField::new("amount", "Amount", DataType::Number).required(),
                SystemField::new("tax_code", "Tax Code", DataType::String),
            ],
            document_types: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // score_template
    // ------------------------------------------------------------------

    #[test]
    fn test_score_three_exact_one_fallback() {
        let columns = cols(&["Description", "Reference", "Date", "Total"]);
        let score = score_template(&four_mapping_template(), &columns);
        assert!(approx(score, 95.0), "score was {}", score);
    }

    #[test]
    fn test_score_single_exact_match() {
        let columns = cols(&["Description", "Posted", "Value"]);
        let score = score_template(&four_mapping_template(), &columns);
        assert!(approx(score, 25.0), "score was {}", score);
    }

    #[test]
    fn test_score_empty_template_is_zero() {
        let empty = template("empty", "sage", Vec::new());
        assert_eq!(score_template(&empty, &cols(&["Date"])), 0.0);
    }

    #[test]
    fn test_score_bounds() {
        let t = four_mapping_template();
        let full = cols(&["Description", "Reference", "Date", "Amount", "Total"]);
        assert!(approx(score_template(&t, &full), 100.0));
        let none: Vec<String> = Vec::new();
        assert_eq!(score_template(&t, &none), 0.0);
    }

    #[test]
    fn test_score_is_case_sensitive() {
        let t = template("t", "sage", vec![m("m1", "Amount", "amount")]);
        assert_eq!(score_template(&t, &cols(&["amount"])), 0.0);
    }

    // ------------------------------------------------------------------
    // find_best_template
    // ------------------------------------------------------------------

    #[test]
    fn test_find_best_filters_target_system() {
        let templates = vec![template("qb", "quickbooks", vec![m("m1", "Date", "txn_date")])];
        assert!(find_best_template(&templates, "sage", &cols(&["Date"])).is_none());
    }

    #[test]
    fn test_find_best_picks_highest() {
        let templates = vec![
            template("half", "sage", vec![m("a", "Date", "date"), m("b", "Missing", "amount")]),
            template("full", "sage", vec![m("c", "Date", "date")]),
        ];
        let best = find_best_template(&templates, "sage", &cols(&["Date"])).unwrap();
        assert_eq!(best.template.id, "full");
        assert!(approx(best.score, 100.0));
    }

    #[test]
    fn test_find_best_tie_prefers_first() {
        let templates = vec![
            template("first", "sage", vec![m("a", "Date", "date")]),
            template("second", "sage", vec![m("b", "Date", "date")]),
        ];
        let best = find_best_template(&templates, "sage", &cols(&["Date"])).unwrap();
        assert_eq!(best.template.id, "first");
    }

    #[test]
    fn test_threshold_exactly_fifty_is_accepted() {
        let templates = vec![template(
            "t",
            "sage",
            vec![m("a", "Date", "date"), m("b", "Amount", "amount")],
        )];
        let best = find_best_template(&templates, "sage", &cols(&["Date"])).unwrap();
        assert!(approx(best.score, 50.0));
    }

    #[test]
    fn test_threshold_below_fifty_is_rejected() {
        assert!(accepts_score(50.0));
        assert!(!accepts_score(49.999));

        // 1 exact + 1 fallback of 4 = 45
        let templates = vec![template(
            "t",
            "sage",
            vec![
                m("a", "Date", "date"),
                m("b", "Amount", "amount").with_fallbacks(["Total"]),
                m("c", "Reference", "reference"),
                m("d", "Description", "description"),
            ],
        )];
        assert!(find_best_template(&templates, "sage", &cols(&["Date", "Total"])).is_none());
    }

    #[test]
    fn test_template_without_target_system_is_excluded() {
        let templates = vec![template("orphan", "", vec![m("a", "Date", "date")])];
        assert!(find_best_template(&templates, "", &cols(&["Date"])).is_none());
    }

    // ------------------------------------------------------------------
    // adapt_template
    // ------------------------------------------------------------------

    #[test]
    fn test_adapt_uses_fallback_for_missing_primary() {
        let columns = cols(&["Description", "Reference", "Date", "Total"]);
        let adapted = adapt_template(&four_mapping_template(), &columns, &mut UuidIds);

        assert_eq!(adapted.len(), 4);
        assert!(adapted.iter().all(|m| m.active));
        assert_eq!(adapted[3].source_column, "Total");
        assert!(adapted[3].description.contains("auto-adapted"));
        assert_eq!(adapted[0].source_column, "Description");
    }

    #[test]
    fn test_adapt_primary_wins_over_fallback() {
        let columns = cols(&["Total", "Amount"]);
        let t = template("t", "sage", vec![m("a", "Amount", "amount").with_fallbacks(["Total"])]);
        let adapted = adapt_template(&t, &columns, &mut UuidIds);
        assert_eq!(adapted[0].source_column, "Amount");
    }

    #[test]
    fn test_adapt_first_listed_fallback_wins() {
        let columns = cols(&["Grand Total", "Total"]);
        let t = template(
            "t",
            "sage",
            vec![m("a", "Amount", "amount").with_fallbacks(["Total", "Grand Total"])],
        );
        let adapted = adapt_template(&t, &columns, &mut UuidIds);
        assert_eq!(adapted[0].source_column, "Total");
    }

    #[test]
    fn test_adapt_keeps_unmatched_mapping_inactive() {
        let t = four_mapping_template();
        let adapted = adapt_template(&t, &cols(&["Description"]), &mut UuidIds);
        assert_eq!(adapted.len(), t.mappings.len());
        assert!(adapted[0].active);
        assert!(!adapted[1].active);
        assert!(!adapted[3].active);
        assert_eq!(adapted[3].source_column, "Amount");
        assert!(adapted[1].description.ends_with("(needs configuration)"));
    }

    #[test]
    fn test_adapt_generates_fresh_ids() {
        let t = four_mapping_template();
        let columns = cols(&["Description", "Reference", "Date", "Amount"]);
        let first = adapt_template(&t, &columns, &mut UuidIds);
        let second = adapt_template(&t, &columns, &mut UuidIds);

        for (i, mapping) in first.iter().enumerate() {
            assert_ne!(mapping.id, t.mappings[i].id);
            assert_ne!(mapping.id, second[i].id);
        }
    }

    // ------------------------------------------------------------------
    // match_source_column / suggest_mappings_from_scratch
    // ------------------------------------------------------------------

    #[test]
    fn test_exact_match_normalizes_separators() {
        let field = SystemField::new("account_code", "Account Code", DataType::String);
        let columns = cols(&["Nominal", "ACCOUNT-CODE"]);
        assert_eq!(
            match_source_column(&field, &columns),
            Some(ColumnMatch::Exact("ACCOUNT-CODE"))
        );
    }

    #[test]
    fn test_exact_match_on_field_id() {
        let field = SystemField::new("txn_date", "Transaction Date", DataType::Date);
        let columns = cols(&["Posted", "TxnDate"]);
        assert_eq!(match_source_column(&field, &columns), Some(ColumnMatch::Exact("TxnDate")));
    }

    #[test]
    fn test_exact_match_beats_earlier_keyword_candidate() {
        // "Total" is a keyword hit for amount and comes first, but "Amount" is exact
        let field = SystemField::new("amount", "Amount", DataType::Number);
        let columns = cols(&["Total", "Amount"]);
        assert_eq!(match_source_column(&field, &columns), Some(ColumnMatch::Exact("Amount")));
    }

    #[test]
    fn test_keyword_match_invoice_date() {
        let field = SystemField::new("date", "Transaction Date", DataType::Date);
        let columns = cols(&["Invoice Date", "Total", "Vendor"]);
        match match_source_column(&field, &columns) {
            Some(ColumnMatch::Keyword { column, category, keyword }) => {
                assert_eq!(column, "Invoice Date");
                assert_eq!(category, "date");
                assert_eq!(keyword, "date");
            }
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn test_keyword_order_beats_column_order() {
        // "sum" is listed before "net" in the amount keywords
        let field = SystemField::new("amount", "Amount", DataType::Number);
        let columns = cols(&["Net", "Sum"]);
        assert_eq!(match_source_column(&field, &columns).map(|m| m.column()), Some("Sum"));
    }

    #[test]
    fn test_no_category_means_no_match() {
        let field = SystemField::new("tax_code", "Tax Code", DataType::String);
        let columns = cols(&["VAT", "Rate"]);
        assert!(match_source_column(&field, &columns).is_none());
    }

    #[test]
    fn test_suggest_skips_unmatched_fields() {
        let columns = cols(&["Description", "Posted"]);
        let suggested = suggest_mappings_from_scratch(&sage().fields, &columns, &mut UuidIds);
        let targets: Vec<&str> = suggested.iter().map(|m| m.target_field.as_str()).collect();
        assert_eq!(targets, vec!["description"]);
    }

    #[test]
    fn test_suggest_date_gets_format_transformation() {
        let columns = cols(&["Invoice Date"]);
        let suggested = suggest_mappings_from_scratch(&sage().fields, &columns, &mut UuidIds);
        let date = suggested.iter().find(|m| m.target_field == "date").unwrap();

        assert_eq!(date.source_column, "Invoice Date");
        assert_eq!(date.data_type, DataType::Date);
        assert_eq!(date.format.as_deref(), Some("YYYY-MM-DD"));
        assert_eq!(date.transformations.len(), 1);
        match &date.transformations[0].kind {
            TransformationKind::Format(cfg) => {
                assert_eq!(cfg.input_format, "auto");
                assert_eq!(cfg.output_format, "YYYY-MM-DD");
            }
            other => panic!("unexpected transformation: {:?}", other),
        }
        assert!(date.validation_rules.is_empty());
    }

    #[test]
    fn test_suggest_required_amount_from_total() {
        let fields = vec![SystemField::new("amount", "Amount", DataType::Number).required()];
        let columns = cols(&["Invoice Date", "Total", "Vendor"]);
        let suggested = suggest_mappings_from_scratch(&fields, &columns, &mut UuidIds);

        assert_eq!(suggested.len(), 1);
        let amount = &suggested[0];
        assert_eq!(amount.source_column, "Total");
        assert!(amount.required);

        assert_eq!(amount.validation_rules.len(), 1);
        assert!(matches!(amount.validation_rules[0].kind, RuleKind::Required(_)));

        assert_eq!(amount.transformations.len(), 1);
        match &amount.transformations[0].kind {
            TransformationKind::Replace(cfg) => {
                assert_eq!(cfg.find, "[$£€]");
                assert_eq!(cfg.replace, "");
                assert!(cfg.use_regex);
            }
            other => panic!("unexpected transformation: {:?}", other),
        }
    }

    #[test]
    fn test_suggest_optional_number_has_no_required_rule() {
        let fields = vec![SystemField::new("net_amount", "Net Amount", DataType::Number)];
        let suggested = suggest_mappings_from_scratch(&fields, &cols(&["Net"]), &mut UuidIds);
        assert_eq!(suggested.len(), 1);
        assert!(suggested[0].validation_rules.is_empty());
        assert_eq!(suggested[0].transformations.len(), 1);
    }

    // ------------------------------------------------------------------
    // resolve
    // ------------------------------------------------------------------

    #[test]
    fn test_resolve_uses_qualifying_template() {
        let library = vec![four_mapping_template()];
        let columns = cols(&["Description", "Reference", "Date", "Total"]);
        let resolution = resolve(&columns, &sage(), &library, &mut UuidIds);

        assert!(resolution.from_template());
        assert_eq!(resolution.source_template.as_ref().unwrap().id, "invoice");
        assert!(approx(resolution.score.unwrap(), 95.0));
        assert_eq!(resolution.mappings.len(), 4);
        assert!(resolution.mappings.iter().all(|m| m.active));
        assert_eq!(resolution.unmapped_fields, vec!["tax_code"]);
    }

    #[test]
    fn test_resolve_falls_back_to_suggestions() {
        let library = vec![four_mapping_template()];
        let columns = cols(&["Description", "Posted", "Value"]);
        let resolution = resolve(&columns, &sage(), &library, &mut UuidIds);

        assert!(resolution.source_template.is_none());
        assert!(resolution.score.is_none());
        let targets: Vec<&str> = resolution.mappings.iter().map(|m| m.target_field.as_str()).collect();
        assert_eq!(targets, vec!["description", "amount"]);
        assert_eq!(resolution.unmapped_fields, vec!["date", "tax_code"]);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let library = vec![four_mapping_template()];
        let target = sage();
        for columns in [
            cols(&["Description", "Reference", "Date", "Total"]),
            cols(&["Invoice Date", "Total", "Vendor"]),
        ] {
            let first = resolve(&columns, &target, &library, &mut SequentialIds::new("r"));
            let second = resolve(&columns, &target, &library, &mut SequentialIds::new("r"));
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Transaction  Date"), "transactiondate");
        assert_eq!(normalize_name("txn_date"), "txndate");
        assert_eq!(normalize_name("Post-Date"), "postdate");
    }
}

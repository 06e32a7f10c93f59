//! Sample mapping templates
//!
//! Seeded into an empty library so first-time users see template matching
//! work on common invoice and bank statement layouts.

use chrono::{Duration, Utc};

use crate::domain::{
    DataType, FieldMapping, FormatRuleConfig, MappingTemplate, RuleKind, Transformation,
    ValidationRule,
};

pub const SAMPLE_INVOICE_TEMPLATE_ID: &str = "template_1";
pub const SAMPLE_STATEMENT_TEMPLATE_ID: &str = "template_2";

/// The built-in sample templates, in library order
pub fn sample_templates() -> Vec<MappingTemplate> {
    vec![invoice_to_sage(), statement_to_quickbooks()]
}

fn mapping(
    id: &str,
    name: &str,
    source: &str,
    target: &str,
    data_type: DataType,
    required: bool,
) -> FieldMapping {
    let mut m = FieldMapping::new(id, source, target);
    m.name = name.to_string();
    m.data_type = data_type;
    m.required = required;
    m
}

fn format_rule(id: &str, format: &str, message: &str) -> ValidationRule {
    ValidationRule::new(
        id,
        RuleKind::Format(FormatRuleConfig {
            format: format.to_string(),
        }),
        message,
    )
}

fn invoice_to_sage() -> MappingTemplate {
    let description = {
        let mut m = mapping("mapping_1", "Invoice Description", "Description", "description", DataType::String, true);
        m.description = "Maps description or details field to Sage description".to_string();
        m
    };

    let reference = {
        let mut m = mapping("mapping_2", "Invoice Number", "Invoice Number", "reference", DataType::String, true)
            .with_fallbacks(["Reference", "Invoice No", "No."]);
        m.description = "Maps invoice number to Sage reference".to_string();
        m
    };

    let date = {
        let mut m = mapping("mapping_3", "Invoice Date", "Date", "date", DataType::Date, true)
            .with_fallbacks(["Invoice Date", "Transaction Date"]);
        m.description = "Maps invoice date to Sage transaction date".to_string();
        m.format = Some("YYYY-MM-DD".to_string());
        m.transformations.push(Transformation::format_date("transform_1", "YYYY-MM-DD"));
        m.validation_rules.push(format_rule("validation_1", "date", "Invalid date format"));
        m
    };

    let amount = {
        let mut m = mapping("mapping_4", "Invoice Amount", "Amount", "amount", DataType::Number, true)
            .with_fallbacks(["Total", "Amount (inc. VAT)", "Grand Total"]);
        m.description = "Maps invoice amount to Sage amount".to_string();
        m.transformations.push(Transformation::strip_currency_symbols("transform_2"));
        m.validation_rules.push(format_rule("validation_2", "number", "Amount must be a number"));
        m
    };

    let mut template = MappingTemplate::new(
        SAMPLE_INVOICE_TEMPLATE_ID,
        "Standard Invoice to Sage",
        "sage",
        vec![description, reference, date, amount],
    );
    template.description = "Maps standard invoice fields to Sage Accounting".to_string();
    template.document_type = Some("invoice".to_string());
    template.is_default = true;
    template.created_at = Utc::now() - Duration::days(30);
    template.updated_at = Utc::now() - Duration::days(5);
    template
}

fn statement_to_quickbooks() -> MappingTemplate {
    let memo = {
        let mut m = mapping("mapping_5", "Transaction Description", "Description", "memo", DataType::String, true)
            .with_fallbacks(["Narrative", "Details", "Transaction Details"]);
        m.description = "Maps description field to QuickBooks memo".to_string();
        m
    };

    let doc_number = {
        let mut m = mapping("mapping_6", "Reference Number", "Reference", "doc_number", DataType::String, false)
            .with_fallbacks(["Ref", "Transaction Ref"]);
        m.description = "Maps reference to QuickBooks document number".to_string();
        m
    };

    let txn_date = {
        let mut m = mapping("mapping_7", "Transaction Date", "Date", "txn_date", DataType::Date, true)
            .with_fallbacks(["Transaction Date", "Posting Date"]);
        m.description = "Maps date to QuickBooks transaction date".to_string();
        m.format = Some("MM/DD/YYYY".to_string());
        m.transformations.push(Transformation::format_date("transform_3", "MM/DD/YYYY"));
        m
    };

    let amount = {
        let mut m = mapping("mapping_8", "Amount", "Amount", "amount", DataType::Number, true)
            .with_fallbacks(["Debit", "Credit", "Value"]);
        m.description = "Maps amount to QuickBooks amount".to_string();
        m
    };

    let mut template = MappingTemplate::new(
        SAMPLE_STATEMENT_TEMPLATE_ID,
        "Bank Statement to QuickBooks",
        "quickbooks",
        vec![memo, doc_number, txn_date, amount],
    );
    template.description = "Maps bank statement to QuickBooks format".to_string();
    template.document_type = Some("bank_statement".to_string());
    template.created_at = Utc::now() - Duration::days(20);
    template.updated_at = Utc::now() - Duration::days(2);
    template
}

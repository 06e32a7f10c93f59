//! Built-in target system catalog
//!
//! Ships the Sage, QuickBooks and custom-export schemas. User-defined target
//! systems from settings.json are layered on top; a user system with the same
//! id as a built-in replaces it.

use crate::domain::{DataType, SystemField, SystemType, TargetSystem};
use crate::ports::TargetCatalog;

pub struct BuiltinCatalog {
    systems: Vec<TargetSystem>,
}

impl BuiltinCatalog {
    /// Catalog with only the built-in systems
    pub fn new() -> Self {
        Self {
            systems: builtin_target_systems(),
        }
    }

    /// Built-ins overlaid with user-defined systems
    pub fn with_overrides(overrides: Vec<TargetSystem>) -> Self {
        let mut systems = builtin_target_systems();
        for system in overrides {
            match systems.iter_mut().find(|s| s.id == system.id) {
                Some(existing) => *existing = system,
                None => systems.push(system),
            }
        }
        Self { systems }
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetCatalog for BuiltinCatalog {
    fn target_systems(&self) -> Vec<TargetSystem> {
        self.systems.clone()
    }

    fn target_system(&self, id: &str) -> Option<TargetSystem> {
        self.systems.iter().find(|s| s.id == id).cloned()
    }
}

fn builtin_target_systems() -> Vec<TargetSystem> {
    vec![sage(), quickbooks(), custom_export()]
}

fn sage() -> TargetSystem {
    TargetSystem {
        id: "sage".to_string(),
        name: "Sage Accounting".to_string(),
        system_type: SystemType::Accounting,
        fields: vec![
            SystemField::new("description", "Description", DataType::String)
                .required()
                .with_description("Transaction description or narrative")
                .with_category("transaction")
                .with_example("Invoice payment for services"),
            SystemField::new("reference", "Reference", DataType::String)
                .required()
                .with_description("Invoice or transaction reference number")
                .with_category("transaction")
                .with_example("INV-2023-001"),
            SystemField::new("date", "Transaction Date", DataType::Date)
                .required()
                .with_format("YYYY-MM-DD")
                .with_description("Date of the transaction")
                .with_category("transaction")
                .with_example("2023-04-15"),
            SystemField::new("amount", "Amount", DataType::Number)
                .required()
                .with_description("Transaction amount (positive for debit, negative for credit)")
                .with_category("transaction")
                .with_example("1250.75"),
            SystemField::new("account_code", "Account Code", DataType::String)
                .required()
                .with_description("GL account code")
                .with_category("accounting")
                .with_example("4000"),
            SystemField::new("tax_code", "Tax Code", DataType::String)
                .with_description("Tax code for the transaction")
                .with_category("taxation")
                .with_example("T1"),
            SystemField::new("contact_name", "Contact Name", DataType::String)
                .with_description("Name of the contact or customer")
                .with_category("customer")
                .with_example("ACME Corporation"),
        ],
        document_types: vec!["invoice".into(), "receipt".into(), "statement".into()],
    }
}

fn quickbooks() -> TargetSystem {
    TargetSystem {
        id: "quickbooks".to_string(),
        name: "QuickBooks".to_string(),
        system_type: SystemType::Accounting,
        fields: vec![
            SystemField::new("memo", "Memo", DataType::String)
                .required()
                .with_description("Transaction description or memo")
                .with_category("transaction")
                .with_example("Monthly service fee"),
            SystemField::new("doc_number", "Document Number", DataType::String)
                .required()
                .with_description("Invoice or document reference number")
                .with_category("transaction")
                .with_example("INV-2023-001"),
            SystemField::new("txn_date", "Transaction Date", DataType::Date)
                .required()
                .with_format("MM/DD/YYYY")
                .with_description("Date of the transaction")
                .with_category("transaction")
                .with_example("04/15/2023"),
            SystemField::new("amount", "Amount", DataType::Number)
                .required()
                .with_description("Transaction amount")
                .with_category("transaction")
                .with_example("1250.75"),
            SystemField::new("account_number", "Account Number", DataType::String)
                .required()
                .with_description("GL account number")
                .with_category("accounting")
                .with_example("40000"),
        ],
        document_types: vec!["invoice".into(), "receipt".into(), "bill".into()],
    }
}

fn custom_export() -> TargetSystem {
    let fields = (1..=3)
        .map(|i| {
            SystemField::new(format!("field{}", i), format!("Field {}", i), DataType::String)
                .with_description(format!("Custom field {}", i))
                .with_category("custom")
        })
        .collect();

    TargetSystem {
        id: "custom".to_string(),
        name: "Custom Export".to_string(),
        system_type: SystemType::Custom,
        fields,
        document_types: Vec::new(),
    }
}

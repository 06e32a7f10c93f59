//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

use fileflip_core::FieldMapping;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Table of mappings: source column, target field, transformations, state
pub fn mappings_table(mappings: &[FieldMapping]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Source Column", "Target Field", "Transformations", "Rules", "Active"]);

    for mapping in mappings {
        let transformations = mapping
            .ordered_transformations()
            .iter()
            .map(|t| t.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let active = if mapping.active {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("needs configuration").fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(&mapping.source_column),
            Cell::new(&mapping.target_field),
            Cell::new(transformations),
            Cell::new(mapping.validation_rules.len()),
            active,
        ]);
    }
    table
}

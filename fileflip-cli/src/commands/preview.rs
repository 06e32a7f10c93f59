//! Preview command - show transformed sample values from a CSV file

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Color};

use fileflip_core::{LogEvent, SourceTable};

use super::{get_context, get_logger, log_event, resolve_system};
use crate::output;

pub fn run(file: &Path, system: Option<String>, template: Option<&str>, rows: usize, json: bool) -> Result<()> {
    let table = SourceTable::from_csv(file, rows.max(1))
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("preview"));
    let ctx = get_context(logger)?;

    let mappings = match template {
        Some(id) => ctx.template_service.apply(id, Some(table.column_names.as_slice()))?,
        None => {
            let system_id = resolve_system(&ctx, system)?;
            ctx.mapping_service.suggest(&table.column_names, &system_id)?.mappings
        }
    };

    let preview = ctx.preview_service.preview(&table, &mappings);

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let mut out = output::create_table();
    out.set_header(vec!["Source Column", "Sample", "Target Field", "Transformed"]);
    for row in &preview.rows {
        let target = match &row.target_field {
            Some(field) => Cell::new(field).fg(Color::Green),
            None => Cell::new("not mapped").fg(Color::DarkGrey),
        };
        out.add_row(vec![
            Cell::new(&row.source_column),
            Cell::new(row.sample_value.as_deref().unwrap_or("")),
            target,
            Cell::new(row.transformed_value.as_deref().unwrap_or("")),
        ]);
    }
    println!("{}", out);
    println!(
        "{}",
        format!("{} of {} columns mapped", preview.mapped_count(), preview.rows.len()).dimmed()
    );

    for warning in &preview.warnings {
        output::warning(&format!("Warning: {}", warning));
    }

    Ok(())
}

//! Suggest command - resolve column mappings for a statement

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use fileflip_core::services::TemplateDraft;
use fileflip_core::{LogEvent, SourceTable};

use super::{get_context, get_logger, log_event, resolve_system};
use crate::output;

pub struct SuggestArgs {
    pub file: Option<PathBuf>,
    pub system: Option<String>,
    pub columns: Vec<String>,
    pub save_template: Option<String>,
    pub export: Option<PathBuf>,
    pub json: bool,
}

/// Columns from: CSV header, --columns, or stdin (one per line, or comma-separated)
fn read_columns(file: Option<&PathBuf>, columns: Vec<String>) -> Result<Vec<String>> {
    let columns: Vec<String> = if let Some(path) = file {
        SourceTable::from_csv(path, 0)
            .with_context(|| format!("Failed to read columns from {}", path.display()))?
            .column_names
    } else if !columns.is_empty() {
        columns
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read columns from stdin")?;
        let trimmed = buffer.trim();
        if trimmed.contains('\n') {
            trimmed.lines().map(str::to_string).collect()
        } else {
            trimmed.split(',').map(str::to_string).collect()
        }
    } else {
        anyhow::bail!("No columns provided. Pass a CSV file, use --columns, or pipe column names from stdin.");
    };

    let columns: Vec<String> = columns
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if columns.is_empty() {
        anyhow::bail!("No column names found.");
    }
    Ok(columns)
}

pub fn run(args: SuggestArgs) -> Result<()> {
    let columns = read_columns(args.file.as_ref(), args.columns)?;

    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("suggest"));
    let ctx = get_context(logger)?;
    let system_id = resolve_system(&ctx, args.system)?;

    let resolution = ctx.mapping_service.suggest(&columns, &system_id)?;

    let saved = match args.save_template {
        Some(name) => Some(ctx.template_service.save_as_template(TemplateDraft {
            name,
            target_system: system_id.clone(),
            mappings: resolution.mappings.clone(),
            ..Default::default()
        })?),
        None => None,
    };

    if let Some(path) = &args.export {
        let content = ctx.template_service.export_mappings(&resolution.mappings)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    match (&resolution.source_template, resolution.score) {
        (Some(template), Some(score)) => output::info(&format!(
            "Using template '{}' ({:.0}% match)",
            template.name, score
        )),
        _ => output::info("No saved template matched; suggested mappings from column names"),
    }

    if resolution.mappings.is_empty() {
        output::warning("No columns could be matched to target fields.");
    } else {
        println!("{}", output::mappings_table(&resolution.mappings));
    }

    if !resolution.unmapped_fields.is_empty() {
        println!(
            "{} {}",
            "Unmapped fields:".yellow(),
            resolution.unmapped_fields.join(", ")
        );
    }

    if let Some(template) = saved {
        output::success(&format!("Saved template '{}' ({})", template.name, template.id));
    }
    if let Some(path) = args.export {
        output::success(&format!("Exported mappings to {}", path.display()));
    }

    Ok(())
}

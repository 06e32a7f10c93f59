//! Templates command - manage saved mapping templates

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use fileflip_core::services::ImportedMappings;
use fileflip_core::LogEvent;

use super::{get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum TemplatesCommands {
    /// List saved templates
    List {
        /// Only templates for this target system
        #[arg(long, short)]
        system: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a template's mappings
    Show {
        /// Template ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a template
    Delete {
        /// Template ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Import a template or exported mapping list from JSON
    Import {
        /// Path to JSON file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a template as JSON
    Export {
        /// Template ID
        id: String,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Add the sample templates that are missing from the library
    Seed,
}

pub fn run(command: TemplatesCommands) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("templates"));
    let ctx = get_context(logger)?;

    match command {
        TemplatesCommands::List { system, json } => {
            let templates = ctx.template_service.list(system.as_deref())?;
            let unreadable = ctx.config.unreadable_template_count();
            if unreadable > 0 && !json {
                output::warning(&format!("Skipped {} template(s) in settings.json that could not be read", unreadable));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
                return Ok(());
            }
            if templates.is_empty() {
                println!("No templates found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Target System", "Document Type", "Mappings", "Updated"]);
            for template in &templates {
                let name = if template.is_default {
                    format!("{} (default)", template.name)
                } else {
                    template.name.clone()
                };
                table.add_row(vec![
                    template.id.clone(),
                    name,
                    template.target_system.clone(),
                    template.document_type.clone().unwrap_or_default(),
                    template.mappings.len().to_string(),
                    template.updated_at.format("%Y-%m-%d").to_string(),
                ]);
            }
            println!("{}", table);
        }
        TemplatesCommands::Show { id, json } => {
            let template = ctx
                .template_service
                .get(&id)?
                .with_context(|| format!("Template '{}' not found", id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&template)?);
                return Ok(());
            }

            println!("{} ({})", template.name.bold(), template.id);
            if !template.description.is_empty() {
                println!("{}", template.description.dimmed());
            }
            println!("Target system: {}", template.target_system);
            println!("{}", output::mappings_table(&template.mappings));
            for mapping in template.mappings.iter().filter(|m| !m.fallback_columns.is_empty()) {
                println!(
                    "  {} falls back to: {}",
                    mapping.source_column,
                    mapping.fallback_columns.join(", ").dimmed()
                );
            }
        }
        TemplatesCommands::Delete { id, force } => {
            let template = ctx
                .template_service
                .get(&id)?
                .with_context(|| format!("Template '{}' not found", id))?;

            if !force
                && !Confirm::new()
                    .with_prompt(format!("Delete template '{}'?", template.name))
                    .default(false)
                    .interact()?
            {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }

            ctx.template_service.delete(&id)?;
            output::success(&format!("Deleted template '{}'", template.name));
        }
        TemplatesCommands::Import { file, json } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            match ctx.template_service.import_json(&content)? {
                ImportedMappings::Template(template) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&template)?);
                    } else {
                        output::success(&format!("Imported template '{}' ({})", template.name, template.id));
                    }
                }
                ImportedMappings::Mappings(mappings) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&mappings)?);
                    } else {
                        output::info(&format!("File contains {} mappings (not a template):", mappings.len()));
                        println!("{}", output::mappings_table(&mappings));
                    }
                }
            }
        }
        TemplatesCommands::Export { id, output: path } => {
            let content = ctx.template_service.export_template(&id)?;
            match path {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    output::success(&format!("Exported template to {}", path.display()));
                }
                None => println!("{}", content),
            }
        }
        TemplatesCommands::Seed => {
            let added = ctx.template_service.seed_samples()?;
            if added == 0 {
                println!("Sample templates already present.");
            } else {
                output::success(&format!("Added {} sample templates", added));
            }
        }
    }

    Ok(())
}

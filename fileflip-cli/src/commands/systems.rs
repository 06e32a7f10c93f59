//! Systems command - show target systems and their fields

use anyhow::Result;
use colored::Colorize;

use fileflip_core::ports::TargetCatalog;

use super::get_context;
use crate::output;

pub fn run(id: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context(None)?;

    let Some(id) = id else {
        let systems = ctx.catalog.target_systems();
        if json {
            println!("{}", serde_json::to_string_pretty(&systems)?);
            return Ok(());
        }

        let mut table = output::create_table();
        table.set_header(vec!["ID", "Name", "Fields", "Document Types"]);
        for system in &systems {
            table.add_row(vec![
                system.id.clone(),
                system.name.clone(),
                system.fields.len().to_string(),
                system.document_types.join(", "),
            ]);
        }
        println!("{}", table);
        return Ok(());
    };

    let system = ctx.mapping_service.target_system(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&system)?);
        return Ok(());
    }

    println!("{} ({})", system.name.bold(), system.id);
    let mut table = output::create_table();
    table.set_header(vec!["Field", "Name", "Type", "Required", "Format", "Example"]);
    for field in &system.fields {
        table.add_row(vec![
            field.id.clone(),
            field.name.clone(),
            field.data_type.as_str().to_string(),
            if field.required { "yes".to_string() } else { String::new() },
            field.format.clone().unwrap_or_default(),
            field.example.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    Ok(())
}

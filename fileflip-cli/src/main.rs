//! FileFlip CLI - map statement columns onto accounting imports

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fileflip_core::LogEvent;

mod commands;
mod output;

use commands::{logs, preview, suggest, systems, templates};

/// FileFlip - map statement columns onto accounting system imports
#[derive(Parser)]
#[command(name = "ff", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest column mappings for a statement
    Suggest {
        /// CSV file whose header row provides the columns
        file: Option<PathBuf>,
        /// Target system id (defaults to app.defaultTargetSystem)
        #[arg(long, short)]
        system: Option<String>,
        /// Comma-separated column names (instead of a file)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Save the resulting mappings as a template with this name
        #[arg(long)]
        save_template: Option<String>,
        /// Write the mappings to a JSON file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview mapped and transformed values from a CSV file
    Preview {
        /// Path to CSV file
        file: PathBuf,
        /// Target system id (defaults to app.defaultTargetSystem)
        #[arg(long, short)]
        system: Option<String>,
        /// Apply this template instead of resolving one
        #[arg(long, short)]
        template: Option<String>,
        /// Number of sample rows to read
        #[arg(long, default_value = "5")]
        rows: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage mapping templates
    Templates {
        #[command(subcommand)]
        command: templates::TemplatesCommands,
    },

    /// Show target systems and their fields
    Systems {
        /// Target system id (lists all systems if not specified)
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            commands::log_event(
                &commands::get_logger(),
                LogEvent::failure("command_failed", message.clone()),
            );
            output::error(&message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Suggest { file, system, columns, save_template, export, json } => {
            suggest::run(suggest::SuggestArgs {
                file,
                system,
                columns,
                save_template,
                export,
                json,
            })
        }
        Commands::Preview { file, system, template, rows, json } => {
            preview::run(&file, system, template.as_deref(), rows, json)
        }
        Commands::Templates { command } => templates::run(command),
        Commands::Systems { id, json } => systems::run(id.as_deref(), json),
        Commands::Logs { command } => logs::run(command),
    }
}

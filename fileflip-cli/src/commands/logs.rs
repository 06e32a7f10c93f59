//! Logs command - inspect the event log

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_logger;
use crate::output;
use fileflip_core::services::LogEntry;
use fileflip_core::{LogQuery, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only failures
        #[arg(long)]
        errors: bool,
        /// Only this event (e.g. template_matched)
        #[arg(long)]
        event: Option<String>,
        /// Only events for this target system
        #[arg(long)]
        system: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old events
    Clear {
        /// Delete events older than N days
        #[arg(long, default_value = "30")]
        older_than_days: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Event counts and how often saved templates matched
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<std::sync::Arc<LoggingService>> {
    get_logger().context("Could not open the event log")
}

fn when(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn subject(entry: &LogEntry) -> String {
    let e = &entry.event;
    match (&e.target_system, &e.template_id, &e.command) {
        (Some(system), Some(template), _) => format!("{} / {}", system, template),
        (Some(system), None, _) => system.clone(),
        (None, Some(template), _) => template.clone(),
        (None, None, Some(command)) => format!("ff {}", command),
        (None, None, None) => String::new(),
    }
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = open_log()?;

    match command {
        LogsCommands::List { limit, errors, event, system, json } => {
            let mut query = LogQuery::latest(limit);
            query.errors_only = errors;
            query.event = event;
            query.target_system = system;
            let entries = log.entries(&query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("No events found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["When", "Event", "System / Template", "Mappings", "Error"]);
            for entry in &entries {
                let event = if entry.is_error() {
                    entry.event.name.red().to_string()
                } else {
                    entry.event.name.clone()
                };
                table.add_row(vec![
                    when(entry.timestamp),
                    event,
                    subject(entry),
                    entry.event.mapping_count.map(|c| c.to_string()).unwrap_or_default(),
                    entry.event.error_message.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
        LogsCommands::Clear { older_than_days, force } => {
            let confirmed = force
                || Confirm::new()
                    .with_prompt(format!("Delete events older than {} days?", older_than_days))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }

            let cutoff = Utc::now() - Duration::days(older_than_days);
            let deleted = log.delete_before(cutoff.timestamp_millis())?;
            output::success(&format!("Deleted {} events", deleted));
        }
        LogsCommands::Stats { json } => {
            let stats = log.stats()?;
            if json {
                let mut value = serde_json::to_value(&stats)?;
                value["template_match_rate"] = serde_json::json!(stats.template_match_rate());
                value["database_path"] = serde_json::json!(log.db_path());
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            println!("{}", "Event log".bold());
            println!("  Events: {} ({} failed)", stats.total, stats.errors);
            if let (Some(first), Some(last)) = (stats.first_timestamp, stats.last_timestamp) {
                println!("  Span:   {} to {}", when(first), when(last));
            }
            match stats.template_match_rate() {
                Some(rate) => println!("  Saved template used for {:.0}% of resolutions", rate),
                None => println!("  No resolutions logged yet"),
            }
            println!("  Database: {}", log.db_path().display().to_string().dimmed());

            if !stats.by_event.is_empty() {
                let mut table = output::create_table();
                table.set_header(vec!["Event", "Count"]);
                for count in &stats.by_event {
                    table.add_row(vec![count.event.clone(), count.count.to_string()]);
                }
                println!("{}", table);
            }
        }
    }

    Ok(())
}

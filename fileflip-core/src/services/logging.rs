//! Event log - a DuckDB record of what the resolver and the template library did
//!
//! Events are stored in `logs.duckdb` inside the FileFlip directory. Only
//! identifiers and counts are recorded (target system, template id, number of
//! mappings); column names, cell values and file paths never are.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::domain::MappingTemplate;
use crate::log_migrations::{BOOTSTRAP, LOG_MIGRATIONS};

/// Name of the log database inside the FileFlip directory
pub const LOG_DB_FILE: &str = "logs.duckdb";

/// Event names shared by the services and the stats query
pub mod events {
    /// A stored template qualified and its mappings were adapted
    pub const TEMPLATE_MATCHED: &str = "template_matched";
    /// No template qualified; mappings were suggested from field names
    pub const MAPPINGS_SUGGESTED: &str = "mappings_suggested";
}

/// Which front-end produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    /// Linked as a library by another application
    Embedded,
}

impl EntryPoint {
    fn name(self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Embedded => "embedded",
        }
    }
}

/// What happened, with the identifiers it concerns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(rename = "event")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// An event about one template: its id, target system and size
    pub fn for_template(name: impl Into<String>, template: &MappingTemplate) -> Self {
        Self::new(name)
            .with_template(template.id.clone())
            .with_target_system(template.target_system.clone())
            .with_mapping_count(template.mappings.len())
    }

    /// An event recording a failure
    pub fn failure(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(name)
        }
    }

    pub fn with_target_system(mut self, target_system: impl Into<String>) -> Self {
        self.target_system = Some(target_system.into());
        self
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_mapping_count(mut self, count: usize) -> Self {
        self.mapping_count = Some(i32::try_from(count).unwrap_or(i32::MAX));
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A stored event with the metadata the service adds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    /// Unix milliseconds
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    #[serde(flatten)]
    pub event: LogEvent,
}

impl LogEntry {
    pub fn is_error(&self) -> bool {
        self.event.error_message.is_some()
    }
}

const ENTRY_COLUMNS: &str = "id, timestamp, entry_point, app_version, platform, event, \
     target_system, template_id, command, mapping_count, error_message, error_details";

fn row_to_entry(row: &duckdb::Row<'_>) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        entry_point: row.get(2)?,
        app_version: row.get(3)?,
        platform: row.get(4)?,
        event: LogEvent {
            name: row.get(5)?,
            target_system: row.get(6)?,
            template_id: row.get(7)?,
            command: row.get(8)?,
            mapping_count: row.get(9)?,
            error_message: row.get(10)?,
            error_details: row.get(11)?,
        },
    })
}

/// Filter for reading entries back, newest first
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub limit: usize,
    pub errors_only: bool,
    pub event: Option<String>,
    pub target_system: Option<String>,
}

impl LogQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            limit,
            errors_only: false,
            event: None,
            target_system: None,
        }
    }

    pub fn errors(mut self) -> Self {
        self.errors_only = true;
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.event = Some(name.into());
        self
    }

    pub fn target_system(mut self, id: impl Into<String>) -> Self {
        self.target_system = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCount {
    pub event: String,
    pub count: i64,
}

/// Totals over the whole log
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogStats {
    pub total: i64,
    pub errors: i64,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    /// Most frequent first
    pub by_event: Vec<EventCount>,
}

impl LogStats {
    pub fn count_of(&self, event: &str) -> i64 {
        self.by_event
            .iter()
            .find(|c| c.event == event)
            .map_or(0, |c| c.count)
    }

    /// Share of resolutions answered by a stored template, in percent
    pub fn template_match_rate(&self) -> Option<f64> {
        let matched = self.count_of(events::TEMPLATE_MATCHED);
        let resolutions = matched + self.count_of(events::MAPPINGS_SUGGESTED);
        (resolutions > 0).then(|| matched as f64 * 100.0 / resolutions as f64)
    }
}

/// DuckDB-backed event log shared by the services
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in the FileFlip directory and migrate it
    pub fn new(fileflip_dir: &Path, entry_point: EntryPoint, app_version: impl Into<String>) -> Result<Self> {
        let db_path = fileflip_dir.join(LOG_DB_FILE);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open {}", db_path.display()))?;
        migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Record an event; time, entry point, version and platform are filled in
    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.connection()?.execute(
            "INSERT INTO sys_logs (timestamp, entry_point, app_version, platform, event, target_system, \
             template_id, command, mapping_count, error_message, error_details) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                Utc::now().timestamp_millis(),
                self.entry_point.name(),
                &self.app_version,
                std::env::consts::OS,
                &event.name,
                &event.target_system,
                &event.template_id,
                &event.command,
                &event.mapping_count,
                &event.error_message,
                &event.error_details,
            ],
        )?;
        Ok(())
    }

    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let failure = LogEvent::failure(event, message);
        self.log(match details {
            Some(details) => failure.with_details(details),
            None => failure,
        })
    }

    /// Entries matching the query, newest first
    pub fn entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();
        if query.errors_only {
            filters.push("error_message IS NOT NULL");
        }
        if let Some(event) = &query.event {
            filters.push("event = ?");
            args.push(event.clone());
        }
        if let Some(system) = &query.target_system {
            filters.push("target_system = ?");
            args.push(system.clone());
        }

        let mut sql = format!("SELECT {} FROM sys_logs", ENTRY_COLUMNS);
        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY timestamp DESC, id DESC LIMIT {}", query.limit));

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(duckdb::params_from_iter(args), row_to_entry)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.connection()?;
        let (total, errors, first_timestamp, last_timestamp): (i64, i64, Option<i64>, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), COUNT(error_message), MIN(timestamp), MAX(timestamp) FROM sys_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT event, COUNT(*) AS n FROM sys_logs GROUP BY event ORDER BY n DESC, event",
        )?;
        let by_event = stmt
            .query_map([], |row| {
                Ok(EventCount {
                    event: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(LogStats {
            total,
            errors,
            first_timestamp,
            last_timestamp,
            by_event,
        })
    }

    /// Delete entries older than the cutoff (unix ms); returns how many went
    pub fn delete_before(&self, cutoff_ms: i64) -> Result<usize> {
        let deleted = self
            .connection()?
            .execute("DELETE FROM sys_logs WHERE timestamp < ?", [cutoff_ms])?;
        Ok(deleted)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Apply the embedded migrations that haven't run yet
fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(BOOTSTRAP)?;

    let applied: Vec<String> = {
        let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<duckdb::Result<Vec<String>>>()?;
        names
    };

    for &(name, sql) in LOG_MIGRATIONS {
        if applied.iter().any(|a| a == name) {
            continue;
        }
        conn.execute_batch(sql)
            .with_context(|| format!("Log migration {} failed", name))?;
        conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn service(dir: &Path) -> LoggingService {
        LoggingService::new(dir, EntryPoint::Cli, "1.0.0").unwrap()
    }

    #[test]
    fn test_reopen_keeps_entries_and_migrations() {
        let dir = tempdir().unwrap();
        service(dir.path()).log(LogEvent::new("first")).unwrap();

        let reopened = service(dir.path());
        reopened.log(LogEvent::new("second")).unwrap();
        let entries = reopened.entries(&LogQuery::latest(10)).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].id > entries[1].id);

        let conn = reopened.connection().unwrap();
        let runs: i64 = conn
            .query_row("SELECT COUNT(*) FROM sys_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(runs as usize, LOG_MIGRATIONS.len());
    }

    #[test]
    fn test_entry_metadata_and_template_fields() {
        let dir = tempdir().unwrap();
        let log = LoggingService::new(dir.path(), EntryPoint::Embedded, "2.1.0").unwrap();
        let template = MappingTemplate::new("template_9", "Bank", "sage", Vec::new());
        log.log(LogEvent::for_template("template_saved", &template)).unwrap();

        let entry = log.entries(&LogQuery::latest(1)).unwrap().remove(0);
        assert_eq!(entry.entry_point, "embedded");
        assert_eq!(entry.app_version, "2.1.0");
        assert_eq!(entry.platform, std::env::consts::OS);
        assert_eq!(entry.event.name, "template_saved");
        assert_eq!(entry.event.template_id.as_deref(), Some("template_9"));
        assert_eq!(entry.event.target_system.as_deref(), Some("sage"));
        assert_eq!(entry.event.mapping_count, Some(0));
        assert!(!entry.is_error());
    }

    #[test]
    fn test_query_filters() {
        let dir = tempdir().unwrap();
        let log = service(dir.path());
        log.log(LogEvent::new(events::TEMPLATE_MATCHED).with_target_system("sage")).unwrap();
        log.log(LogEvent::new(events::MAPPINGS_SUGGESTED).with_target_system("quickbooks")).unwrap();
        log.log_error("template_import_failed", "Invalid import format", Some("line 1")).unwrap();

        let errors = log.entries(&LogQuery::latest(10).errors()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event.error_details.as_deref(), Some("line 1"));

        let sage = log.entries(&LogQuery::latest(10).target_system("sage")).unwrap();
        assert_eq!(sage.len(), 1);
        assert_eq!(sage[0].event.name, events::TEMPLATE_MATCHED);

        let none = log
            .entries(&LogQuery::latest(10).event(events::MAPPINGS_SUGGESTED).target_system("sage"))
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(log.entries(&LogQuery::latest(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_stats_and_match_rate() {
        let dir = tempdir().unwrap();
        let log = service(dir.path());
        assert_eq!(log.stats().unwrap().template_match_rate(), None);

        for _ in 0..3 {
            log.log(LogEvent::new(events::TEMPLATE_MATCHED)).unwrap();
        }
        log.log(LogEvent::new(events::MAPPINGS_SUGGESTED)).unwrap();
        log.log(LogEvent::failure("command_failed", "boom")).unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.by_event[0].event, events::TEMPLATE_MATCHED);
        assert_eq!(stats.count_of("command_failed"), 1);
        assert_eq!(stats.template_match_rate(), Some(75.0));
        assert!(stats.first_timestamp <= stats.last_timestamp);
    }

    #[test]
    fn test_delete_before() {
        let dir = tempdir().unwrap();
        let log = service(dir.path());
        log.log(LogEvent::new("a")).unwrap();
        log.log(LogEvent::new("b")).unwrap();

        assert_eq!(log.delete_before(0).unwrap(), 0);
        let future = Utc::now().timestamp_millis() + 60_000;
        assert_eq!(log.delete_before(future).unwrap(), 2);
        assert_eq!(log.stats().unwrap().total, 0);
    }
}

//! CLI command implementations

pub mod logs;
pub mod preview;
pub mod suggest;
pub mod systems;
pub mod templates;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use fileflip_core::{EntryPoint, FileFlipContext, LogEvent, LoggingService};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<Arc<LoggingService>> {
    let fileflip_dir = get_fileflip_dir().ok()?;
    std::fs::create_dir_all(&fileflip_dir).ok()?;
    LoggingService::new(&fileflip_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<Arc<LoggingService>>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the FileFlip directory from environment or default
pub fn get_fileflip_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FILEFLIP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".fileflip"))
}

/// Create the FileFlip context, sharing the given logger with its services
pub fn get_context(logger: Option<Arc<LoggingService>>) -> Result<FileFlipContext> {
    let fileflip_dir = get_fileflip_dir()?;
    FileFlipContext::new(&fileflip_dir, logger).context("Failed to initialize FileFlip context")
}

/// Pick the target system: explicit flag, then the configured default
pub fn resolve_system(ctx: &FileFlipContext, system: Option<String>) -> Result<String> {
    match system.or_else(|| ctx.default_target_system().map(str::to_string)) {
        Some(id) => Ok(id),
        None => anyhow::bail!(
            "No target system given. Use --system or set app.defaultTargetSystem in settings.json."
        ),
    }
}

//! Log database migrations, embedded at compile time

/// Creates the table that records applied migrations; safe to run every time
pub const BOOTSTRAP: &str = include_str!("000_migrations.sql");

/// Schema migrations as (name, sql), applied in order and recorded by name
///
/// New migrations get a `NNN_description.sql` file appended here.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial_schema.sql",
    include_str!("001_initial_schema.sql"),
)];

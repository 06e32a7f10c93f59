//! Service layer - business logic orchestration
//!
//! Services coordinate the resolver and port interactions. The resolver
//! itself is pure; the other services add storage and logging around it.

mod editor;
pub mod ids;
pub mod logging;
mod mapping;
pub mod preview;
pub mod resolver;
mod template;

pub use editor::{MappingDraft, MappingEditor};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use logging::{events, EntryPoint, LogEntry, LogEvent, LogQuery, LogStats, LoggingService};
pub use mapping::MappingService;
pub use preview::{Preview, PreviewRow, PreviewService};
pub use resolver::{ColumnMatch, Resolution, ScoredTemplate, TEMPLATE_ACCEPT_THRESHOLD};
pub use template::{ImportedMappings, MappingExport, TemplateDraft, TemplateService};

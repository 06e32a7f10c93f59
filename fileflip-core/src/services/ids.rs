//! Id generation for mappings, transformations, rules and templates

use uuid::Uuid;

/// Source of fresh entity ids
///
/// Ids have the form `<prefix>_<suffix>`, e.g. `mapping_4f3c...`.
pub trait IdGenerator {
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random v4 UUID ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }
}

/// Deterministic ids (`<prefix>_<namespace>_<n>`), for reproducible output
#[derive(Debug, Clone)]
pub struct SequentialIds {
    namespace: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}_{}", prefix, self.namespace, self.next);
        self.next += 1;
        id
    }
}

//! Target catalog port - static reference data about target systems

use crate::domain::TargetSystem;

/// Source of target system definitions (fields per system id)
pub trait TargetCatalog: Send + Sync {
    /// All known target systems
    fn target_systems(&self) -> Vec<TargetSystem>;

    /// Look up one target system by id
    fn target_system(&self, id: &str) -> Option<TargetSystem> {
        self.target_systems().into_iter().find(|s| s.id == id)
    }
}

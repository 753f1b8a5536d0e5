pub mod migration_service;
pub mod offline_service;
pub mod optimistic;
pub mod reading_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use migration_service::{MergeChoice, MergeOutcome, MergePhase, MigrationService};
pub use offline_service::OfflineContentService;
pub use reading_service::{ReadingService, ToggleOutcome};

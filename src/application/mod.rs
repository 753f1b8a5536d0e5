pub mod ports;
pub mod services;

pub use services::{MigrationService, OfflineContentService, ReadingService};

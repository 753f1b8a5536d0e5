pub mod memory_cache;
pub mod sqlite_content_cache;

pub use memory_cache::MemoryCache;
pub use sqlite_content_cache::SqliteContentCache;

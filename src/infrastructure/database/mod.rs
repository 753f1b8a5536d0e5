pub mod connection_pool;
pub mod guest_store;

pub use connection_pool::ConnectionPool;
pub use guest_store::SqliteGuestStore;

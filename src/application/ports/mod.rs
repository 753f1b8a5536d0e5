pub mod connectivity;
pub mod content_cache;
pub mod content_source;
pub mod identity;
pub mod local_store;
pub mod remote_store;

pub use connectivity::ConnectivityProbe;
pub use content_cache::ContentCache;
pub use content_source::ContentSource;
pub use identity::{Identity, IdentityProvider};
pub use local_store::{ClearScope, LocalRecordStore};
pub use remote_store::{LastReadReplaced, RemoteRecordStore};

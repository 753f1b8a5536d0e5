pub mod account_id;
pub mod bookmark_id;
pub mod bookmark_kind;
pub mod content_kind;
pub mod last_read_kind;
pub mod ref_id;

pub use account_id::AccountId;
pub use bookmark_id::BookmarkId;
pub use bookmark_kind::BookmarkKind;
pub use content_kind::{ContentKind, OfflineTarget};
pub use last_read_kind::LastReadKind;
pub use ref_id::RefId;

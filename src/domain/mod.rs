pub mod entities;
pub mod value_objects;

pub use entities::{Bookmark, BookmarkDraft, LastRead, LastReadDraft};
pub use value_objects::{AccountId, BookmarkId, BookmarkKind, LastReadKind, RefId};

pub mod bookmark;
pub mod content;
pub mod download;
pub mod last_read;

pub use bookmark::{Bookmark, BookmarkDraft};
pub use content::{
    Ayah, CollectionPayload, Dua, DuaCategory, ItemPayload, Surah, SurahSummary,
};
pub use download::{DownloadProgress, DownloadStatus, OfflineStatus};
pub use last_read::{LastRead, LastReadDraft, ReadingPosition};

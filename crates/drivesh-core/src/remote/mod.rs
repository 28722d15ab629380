//! Boundary with the remote storage service.
//!
//! [`DriveApi`] is the narrow interface the rest of the core needs from a
//! cloud drive: paginated child listings, streamed file bytes, folder and
//! file creation, trashing, and metadata lookups. [`gdrive::GoogleDrive`]
//! talks to Google Drive v3; [`memory::MemoryDrive`] keeps everything in
//! process and backs the tests.
//!
//! [`index::DirectoryIndex`] turns the page-oriented listing call into a
//! lazy iterator of [`RemoteItem`]s.

pub mod gdrive;
pub mod index;
pub mod memory;
pub mod query;

use std::io::Read;

pub use index::{Children, DirectoryIndex};

/// Well-known id of the drive root folder.
pub const ROOT_ID: &str = "root";

/// Errors raised by a [`DriveApi`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("remote error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("not authorized; log in again")]
    Unauthorized,

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("no such remote item: {0}")]
    NotFound(String),

    #[error("transfer failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Whether a remote item is a folder or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    File,
}

/// An immutable snapshot of one remote item.
///
/// Identity is the `id`; names are not unique within a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub parents: Vec<String>,
    pub trashed: bool,
}

impl RemoteItem {
    /// Returns `true` if this item is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }
}

/// Filter applied to a child listing.
///
/// `name_equals` holds the raw item name; backends are responsible for
/// escaping it for their query language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildQuery {
    pub name_equals: Option<String>,
    pub folders_only: bool,
}

impl ChildQuery {
    /// All non-trashed children.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only child folders.
    pub fn folders() -> Self {
        Self {
            name_equals: None,
            folders_only: true,
        }
    }

    /// Children named exactly `name`, optionally restricted to folders.
    pub fn named(name: &str, folders_only: bool) -> Self {
        Self {
            name_equals: Some(name.to_string()),
            folders_only,
        }
    }
}

/// One page of a child listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<RemoteItem>,
    pub next_page_token: Option<String>,
}

/// The signed-in account, shown when the shell starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub display_name: String,
    pub email: String,
}

/// Operations the core needs from a remote drive.
///
/// All calls block. Implementations perform exactly one attempt per call;
/// retry policy belongs to the caller.
pub trait DriveApi {
    /// Lists one page of non-trashed children of `parent_id`, ordered
    /// folders first, then by name.
    fn list_children(
        &self,
        parent_id: &str,
        query: &ChildQuery,
        page_size: usize,
        page_token: Option<&str>,
    ) -> RemoteResult<Page>;

    /// Opens a byte stream over a file's content.
    fn open_file(&self, file_id: &str) -> RemoteResult<Box<dyn Read>>;

    /// Creates a folder, under the drive root when `parent_id` is `None`.
    fn create_folder(&self, name: &str, parent_id: Option<&str>) -> RemoteResult<RemoteItem>;

    /// Creates a new file object from a stream of `len` bytes.
    ///
    /// Never deduplicates: an existing file with the same name is left alone
    /// and a second object is created.
    fn create_file(
        &self,
        name: &str,
        parent_id: Option<&str>,
        content: Box<dyn Read + Send>,
        len: u64,
    ) -> RemoteResult<RemoteItem>;

    /// Marks an item as trashed and returns its updated metadata.
    fn trash(&self, file_id: &str) -> RemoteResult<RemoteItem>;

    /// Fetches an item's metadata.
    fn metadata(&self, file_id: &str) -> RemoteResult<RemoteItem>;

    /// Describes the signed-in account.
    fn account(&self) -> RemoteResult<Account>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_query_keeps_raw_name() {
        let query = ChildQuery::named("O'Brien", true);
        assert_eq!(query.name_equals.as_deref(), Some("O'Brien"));
        assert!(query.folders_only);
    }

    #[test]
    fn all_query_has_no_filters() {
        let query = ChildQuery::all();
        assert!(query.name_equals.is_none());
        assert!(!query.folders_only);
        assert_eq!(query, ChildQuery::default());
    }

    #[test]
    fn folder_kind_detection() {
        let item = RemoteItem {
            id: "1".to_string(),
            name: "docs".to_string(),
            kind: ItemKind::Folder,
            parents: vec![ROOT_ID.to_string()],
            trashed: false,
        };
        assert!(item.is_folder());
        let file = RemoteItem {
            kind: ItemKind::File,
            ..item
        };
        assert!(!file.is_folder());
    }

    #[test]
    fn status_error_display() {
        let err = RemoteError::Status {
            status: 404,
            message: "File not found".to_string(),
        };
        assert_eq!(err.to_string(), "remote error (404): File not found");
    }
}

//! Lazy, paginated view over a folder's children.

use std::collections::VecDeque;

use crate::remote::{ChildQuery, DriveApi, RemoteItem, RemoteResult};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Query layer over [`DriveApi::list_children`].
///
/// Cheap to construct; holds only a borrow of the drive and the page size.
pub struct DirectoryIndex<'a, D: DriveApi + ?Sized> {
    drive: &'a D,
    page_size: usize,
}

impl<D: DriveApi + ?Sized> Clone for DirectoryIndex<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: DriveApi + ?Sized> Copy for DirectoryIndex<'_, D> {}

impl<'a, D: DriveApi + ?Sized> DirectoryIndex<'a, D> {
    pub fn new(drive: &'a D, page_size: usize) -> Self {
        Self {
            drive,
            page_size: page_size.max(1),
        }
    }

    /// Returns the underlying drive.
    pub fn drive(&self) -> &'a D {
        self.drive
    }

    /// Lazily iterates the children of `folder_id` matching `query`.
    ///
    /// No request is made until the iterator is first polled; each further
    /// page is fetched only after the previous one has been consumed.
    pub fn children(&self, folder_id: &str, query: ChildQuery) -> Children<'a, D> {
        Children {
            drive: self.drive,
            folder_id: folder_id.to_string(),
            query,
            page_size: self.page_size,
            buffer: VecDeque::new(),
            next_token: None,
            started: false,
            done: false,
        }
    }

    /// Returns the first child of `folder_id` named exactly `name`, if any.
    ///
    /// Stops at the first match; a further page is fetched only while the
    /// pages seen so far yielded nothing.
    pub fn find(
        &self,
        folder_id: &str,
        name: &str,
        folders_only: bool,
    ) -> RemoteResult<Option<RemoteItem>> {
        tracing::debug!(folder_id, name, folders_only, "looking up child");
        self.children(folder_id, ChildQuery::named(name, folders_only))
            .next()
            .transpose()
    }
}

/// Iterator returned by [`DirectoryIndex::children`].
///
/// Yields `Err` at most once; the sequence ends after an error.
pub struct Children<'a, D: DriveApi + ?Sized> {
    drive: &'a D,
    folder_id: String,
    query: ChildQuery,
    page_size: usize,
    buffer: VecDeque<RemoteItem>,
    next_token: Option<String>,
    started: bool,
    done: bool,
}

impl<D: DriveApi + ?Sized> Children<'_, D> {
    fn fetch_page(&mut self) -> RemoteResult<()> {
        let token = self.next_token.take();
        tracing::debug!(
            folder_id = %self.folder_id,
            page_token = ?token,
            "fetching children page"
        );
        let page = self.drive.list_children(
            &self.folder_id,
            &self.query,
            self.page_size,
            token.as_deref(),
        )?;
        self.started = true;
        self.buffer.extend(page.items);
        self.next_token = page.next_page_token.filter(|t| !t.is_empty());
        Ok(())
    }
}

impl<D: DriveApi + ?Sized> Iterator for Children<'_, D> {
    type Item = RemoteResult<RemoteItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done || (self.started && self.next_token.is_none()) {
                self.done = true;
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

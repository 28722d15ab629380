//! In-process drive used by tests and offline experiments.
//!
//! [`MemoryDrive`] mirrors the listing semantics of the real service
//! (folders first, then by name, trashed items hidden, token pagination)
//! and records every listing request so callers can assert how many
//! lookups an operation needed and which query text it would have sent.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::remote::query::children_query;
use crate::remote::{
    Account, ChildQuery, DriveApi, ItemKind, Page, RemoteError, RemoteItem, RemoteResult, ROOT_ID,
};

/// A listing request as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub parent_id: String,
    pub query: ChildQuery,
    /// The query text a Drive backend would send for this request.
    pub rendered: String,
    pub page_token: Option<String>,
}

#[derive(Debug)]
struct Stored {
    item: RemoteItem,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    items: BTreeMap<String, Stored>,
    next_id: u64,
    requests: Vec<ListRequest>,
}

impl State {
    fn insert(
        &mut self,
        parent_id: &str,
        name: &str,
        kind: ItemKind,
        content: Vec<u8>,
    ) -> RemoteItem {
        self.next_id += 1;
        let item = RemoteItem {
            id: format!("id{}", self.next_id),
            name: name.to_string(),
            kind,
            parents: vec![parent_id.to_string()],
            trashed: false,
        };
        self.items.insert(
            item.id.clone(),
            Stored {
                item: item.clone(),
                content,
            },
        );
        item
    }

    fn is_folder(&self, id: &str) -> bool {
        id == ROOT_ID
            || self
                .items
                .get(id)
                .is_some_and(|s| s.item.is_folder() && !s.item.trashed)
    }
}

/// A drive held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDrive {
    state: RefCell<State>,
}

impl MemoryDrive {
    /// Creates an empty drive containing only the root folder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a folder under `parent_id`, ignoring name collisions.
    pub fn add_folder(&self, parent_id: &str, name: &str) -> RemoteItem {
        self.state
            .borrow_mut()
            .insert(parent_id, name, ItemKind::Folder, Vec::new())
    }

    /// Adds a file with `content` under `parent_id`.
    pub fn add_file(&self, parent_id: &str, name: &str, content: &[u8]) -> RemoteItem {
        self.state
            .borrow_mut()
            .insert(parent_id, name, ItemKind::File, content.to_vec())
    }

    /// Returns the stored bytes of a file.
    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        self.state.borrow().items.get(id).map(|s| s.content.clone())
    }

    /// Returns every non-trashed item directly under `parent_id`, in
    /// insertion order.
    pub fn children_of(&self, parent_id: &str) -> Vec<RemoteItem> {
        let state = self.state.borrow();
        let mut items: Vec<RemoteItem> = state
            .items
            .values()
            .filter(|s| !s.item.trashed && s.item.parents.iter().any(|p| p == parent_id))
            .map(|s| s.item.clone())
            .collect();
        items.sort_by_key(|i| id_number(&i.id));
        items
    }

    /// Number of listing requests served so far.
    pub fn list_calls(&self) -> usize {
        self.state.borrow().requests.len()
    }

    /// Every listing request served so far.
    pub fn list_requests(&self) -> Vec<ListRequest> {
        self.state.borrow().requests.clone()
    }

    /// Forgets recorded listing requests.
    pub fn reset_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }
}

fn id_number(id: &str) -> u64 {
    id.trim_start_matches("id").parse().unwrap_or(0)
}

impl DriveApi for MemoryDrive {
    fn list_children(
        &self,
        parent_id: &str,
        query: &ChildQuery,
        page_size: usize,
        page_token: Option<&str>,
    ) -> RemoteResult<Page> {
        let mut state = self.state.borrow_mut();
        state.requests.push(ListRequest {
            parent_id: parent_id.to_string(),
            query: query.clone(),
            rendered: children_query(parent_id, query),
            page_token: page_token.map(str::to_string),
        });
        if !state.is_folder(parent_id) {
            return Err(RemoteError::NotFound(parent_id.to_string()));
        }

        let mut matches: Vec<&RemoteItem> = state
            .items
            .values()
            .map(|s| &s.item)
            .filter(|i| !i.trashed && i.parents.iter().any(|p| p == parent_id))
            .filter(|i| !query.folders_only || i.is_folder())
            .filter(|i| query.name_equals.as_ref().map_or(true, |n| *n == i.name))
            .collect();
        matches.sort_by(|a, b| {
            b.is_folder()
                .cmp(&a.is_folder())
                .then_with(|| a.name.cmp(&b.name))
        });

        let offset = match page_token {
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| RemoteError::Decode(format!("bad page token {t}")))?,
            None => 0,
        };
        let end = (offset + page_size.max(1)).min(matches.len());
        let items = matches
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|i| (*i).clone())
            .collect();
        let next_page_token = (end < matches.len()).then(|| end.to_string());
        Ok(Page {
            items,
            next_page_token,
        })
    }

    fn open_file(&self, file_id: &str) -> RemoteResult<Box<dyn Read>> {
        let state = self.state.borrow();
        let stored = state
            .items
            .get(file_id)
            .ok_or_else(|| RemoteError::NotFound(file_id.to_string()))?;
        if stored.item.is_folder() {
            return Err(RemoteError::Status {
                status: 403,
                message: "folders have no content".to_string(),
            });
        }
        Ok(Box::new(Cursor::new(stored.content.clone())))
    }

    fn create_folder(&self, name: &str, parent_id: Option<&str>) -> RemoteResult<RemoteItem> {
        let parent = parent_id.unwrap_or(ROOT_ID);
        let mut state = self.state.borrow_mut();
        if !state.is_folder(parent) {
            return Err(RemoteError::NotFound(parent.to_string()));
        }
        Ok(state.insert(parent, name, ItemKind::Folder, Vec::new()))
    }

    fn create_file(
        &self,
        name: &str,
        parent_id: Option<&str>,
        mut content: Box<dyn Read + Send>,
        len: u64,
    ) -> RemoteResult<RemoteItem> {
        let parent = parent_id.unwrap_or(ROOT_ID);
        let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
        content.read_to_end(&mut bytes)?;
        let mut state = self.state.borrow_mut();
        if !state.is_folder(parent) {
            return Err(RemoteError::NotFound(parent.to_string()));
        }
        Ok(state.insert(parent, name, ItemKind::File, bytes))
    }

    fn trash(&self, file_id: &str) -> RemoteResult<RemoteItem> {
        let mut state = self.state.borrow_mut();
        let stored = state
            .items
            .get_mut(file_id)
            .ok_or_else(|| RemoteError::NotFound(file_id.to_string()))?;
        stored.item.trashed = true;
        Ok(stored.item.clone())
    }

    fn metadata(&self, file_id: &str) -> RemoteResult<RemoteItem> {
        if file_id == ROOT_ID {
            return Ok(RemoteItem {
                id: ROOT_ID.to_string(),
                name: "My Drive".to_string(),
                kind: ItemKind::Folder,
                parents: Vec::new(),
                trashed: false,
            });
        }
        self.state
            .borrow()
            .items
            .get(file_id)
            .map(|s| s.item.clone())
            .ok_or_else(|| RemoteError::NotFound(file_id.to_string()))
    }

    fn account(&self) -> RemoteResult<Account> {
        Ok(Account {
            display_name: "Local User".to_string(),
            email: "local@localhost".to_string(),
        })
    }
}

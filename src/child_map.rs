//! A folder's child-name-to-child-folder mapping.
//!
//! Out of scope per the design this crate follows (an external hash map
//! collaborator), kept here as a thin wrapper so the crate compiles
//! standalone. It is intentionally **not** internally synchronized:
//! every caller reaches it only after acquiring reader or writer rights
//! on the owning folder's monitor, so a second lock here would just be
//! redundant overhead on top of the real synchronization.

use crate::folder::Folder;
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct ChildMap {
    inner: HashMap<String, Folder>,
}

impl ChildMap {
    pub(crate) fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Folder> {
        self.inner.get(name)
    }

    pub(crate) fn insert(&mut self, name: String, folder: Folder) {
        self.inner.insert(name, folder);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Folder> {
        self.inner.remove(name)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Comma-joined snapshot of the direct child names. Order matches
    /// map iteration order, which is unspecified.
    pub(crate) fn snapshot(&self) -> String {
        self.inner.keys().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}

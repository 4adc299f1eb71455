//! Descend-and-lock traversal, and its release dual.
//!
//! All locks for one operation are acquired in a single top-down pass —
//! root first, descending by path — which is what makes the whole
//! protocol deadlock-free: no operation ever holds a lock on a deeper
//! folder while waiting on a shallower one.

use crate::error::TreeError;
use crate::folder::Folder;
use crate::path;
use crate::tree::Tree;

enum Role {
    Reader,
    Writer,
}

/// One folder visited during a descent, and the role (reader/writer)
/// the caller is holding on it. Kept as a raw pointer rather than a
/// borrow: the folder it points to is owned by an ancestor's child map
/// that is itself locked for the lifetime of this `Visited`, so the
/// pointee cannot be freed or relocated out from under it (see
/// `folder.rs`'s `Sync` justification).
pub(crate) struct Visited {
    folder: *const Folder,
    role: Role,
}

impl Visited {
    /// # Safety
    /// Valid for as long as this `Visited` has not yet been consumed by
    /// `release`.
    pub(crate) fn folder(&self) -> &Folder {
        unsafe { &*self.folder }
    }
}

pub(crate) enum DescendOutcome {
    /// Reached `target_path` in full: every entry but the last is a
    /// reader, the last is a writer on `target_path` itself.
    Ok(Vec<Visited>),
    /// A path component did not exist. Every entry locked so far is a
    /// reader — the final writer-lock was never attempted.
    NotFound(Vec<Visited>),
}

/// Walk root -> ... -> `target_path`, acquiring reader rights on every
/// intermediate folder and writer rights on the final one.
pub(crate) fn descend_and_lock(tree: &Tree, target_path: &str) -> DescendOutcome {
    let mut visited = Vec::new();
    let root_ptr: *const Folder = tree.root();

    if target_path == "/" {
        let root = unsafe { &*root_ptr };
        root.monitor().writer_enter();
        visited.push(Visited {
            folder: root_ptr,
            role: Role::Writer,
        });
        return DescendOutcome::Ok(visited);
    }

    let root = unsafe { &*root_ptr };
    root.monitor().reader_enter();
    visited.push(Visited {
        folder: root_ptr,
        role: Role::Reader,
    });

    let components: Vec<&str> = path::components(target_path).collect();
    let mut current_ptr = root_ptr;

    for (idx, name) in components.iter().enumerate() {
        let current = unsafe { &*current_ptr };
        // Safety: `current` is the most recently visited folder, on
        // which we are still holding reader (or, if it's the root on a
        // single-component path, about-to-be-writer) rights.
        let child = match unsafe { current.children() }.get(name) {
            Some(child) => child,
            None => return DescendOutcome::NotFound(visited),
        };
        let child_ptr: *const Folder = child;
        let is_last = idx + 1 == components.len();
        if is_last {
            child.monitor().writer_enter();
            visited.push(Visited {
                folder: child_ptr,
                role: Role::Writer,
            });
        } else {
            child.monitor().reader_enter();
            visited.push(Visited {
                folder: child_ptr,
                role: Role::Reader,
            });
        }
        current_ptr = child_ptr;
    }

    DescendOutcome::Ok(visited)
}

/// Release every folder visited during one `descend_and_lock` call, in
/// reverse acquisition order. `success` must be the outcome of that
/// same `descend_and_lock` call (`Ok` vs `NotFound`), not of whatever
/// validation the operations layer ran afterward — the last folder was
/// only ever escalated to a writer on the `Ok` path.
pub(crate) fn release(visited: &[Visited], success: bool) {
    if success {
        let Some((last, ancestors)) = visited.split_last() else {
            return;
        };
        last.folder().monitor().writer_exit();
        for v in ancestors.iter().rev() {
            v.folder().monitor().reader_exit();
        }
    } else {
        for v in visited.iter().rev() {
            match v.role {
                Role::Reader => v.folder().monitor().reader_exit(),
                Role::Writer => v.folder().monitor().writer_exit(),
            }
        }
    }
}

/// Run `body` and unconditionally release `visited` (with the writer
/// held on its last entry) afterward, regardless of which branch of
/// `body` returned.
pub(crate) fn guarded<T>(
    visited: &[Visited],
    body: impl FnOnce() -> Result<T, TreeError>,
) -> Result<T, TreeError> {
    let result = body();
    release(visited, true);
    result
}

/// Walk `path` from `root` via plain child-map lookups, with no locking
/// of our own. Safe only when called on a subtree whose root (or an
/// ancestor of it) is already writer-locked by the caller — see
/// `Tree::move_`, the only caller, for the argument.
pub(crate) fn descend_plain<'a>(root: &'a Folder, path: &str) -> Option<&'a Folder> {
    let mut current = root;
    for name in path::components(path) {
        // Safety: see function doc comment.
        current = unsafe { current.children() }.get(name)?;
    }
    Some(current)
}

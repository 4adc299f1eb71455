use crate::child_map::ChildMap;
use crate::error::{Result, TreeError};
use crate::folder::Folder;
use crate::path;
use crate::traversal::{self, DescendOutcome};

/// A concurrent in-memory hierarchical namespace.
///
/// `Tree` owns a synthetic top-level folder whose single child, keyed
/// `"/"`, is the real root. That indirection lets every path —
/// including `"/"` itself — go through the same descend-and-lock
/// traversal, with no special-cased root branch in `traversal.rs`. The
/// synthetic top-level's own monitor is never touched: its child map
/// never changes after construction, so no synchronization is needed
/// to read it.
pub struct Tree {
    top: Folder,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        let mut top_children = ChildMap::new();
        top_children.insert("/".to_string(), Folder::new_empty());
        Self {
            top: Folder::new_with_children(top_children),
        }
    }

    pub(crate) fn root(&self) -> *const Folder {
        // Safety: the synthetic top-level's children map is written once,
        // here, and never again — no monitor is needed to read it.
        unsafe { self.top.children() }
            .get("/")
            .expect("tree always has a root")
    }

    /// `list(path) -> String | NotFound | Invalid`.
    ///
    /// Operating point is the folder named by `path` itself: a writer
    /// lock there, not just a reader, so the snapshot can't race a
    /// concurrent create/remove of one of its direct children.
    pub fn list(&self, path: &str) -> Result<String> {
        log::trace!("list({path:?})");
        let visited = match traversal::descend_and_lock(self, path) {
            DescendOutcome::NotFound(v) => {
                traversal::release(&v, false);
                log::debug!("list({path:?}) -> NotFound");
                return Err(TreeError::NotFound);
            }
            DescendOutcome::Ok(v) => v,
        };

        if !path::is_valid(path) {
            traversal::release(&visited, true);
            log::debug!("list({path:?}) -> Invalid");
            return Err(TreeError::Invalid);
        }

        traversal::guarded(&visited, || {
            let operating_point = visited.last().expect("descend_and_lock always visits the root");
            // Safety: we hold writer rights on `operating_point` right now.
            let snapshot = unsafe { operating_point.folder().children() }.snapshot();
            log::debug!("list({path:?}) -> {snapshot:?}");
            Ok(snapshot)
        })
    }

    /// `create(path) -> () | NotFound | Invalid | Exists`.
    pub fn create(&self, path: &str) -> Result<()> {
        log::trace!("create({path:?})");
        if path == "/" {
            return Err(TreeError::Exists);
        }
        let Some((parent_path, leaf)) = path::split_last_component(path) else {
            return Err(TreeError::Invalid);
        };

        let visited = match traversal::descend_and_lock(self, &parent_path) {
            DescendOutcome::NotFound(v) => {
                traversal::release(&v, false);
                return Err(TreeError::NotFound);
            }
            DescendOutcome::Ok(v) => v,
        };

        if !path::is_valid(path) {
            traversal::release(&visited, true);
            return Err(TreeError::Invalid);
        }

        traversal::guarded(&visited, || {
            let parent = visited.last().expect("descend_and_lock always visits the root").folder();
            // Safety: we hold writer rights on `parent` right now.
            let children = unsafe { parent.children_mut() };
            if children.get(&leaf).is_some() {
                return Err(TreeError::Exists);
            }
            children.insert(leaf, Folder::new_empty());
            Ok(())
        })
    }

    /// `remove(path) -> () | NotFound | Invalid | Busy | NotEmpty`.
    pub fn remove(&self, path: &str) -> Result<()> {
        log::trace!("remove({path:?})");
        if path == "/" {
            return Err(TreeError::Busy);
        }
        let Some((parent_path, leaf)) = path::split_last_component(path) else {
            return Err(TreeError::Invalid);
        };

        let visited = match traversal::descend_and_lock(self, &parent_path) {
            DescendOutcome::NotFound(v) => {
                traversal::release(&v, false);
                return Err(TreeError::NotFound);
            }
            DescendOutcome::Ok(v) => v,
        };

        if !path::is_valid(path) {
            traversal::release(&visited, true);
            return Err(TreeError::Invalid);
        }

        traversal::guarded(&visited, || {
            let parent = visited.last().expect("descend_and_lock always visits the root").folder();
            // Safety: we hold writer rights on `parent` right now.
            let children = unsafe { parent.children_mut() };
            let Some(target) = children.get(&leaf) else {
                return Err(TreeError::NotFound);
            };
            // Safety: reachable only through `parent`'s map, which we hold
            // as writer — no other thread can be descending into `target`
            // (that would require a reader lock on `parent` first) or have
            // one in flight, so reading its child count needs no lock of
            // its own.
            if !unsafe { target.children() }.is_empty() {
                return Err(TreeError::NotEmpty);
            }
            children.remove(&leaf);
            Ok(())
        })
    }

    /// `move(source, target) -> () | NotFound | Invalid | Busy | Exists | SourceAncestorOfTarget`.
    ///
    /// Operating point is the latest common ancestor of `source` and
    /// `target`: both the detach and the attach happen within that
    /// single writer-locked subtree, so they appear atomic to any other
    /// operation.
    pub fn move_(&self, source: &str, target: &str) -> Result<()> {
        log::trace!("move({source:?}, {target:?})");
        if source == "/" {
            return Err(TreeError::Busy);
        }
        if target == "/" {
            return Err(TreeError::Exists);
        }

        let lca = path::latest_common_ancestor(source, target);
        let visited = match traversal::descend_and_lock(self, &lca) {
            DescendOutcome::NotFound(v) => {
                traversal::release(&v, false);
                return Err(TreeError::NotFound);
            }
            DescendOutcome::Ok(v) => v,
        };

        if !path::is_valid(source) || !path::is_valid(target) {
            traversal::release(&visited, true);
            return Err(TreeError::Invalid);
        }

        traversal::guarded(&visited, || {
            // Safety: every folder reached from here on is inside the
            // subtree rooted at `lca`, which we hold as writer (or is an
            // ancestor of `lca` that the descent already read-locked) —
            // see `traversal::descend_plain`'s doc comment.
            let root = unsafe { &*self.root() };

            let (source_parent_path, source_leaf) =
                path::split_last_component(source).ok_or(TreeError::Invalid)?;
            let source_parent =
                traversal::descend_plain(root, &source_parent_path).ok_or(TreeError::NotFound)?;
            if unsafe { source_parent.children() }.get(&source_leaf).is_none() {
                return Err(TreeError::NotFound);
            }

            let (target_parent_path, target_leaf) =
                path::split_last_component(target).ok_or(TreeError::Invalid)?;
            let target_parent =
                traversal::descend_plain(root, &target_parent_path).ok_or(TreeError::NotFound)?;
            if unsafe { target_parent.children() }.get(&target_leaf).is_some() {
                return Err(TreeError::Exists);
            }

            if path::is_ancestor(source, target) {
                return Err(TreeError::SourceAncestorOfTarget);
            }

            let moved = unsafe { source_parent.children_mut() }
                .remove(&source_leaf)
                .expect("existence just checked above, and we hold the writer lock throughout");
            unsafe { target_parent.children_mut() }.insert(target_leaf, moved);
            Ok(())
        })
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

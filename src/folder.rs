use crate::child_map::ChildMap;
use crate::monitor::Monitor;
use std::cell::UnsafeCell;

/// One node of the namespace tree: a monitor gating access, and the
/// child map it gates. Exclusively owned by its parent's child map (or,
/// for the real root, by the synthetic top-level inside `Tree`) — no
/// `Arc`, no weak references, the tree owns its shape outright.
pub(crate) struct Folder {
    monitor: Monitor,
    children: UnsafeCell<ChildMap>,
}

// Safety: `children` is never touched except by a thread that has gone
// through `monitor`'s reader/writer admission protocol first (see
// `traversal::descend_and_lock` and the plain-lookup helpers in
// `tree.rs`, which only run inside a subtree whose root is already
// writer-locked). That discipline is exactly what a `Sync` bound would
// otherwise ask the compiler to enforce structurally.
unsafe impl Sync for Folder {}

impl Folder {
    pub(crate) fn new_empty() -> Self {
        Self::new_with_children(ChildMap::new())
    }

    pub(crate) fn new_with_children(children: ChildMap) -> Self {
        Self {
            monitor: Monitor::new(),
            children: UnsafeCell::new(children),
        }
    }

    pub(crate) fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// # Safety
    /// Caller must hold reader or writer rights on this folder's monitor.
    pub(crate) unsafe fn children(&self) -> &ChildMap {
        unsafe { &*self.children.get() }
    }

    /// # Safety
    /// Caller must hold writer rights on this folder's monitor.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn children_mut(&self) -> &mut ChildMap {
        unsafe { &mut *self.children.get() }
    }
}

//! A concurrent in-memory hierarchical namespace: every folder gates its
//! children with its own reader/writer monitor, and operations acquire
//! locks top-down along the path they traverse so the whole tree stays
//! deadlock-free under arbitrary concurrent access.

mod child_map;
mod error;
mod folder;
mod monitor;
mod path;
mod traversal;
mod tree;

pub use error::{Result, TreeError};
pub use tree::Tree;

#[cfg(all(feature = "mimalloc", not(feature = "no-mimalloc")))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

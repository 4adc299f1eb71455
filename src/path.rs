//! Path parsing and validation.
//!
//! Out of scope per the design this crate follows — a real deployment
//! would pull these from a shared path-utilities collaborator — but a
//! standalone crate needs *something* here, so this is a minimal,
//! dependency-light stand-in: canonical paths are `/c1/c2/.../ck/`,
//! components drawn from lowercase ASCII letters, 1-255 chars each.

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_FOLDER_NAME_LENGTH: usize = 255;

static COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^[a-z]{{1,{MAX_FOLDER_NAME_LENGTH}}}$")).expect("static pattern is valid")
});

/// Whether `path` is canonical: `"/"`, or `/c1/.../ck/` with every
/// component matching the restricted alphabet.
#[must_use]
pub fn is_valid(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if !path.starts_with('/') || !path.ends_with('/') {
        return false;
    }
    let inner = &path[1..path.len() - 1];
    if inner.is_empty() {
        return false;
    }
    inner.split('/').all(|c| COMPONENT_RE.is_match(c))
}

/// Iterate a path's components, tolerating a missing leading/trailing
/// slash so callers can walk a not-yet-validated path without panicking.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').filter(|c| !c.is_empty())
}

/// Split `path` into `(parent_path, leaf_name)`. Returns `None` for
/// `"/"` (no parent) and for a path with no parseable leaf component.
#[must_use]
pub fn split_last_component(path: &str) -> Option<(String, String)> {
    if path == "/" {
        return None;
    }
    let comps: Vec<&str> = components(path).collect();
    let leaf = (*comps.last()?).to_string();
    let mut parent = String::from("/");
    for c in &comps[..comps.len() - 1] {
        parent.push_str(c);
        parent.push('/');
    }
    Some((parent, leaf))
}

/// The longest path that is a prefix of both `a` and `b`, aligned on
/// component boundaries. Always at least `"/"`.
#[must_use]
pub fn latest_common_ancestor(a: &str, b: &str) -> String {
    let mut common = String::from("/");
    for (x, y) in components(a).zip(components(b)) {
        if x != y {
            break;
        }
        common.push_str(x);
        common.push('/');
    }
    common
}

/// Whether `maybe_ancestor` is a strict or non-strict prefix of `path`
/// on component boundaries. Both arguments must already be canonical
/// (trailing slash included), which is what makes a plain `starts_with`
/// safe here: the ancestor's own trailing `/` can only line up with a
/// component boundary in `path`.
#[must_use]
pub fn is_ancestor(maybe_ancestor: &str, path: &str) -> bool {
    path.starts_with(maybe_ancestor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_valid() {
        assert!(is_valid("/"));
    }

    #[test]
    fn rejects_missing_slashes_and_bad_chars() {
        assert!(!is_valid("a/"));
        assert!(!is_valid("/a"));
        assert!(!is_valid("/A/"));
        assert!(!is_valid("/a1/"));
        assert!(!is_valid("//"));
    }

    #[test]
    fn splits_last_component() {
        assert_eq!(split_last_component("/"), None);
        assert_eq!(
            split_last_component("/a/"),
            Some(("/".to_string(), "a".to_string()))
        );
        assert_eq!(
            split_last_component("/a/b/"),
            Some(("/a/".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn lca_of_disjoint_paths_is_root() {
        assert_eq!(latest_common_ancestor("/a/", "/b/"), "/");
    }

    #[test]
    fn lca_of_shared_prefix() {
        assert_eq!(latest_common_ancestor("/a/b/c/", "/a/b/d/"), "/a/b/");
    }

    #[test]
    fn ancestor_prefix_is_component_aligned() {
        assert!(is_ancestor("/a/", "/a/b/"));
        assert!(!is_ancestor("/ab/", "/abc/"));
    }
}

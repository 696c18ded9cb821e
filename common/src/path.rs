use std::path::Path;

/// Returns true if `descendant` lives strictly below `ancestor`.
///
/// Both paths must already be canonical and absolute. Comparison is per path component, so
/// `/a/b` does not contain `/a/bc`, and a path never contains itself.
pub fn contains(ancestor: &Path, descendant: &Path) -> bool {
    ancestor != descendant && descendant.starts_with(ancestor)
}

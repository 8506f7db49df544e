//! PATH lookup for external commands.

use std::path::{Path, PathBuf};

/// Separator between entries of `$PATH`.
pub const PATH_LIST_DELIMITER: char = ':';

/// Resolve a command name to a path.
///
/// Resolution strategy:
/// 1. Names containing `/` are returned unchanged if `exists` accepts them;
///    `search_path` is not consulted
/// 2. Bare names are tried against each non-empty `search_path` entry, left
///    to right, and the first hit wins
///
/// Nothing is cached; callers resolve again for every execution.
pub fn resolve<F>(command: &str, search_path: Option<&str>, exists: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    if command.contains('/') {
        let path = Path::new(command);
        return exists(path).then(|| path.to_path_buf());
    }

    search_path?
        .split(PATH_LIST_DELIMITER)
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(command))
        .find(|candidate| exists(candidate.as_path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_qualified_name_skips_search() {
        let probed = RefCell::new(Vec::new());
        let exists = |p: &Path| {
            probed.borrow_mut().push(p.to_path_buf());
            p == Path::new("./foo")
        };
        assert_eq!(
            resolve("./foo", Some("/a:/b"), exists),
            Some(PathBuf::from("./foo"))
        );
        assert_eq!(*probed.borrow(), [PathBuf::from("./foo")]);

        assert_eq!(resolve("./bar", Some("/a:/b"), |_| false), None);
        assert_eq!(resolve("/usr/bin/env", None, |_| true), Some(PathBuf::from("/usr/bin/env")));
    }

    #[test]
    fn test_first_match_wins() {
        let only_b = |p: &Path| p == Path::new("/b/foo");
        assert_eq!(resolve("foo", Some("/a:/b"), only_b), Some(PathBuf::from("/b/foo")));

        let both = |p: &Path| p == Path::new("/a/foo") || p == Path::new("/b/foo");
        assert_eq!(resolve("foo", Some("/a:/b"), both), Some(PathBuf::from("/a/foo")));
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let probed = RefCell::new(Vec::new());
        let exists = |p: &Path| {
            probed.borrow_mut().push(p.to_path_buf());
            false
        };
        assert_eq!(resolve("foo", Some("::/a::/b:"), exists), None);
        assert_eq!(
            *probed.borrow(),
            [PathBuf::from("/a/foo"), PathBuf::from("/b/foo")]
        );
    }

    #[test]
    fn test_missing_search_path() {
        assert_eq!(resolve("foo", None, |_| true), None);
        assert_eq!(resolve("foo", Some(""), |_| true), None);
    }

    #[test]
    fn test_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tool"), "").unwrap();
        let search = format!("/nonexistent-kubsh-dir:{}", dir.path().display());
        assert_eq!(
            resolve("tool", Some(&search), |p| p.exists()),
            Some(dir.path().join("tool"))
        );
        assert_eq!(resolve("other", Some(&search), |p| p.exists()), None);
    }
}

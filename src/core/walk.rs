//! Directory tree traversals used by cp, rm, du and find
//!
//! Every walk keeps going past failing entries: errors are collected and
//! handed back to the caller, which reports them per entry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::UtilError;

/// Convert a `walkdir` failure into a path-tagged error.
pub fn walk_error(err: walkdir::Error) -> UtilError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    match err.into_io_error() {
        Some(io) => UtilError::path(path, io),
        None => UtilError::failed(format!("{}: filesystem loop detected", path.display())),
    }
}

/// Copy the tree rooted at `src` to `dst`, pre-order.
///
/// Directories are created before their contents. Every non-directory entry
/// is handed to `copy_file(src_entry, dst_entry)`. When a directory cannot be
/// created its subtree is skipped.
pub fn copy_tree<F>(src: &Path, dst: &Path, mut copy_file: F) -> Vec<UtilError>
where
    F: FnMut(&Path, &Path) -> Result<(), UtilError>,
{
    let mut errors = Vec::new();
    let mut walker = WalkDir::new(src).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                errors.push(walk_error(e));
                continue;
            }
        };

        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            tracing::debug!(dir = %target.display(), "creating directory");
            if let Err(e) = fs::create_dir_all(&target) {
                errors.push(UtilError::path(&target, e));
                walker.skip_current_dir();
            }
        } else if let Err(e) = copy_file(entry.path(), &target) {
            errors.push(e);
        }
    }

    errors
}

/// Remove the tree rooted at `root`, post-order.
///
/// Children go before their directory. A directory left non-empty because a
/// descendant failed is reported as well. `on_removed` is called for each
/// path actually removed.
pub fn remove_tree<F>(root: &Path, mut on_removed: F) -> Vec<UtilError>
where
    F: FnMut(&Path),
{
    let mut errors = Vec::new();

    for entry in WalkDir::new(root).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                errors.push(walk_error(e));
                continue;
            }
        };
        let path = entry.path();

        let result = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => on_removed(path),
            Err(e) => errors.push(UtilError::path(path, e)),
        }
    }

    errors
}

/// One entry of a disk usage walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub path: PathBuf,
    /// Apparent size in bytes; for directories, of the whole subtree
    pub bytes: u64,
    pub is_dir: bool,
}

/// Result of [`disk_usage`].
#[derive(Debug, Default)]
pub struct DiskUsage {
    /// Entries in post-order: children before the directory holding them
    pub entries: Vec<UsageEntry>,
    pub total: u64,
    pub errors: Vec<UtilError>,
}

/// Sum apparent sizes under `root`, post-order.
pub fn disk_usage(root: &Path) -> DiskUsage {
    let mut usage = DiskUsage::default();
    let mut pending: HashMap<PathBuf, u64> = HashMap::new();

    for entry in WalkDir::new(root).contents_first(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                usage.errors.push(walk_error(e));
                continue;
            }
        };

        let own = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                usage.errors.push(walk_error(e));
                0
            }
        };
        let path = entry.path().to_path_buf();
        let bytes = own + pending.remove(&path).unwrap_or(0);

        if entry.depth() == 0 {
            usage.total = bytes;
        } else if let Some(parent) = path.parent() {
            *pending.entry(parent.to_path_buf()).or_default() += bytes;
        }

        usage.entries.push(UsageEntry {
            path,
            bytes,
            is_dir: entry.file_type().is_dir(),
        });
    }

    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("top.txt"), "12345").unwrap();
        fs::write(root.join("a/one.txt"), "1").unwrap();
        fs::write(root.join("a/b/two.txt"), "22").unwrap();
    }

    #[test]
    fn test_copy_tree_reproduces_structure() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        sample_tree(&src);
        let dst = tmp.path().join("dst");

        let errors = copy_tree(&src, &dst, |from, to| {
            fs::copy(from, to).map(|_| ()).map_err(|e| UtilError::path(from, e))
        });

        assert!(errors.is_empty());
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "12345");
        assert_eq!(fs::read_to_string(dst.join("a/b/two.txt")).unwrap(), "22");
    }

    #[test]
    fn test_copy_tree_continues_after_file_error() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        sample_tree(&src);
        let dst = tmp.path().join("dst");

        let errors = copy_tree(&src, &dst, |from, to| {
            if from.ends_with("one.txt") {
                return Err(UtilError::failed("refused"));
            }
            fs::copy(from, to).map(|_| ()).map_err(|e| UtilError::path(from, e))
        });

        assert_eq!(errors.len(), 1);
        assert!(dst.join("a/b/two.txt").exists());
        assert!(!dst.join("a/one.txt").exists());
    }

    #[test]
    fn test_remove_tree_is_post_order() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("victim");
        sample_tree(&root);

        let mut removed = Vec::new();
        let errors = remove_tree(&root, |p| removed.push(p.to_path_buf()));

        assert!(errors.is_empty());
        assert!(!root.exists());
        let pos = |p: &Path| removed.iter().position(|r| r == p).unwrap();
        assert!(pos(&root.join("a/b/two.txt")) < pos(&root.join("a/b")));
        assert!(pos(&root.join("a")) < pos(&root));
    }

    #[test]
    fn test_disk_usage_sums_subtrees() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("tree");
        sample_tree(&root);

        let usage = disk_usage(&root);
        assert!(usage.errors.is_empty());

        let files: u64 = usage
            .entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.bytes)
            .sum();
        assert_eq!(files, 8);

        let last = usage.entries.last().unwrap();
        assert_eq!(last.path, root);
        assert_eq!(last.bytes, usage.total);

        let b = usage.entries.iter().find(|e| e.path == root.join("a/b")).unwrap();
        let a = usage.entries.iter().find(|e| e.path == root.join("a")).unwrap();
        assert!(a.bytes >= b.bytes + 1);
    }

    #[test]
    fn test_disk_usage_of_single_file() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "abc").unwrap();
        let usage = disk_usage(&file);
        assert_eq!(usage.total, 3);
        assert_eq!(usage.entries.len(), 1);
    }
}

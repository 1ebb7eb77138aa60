//! `rm` - remove files or directories

use clap::Parser;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::cli::args::{HelpFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::walk::remove_tree;
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "rm",
    version = VERSION,
    about = "Remove (unlink) the FILE(s)",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct RmArgs {
    /// Ignore nonexistent files and missing operands
    #[arg(short = 'f')]
    pub force: bool,

    /// Remove directories and their contents recursively
    #[arg(short = 'r', short_alias = 'R')]
    pub recursive: bool,

    /// Explain what is being done
    #[arg(short = 'v')]
    pub verbose: bool,

    #[arg(value_name = "FILE", required_unless_present = "force")]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub std: HelpFlags,
}

/// Last `/`-separated segment is `.` or `..`.
pub fn is_dot_entry(path: &Path) -> bool {
    let raw = path.as_os_str().as_bytes();
    let end = raw.iter().rposition(|b| *b != b'/').map_or(0, |i| i + 1);
    let trimmed = &raw[..end];
    let last = trimmed.rsplit(|b| *b == b'/').next().unwrap_or_default();
    last == b"." || last == b".."
}

fn is_root(path: &Path) -> bool {
    fs::canonicalize(path).is_ok_and(|p| p == Path::new("/"))
}

impl RmArgs {
    fn remove(&self, ctx: &mut Ctx<'_>, path: &Path) -> Result<(), UtilError> {
        if is_dot_entry(path) {
            return Err(UtilError::failed(format!(
                "refusing to remove '.' or '..' directory: skipping '{}'",
                path.display()
            )));
        }
        if is_root(path) {
            return Err(UtilError::failed(format!(
                "it is dangerous to operate on '{}'",
                path.display()
            )));
        }

        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if self.force && e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "ignoring missing operand");
                return Ok(());
            }
            Err(e) => return Err(UtilError::path(path, e)),
        };

        if !meta.is_dir() {
            fs::remove_file(path).map_err(|e| UtilError::path(path, e))?;
            if self.verbose {
                ctx.line(format_args!("removed '{}'", path.display()))?;
            }
            return Ok(());
        }

        if !self.recursive {
            return Err(UtilError::path(path, io::Error::from_raw_os_error(libc::EISDIR)));
        }

        let mut removed = Vec::new();
        let errors = remove_tree(path, |p| removed.push(p.to_path_buf()));
        if self.verbose {
            for p in &removed {
                ctx.line(format_args!("removed '{}'", p.display()))?;
            }
        }
        ctx.report_all(errors);
        Ok(())
    }
}

impl Utility for RmArgs {
    const NAME: &'static str = "rm";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        for path in &self.paths {
            if let Err(e) = self.remove(ctx, path) {
                ctx.report(&e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{arg, run};
    use tempfile::tempdir;

    #[test]
    fn test_dot_entries() {
        assert!(is_dot_entry(Path::new(".")));
        assert!(is_dot_entry(Path::new("..")));
        assert!(is_dot_entry(Path::new("a/./")));
        assert!(is_dot_entry(Path::new("a/..")));
        assert!(!is_dot_entry(Path::new(".hidden")));
        assert!(!is_dot_entry(Path::new("a/b")));
    }

    #[test]
    fn test_remove_files_continues_past_failure() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();

        let out = run::<RmArgs>(&["-v", arg(&a), arg(&tmp.path().join("missing")), arg(&b)]);
        assert_eq!(out.code, 1);
        assert!(!a.exists() && !b.exists());
        assert!(out.stderr.contains("No such file or directory"));
        assert_eq!(out.stdout.lines().count(), 2);
    }

    #[test]
    fn test_force_ignores_missing() {
        let tmp = tempdir().unwrap();
        let out = run::<RmArgs>(&["-f", arg(&tmp.path().join("missing"))]);
        assert_eq!(out.code, 0);
        assert!(out.stderr.is_empty());
        assert_eq!(run::<RmArgs>(&["-f"]).code, 0);
        assert_eq!(run::<RmArgs>(&[]).code, 1);
    }

    #[test]
    fn test_directory_needs_recursive() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub/f"), "x").unwrap();

        let out = run::<RmArgs>(&[arg(&dir)]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("Is a directory"));
        assert!(dir.exists());

        assert_eq!(run::<RmArgs>(&["-R", arg(&dir)]).code, 0);
        assert!(!dir.exists());
    }

    #[test]
    fn test_refuses_dot_and_root() {
        let out = run::<RmArgs>(&["-rf", "."]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("refusing to remove"));

        let out = run::<RmArgs>(&["-rf", "/"]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("dangerous"));
    }

    #[test]
    fn test_symlink_to_directory_is_unlinked() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("real");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("keep"), "").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&dir, &link).unwrap();

        assert_eq!(run::<RmArgs>(&[arg(&link)]).code, 0);
        assert!(dir.join("keep").exists());
        assert!(fs::symlink_metadata(&link).is_err());
    }
}

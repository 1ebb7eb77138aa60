//! `zip` - package files into a ZIP archive

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::archive::write_zip;
use crate::core::walk::remove_tree;
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "zip",
    version = VERSION,
    about = "Create ARCHIVE holding FILE(s), or add them to it with -u",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ZipArgs {
    /// Delete the sources once they are archived
    #[arg(short = 'd')]
    pub delete: bool,

    /// Keep the members of an existing archive
    #[arg(short = 'u')]
    pub update: bool,

    /// Descend into directories
    #[arg(short = 'r')]
    pub recursive: bool,

    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

fn remove_source(path: &Path) -> Vec<UtilError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => remove_tree(path, |_| {}),
        Ok(_) => fs::remove_file(path)
            .err()
            .map(|e| UtilError::path(path, e))
            .into_iter()
            .collect(),
        Err(e) => vec![UtilError::path(path, e)],
    }
}

impl Utility for ZipArgs {
    const NAME: &'static str = "zip";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let report = write_zip(&self.archive, &self.files, self.update, self.recursive)?;
        tracing::debug!(
            entries = report.entries.len(),
            archive = %self.archive.display(),
            "zip written"
        );

        for path in &report.skipped {
            ctx.notice(format_args!("{}: file is the archive; not added", path.display()));
        }

        // Sources go only when every one of them made it in, and the
        // archive is not among them
        let complete = report.errors.is_empty();
        let holds_archive = !report.skipped.is_empty();
        ctx.report_all(report.errors);
        if !self.delete {
            return Ok(());
        }
        if !complete {
            tracing::warn!("keeping sources, the archive is incomplete");
            return Ok(());
        }
        if holds_archive {
            tracing::warn!("keeping sources, the archive lies among them");
            return Ok(());
        }
        for file in &self.files {
            ctx.report_all(remove_source(file));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{arg, run};
    use crate::core::archive::list_zip;
    use tempfile::tempdir;

    fn members(archive: &Path) -> Vec<String> {
        let mut names: Vec<String> = list_zip(archive)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_create_and_update() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let archive = tmp.path().join("x.zip");

        assert_eq!(run::<ZipArgs>(&[arg(&archive), arg(&a)]).code, 0);
        assert_eq!(members(&archive), vec!["a.txt"]);

        assert_eq!(run::<ZipArgs>(&["-u", arg(&archive), arg(&b)]).code, 0);
        assert_eq!(members(&archive), vec!["a.txt", "b.txt"]);

        // Without -u the archive starts over
        assert_eq!(run::<ZipArgs>(&[arg(&archive), arg(&b)]).code, 0);
        assert_eq!(members(&archive), vec!["b.txt"]);
    }

    #[test]
    fn test_delete_after_adding() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let dir = tmp.path().join("d");
        fs::write(&a, "a").unwrap();
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("inner"), "i").unwrap();
        let archive = tmp.path().join("m.zip");

        let out = run::<ZipArgs>(&["-dr", arg(&archive), arg(&a), arg(&dir)]);
        assert_eq!(out.code, 0, "{}", out.stderr);
        assert!(!a.exists() && !dir.exists());
        assert_eq!(members(&archive), vec!["a.txt", "d/", "d/inner"]);
    }

    #[test]
    fn test_failure_keeps_sources() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        fs::write(&a, "a").unwrap();
        let archive = tmp.path().join("k.zip");

        let out = run::<ZipArgs>(&["-d", arg(&archive), arg(&a), arg(&tmp.path().join("gone"))]);
        assert_eq!(out.code, 1);
        assert!(a.exists());
        assert_eq!(members(&archive), vec!["a.txt"]);
    }

    #[test]
    fn test_needs_files() {
        assert_eq!(run::<ZipArgs>(&["only.zip"]).code, 1);
    }

    #[test]
    fn test_archive_inside_source_is_kept() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("f"), "f").unwrap();
        let archive = dir.join("a.zip");
        assert_eq!(run::<ZipArgs>(&["-r", arg(&archive), arg(&dir)]).code, 0);

        let out = run::<ZipArgs>(&["-dur", arg(&archive), arg(&dir)]);
        assert_eq!(out.code, 0, "{}", out.stderr);
        assert!(out.stderr.contains("file is the archive"));
        assert!(archive.exists() && dir.join("f").exists());
        assert_eq!(members(&archive), vec!["d/", "d/f"]);
    }
}

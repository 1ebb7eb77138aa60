//! `cp` - copy files and directories

use clap::Parser;
use std::fs::{self, File, FileTimes};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::cli::args::{HelpFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::walk::copy_tree;
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "cp",
    version = VERSION,
    about = "Copy SOURCE to DEST, or multiple SOURCEs into directory DEST",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct CpArgs {
    /// Copy directories recursively
    #[arg(short = 'r', short_alias = 'R')]
    pub recursive: bool,

    /// Prompt before overwriting
    #[arg(short = 'i')]
    pub interactive: bool,

    /// Explain what is being done
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Preserve mode and timestamps
    #[arg(short = 'p')]
    pub preserve: bool,

    /// Copy only when SOURCE is newer than DEST or DEST is missing
    #[arg(short = 'u')]
    pub update: bool,

    #[arg(value_name = "SOURCE... DEST", required = true)]
    pub operands: Vec<PathBuf>,

    #[command(flatten)]
    pub std: HelpFlags,
}

/// Whether `dst` lies inside (or is) the directory `src`.
fn inside(src: &Path, dst: &Path) -> bool {
    let Ok(src) = fs::canonicalize(src) else {
        return false;
    };
    // dst usually does not exist yet; resolve its parent instead
    let resolved = match (dst.parent(), dst.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent).map(|p| p.join(name))
        }
        _ => fs::canonicalize(dst),
    };
    resolved.is_ok_and(|dst| dst.starts_with(&src))
}

fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    a.dev() == b.dev() && a.ino() == b.ino()
}

impl CpArgs {
    fn copy_file(&self, ctx: &mut Ctx<'_>, src: &Path, dst: &Path) -> Result<(), UtilError> {
        let meta = fs::metadata(src).with_path(src)?;
        if let Ok(existing) = fs::metadata(dst) {
            if same_file(&meta, &existing) {
                return Err(UtilError::failed(format!(
                    "'{}' and '{}' are the same file",
                    src.display(),
                    dst.display()
                )));
            }
            if self.update {
                let newer = match (meta.modified(), existing.modified()) {
                    (Ok(s), Ok(d)) => s > d,
                    _ => true,
                };
                if !newer {
                    tracing::debug!(src = %src.display(), "destination is up to date");
                    return Ok(());
                }
            }
            if self.interactive
                && !ctx.confirm(&format!("overwrite '{}'? ", dst.display()))?
            {
                return Ok(());
            }
        }

        fs::copy(src, dst).with_path(dst)?;
        if self.preserve {
            let times = FileTimes::new()
                .set_accessed(meta.accessed().with_path(src)?)
                .set_modified(meta.modified().with_path(src)?);
            File::options()
                .write(true)
                .open(dst)
                .and_then(|f| f.set_times(times))
                .with_path(dst)?;
        }
        if self.verbose {
            ctx.line(format_args!("'{}' -> '{}'", src.display(), dst.display()))?;
        }
        Ok(())
    }

    fn copy_dir(&self, ctx: &mut Ctx<'_>, src: &Path, dst: &Path) -> Result<(), UtilError> {
        if inside(src, dst) {
            return Err(UtilError::failed(format!(
                "cannot copy a directory, '{}', into itself, '{}'",
                src.display(),
                dst.display()
            )));
        }
        if self.verbose {
            ctx.line(format_args!("'{}' -> '{}'", src.display(), dst.display()))?;
        }
        let errors = copy_tree(src, dst, |from, to| self.copy_file(ctx, from, to));
        ctx.report_all(errors);
        Ok(())
    }
}

impl Utility for CpArgs {
    const NAME: &'static str = "cp";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let Some((dest, sources)) = self.operands.split_last() else {
            return Err(UtilError::usage("missing file operand"));
        };
        if sources.is_empty() {
            return Err(UtilError::usage(format!(
                "missing destination file operand after '{}'",
                dest.display()
            )));
        }

        let into_dir = dest.is_dir();
        if sources.len() > 1 && !into_dir {
            return Err(UtilError::failed(format!(
                "target '{}' is not a directory",
                dest.display()
            )));
        }

        for src in sources {
            let target = match src.file_name() {
                Some(name) if into_dir => dest.join(name),
                _ => dest.clone(),
            };

            let meta = match fs::metadata(src).with_path(src) {
                Ok(meta) => meta,
                Err(e) => {
                    ctx.report(&e);
                    continue;
                }
            };
            let copied = if !meta.is_dir() {
                self.copy_file(ctx, src, &target)
            } else if self.recursive {
                self.copy_dir(ctx, src, &target)
            } else {
                Err(UtilError::failed(format!(
                    "-r not specified; omitting directory '{}'",
                    src.display()
                )))
            };
            if let Err(e) = copied {
                ctx.report(&e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{arg, run, run_input};
    use tempfile::tempdir;

    #[test]
    fn test_copy_file() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "data").unwrap();

        let out = run::<CpArgs>(&[arg(&a), arg(&b)]);
        assert_eq!(out.code, 0);
        assert_eq!(fs::read_to_string(&b).unwrap(), "data");
    }

    #[test]
    fn test_copy_into_directory() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let dir = tmp.path().join("dir");
        fs::write(&a, "A").unwrap();
        fs::write(&b, "B").unwrap();
        fs::create_dir(&dir).unwrap();

        let out = run::<CpArgs>(&["-v", arg(&a), arg(&b), arg(&dir)]);
        assert_eq!(out.code, 0);
        assert_eq!(fs::read_to_string(dir.join("a")).unwrap(), "A");
        assert_eq!(fs::read_to_string(dir.join("b")).unwrap(), "B");
        assert_eq!(out.stdout.lines().count(), 2);
    }

    #[test]
    fn test_several_sources_need_directory() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        fs::write(&a, "A").unwrap();
        let out = run::<CpArgs>(&[arg(&a), arg(&a), arg(&tmp.path().join("nope"))]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("is not a directory"));
    }

    #[test]
    fn test_missing_source_does_not_stop_others() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let dir = tmp.path().join("dir");
        fs::write(&a, "A").unwrap();
        fs::create_dir(&dir).unwrap();

        let out = run::<CpArgs>(&[arg(&tmp.path().join("ghost")), arg(&a), arg(&dir)]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("ghost: No such file or directory"));
        assert!(dir.join("a").exists());
    }

    #[test]
    fn test_directory_needs_recursive() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        let out = run::<CpArgs>(&[arg(&src), arg(&tmp.path().join("dst"))]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("omitting directory"));
    }

    #[test]
    fn test_recursive_copy() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("sub/deeper")).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        fs::write(src.join("sub/deeper/leaf.txt"), "leaf").unwrap();
        let dst = tmp.path().join("dst");

        let out = run::<CpArgs>(&["-R", arg(&src), arg(&dst)]);
        assert_eq!(out.code, 0, "{}", out.stderr);
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read_to_string(dst.join("sub/deeper/leaf.txt")).unwrap(), "leaf");
    }

    #[test]
    fn test_refuses_copy_into_itself() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        let out = run::<CpArgs>(&["-r", arg(&src), arg(&src.join("inner"))]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("into itself"));
        assert!(!src.join("inner").exists());
    }

    #[test]
    fn test_same_file() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        fs::write(&a, "A").unwrap();
        let out = run::<CpArgs>(&[arg(&a), arg(&a)]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("are the same file"));
    }

    #[test]
    fn test_interactive_decline_keeps_destination() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "new").unwrap();
        fs::write(&b, "old").unwrap();

        let out = run_input::<CpArgs>(&["-i", arg(&a), arg(&b)], "n\n");
        assert_eq!(out.code, 0);
        assert!(out.stderr.contains("overwrite"));
        assert_eq!(fs::read_to_string(&b).unwrap(), "old");

        run_input::<CpArgs>(&["-i", arg(&a), arg(&b)], "y\n");
        assert_eq!(fs::read_to_string(&b).unwrap(), "new");
    }

    #[test]
    fn test_update_skips_newer_destination() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "source").unwrap();
        fs::write(&b, "dest").unwrap();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(&a)
            .unwrap()
            .set_modified(old)
            .unwrap();

        run::<CpArgs>(&["-u", arg(&a), arg(&b)]);
        assert_eq!(fs::read_to_string(&b).unwrap(), "dest");
    }

    #[test]
    fn test_preserve_keeps_mtime() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "x").unwrap();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(&a)
            .unwrap()
            .set_modified(old)
            .unwrap();

        run::<CpArgs>(&["-p", arg(&a), arg(&b)]);
        assert_eq!(fs::metadata(&b).unwrap().modified().unwrap(), old);
    }

    struct Broken;

    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_verbose_write_error_is_reported() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        let dst = tmp.path().join("dst");

        let args: Vec<std::ffi::OsString> = ["-rv", arg(&src), arg(&dst)]
            .iter()
            .map(std::ffi::OsString::from)
            .collect();
        let mut err = Vec::new();
        let mut input = std::io::Cursor::new(Vec::new());
        let code = crate::cli::run_with::<CpArgs>(
            &args,
            &crate::core::Config::default(),
            false,
            &mut Broken,
            &mut err,
            &mut input,
        );
        assert_eq!(code, 1);
        assert!(String::from_utf8_lossy(&err).contains("write error"));
    }

    #[test]
    fn test_missing_destination() {
        let out = run::<CpArgs>(&["only"]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("missing destination"));
    }
}

//! `mkdir` - make directories

use clap::Parser;
use std::fs::{self, DirBuilder, Permissions};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::cli::args::{HelpFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "mkdir",
    version = VERSION,
    about = "Create the DIRECTORY(ies), if they do not already exist",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct MkdirArgs {
    /// No error if existing, make parent directories as needed
    #[arg(short = 'p')]
    pub parents: bool,

    /// Print a message for each created directory
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Set the mode of new directories (octal, e.g. 750)
    #[arg(short = 'm', value_name = "MODE", value_parser = parse_mode)]
    pub mode: Option<u32>,

    #[arg(value_name = "DIRECTORY", required = true)]
    pub dirs: Vec<PathBuf>,

    #[command(flatten)]
    pub std: HelpFlags,
}

pub fn parse_mode(text: &str) -> Result<u32, String> {
    u32::from_str_radix(text, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| format!("invalid mode '{text}'"))
}

impl MkdirArgs {
    fn create(&self, ctx: &mut Ctx<'_>, dir: &Path) -> Result<(), UtilError> {
        let mut builder = DirBuilder::new();
        builder.mode(0o777);
        builder.create(dir).with_path(dir)?;
        if let Some(mode) = self.mode {
            // Applied after creation so the umask does not mask it
            fs::set_permissions(dir, Permissions::from_mode(mode)).with_path(dir)?;
        }
        if self.verbose {
            ctx.line(format_args!("created directory '{}'", dir.display()))?;
        }
        Ok(())
    }

    fn create_parents(&self, ctx: &mut Ctx<'_>, dir: &Path) -> Result<(), UtilError> {
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(UtilError::path(dir, std::io::ErrorKind::AlreadyExists.into()));
        }
        let missing: Vec<&Path> = dir
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .take_while(|p| !p.exists())
            .collect();
        for (idx, path) in missing.iter().rev().enumerate() {
            let last = idx + 1 == missing.len();
            let result = if last {
                self.create(ctx, path)
            } else {
                DirBuilder::new().create(path).with_path(path).and_then(|()| {
                    if self.verbose {
                        ctx.line(format_args!("created directory '{}'", path.display()))?;
                    }
                    Ok(())
                })
            };
            match result {
                // Someone else made it in the meantime
                Err(UtilError::Path { ref source, .. })
                    if source.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => {}
                other => other?,
            }
        }
        Ok(())
    }
}

impl Utility for MkdirArgs {
    const NAME: &'static str = "mkdir";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        for dir in &self.dirs {
            let result = if self.parents {
                self.create_parents(ctx, dir)
            } else {
                self.create(ctx, dir)
            };
            if let Err(e) = result {
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
    fn test_create_and_exists() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("new");

        assert_eq!(run::<MkdirArgs>(&[arg(&dir)]).code, 0);
        assert!(dir.is_dir());

        let again = run::<MkdirArgs>(&[arg(&dir)]);
        assert_eq!(again.code, 1);
        assert!(again.stderr.contains("File exists"));
    }

    #[test]
    fn test_parents_is_idempotent() {
        let tmp = tempdir().unwrap();
        let chain = tmp.path().join("a/b/c");

        let first = run::<MkdirArgs>(&["-pv", arg(&chain)]);
        assert_eq!(first.code, 0);
        assert_eq!(first.stdout.lines().count(), 3);
        assert!(chain.is_dir());

        let second = run::<MkdirArgs>(&["-p", arg(&chain)]);
        assert_eq!(second.code, 0);
        assert!(second.stdout.is_empty());
    }

    #[test]
    fn test_missing_parent_without_p() {
        let tmp = tempdir().unwrap();
        let ok = tmp.path().join("ok");
        let out = run::<MkdirArgs>(&[arg(&tmp.path().join("x/y")), arg(&ok)]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("No such file or directory"));
        assert!(ok.is_dir());
    }

    #[test]
    fn test_mode() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("private");
        assert_eq!(run::<MkdirArgs>(&["-m", "700", arg(&dir)]).code, 0);
        assert_eq!(fs::metadata(&dir).unwrap().permissions().mode() & 0o7777, 0o700);

        assert_eq!(run::<MkdirArgs>(&["-m", "9z", arg(&dir)]).code, 1);
    }

    #[test]
    fn test_file_in_the_way() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "").unwrap();
        let out = run::<MkdirArgs>(&["-p", arg(&file)]);
        assert_eq!(out.code, 1);
    }
}

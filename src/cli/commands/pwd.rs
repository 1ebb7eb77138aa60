//! `pwd` - print name of the current directory

use clap::Parser;
use std::ffi::OsStr;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "pwd",
    version = VERSION,
    about = "Print the full name of the current working directory",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct PwdArgs {
    /// Use PWD from the environment, even if it contains symlinks
    #[arg(short = 'L', overrides_with = "physical")]
    pub logical: bool,

    /// Resolve all symlinks (default)
    #[arg(short = 'P', overrides_with = "logical")]
    pub physical: bool,

    #[command(flatten)]
    pub std: StdFlags,
}

/// `$PWD`, if it is absolute, free of `.`/`..`, and names the same
/// directory as `cwd`.
pub fn logical(pwd: Option<&OsStr>, cwd: &Path) -> Option<PathBuf> {
    let pwd = Path::new(pwd?);
    if !pwd.is_absolute() {
        return None;
    }
    if pwd
        .components()
        .any(|c| matches!(c, Component::CurDir | Component::ParentDir))
    {
        return None;
    }
    let (a, b) = (pwd.metadata().ok()?, cwd.metadata().ok()?);
    (a.dev() == b.dev() && a.ino() == b.ino()).then(|| pwd.to_path_buf())
}

impl Utility for PwdArgs {
    const NAME: &'static str = "pwd";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let cwd = std::env::current_dir().with_context(|| "current directory".to_string())?;
        let shown = if self.logical {
            let pwd = std::env::var_os("PWD");
            logical(pwd.as_deref(), &cwd).unwrap_or(cwd)
        } else {
            cwd
        };
        ctx.line(shown.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::run;
    use tempfile::tempdir;

    #[test]
    fn test_physical() {
        let out = run::<PwdArgs>(&["-P"]);
        assert_eq!(out.code, 0);
        assert_eq!(out.stdout.trim_end(), std::env::current_dir().unwrap().display().to_string());
    }

    #[test]
    fn test_logical_accepts_symlink_to_cwd() {
        let tmp = tempdir().unwrap();
        let real = tmp.path().join("real");
        let link = tmp.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(logical(Some(link.as_os_str()), &real), Some(link.clone()));
    }

    #[test]
    fn test_logical_rejects_bad_pwd() {
        let tmp = tempdir().unwrap();
        let real = tmp.path().join("real");
        let other = tmp.path().join("other");
        std::fs::create_dir(&real).unwrap();
        std::fs::create_dir(&other).unwrap();

        assert_eq!(logical(None, &real), None);
        assert_eq!(logical(Some(OsStr::new("relative")), &real), None);
        assert_eq!(logical(Some(other.as_os_str()), &real), None);
        let dotted = real.join("..").join("real");
        assert_eq!(logical(Some(dotted.as_os_str()), &real), None);
    }

    #[test]
    fn test_operand_is_rejected() {
        assert_eq!(run::<PwdArgs>(&["x"]).code, 1);
    }
}

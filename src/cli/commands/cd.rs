//! `cd` - start a shell in another directory
//!
//! A process cannot change its parent's working directory, so `cd` starts
//! `$SHELL` (or `bash`) inside the target with `PWD` and `OLDPWD` set.

use clap::Parser;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use crate::cli::args::{HelpFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "cd",
    version = VERSION,
    about = "Start a shell in DIR (default $HOME; '-' is $OLDPWD)",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct CdArgs {
    /// Keep symbolic links in the new path (default)
    #[arg(short = 'L', overrides_with = "physical")]
    pub logical: bool,

    /// Resolve symbolic links in the new path
    #[arg(short = 'P', overrides_with = "logical")]
    pub physical: bool,

    /// Describe the change before starting the shell
    #[arg(short = 'v')]
    pub verbose: bool,

    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(flatten)]
    pub std: HelpFlags,
}

/// Remove `.` and fold `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Pick the directory named by the operand; `env` looks up variables.
pub fn requested(
    dir: Option<&Path>,
    env: impl Fn(&str) -> Option<OsString>,
) -> Result<PathBuf, UtilError> {
    let lookup = |name: &str| {
        env(name)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| UtilError::failed(format!("{name} not set")))
    };
    match dir {
        None => lookup("HOME"),
        Some(dir) if dir.as_os_str() == "-" => lookup("OLDPWD"),
        Some(dir) => Ok(dir.to_path_buf()),
    }
}

impl Utility for CdArgs {
    const NAME: &'static str = "cd";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let target = requested(self.dir.as_deref(), |key| std::env::var_os(key))?;
        let cwd = std::env::current_dir().with_context(|| "current directory".to_string())?;
        // $PWD keeps the logical spelling of the current directory
        let here = std::env::var_os("PWD")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .unwrap_or_else(|| cwd.clone());

        let dest = if self.physical {
            std::fs::canonicalize(cwd.join(&target)).with_path(&target)?
        } else {
            normalize(&here.join(&target))
        };
        let meta = std::fs::metadata(&dest).with_path(&target)?;
        if !meta.is_dir() {
            return Err(UtilError::failed(format!(
                "{}: Not a directory",
                target.display()
            )));
        }

        if self.verbose {
            ctx.line(format_args!("from: {}", here.display()))?;
            ctx.line(format_args!("to: {}", dest.display()))?;
        }

        let shell = std::env::var_os("SHELL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| OsString::from("bash"));
        tracing::debug!(?shell, dest = %dest.display(), "starting shell");
        ctx.flush()?;

        let status = Command::new(&shell)
            .current_dir(&dest)
            .env("PWD", &dest)
            .env("OLDPWD", &here)
            .status()
            .with_context(|| format!("cannot start {}", Path::new(&shell).display()))?;
        if !status.success() {
            return Err(UtilError::failed(match status.code() {
                Some(code) => format!("shell exited with status {code}"),
                None => "shell terminated by a signal".to_string(),
            }));
        }
        Ok(())
    }
}

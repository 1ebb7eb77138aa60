//! `rmdir` - remove empty directories

use clap::Parser;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cli::args::{HelpFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "rmdir",
    version = VERSION,
    about = "Remove the DIRECTORY(ies), if they are empty",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct RmdirArgs {
    /// Remove DIRECTORY and its ancestors
    #[arg(short = 'p')]
    pub parents: bool,

    /// Print a message for each removed directory
    #[arg(short = 'v')]
    pub verbose: bool,

    #[arg(value_name = "DIRECTORY", required = true)]
    pub dirs: Vec<PathBuf>,

    #[command(flatten)]
    pub std: HelpFlags,
}

fn not_empty(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::ENOTEMPTY) | Some(libc::EEXIST))
}

impl RmdirArgs {
    fn remove(&self, ctx: &mut Ctx<'_>, dir: &Path) -> Result<(), UtilError> {
        fs::remove_dir(dir).with_path(dir)?;
        if self.verbose {
            ctx.line(format_args!("removed directory '{}'", dir.display()))?;
        }
        Ok(())
    }

    fn remove_ancestors(&self, ctx: &mut Ctx<'_>, dir: &Path) -> Result<(), UtilError> {
        for parent in dir.ancestors().skip(1) {
            if parent.as_os_str().is_empty() || parent == Path::new("/") {
                break;
            }
            match fs::remove_dir(parent) {
                Ok(()) => {
                    if self.verbose {
                        ctx.line(format_args!("removed directory '{}'", parent.display()))?;
                    }
                }
                Err(e) if not_empty(&e) => {
                    tracing::debug!(dir = %parent.display(), "stopping at non-empty parent");
                    break;
                }
                Err(e) => return Err(UtilError::path(parent, e)),
            }
        }
        Ok(())
    }
}

impl Utility for RmdirArgs {
    const NAME: &'static str = "rmdir";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        for dir in &self.dirs {
            let mut result = self.remove(ctx, dir);
            if result.is_ok() && self.parents {
                result = self.remove_ancestors(ctx, dir);
            }
            if let Err(e) = result {
                ctx.report(&e);
            }
        }
        Ok(())
    }
}

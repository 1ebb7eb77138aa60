//! `find` - search for files by name and size

use clap::Parser;
use glob::Pattern;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::walk::walk_error;
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "find",
    version = VERSION,
    about = "List files under DIR (default '.') whose names match PATTERN",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct FindArgs {
    /// Directory to search
    #[arg(short = 'd', value_name = "DIR", conflicts_with = "dir")]
    pub directory: Option<PathBuf>,

    /// Shell glob the file name must match, e.g. '*.rs'
    #[arg(short = 'n', value_name = "PATTERN", conflicts_with = "pattern")]
    pub name: Option<String>,

    /// Minimum size in bytes
    #[arg(short = 's', value_name = "MINSIZE", default_value_t = 0)]
    pub min_size: u64,

    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl Utility for FindArgs {
    const NAME: &'static str = "find";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let root = self
            .directory
            .or(self.dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let pattern = match self.name.or(self.pattern) {
            Some(text) => Some(
                Pattern::new(text.trim())
                    .map_err(|e| UtilError::usage(format!("invalid pattern '{text}': {e}")))?,
            ),
            None => None,
        };

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    ctx.report(&walk_error(e));
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if pattern.as_ref().is_some_and(|p| !p.matches(&name)) {
                continue;
            }
            if self.min_size > 0 {
                match entry.metadata() {
                    Ok(meta) if meta.len() >= self.min_size => {}
                    Ok(_) => continue,
                    Err(e) => {
                        ctx.report(&walk_error(e));
                        continue;
                    }
                }
            }
            ctx.line(entry.path().display())?;
        }
        Ok(())
    }
}

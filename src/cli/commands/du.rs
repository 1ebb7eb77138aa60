//! `du` - estimate file space usage

use clap::Parser;
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::walk::disk_usage;
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "du",
    version = VERSION,
    about = "Summarize apparent sizes, in bytes, of each PATH (default '.')",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct DuArgs {
    /// Display only a total for each argument
    #[arg(short = 's', conflicts_with = "all")]
    pub summarize: bool,

    /// Write counts for all files, not just directories
    #[arg(short = 'a')]
    pub all: bool,

    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl Utility for DuArgs {
    const NAME: &'static str = "du";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let paths = if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        };

        for root in &paths {
            let usage = disk_usage(root);
            ctx.report_all(usage.errors);

            for entry in &usage.entries {
                let is_root = entry.path == *root;
                let shown = if self.summarize {
                    is_root
                } else {
                    is_root || entry.is_dir || self.all
                };
                if shown {
                    ctx.line(format_args!("{}\t{}", entry.bytes, entry.path.display()))?;
                }
            }
        }
        Ok(())
    }
}

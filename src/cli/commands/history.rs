//! `history` - show or edit the shell history file

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::history::History;
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "history",
    version = VERSION,
    about = "List, clear or edit the shell history file",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct HistoryArgs {
    /// Clear the history
    #[arg(short = 'c', conflicts_with_all = ["delete", "last"])]
    pub clear: bool,

    /// Delete the entry at position N
    #[arg(short = 'd', value_name = "N", conflicts_with = "last")]
    pub delete: Option<usize>,

    /// Show only the last N entries
    #[arg(short = 'n', value_name = "N")]
    pub last: Option<usize>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl Utility for HistoryArgs {
    const NAME: &'static str = "history";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let path = ctx.config.history_path()?;

        if self.clear {
            return History::clear(&path);
        }

        let mut history = History::load(&path)?;
        if let Some(position) = self.delete {
            let removed = history.delete(position)?;
            tracing::debug!(
                position,
                %removed,
                path = %history.path().display(),
                "deleted history entry"
            );
            return history.save();
        }

        let skip = match self.last {
            Some(n) => history.len().saturating_sub(n),
            None => 0,
        };
        for (idx, entry) in history.entries().iter().enumerate().skip(skip) {
            ctx.line(format_args!("{:5}  {entry}", idx + 1))?;
        }
        Ok(())
    }
}

//! `in` (`!n`) - run a command from the history by position

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::history::{replay, split_command, History};
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "in",
    version = VERSION,
    about = "Run history entry N (asking for N if not given), with ARGS appended",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct BangNArgs {
    /// Position in the history, as `history` numbers it
    #[arg(value_name = "N")]
    pub position: Option<usize>,

    /// Extra arguments for the command
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl Utility for BangNArgs {
    const NAME: &'static str = "in";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let history = History::load(&ctx.config.history_path()?)?;
        if history.is_empty() {
            return Err(UtilError::failed("history is empty"));
        }

        let position = match self.position {
            Some(n) => n,
            None => {
                let reply = ctx.prompt(&format!("history position (1-{}): ", history.len()))?;
                reply
                    .parse()
                    .map_err(|_| UtilError::usage(format!("invalid position '{reply}'")))?
            }
        };
        let line = history.get(position).ok_or_else(|| {
            UtilError::failed(format!(
                "{position}: history position out of range (1-{})",
                history.len()
            ))
        })?;

        let mut words = split_command(line);
        words.extend(self.args);
        ctx.line(words.join(" "))?;
        ctx.flush()?;
        replay(&words)
    }
}

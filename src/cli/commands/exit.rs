//! `exit` - end the calling shell session

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::sys;
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "exit",
    version = VERSION,
    about = "End the session of the shell that started this program (sends it SIGHUP)",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ExitArgs {
    #[command(flatten)]
    pub std: StdFlags,
}

impl Utility for ExitArgs {
    const NAME: &'static str = "exit";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let parent = sys::parent_pid();
        if parent <= 1 {
            return Err(UtilError::failed("no parent shell to end"));
        }
        tracing::debug!(parent, "sending SIGHUP");
        ctx.flush()?;
        sys::kill(parent, libc::SIGHUP).with_context(|| format!("cannot signal process {parent}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::run;

    #[test]
    fn test_help_does_not_signal() {
        let out = run::<ExitArgs>(&["-h"]);
        assert_eq!(out.code, 0);
        assert!(out.stdout.contains("SIGHUP"));
    }

    #[test]
    fn test_operand_is_rejected() {
        let out = run::<ExitArgs>(&["0"]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("try '-h'"));
    }
}

//! `kill` - send a signal to a process

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::sys::{self, SIGNALS};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "kill",
    version = VERSION,
    about = "Send SIGNAL (default TERM) to process PID",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct KillArgs {
    /// Signal to send, by name (TERM, SIGTERM) or number
    #[arg(short = 's', value_name = "SIGNAL", conflicts_with = "signal")]
    pub signal_flag: Option<String>,

    /// List signal names
    #[arg(short = 'l', conflicts_with_all = ["pid", "signal_flag"])]
    pub list: bool,

    #[arg(
        value_name = "PID",
        required_unless_present = "list",
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub pid: Option<i32>,

    #[arg(value_name = "SIGNAL")]
    pub signal: Option<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl Utility for KillArgs {
    const NAME: &'static str = "kill";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        if self.list {
            for (name, num) in SIGNALS {
                ctx.line(format_args!("{num:2}) SIG{name}"))?;
            }
            return Ok(());
        }

        let Some(pid) = self.pid else {
            return Err(UtilError::usage("missing PID"));
        };
        let signal = match self.signal_flag.or(self.signal) {
            Some(name) => sys::signal_number(&name)
                .ok_or_else(|| UtilError::failed(format!("invalid signal '{name}'")))?,
            None => libc::SIGTERM,
        };

        tracing::debug!(
            pid,
            signal,
            name = sys::signal_name(signal).unwrap_or("0"),
            "sending signal"
        );
        sys::kill(pid, signal).with_context(|| format!("({pid})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::run;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;

    #[test]
    fn test_terminates_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id().to_string();

        let out = run::<KillArgs>(&[&pid, "KILL"]);
        assert_eq!(out.code, 0, "{}", out.stderr);
        assert_eq!(child.wait().unwrap().signal(), Some(libc::SIGKILL));
    }

    #[test]
    fn test_default_is_term() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id().to_string();

        assert_eq!(run::<KillArgs>(&[&pid]).code, 0);
        assert_eq!(child.wait().unwrap().signal(), Some(libc::SIGTERM));
    }

    #[test]
    fn test_signal_zero_probe() {
        let me = std::process::id().to_string();
        assert_eq!(run::<KillArgs>(&["-s", "0", &me]).code, 0);
    }

    #[test]
    fn test_errors() {
        let gone = run::<KillArgs>(&["2147483647", "0"]);
        assert_eq!(gone.code, 1);
        assert!(gone.stderr.contains("No such process"));

        let bad = run::<KillArgs>(&["1", "NOPE"]);
        assert_eq!(bad.code, 1);
        assert!(bad.stderr.contains("invalid signal 'NOPE'"));

        assert_eq!(run::<KillArgs>(&[]).code, 1);
        assert_eq!(run::<KillArgs>(&["0"]).code, 1);
        assert_eq!(run::<KillArgs>(&["abc"]).code, 1);
    }

    #[test]
    fn test_list() {
        let out = run::<KillArgs>(&["-l"]);
        assert_eq!(out.code, 0);
        assert!(out.stdout.contains(" 9) SIGKILL\n"));
        assert!(out.stdout.contains("15) SIGTERM\n"));
    }
}

//! `ii` (`!!`) - run the previous command again

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::history::{replay, split_command, History};
use crate::core::UtilError;

/// Names this utility may appear under in the history.
const REPLAY_NAMES: &[&str] = &["ii", "!!"];

#[derive(Parser, Debug)]
#[command(
    name = "ii",
    version = VERSION,
    about = "Run the most recent command from the shell history again, with ARGS appended",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct BangBangArgs {
    /// Extra arguments for the replayed command
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Whether a history line is itself a replay request.
pub fn is_replay(line: &str) -> bool {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    let first = first.rsplit('/').next().unwrap_or(first);
    if first == "unixkit" {
        return words.next().is_some_and(|w| REPLAY_NAMES.contains(&w));
    }
    REPLAY_NAMES.contains(&first)
}

impl Utility for BangBangArgs {
    const NAME: &'static str = "ii";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let history = History::load(&ctx.config.history_path()?)?;
        let line = history
            .last_where(|line| !is_replay(line))
            .ok_or_else(|| UtilError::failed("no previous command in history"))?;

        let mut words = split_command(line);
        words.extend(self.args);
        ctx.line(words.join(" "))?;
        ctx.flush()?;
        replay(&words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{run_full, Outcome};
    use crate::core::Config;
    use std::path::Path;
    use tempfile::tempdir;

    fn ii(path: &Path, args: &[&str]) -> Outcome {
        let config = Config {
            history_file: Some(path.to_path_buf()),
            ..Default::default()
        };
        run_full::<BangBangArgs>(args, "", &config)
    }

    #[test]
    fn test_is_replay() {
        assert!(is_replay("ii"));
        assert!(is_replay("!! -l"));
        assert!(is_replay("/usr/local/bin/ii x"));
        assert!(is_replay("unixkit ii"));
        assert!(!is_replay("iii"));
        assert!(!is_replay("unixkit ls"));
        assert!(!is_replay(""));
    }

    #[test]
    fn test_skips_own_invocations() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("hist");
        std::fs::write(&file, "false\ntrue\nii\n!!\n").unwrap();

        let out = ii(&file, &[]);
        assert_eq!(out.code, 0, "{}", out.stderr);
        assert_eq!(out.stdout, "true\n");
    }

    #[test]
    fn test_appends_arguments() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("hist");
        std::fs::write(&file, "test -d\n").unwrap();

        let out = ii(&file, &[tmp.path().to_str().unwrap()]);
        assert_eq!(out.stdout, format!("test -d {}\n", tmp.path().display()));
        assert_eq!(out.code, 0);
    }

    #[test]
    fn test_failing_command() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("hist");
        std::fs::write(&file, "false\n").unwrap();

        let out = ii(&file, &[]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("exited with status 1"));
    }

    #[test]
    fn test_empty_history() {
        let tmp = tempdir().unwrap();
        let out = ii(&tmp.path().join("none"), &[]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("no previous command"));
    }
}

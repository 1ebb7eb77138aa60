//! Argument parsing shared by every utility
//!
//! Records are clap derives. On top of clap this module adds the rule that
//! a value-taking short flag may only open a bundle (`-n5`), never follow
//! other flags in one (`-qn 5`).

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory};
use std::collections::HashSet;
use std::ffi::OsString;

use crate::cli::Utility;
use crate::core::UtilError;

/// Version text; clap prefixes it with the utility name.
pub const VERSION: &str = concat!("(unixkit) ", env!("CARGO_PKG_VERSION"), "\nwritten in Rust");

/// `-h/--help` and `-v/--version`, flattened into most records.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StdFlags {
    /// Print help
    #[arg(short = 'h', long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// Like [`StdFlags`] for utilities where `-v` means verbose.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct HelpFlags {
    /// Print help
    #[arg(short = 'h', long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Print version
    #[arg(long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// Outcome of parsing.
#[derive(Debug)]
pub enum Parsed<U> {
    Run(U),
    /// Help or version text to print before exiting successfully
    Exit(String),
}

/// Parse `args` (without the program name) into `U`.
pub fn parse<U: Utility>(args: &[OsString]) -> Result<Parsed<U>, UtilError> {
    let mut cmd = U::command();
    cmd.build();
    if !asks_for_help(args) {
        check_bundles(&cmd, args)?;
    }

    let argv = std::iter::once(OsString::from(U::NAME)).chain(args.iter().cloned());
    match U::try_parse_from(argv) {
        Ok(utility) => Ok(Parsed::Run(utility)),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(Parsed::Exit(e.to_string())),
            _ => Err(usage_from_clap(&e)),
        },
    }
}

/// `-h`, `--help` or `--version` appears before any `--`.
fn asks_for_help(args: &[OsString]) -> bool {
    args.iter()
        .take_while(|a| *a != "--")
        .any(|a| a == "-h" || a == "--help" || a == "--version")
}

/// First line of clap's message, without its `error: ` prefix.
fn usage_from_clap(err: &clap::Error) -> UtilError {
    let text = err.to_string();
    let first = text.lines().next().unwrap_or_default().trim();
    UtilError::usage(first.strip_prefix("error: ").unwrap_or(first))
}

/// Reject value-taking short flags that are not the first letter of a
/// bundle.
pub fn check_bundles(cmd: &clap::Command, args: &[OsString]) -> Result<(), UtilError> {
    let mut value_shorts = HashSet::new();
    let mut value_longs = HashSet::new();
    for arg in cmd.get_arguments().filter(|a| a.get_action().takes_values() && !a.is_positional()) {
        if let Some(short) = arg.get_short() {
            value_shorts.insert(short);
        }
        if let Some(long) = arg.get_long() {
            value_longs.insert(long);
        }
    }

    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        let Some(arg) = arg.to_str() else {
            continue;
        };
        if arg == "--" {
            break;
        }
        if let Some(long) = arg.strip_prefix("--") {
            skip_value = value_longs.contains(long);
            continue;
        }
        let Some(bundle) = arg.strip_prefix('-') else {
            continue;
        };

        for (idx, flag) in bundle.chars().enumerate() {
            if !value_shorts.contains(&flag) {
                continue;
            }
            if idx > 0 {
                return Err(UtilError::usage(format!(
                    "option '-{flag}' takes a value and cannot follow other flags in '{arg}'"
                )));
            }
            // Anything after the opening letter is its value
            skip_value = bundle.len() == 1;
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    #[command(
        name = "probe",
        version = VERSION,
        disable_help_flag = true,
        disable_version_flag = true
    )]
    struct Probe {
        #[arg(short = 'n')]
        count: Option<usize>,
        #[arg(short = 'q')]
        quiet: bool,
        #[arg(short = 'c')]
        chars: bool,
        #[command(flatten)]
        std: StdFlags,
        files: Vec<String>,
    }

    impl Utility for Probe {
        const NAME: &'static str = "probe";
        fn run(self, _ctx: &mut crate::cli::Ctx<'_>) -> Result<(), UtilError> {
            Ok(())
        }
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn built() -> clap::Command {
        let mut cmd = Probe::command();
        cmd.build();
        cmd
    }

    fn parsed(args: &[&str]) -> Result<Parsed<Probe>, UtilError> {
        parse::<Probe>(&os(args))
    }

    #[test]
    fn test_bundles_union_flags() {
        match parsed(&["-qc", "f"]).unwrap() {
            Parsed::Run(p) => {
                assert!(p.quiet && p.chars);
                assert_eq!(p.files, ["f"]);
            }
            Parsed::Exit(_) => panic!("expected a record"),
        }
    }

    #[test]
    fn test_attached_value_is_accepted() {
        match parsed(&["-n5", "f"]).unwrap() {
            Parsed::Run(p) => assert_eq!(p.count, Some(5)),
            Parsed::Exit(_) => panic!("expected a record"),
        }
    }

    #[test]
    fn test_value_flag_inside_bundle_is_rejected() {
        let err = parsed(&["-qn", "5", "f"]).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("'-n'"));
    }

    #[test]
    fn test_separate_value_is_not_a_bundle() {
        // "-qc" is the value of -n here, not flags; clap then rejects it as a number
        let err = parsed(&["-n", "-qc"]).unwrap_err();
        assert!(err.is_usage());
        assert!(check_bundles(&built(), &os(&["-n", "-qn"])).is_ok());
    }

    #[test]
    fn test_unknown_flag_names_it() {
        let err = parsed(&["-z"]).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("-z"));
        assert!(!err.to_string().starts_with("error:"));
    }

    #[test]
    fn test_missing_value_names_flag() {
        let err = parsed(&["-n"]).unwrap_err();
        assert!(err.to_string().contains("-n"));
    }

    #[test]
    fn test_help_wins_over_bad_bundle() {
        match parsed(&["-qn", "5", "-h"]).unwrap() {
            Parsed::Exit(text) => assert!(text.contains("Usage")),
            Parsed::Run(_) => panic!("help should short-circuit"),
        }
        assert!(matches!(parsed(&["-qn", "5", "--version"]), Ok(Parsed::Exit(_))));

        // After `--` it is an operand
        let err = parsed(&["-qn", "5", "--", "-h"]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_help_and_version_short_circuit() {
        match parsed(&["-h", "-z"]).unwrap() {
            Parsed::Exit(text) => assert!(text.contains("Usage")),
            Parsed::Run(_) => panic!("help should short-circuit"),
        }
        match parsed(&["--version"]).unwrap() {
            Parsed::Exit(text) => {
                assert!(text.starts_with("probe (unixkit) "));
                assert!(text.contains("written in Rust"));
            }
            Parsed::Run(_) => panic!("version should short-circuit"),
        }
    }

    #[test]
    fn test_double_dash_ends_checks() {
        assert!(check_bundles(&built(), &os(&["--", "-qn"])).is_ok());
    }
}

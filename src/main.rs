use clap::{Parser, Subcommand};
use clap_complete::Shell;
use miette::{miette, IntoDiagnostic, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use unixkit::cli::commands::{self, APPLETS};
use unixkit::cli::{completions, reset_sigpipe};

/// Multi-call front end: `unixkit <utility> [ARGS]...`, or invoked through
/// a link named after the utility.
#[derive(Parser, Debug)]
#[command(name = "unixkit", version, about = "Classic Unix utilities in one binary")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available utilities
    List,

    /// Print a shell completion script for a utility
    Completions {
        #[arg(value_enum)]
        shell: Shell,
        utility: String,
    },

    /// Run a utility
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

fn list() -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for applet in APPLETS {
        let aliases = if applet.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", applet.aliases.join(", "))
        };
        writeln!(out, "{:<10}{}{aliases}", applet.name, applet.about()).into_diagnostic()?;
    }
    Ok(())
}

fn dispatch(name: &str, args: &[OsString]) -> Result<()> {
    let applet = commands::find(name).ok_or_else(|| {
        miette!(
            code = "unixkit::unknown_utility",
            help = "run `unixkit list` to see the available utilities",
            "unknown utility '{name}'"
        )
    })?;
    std::process::exit((applet.run)(args))
}

fn main() -> Result<()> {
    reset_sigpipe();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let mut argv = std::env::args_os();
    let program = argv.next().unwrap_or_default();
    let invoked = Path::new(&program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if invoked != "unixkit" && commands::find(&invoked).is_some() {
        let rest: Vec<OsString> = argv.collect();
        return dispatch(&invoked, &rest);
    }

    let cli = Cli::parse();
    match cli.command {
        None | Some(Command::List) => list(),
        Some(Command::Completions { shell, utility }) => {
            let stdout = std::io::stdout();
            completions::run(shell, &utility, &mut stdout.lock())?;
            Ok(())
        }
        Some(Command::External(words)) => {
            let Some((name, rest)) = words.split_first() else {
                return list();
            };
            dispatch(&name.to_string_lossy(), rest)
        }
    }
}

//! CLI module - the shared runner every utility goes through
//!
//! A utility is a `clap::Parser` record plus an executor ([`Utility::run`]).
//! The runner parses an explicit argument slice, handles help/version, runs
//! the executor against a [`Ctx`] and turns the outcome into an exit status.

pub mod args;
pub mod commands;
pub mod completions;
pub mod helpers;

use miette::Diagnostic;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};

use crate::core::{logging, Config, UtilError};
use args::Parsed;

/// One command-line utility.
pub trait Utility: clap::Parser {
    /// Name used in diagnostics and for dispatch
    const NAME: &'static str;

    /// Perform the operation. Per-operand failures go through
    /// [`Ctx::report`]; returning `Err` stops the utility.
    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError>;
}

/// What an executor gets to work with.
pub struct Ctx<'a> {
    pub name: &'static str,
    pub config: &'a Config,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub input: &'a mut dyn BufRead,
    /// Standard output is an interactive terminal
    pub terminal: bool,
    failures: usize,
}

impl<'a> Ctx<'a> {
    pub fn new(
        name: &'static str,
        config: &'a Config,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
        input: &'a mut dyn BufRead,
    ) -> Self {
        Self {
            name,
            config,
            out,
            err,
            input,
            terminal: false,
            failures: 0,
        }
    }

    /// Print `<name>: <error>` (plus a help line if the error has one) and
    /// count the failure.
    pub fn report(&mut self, err: &UtilError) {
        tracing::debug!(utility = self.name, error = ?err, "reporting failure");
        let _ = writeln!(self.err, "{}: {err}", self.name);
        if let Some(help) = err.help() {
            let _ = writeln!(self.err, "{}: {help}", self.name);
        }
        self.failures += 1;
    }

    /// Print `<name>: <text>` to stderr without counting a failure.
    pub fn notice(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.err, "{}: {text}", self.name);
    }

    pub fn report_all(&mut self, errors: impl IntoIterator<Item = UtilError>) {
        for err in errors {
            self.report(&err);
        }
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Write one line to standard output.
    pub fn line(&mut self, text: impl std::fmt::Display) -> Result<(), UtilError> {
        writeln!(self.out, "{text}").map_err(write_error)
    }

    /// Write raw bytes to standard output.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), UtilError> {
        self.out.write_all(bytes).map_err(write_error)
    }

    /// Flush pending output, e.g. before handing the terminal to a child.
    pub fn flush(&mut self) -> Result<(), UtilError> {
        self.out.flush().map_err(write_error)
    }

    /// Show `question` on stderr and read one line of reply.
    pub fn prompt(&mut self, question: &str) -> Result<String, UtilError> {
        self.flush()?;
        write!(self.err, "{}: {question}", self.name)
            .and_then(|()| self.err.flush())
            .map_err(write_error)?;

        let mut reply = String::new();
        self.input
            .read_line(&mut reply)
            .map_err(|e| UtilError::io("read error", e))?;
        Ok(reply.trim().to_string())
    }

    /// Prompt and accept `y`/`yes` in any case.
    pub fn confirm(&mut self, question: &str) -> Result<bool, UtilError> {
        let reply = self.prompt(question)?;
        Ok(matches!(reply.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

fn write_error(err: io::Error) -> UtilError {
    UtilError::io("write error", err)
}

/// Run `U` over `args` (the arguments after the program name) with the
/// given streams. Returns the exit status.
pub fn run_with<U: Utility>(
    args: &[OsString],
    config: &Config,
    terminal: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
    input: &mut dyn BufRead,
) -> i32 {
    let mut ctx = Ctx::new(U::NAME, config, out, err, input);
    ctx.terminal = terminal;

    let utility = match args::parse::<U>(args) {
        Ok(Parsed::Run(utility)) => utility,
        Ok(Parsed::Exit(text)) => {
            let _ = ctx.out.write_all(text.as_bytes());
            let _ = ctx.out.flush();
            return 0;
        }
        Err(e) => {
            ctx.report(&e);
            return 1;
        }
    };

    if let Err(e) = utility.run(&mut ctx) {
        ctx.report(&e);
    }
    if let Err(e) = ctx.flush() {
        ctx.report(&e);
    }

    if ctx.failures() > 0 {
        1
    } else {
        0
    }
}

/// Run `U` as a process: load configuration, set up logging, and wire the
/// real standard streams.
pub fn start<U: Utility>(args: &[OsString]) -> i32 {
    reset_sigpipe();

    let config = Config::load();
    logging::init(&config);
    if let Some(ref problem) = config.load_error {
        tracing::warn!("ignoring config file: {problem}");
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let stderr = io::stderr();
    let mut err = stderr.lock();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let terminal = console::Term::stdout().is_term();
    run_with::<U>(args, &config, terminal, &mut out, &mut err, &mut input)
}

/// Entry point for a single-utility binary.
pub fn main<U: Utility>() -> ! {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let code = start::<U>(&args);
    std::process::exit(code)
}

/// Restore the default SIGPIPE action so `ls | head` ends quietly.
pub fn reset_sigpipe() {
    // SAFETY: setting a signal disposition to its default has no
    // preconditions
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

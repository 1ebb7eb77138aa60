//! `nl` - number lines of a file

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

/// Which lines get a number.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyMode {
    /// All lines
    A,
    /// Only non-empty lines
    T,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// Left justified
    Ln,
    /// Right justified
    Rn,
    /// Right justified with leading zeros
    Rz,
}

#[derive(Parser, Debug)]
#[command(
    name = "nl",
    version = VERSION,
    about = "Write FILE to standard output with line numbers added",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct NlArgs {
    /// Body numbering style
    #[arg(short = 'b', value_enum, default_value = "a")]
    pub body: BodyMode,

    /// Line number format
    #[arg(short = 'n', value_enum, default_value = "rn")]
    pub format: NumberFormat,

    /// Line number width
    #[arg(short = 'w', default_value_t = 6, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub width: u8,

    /// Separator between number and line
    #[arg(short = 's', default_value = "\t", hide_default_value = true)]
    pub separator: String,

    /// Input file; standard input when absent or `-`
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl NlArgs {
    fn label(&self, n: u64) -> String {
        let width = self.width as usize;
        match self.format {
            NumberFormat::Ln => format!("{n:<width$}"),
            NumberFormat::Rn => format!("{n:>width$}"),
            NumberFormat::Rz => format!("{n:0>width$}"),
        }
    }

    fn number<R: BufRead + ?Sized>(&self, reader: &mut R, out: &mut dyn Write) -> io::Result<()> {
        let mut line = Vec::new();
        let mut n = 0;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            let blank = line.iter().all(|b| b.is_ascii_whitespace());
            if self.body == BodyMode::T && blank {
                out.write_all(&line)?;
                continue;
            }
            n += 1;
            write!(out, "{}{}", self.label(n), self.separator)?;
            out.write_all(&line)?;
        }
    }
}

impl Utility for NlArgs {
    const NAME: &'static str = "nl";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        match self.file {
            Some(ref path) if path.as_os_str() != "-" => {
                let file = File::open(path).with_path(path)?;
                self.number(&mut BufReader::new(file), ctx.out).with_path(path)
            }
            _ => self
                .number(ctx.input, ctx.out)
                .with_context(|| "standard input".to_string()),
        }
    }
}

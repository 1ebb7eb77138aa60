//! `head` - output the first part of files

use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "head",
    version = VERSION,
    about = "Print the first 10 lines of each FILE",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct HeadArgs {
    /// Print the first N lines
    #[arg(short = 'n', value_name = "N", default_value_t = 10)]
    pub lines: u64,

    /// Print the first N bytes
    #[arg(short = 'c', value_name = "N", conflicts_with = "lines")]
    pub bytes: Option<u64>,

    /// Never print headers giving file names
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Files to read; `-` reads standard input
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Copy the first `n` lines of `reader` to `out`.
pub fn head_lines<R: BufRead + ?Sized>(
    reader: &mut R,
    out: &mut dyn Write,
    n: u64,
) -> io::Result<()> {
    let mut line = Vec::new();
    for _ in 0..n {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        out.write_all(&line)?;
    }
    Ok(())
}

/// Copy the first `n` bytes of `reader` to `out`.
pub fn head_bytes<R: Read + ?Sized>(reader: &mut R, out: &mut dyn Write, n: u64) -> io::Result<()> {
    io::copy(&mut reader.take(n), out)?;
    Ok(())
}

impl HeadArgs {
    fn copy(&self, reader: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<()> {
        match self.bytes {
            Some(n) => head_bytes(reader, out, n),
            None => head_lines(reader, out, self.lines),
        }
    }
}

impl Utility for HeadArgs {
    const NAME: &'static str = "head";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let headers = self.files.len() > 1 && !self.quiet;
        let mut first = true;

        for path in &self.files {
            let result = if path.as_os_str() == "-" {
                Ok(None)
            } else {
                File::open(path).map(|f| Some(BufReader::new(f))).with_path(path)
            };
            let mut file = match result {
                Ok(file) => file,
                Err(e) => {
                    ctx.report(&e);
                    continue;
                }
            };

            if headers {
                let name = if file.is_none() {
                    "standard input".to_string()
                } else {
                    path.display().to_string()
                };
                let gap = if first { "" } else { "\n" };
                ctx.line(format!("{gap}==> {name} <=="))?;
            }
            first = false;

            let copied = match file {
                Some(ref mut reader) => self.copy(reader, ctx.out).with_path(path),
                None => self
                    .copy(ctx.input, ctx.out)
                    .with_context(|| "standard input".to_string()),
            };
            if let Err(e) = copied {
                ctx.report(&e);
            }
        }
        Ok(())
    }
}

//! `cat` - concatenate files to standard output

use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "cat",
    version = VERSION,
    about = "Concatenate FILE(s) to standard output",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct CatArgs {
    /// Show all: non-printing characters as ^X and M-X, tabs as ^I, `$` at line ends
    #[arg(short = 'A')]
    pub show_all: bool,

    /// Number non-blank output lines (overrides -n)
    #[arg(short = 'b')]
    pub number_nonblank: bool,

    /// Number all output lines
    #[arg(short = 'n')]
    pub number: bool,

    /// Display `$` at the end of each line
    #[arg(short = 'e')]
    pub show_ends: bool,

    /// Files to concatenate; `-` reads standard input
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Append `byte` in caret/meta notation.
fn push_visible(out: &mut Vec<u8>, byte: u8) {
    let mut b = byte;
    if b >= 0x80 {
        out.extend_from_slice(b"M-");
        b -= 0x80;
    }
    match b {
        0x7f => out.extend_from_slice(b"^?"),
        0..=0x1f => {
            out.push(b'^');
            out.push(b + 0x40);
        }
        _ => out.push(b),
    }
}

/// Line-by-line renderer; keeps the line number across files.
struct Renderer<'a> {
    args: &'a CatArgs,
    line_no: u64,
}

impl Renderer<'_> {
    fn plain(&self) -> bool {
        !(self.args.show_all
            || self.args.number
            || self.args.number_nonblank
            || self.args.show_ends)
    }

    fn render<R: BufRead + ?Sized>(
        &mut self,
        reader: &mut R,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        if self.plain() {
            io::copy(reader, out)?;
            return Ok(());
        }

        let mut line = Vec::new();
        let mut rendered = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            let newline = line.last() == Some(&b'\n');
            let content = if newline { &line[..line.len() - 1] } else { &line[..] };

            rendered.clear();
            let numbered = if self.args.number_nonblank {
                !content.is_empty()
            } else {
                self.args.number
            };
            if numbered {
                self.line_no += 1;
                rendered.extend_from_slice(format!("{:>6}\t", self.line_no).as_bytes());
            }

            if self.args.show_all {
                for &b in content {
                    push_visible(&mut rendered, b);
                }
            } else {
                rendered.extend_from_slice(content);
            }

            if newline {
                if self.args.show_all || self.args.show_ends {
                    rendered.push(b'$');
                }
                rendered.push(b'\n');
            }
            out.write_all(&rendered)?;
        }
    }
}

impl Utility for CatArgs {
    const NAME: &'static str = "cat";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let mut renderer = Renderer {
            args: &self,
            line_no: 0,
        };

        for path in &self.files {
            let result = if path.as_os_str() == "-" {
                renderer
                    .render(ctx.input, ctx.out)
                    .with_context(|| "standard input".to_string())
            } else {
                File::open(path)
                    .and_then(|file| renderer.render(&mut BufReader::new(file), ctx.out))
                    .with_path(path)
            };
            if let Err(e) = result {
                ctx.report(&e);
            }
        }
        Ok(())
    }
}

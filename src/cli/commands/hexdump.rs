//! `hexdump` - display file contents in hexadecimal

use clap::Parser;
use std::fs;
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

const LINE: usize = 16;

#[derive(Parser, Debug)]
#[command(
    name = "hexdump",
    version = VERSION,
    about = "Display the contents of FILE(s), concatenated, in hexadecimal",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct HexdumpArgs {
    /// Canonical hex+ASCII display
    #[arg(short = 'C')]
    pub canonical: bool,

    /// Interpret only LENGTH bytes of input
    #[arg(short = 'n', value_name = "LENGTH")]
    pub length: Option<u64>,

    /// Skip OFFSET bytes from the beginning of the input
    #[arg(short = 's', value_name = "OFFSET", default_value_t = 0)]
    pub skip: u64,

    /// Files to dump; `-` reads standard input
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

fn canonical_line(offset: u64, chunk: &[u8]) -> String {
    let mut line = format!("{offset:08x}  ");
    for i in 0..LINE {
        match chunk.get(i) {
            Some(b) => line.push_str(&format!("{b:02x} ")),
            None => line.push_str("   "),
        }
        if i == 7 {
            line.push(' ');
        }
    }
    line.push_str(" |");
    line.extend(chunk.iter().map(|&b| {
        if b.is_ascii_graphic() || b == b' ' {
            b as char
        } else {
            '.'
        }
    }));
    line.push('|');
    line
}

/// Little-endian 16-bit words; an odd final byte stands alone.
fn word_line(offset: u64, chunk: &[u8]) -> String {
    let mut line = format!("{offset:07x}");
    for pair in chunk.chunks(2) {
        let word = match *pair {
            [lo, hi] => u16::from_le_bytes([lo, hi]),
            [lo] => u16::from(lo),
            _ => continue,
        };
        line.push_str(&format!(" {word:04x}"));
    }
    line
}

/// Format `data`, whose first byte sits at `start` in the input. Runs of
/// identical full lines collapse into a single `*`.
pub fn dump(data: &[u8], start: u64, canonical: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&[u8]> = None;
    let mut squeezing = false;

    for (idx, chunk) in data.chunks(LINE).enumerate() {
        let offset = start + (idx * LINE) as u64;
        if chunk.len() == LINE && previous == Some(chunk) {
            if !squeezing {
                lines.push("*".to_string());
                squeezing = true;
            }
            continue;
        }
        squeezing = false;
        previous = Some(chunk);
        lines.push(if canonical {
            canonical_line(offset, chunk)
        } else {
            word_line(offset, chunk)
        });
    }

    let end = start + data.len() as u64;
    lines.push(if canonical {
        format!("{end:08x}")
    } else {
        format!("{end:07x}")
    });
    lines
}

impl Utility for HexdumpArgs {
    const NAME: &'static str = "hexdump";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let mut data = Vec::new();
        for path in &self.files {
            let read = if path.as_os_str() == "-" {
                ctx.input
                    .read_to_end(&mut data)
                    .map(|_| ())
                    .with_context(|| "standard input".to_string())
            } else {
                fs::read(path).map(|bytes| data.extend(bytes)).with_path(path)
            };
            if let Err(e) = read {
                ctx.report(&e);
            }
        }
        if data.is_empty() && ctx.failures() > 0 {
            return Ok(());
        }

        let start = self.skip.min(data.len() as u64);
        let end = match self.length {
            Some(n) => start.saturating_add(n).min(data.len() as u64),
            None => data.len() as u64,
        };
        for line in dump(&data[start as usize..end as usize], start, self.canonical) {
            ctx.line(line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{arg, run, run_input};
    use tempfile::tempdir;

    #[test]
    fn test_default_words() {
        let out = run_input::<HexdumpArgs>(&["-"], "hello\n");
        assert_eq!(out.stdout, "0000000 6568 6c6c 0a6f\n0000006\n");
    }

    #[test]
    fn test_odd_length() {
        assert_eq!(dump(b"abc", 0, false), ["0000000 6261 0063", "0000003"]);
    }

    #[test]
    fn test_canonical() {
        let out = run_input::<HexdumpArgs>(&["-C", "-"], "hello\n");
        assert_eq!(
            out.stdout,
            "00000000  68 65 6c 6c 6f 0a                                 |hello.|\n00000006\n"
        );
    }

    #[test]
    fn test_canonical_full_line() {
        let data: Vec<u8> = (0..16).collect();
        assert_eq!(
            dump(&data, 0, true)[0],
            "00000000  00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f  |................|"
        );
    }

    #[test]
    fn test_repeated_lines_squeeze() {
        let data = vec![0u8; 64];
        assert_eq!(
            dump(&data, 0, false),
            [
                "0000000 0000 0000 0000 0000 0000 0000 0000 0000",
                "*",
                "0000040"
            ]
        );
    }

    #[test]
    fn test_skip_and_length() {
        let out = run_input::<HexdumpArgs>(&["-C", "-s", "2", "-n", "3", "-"], "abcdefg");
        assert_eq!(
            out.stdout,
            "00000002  63 64 65                                          |cde|\n00000005\n"
        );
    }

    #[test]
    fn test_files_concatenate_and_failures_continue() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        std::fs::write(&a, "ab").unwrap();
        std::fs::write(&b, "cd").unwrap();

        let out = run::<HexdumpArgs>(&[arg(&a), arg(&tmp.path().join("none")), arg(&b)]);
        assert_eq!(out.code, 1);
        assert_eq!(out.stdout, "0000000 6261 6463\n0000004\n");
    }
}

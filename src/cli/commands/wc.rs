//! `wc` - count lines, words and bytes

use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "wc",
    version = VERSION,
    about = "Print line, word and byte counts for each FILE",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct WcArgs {
    /// Print the line counts
    #[arg(short = 'l')]
    pub lines: bool,

    /// Print the word counts
    #[arg(short = 'w')]
    pub words: bool,

    /// Print the byte counts
    #[arg(short = 'c')]
    pub bytes: bool,

    /// Files to count; `-` reads standard input
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub lines: u64,
    pub words: u64,
    pub bytes: u64,
}

impl std::ops::AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.words += other.words;
        self.bytes += other.bytes;
    }
}

/// Count a stream. Words are runs of non-whitespace bytes.
pub fn count(reader: &mut dyn Read) -> io::Result<Counts> {
    let mut reader = BufReader::new(reader);
    let mut counts = Counts::default();
    let mut in_word = false;

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        for &b in buf {
            if b == b'\n' {
                counts.lines += 1;
            }
            if b.is_ascii_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                counts.words += 1;
            }
        }
        let len = buf.len();
        counts.bytes += len as u64;
        reader.consume(len);
    }

    Ok(counts)
}

impl WcArgs {
    fn format(&self, counts: Counts, name: &str) -> String {
        let all = !(self.lines || self.words || self.bytes);
        let mut line = String::new();
        for (enabled, value) in [
            (self.lines, counts.lines),
            (self.words, counts.words),
            (self.bytes, counts.bytes),
        ] {
            if all || enabled {
                line.push_str(&format!("{value:<7} "));
            }
        }
        line.push_str(name);
        line
    }
}

impl Utility for WcArgs {
    const NAME: &'static str = "wc";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let mut total = Counts::default();

        for path in &self.files {
            let result = if path.as_os_str() == "-" {
                count(&mut ctx.input).with_context(|| "standard input".to_string())
            } else {
                File::open(path)
                    .and_then(|mut file| count(&mut file))
                    .with_path(path)
            };

            match result {
                Ok(counts) => {
                    total += counts;
                    ctx.line(self.format(counts, &path.display().to_string()))?;
                }
                Err(e) => ctx.report(&e),
            }
        }

        if self.files.len() > 1 {
            ctx.line(self.format(total, "total"))?;
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
    fn test_count_stream() {
        let counts = count(&mut "one two\nthree\n\n".as_bytes()).unwrap();
        assert_eq!(
            counts,
            Counts {
                lines: 3,
                words: 3,
                bytes: 15
            }
        );
    }

    #[test]
    fn test_lines_only_layout() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("file.txt");
        std::fs::write(&file, "a\nb\nc\n").unwrap();

        let out = run::<WcArgs>(&["-l", arg(&file)]);
        assert_eq!(out.code, 0);
        assert_eq!(out.stdout, format!("3       {}\n", file.display()));
    }

    #[test]
    fn test_default_order_and_total() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        std::fs::write(&a, "x y\n").unwrap();
        std::fs::write(&b, "z\n").unwrap();

        let out = run::<WcArgs>(&[arg(&a), arg(&b)]);
        let lines: Vec<&str> = out.stdout.lines().collect();
        assert_eq!(lines[0], format!("1       2       4       {}", a.display()));
        assert_eq!(lines[2], "2       3       6       total");
    }

    #[test]
    fn test_missing_file_does_not_stop_others() {
        let tmp = tempdir().unwrap();
        let good = tmp.path().join("good");
        std::fs::write(&good, "1\n").unwrap();

        let out = run::<WcArgs>(&["-l", arg(&tmp.path().join("missing")), arg(&good)]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.starts_with("wc: "));
        assert!(out.stderr.contains("No such file or directory"));
        assert!(out.stdout.contains("good"));
    }

    #[test]
    fn test_wide_counts_stay_separated() {
        let args = WcArgs::parse_from(["wc", "-lc", "big.bin"]);
        let counts = Counts {
            lines: 12_345_678,
            words: 0,
            bytes: 100_000_000,
        };
        assert_eq!(args.format(counts, "big.bin"), "12345678 100000000 big.bin");
    }

    #[test]
    fn test_stdin_operand() {
        let out = run_input::<WcArgs>(&["-w", "-"], "a b c");
        assert_eq!(out.stdout, "3       -\n");
    }

    #[test]
    fn test_requires_operand() {
        let out = run::<WcArgs>(&[]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("try '-h'"));
    }
}

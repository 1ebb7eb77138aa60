//! `tail` - output the last part of files

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

/// A count given as `N` (from the end) or `+N` (from the start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count {
    pub from_start: bool,
    pub n: u64,
}

impl FromStr for Count {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from_start, digits) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let n = digits
            .parse()
            .map_err(|_| format!("invalid number '{s}'"))?;
        Ok(Self { from_start, n })
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "tail",
    version = VERSION,
    about = "Print the last 10 lines of each FILE",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct TailArgs {
    /// Print the last N lines, or from line N with +N
    #[arg(short = 'n', value_name = "[+]N", default_value = "10")]
    pub lines: Count,

    /// Print the last N bytes, or from byte N with +N
    #[arg(short = 'c', value_name = "[+]N", conflicts_with = "lines")]
    pub bytes: Option<Count>,

    /// Never print headers giving file names
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Files to read; `-` reads standard input
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Slice of `data` holding the lines selected by `count`. A final line
/// without a newline still counts.
pub fn select_lines(data: &[u8], count: Count) -> &[u8] {
    if count.from_start {
        if count.n <= 1 {
            return data;
        }
        let start = data
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth((count.n - 2) as usize)
            .map_or(data.len(), |(i, _)| i + 1);
        return &data[start..];
    }

    if count.n == 0 {
        return &data[data.len()..];
    }
    // The trailing newline ends the last line rather than starting another
    let body = match data.last() {
        Some(b'\n') => &data[..data.len() - 1],
        _ => data,
    };
    let start = body
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, b)| **b == b'\n')
        .nth((count.n - 1) as usize)
        .map_or(0, |(i, _)| i + 1);
    &data[start..]
}

pub fn select_bytes(data: &[u8], count: Count) -> &[u8] {
    let len = data.len() as u64;
    let start = if count.from_start {
        count.n.saturating_sub(1).min(len)
    } else {
        len.saturating_sub(count.n)
    };
    &data[start as usize..]
}

impl Utility for TailArgs {
    const NAME: &'static str = "tail";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let headers = self.files.len() > 1 && !self.quiet;
        let mut first = true;

        for path in &self.files {
            let stdin = path.as_os_str() == "-";
            let data = if stdin {
                let mut buf = Vec::new();
                ctx.input
                    .read_to_end(&mut buf)
                    .map(|_| buf)
                    .with_context(|| "standard input".to_string())
            } else {
                fs::read(path).with_path(path)
            };
            let data = match data {
                Ok(data) => data,
                Err(e) => {
                    ctx.report(&e);
                    continue;
                }
            };

            if headers {
                let name = if stdin {
                    "standard input".to_string()
                } else {
                    path.display().to_string()
                };
                let gap = if first { "" } else { "\n" };
                ctx.line(format!("{gap}==> {name} <=="))?;
            }
            first = false;

            let selected = match self.bytes {
                Some(count) => select_bytes(&data, count),
                None => select_lines(&data, self.lines),
            };
            ctx.write(selected)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{arg, run, run_input};
    use tempfile::tempdir;

    fn last(n: u64) -> Count {
        Count { from_start: false, n }
    }

    fn from(n: u64) -> Count {
        Count { from_start: true, n }
    }

    #[test]
    fn test_parse_count() {
        assert_eq!("5".parse::<Count>().unwrap(), last(5));
        assert_eq!("+5".parse::<Count>().unwrap(), from(5));
        assert!("-5".parse::<Count>().is_err());
    }

    #[test]
    fn test_select_last_lines() {
        let data = b"1\n2\n3\n4\n5\n";
        assert_eq!(select_lines(data, last(2)), b"4\n5\n");
        assert_eq!(select_lines(data, last(99)), data);
        assert_eq!(select_lines(data, last(0)), b"");
        assert_eq!(select_lines(b"a\nb", last(1)), b"b");
        assert_eq!(select_lines(b"only", last(3)), b"only");
    }

    #[test]
    fn test_select_from_line() {
        let data = b"1\n2\n3\n";
        assert_eq!(select_lines(data, from(2)), b"2\n3\n");
        assert_eq!(select_lines(data, from(1)), data);
        assert_eq!(select_lines(data, from(9)), b"");
    }

    #[test]
    fn test_select_bytes() {
        assert_eq!(select_bytes(b"abcdef", last(2)), b"ef");
        assert_eq!(select_bytes(b"abcdef", from(3)), b"cdef");
        assert_eq!(select_bytes(b"ab", last(10)), b"ab");
    }

    #[test]
    fn test_files_and_headers() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        std::fs::write(&a, "x\ny\nz\n").unwrap();

        let out = run::<TailArgs>(&["-n", "1", arg(&a), arg(&tmp.path().join("gone")), arg(&a)]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("gone"));
        assert_eq!(
            out.stdout,
            format!("==> {0} <==\nz\n\n==> {0} <==\nz\n", a.display())
        );
    }

    #[test]
    fn test_stdin_from_byte() {
        let out = run_input::<TailArgs>(&["-c", "+4", "-"], "abcdef");
        assert_eq!(out.stdout, "def");
    }
}

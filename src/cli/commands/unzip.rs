//! `unzip` - list or extract ZIP archives

use clap::Parser;
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::archive::{extract_zip, list_zip, ArchiveEntry};
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "unzip",
    version = VERSION,
    about = "Extract the members of a ZIP ARCHIVE, or list them",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct UnzipArgs {
    /// List the members instead of extracting
    #[arg(short = 'l')]
    pub list: bool,

    /// Archive to read (instead of the operand)
    #[arg(short = 'f', value_name = "ARCHIVE", conflicts_with = "operand")]
    pub file: Option<PathBuf>,

    /// Extract into DIR
    #[arg(short = 'o', value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    #[arg(value_name = "ARCHIVE", required_unless_present = "file")]
    pub operand: Option<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// `Length  Name` table with a total footer.
pub fn listing(entries: &[ArchiveEntry]) -> Vec<String> {
    let total: u64 = entries.iter().map(|e| e.size).sum();
    let mut lines = vec!["  Length  Name".to_string(), "--------  ----".to_string()];
    lines.extend(entries.iter().map(|e| format!("{:>8}  {}", e.size, e.name)));
    lines.push("--------  -------".to_string());
    let noun = if entries.len() == 1 { "file" } else { "files" };
    lines.push(format!("{total:>8}  {} {noun}", entries.len()));
    lines
}

impl Utility for UnzipArgs {
    const NAME: &'static str = "unzip";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let Some(archive) = self.file.or(self.operand) else {
            return Err(UtilError::usage("missing archive operand"));
        };

        if self.list {
            for line in listing(&list_zip(&archive)?) {
                ctx.line(line)?;
            }
            return Ok(());
        }

        let report = extract_zip(&archive, &self.output)?;
        for name in &report.entries {
            ctx.line(format_args!("  extracting: {name}"))?;
        }
        ctx.report_all(report.errors);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{arg, run};
    use crate::core::archive::write_zip;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_listing_layout() {
        let entries = vec![
            ArchiveEntry {
                name: "a.txt".into(),
                size: 5,
                is_dir: false,
            },
            ArchiveEntry {
                name: "dir/".into(),
                size: 0,
                is_dir: true,
            },
        ];
        assert_eq!(
            listing(&entries),
            vec![
                "  Length  Name",
                "--------  ----",
                "       5  a.txt",
                "       0  dir/",
                "--------  -------",
                "       5  2 files",
            ]
        );
    }

    #[test]
    fn test_list_and_extract() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("hello.txt");
        fs::write(&src, "hello").unwrap();
        let archive = tmp.path().join("h.zip");
        write_zip(&archive, &[src], false, false).unwrap();

        let listed = run::<UnzipArgs>(&["-l", arg(&archive)]);
        assert_eq!(listed.code, 0);
        assert!(listed.stdout.contains("       5  hello.txt"));
        assert!(listed.stdout.ends_with("       5  1 file\n"));

        let dest = tmp.path().join("out");
        let out = run::<UnzipArgs>(&["-f", arg(&archive), "-o", arg(&dest)]);
        assert_eq!(out.code, 0);
        assert_eq!(fs::read_to_string(dest.join("hello.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_missing_and_corrupt_archives() {
        assert_eq!(run::<UnzipArgs>(&[]).code, 1);

        let tmp = tempdir().unwrap();
        let bogus = tmp.path().join("bogus.zip");
        fs::write(&bogus, "not a zip").unwrap();
        assert_eq!(run::<UnzipArgs>(&["-l", arg(&bogus)]).code, 1);
    }
}

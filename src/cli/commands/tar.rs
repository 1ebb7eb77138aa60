//! `tar` - create, extract, or list gzip-compressed tar archives

use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::archive::{create_tar_gz, extract_tar_gz, list_tar_gz};
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "tar",
    version = VERSION,
    about = "Store FILE(s) in a gzip-compressed tar archive, or extract or list one",
    disable_help_flag = true,
    disable_version_flag = true,
    group(ArgGroup::new("mode").required(true).args(["create", "extract", "list"]))
)]
pub struct TarArgs {
    /// Create a new archive
    #[arg(short = 'c')]
    pub create: bool,

    /// Extract files from an archive
    #[arg(short = 'x')]
    pub extract: bool,

    /// List the contents of an archive
    #[arg(short = 't')]
    pub list: bool,

    /// Gzip compression (always on)
    #[arg(short = 'z')]
    pub gzip: bool,

    /// Archive file
    #[arg(short = 'f', value_name = "ARCHIVE", default_value = "archive.tar.gz")]
    pub archive: PathBuf,

    /// Change to DIR: inputs are taken from it, or extracted into it
    #[arg(short = 'C', value_name = "DIR")]
    pub directory: Option<PathBuf>,

    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

impl TarArgs {
    fn base(&self) -> &Path {
        self.directory.as_deref().unwrap_or(Path::new("."))
    }

    fn create(&self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        if self.files.is_empty() {
            return Err(UtilError::usage("cowardly refusing to create an empty archive"));
        }
        let inputs: Vec<PathBuf> = match self.directory {
            Some(ref dir) => self.files.iter().map(|f| dir.join(f)).collect(),
            None => self.files.clone(),
        };
        let report = create_tar_gz(&self.archive, &inputs)?;
        for path in &report.skipped {
            ctx.notice(format_args!("{}: file is the archive; not dumped", path.display()));
        }
        ctx.report_all(report.errors);
        ctx.line(format_args!("archive created: {}", self.archive.display()))
    }

    fn extract(&self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        if !self.files.is_empty() {
            return Err(UtilError::usage("member selection is not supported with -x"));
        }
        let report = extract_tar_gz(&self.archive, self.base())?;
        tracing::debug!(entries = report.entries.len(), "extracted");
        ctx.report_all(report.errors);
        ctx.line(format_args!("archive extracted: {}", self.archive.display()))
    }

    fn list(&self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        for entry in list_tar_gz(&self.archive)? {
            if entry.is_dir && !entry.name.ends_with('/') {
                ctx.line(format_args!("{}/", entry.name))?;
            } else {
                ctx.line(&entry.name)?;
            }
        }
        Ok(())
    }
}

impl Utility for TarArgs {
    const NAME: &'static str = "tar";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        if self.create {
            self.create(ctx)
        } else if self.extract {
            self.extract(ctx)
        } else {
            self.list(ctx)
        }
    }
}

//! `touch` - change file timestamps

use clap::Parser;
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::commands::date::parse_date;
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "touch",
    version = VERSION,
    about = "Update the access and modification times of each FILE, creating missing ones",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct TouchArgs {
    /// Change only the access time
    #[arg(short = 'a')]
    pub access: bool,

    /// Change only the modification time
    #[arg(short = 'm')]
    pub modify: bool,

    /// Do not create any files
    #[arg(short = 'c')]
    pub no_create: bool,

    /// Use DATE (RFC 3339) instead of the current time
    #[arg(short = 'd', value_name = "DATE", conflicts_with = "reference")]
    pub date: Option<String>,

    /// Use this file's times instead of the current time
    #[arg(short = 'r', value_name = "FILE")]
    pub reference: Option<PathBuf>,

    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Access and modification times to apply.
#[derive(Debug, Clone, Copy)]
struct Stamp {
    accessed: SystemTime,
    modified: SystemTime,
}

impl TouchArgs {
    fn stamp(&self) -> Result<Stamp, UtilError> {
        if let Some(ref reference) = self.reference {
            let meta = fs::metadata(reference).with_path(reference)?;
            return Ok(Stamp {
                accessed: meta.accessed().with_path(reference)?,
                modified: meta.modified().with_path(reference)?,
            });
        }
        let now = match self.date {
            Some(ref text) => SystemTime::from(parse_date(text)?),
            None => SystemTime::now(),
        };
        Ok(Stamp {
            accessed: now,
            modified: now,
        })
    }

    fn times(&self, stamp: Stamp) -> FileTimes {
        let both = !self.access && !self.modify;
        let mut times = FileTimes::new();
        if both || self.access {
            times = times.set_accessed(stamp.accessed);
        }
        if both || self.modify {
            times = times.set_modified(stamp.modified);
        }
        times
    }

    fn touch(&self, path: &Path, times: FileTimes) -> Result<(), UtilError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.no_create {
                    tracing::debug!(path = %path.display(), "not creating");
                    return Ok(());
                }
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(path)
                    .with_path(path)?
            }
            Err(e) => return Err(UtilError::path(path, e)),
        };
        file.set_times(times).with_path(path)
    }
}

impl Utility for TouchArgs {
    const NAME: &'static str = "touch";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let times = self.times(self.stamp()?);
        for path in &self.files {
            if let Err(e) = self.touch(path, times) {
                ctx.report(&e);
            }
        }
        Ok(())
    }
}

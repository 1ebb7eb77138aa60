//! `date` - print a date and time

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::Parser;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

/// RFC 1123 layout, used when no `+FORMAT` is given.
pub const DEFAULT_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

#[derive(Parser, Debug)]
#[command(
    name = "date",
    version = VERSION,
    about = "Display the current time, or a given one, in FORMAT",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct DateArgs {
    /// Display DATE (RFC 3339, e.g. 2026-01-13T12:00:00Z) instead of now
    #[arg(short = 'd', value_name = "DATE", conflicts_with_all = ["file", "reference"])]
    pub date: Option<String>,

    /// Display each RFC 3339 date listed in FILE, one per line
    #[arg(short = 'f', value_name = "FILE", conflicts_with = "reference")]
    pub file: Option<PathBuf>,

    /// Display the last modification time of FILE
    #[arg(short = 'r', value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Use Coordinated Universal Time
    #[arg(short = 'u')]
    pub utc: bool,

    /// Output format, strftime style, introduced by '+'
    #[arg(value_name = "+FORMAT")]
    pub format: Option<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Split a strftime format into items, rejecting unknown specifiers.
pub fn compile(format: &str) -> Result<Vec<Item<'_>>, UtilError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(UtilError::usage(format!("invalid format '{format}'")));
    }
    Ok(items)
}

fn render<Tz>(time: &DateTime<Tz>, items: &[Item<'_>]) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format_with_items(items.iter()).to_string()
}

pub fn parse_date(text: &str) -> Result<DateTime<Utc>, UtilError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| UtilError::failed(format!("invalid date '{text}'")))
}

impl DateArgs {
    fn stamp(&self, time: DateTime<Utc>, items: &[Item<'_>]) -> String {
        if self.utc {
            render(&time, items)
        } else {
            render(&time.with_timezone(&Local), items)
        }
    }
}

impl Utility for DateArgs {
    const NAME: &'static str = "date";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let format = match self.format.as_deref() {
            None => DEFAULT_FORMAT,
            Some(f) => f
                .strip_prefix('+')
                .ok_or_else(|| UtilError::usage(format!("invalid date '{f}'")))?,
        };
        let items = compile(format)?;

        if let Some(ref path) = self.file {
            let file = File::open(path).with_path(path)?;
            for line in BufReader::new(file).lines() {
                let line = line.with_path(path)?;
                if line.trim().is_empty() {
                    continue;
                }
                match parse_date(&line) {
                    Ok(time) => ctx.line(self.stamp(time, &items))?,
                    Err(e) => ctx.report(&e),
                }
            }
            return Ok(());
        }

        let time = if let Some(ref text) = self.date {
            parse_date(text)?
        } else if let Some(ref path) = self.reference {
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .with_path(path)?;
            DateTime::<Utc>::from(modified)
        } else {
            Utc::now()
        };
        ctx.line(self.stamp(time, &items))
    }
}

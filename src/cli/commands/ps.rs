//! `ps` - report a snapshot of the current processes

use chrono::{DateTime, Local, TimeZone};
use clap::Parser;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::procfs::{self, Process};
use crate::core::sys;
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "ps",
    version = VERSION,
    about = "Show processes of the current user, or of USER, or of everyone",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct PsArgs {
    /// All processes, short format (PID TTY TIME CMD)
    #[arg(short = 'a', overrides_with_all = ["user_format", "stat_format"])]
    pub all: bool,

    /// All processes, user-oriented full format
    #[arg(short = 'u', overrides_with_all = ["all", "stat_format"])]
    pub user_format: bool,

    /// All processes, with process state (PID TTY STAT TIME COMMAND)
    #[arg(short = 'g', overrides_with_all = ["all", "user_format"])]
    pub stat_format: bool,

    /// Only processes owned by USER (name or uid)
    #[arg(value_name = "USER")]
    pub user: Option<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Short,
    Stat,
    Full,
}

impl Format {
    fn header(self) -> &'static [&'static str] {
        match self {
            Format::Short => &["PID", "TTY", "TIME", "CMD"],
            Format::Stat => &["PID", "TTY", "STAT", "TIME", "COMMAND"],
            Format::Full => &[
                "USER", "PID", "%CPU", "%MEM", "VSZ", "RSS", "TTY", "STAT", "START", "TIME",
                "COMMAND",
            ],
        }
    }

    /// Numeric columns, right aligned
    fn numeric(self) -> std::ops::Range<usize> {
        match self {
            Format::Short | Format::Stat => 0..1,
            Format::Full => 1..6,
        }
    }
}

/// Machine-wide values needed to turn raw process fields into columns.
#[derive(Debug, Clone, Copy)]
pub struct Host {
    pub ticks: u64,
    pub page_size: u64,
    pub mem_total: u64,
    /// Seconds since boot
    pub uptime: f64,
    /// Boot time, seconds since the epoch
    pub boot_time: i64,
}

impl Host {
    fn read() -> Result<Self, UtilError> {
        Ok(Self {
            ticks: sys::clock_ticks(),
            page_size: sys::page_size(),
            mem_total: procfs::meminfo()
                .with_context(|| "/proc/meminfo".to_string())?
                .mem_total,
            uptime: procfs::uptime().with_context(|| "/proc/uptime".to_string())?,
            boot_time: procfs::boot_time().with_context(|| "/proc/stat".to_string())?,
        })
    }
}

/// Cumulative CPU time as `[DD-]HH:MM:SS`.
pub fn cpu_time(seconds: u64) -> String {
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    if days > 0 {
        format!("{days}-{clock}")
    } else {
        clock
    }
}

/// One formatted row.
pub fn row(
    process: &Process,
    user: &str,
    host: &Host,
    format: Format,
    now: DateTime<Local>,
) -> Vec<String> {
    let stat = &process.stat;
    let ticks = host.ticks.max(1);
    let cpu_secs = (stat.utime + stat.stime) / ticks;
    let tty = procfs::tty_name(stat.tty_nr);
    let time = cpu_time(cpu_secs);

    match format {
        Format::Short => vec![stat.pid.to_string(), tty, time, stat.comm.clone()],
        Format::Stat => vec![
            stat.pid.to_string(),
            tty,
            stat.state.to_string(),
            time,
            process.command.clone(),
        ],
        Format::Full => {
            let started_after_boot = stat.starttime as f64 / ticks as f64;
            let elapsed = host.uptime - started_after_boot;
            let total_ticks = (stat.utime + stat.stime) as f64 / ticks as f64;
            let cpu = if elapsed > 0.0 {
                total_ticks * 100.0 / elapsed
            } else {
                0.0
            };
            let rss_bytes = stat.rss.max(0) as u64 * host.page_size;
            let mem = if host.mem_total > 0 {
                rss_bytes as f64 * 100.0 / host.mem_total as f64
            } else {
                0.0
            };
            let start = Local
                .timestamp_opt(host.boot_time + started_after_boot as i64, 0)
                .single()
                .map_or_else(
                    || "?".to_string(),
                    |t| {
                        if t.date_naive() == now.date_naive() {
                            t.format("%H:%M").to_string()
                        } else {
                            t.format("%b%d").to_string()
                        }
                    },
                );

            vec![
                user.to_string(),
                stat.pid.to_string(),
                format!("{cpu:.1}"),
                format!("{mem:.1}"),
                (stat.vsize / 1024).to_string(),
                (rss_bytes / 1024).to_string(),
                tty,
                stat.state.to_string(),
                start,
                time,
                process.command.clone(),
            ]
        }
    }
}

pub fn table(format: Format, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(format.header().iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table
        .with(Style::blank())
        .modify(Columns::new(format.numeric()), Alignment::right());
    table.to_string()
}

impl PsArgs {
    fn format(&self) -> Format {
        if self.all {
            Format::Short
        } else if self.stat_format {
            Format::Stat
        } else {
            Format::Full
        }
    }

    /// uid to keep, or `None` for everyone.
    fn owner(&self) -> Result<Option<u32>, UtilError> {
        if let Some(ref user) = self.user {
            return sys::user_id(user)
                .or_else(|| user.parse().ok())
                .map(Some)
                .ok_or_else(|| UtilError::failed(format!("user '{user}' does not exist")));
        }
        if self.all || self.user_format || self.stat_format {
            Ok(None)
        } else {
            Ok(Some(sys::current_uid()))
        }
    }
}

impl Utility for PsArgs {
    const NAME: &'static str = "ps";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let owner = self.owner()?;
        let format = self.format();
        let host = Host::read()?;
        let now = Local::now();

        let mut rows = Vec::new();
        for pid in procfs::pids().with_context(|| "/proc".to_string())? {
            // Processes may exit between listing and reading
            let process = match procfs::read_process(pid) {
                Ok(process) => process,
                Err(e) => {
                    tracing::debug!(pid, error = %e, "skipping process");
                    continue;
                }
            };
            if owner.is_some_and(|uid| uid != process.uid) {
                continue;
            }
            let user = sys::user_name(process.uid).unwrap_or_else(|| process.uid.to_string());
            rows.push(row(&process, &user, &host, format, now));
        }

        ctx.line(table(format, rows))
    }
}

//! `df` - report filesystem disk space usage

use clap::Parser;
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::helpers::{parse_block_size, to_blocks};
use crate::cli::{Ctx, Utility};
use crate::core::procfs::{self, Mount};
use crate::core::sys::{self, FsStats};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "df",
    version = VERSION,
    about = "Show free and used space of mounted filesystems",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct DfArgs {
    /// Include pseudo, duplicate and inaccessible filesystems
    #[arg(short = 'a')]
    pub all: bool,

    /// Scale sizes by SIZE (e.g. 1024, K, 4M, G)
    #[arg(short = 'B', value_name = "SIZE")]
    pub block_size: Option<String>,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Render the usage table. `unit` names the block size in the header.
pub fn usage_table(rows: &[(Mount, FsStats)], block: u64, unit: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Filesystem".to_string(),
        format!("{unit}-blocks"),
        "Used".to_string(),
        "Available".to_string(),
        "Use%".to_string(),
        "Mounted on".to_string(),
    ]);
    for (mount, stats) in rows {
        builder.push_record([
            mount.device.clone(),
            to_blocks(stats.total, block).to_string(),
            to_blocks(stats.used(), block).to_string(),
            to_blocks(stats.available, block).to_string(),
            stats
                .use_percent()
                .map_or_else(|| "-".to_string(), |p| format!("{p}%")),
            mount.mount_point.clone(),
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::blank())
        .modify(Columns::new(1..5), Alignment::right());
    table.to_string()
}

impl Utility for DfArgs {
    const NAME: &'static str = "df";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let (block, unit) = match self.block_size.as_deref() {
            Some(text) => (parse_block_size(text)?, text.to_string()),
            None => (1024, "1K".to_string()),
        };

        let mounts = procfs::mounts().with_context(|| "/proc/mounts".to_string())?;
        let mut rows = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for mount in mounts {
            let stats = match sys::statvfs(Path::new(&mount.mount_point)) {
                Ok(stats) => stats,
                Err(e) if self.all => {
                    ctx.report(&UtilError::path(&mount.mount_point, e));
                    continue;
                }
                Err(e) => {
                    tracing::debug!(mount = %mount.mount_point, error = %e, "skipping mount");
                    continue;
                }
            };
            if !self.all {
                // Pseudo filesystems report no blocks; bind mounts repeat a device
                if stats.total == 0 || !seen.insert(mount.device.clone()) {
                    continue;
                }
            }
            rows.push((mount, stats));
        }

        ctx.line(usage_table(&rows, block, &unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::run;

    fn mount(device: &str, at: &str) -> Mount {
        Mount {
            device: device.into(),
            mount_point: at.into(),
            fstype: "ext4".into(),
        }
    }

    #[test]
    fn test_table_layout() {
        let rows = vec![(
            mount("/dev/sda1", "/"),
            FsStats {
                total: 10 * 1024 * 1024,
                free: 4 * 1024 * 1024,
                available: 3 * 1024 * 1024,
            },
        )];
        let text = usage_table(&rows, 1024, "1K");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("1K-blocks"));
        assert!(lines[0].contains("Mounted on"));
        let fields: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(fields, ["/dev/sda1", "10240", "6144", "3072", "67%", "/"]);
    }

    #[test]
    fn test_empty_filesystem_has_no_percent() {
        let rows = vec![(
            mount("proc", "/proc"),
            FsStats {
                total: 0,
                free: 0,
                available: 0,
            },
        )];
        let text = usage_table(&rows, 1 << 20, "M");
        assert!(text.contains("M-blocks"));
        assert!(text.lines().nth(1).unwrap().contains(" - "));
    }

    #[test]
    fn test_bad_block_size() {
        let out = run::<DfArgs>(&["-B", "lots"]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("invalid block size"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_lists_root() {
        let out = run::<DfArgs>(&[]);
        assert_eq!(out.code, 0, "{}", out.stderr);
        assert!(out.stdout.contains("Use%"));
    }
}

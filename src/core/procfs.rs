//! Readers for the Linux `/proc` filesystem
//!
//! Parsing is split from reading so the formats can be tested without a
//! live `/proc`.

use std::fs;
use std::io;
use std::path::Path;

const PROC: &str = "/proc";

// ============================================================================
// Processes
// ============================================================================

/// Fields of `/proc/<pid>/stat` used by `ps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStat {
    pub pid: i32,
    pub comm: String,
    pub state: char,
    pub ppid: i32,
    pub tty_nr: i32,
    /// User and system time in clock ticks
    pub utime: u64,
    pub stime: u64,
    /// Start time in clock ticks after boot
    pub starttime: u64,
    /// Virtual memory size in bytes
    pub vsize: u64,
    /// Resident set size in pages
    pub rss: i64,
}

/// Parse a `stat` line.
///
/// `comm` may itself contain spaces and parentheses, so it runs from the
/// first `(` to the *last* `)`.
pub fn parse_stat(line: &str) -> Option<ProcessStat> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    let pid = line[..open].trim().parse().ok()?;
    let comm = line.get(open + 1..close)?.to_string();

    // Fields after comm, numbered from 3 ("state") in proc(5)
    let rest: Vec<&str> = line.get(close + 1..)?.split_whitespace().collect();
    let field = |n: usize| rest.get(n - 3).copied();

    Some(ProcessStat {
        pid,
        comm,
        state: field(3)?.chars().next()?,
        ppid: field(4)?.parse().ok()?,
        tty_nr: field(7)?.parse().ok()?,
        utime: field(14)?.parse().ok()?,
        stime: field(15)?.parse().ok()?,
        starttime: field(22)?.parse().ok()?,
        vsize: field(23)?.parse().ok()?,
        rss: field(24)?.parse().ok()?,
    })
}

/// Real uid from the `Uid:` line of `/proc/<pid>/status`.
pub fn parse_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|uid| uid.parse().ok())
}

/// Turn a NUL-separated `cmdline` into a space-separated command.
pub fn parse_cmdline(raw: &[u8]) -> String {
    raw.split(|b| *b == 0)
        .filter(|part| !part.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name of the controlling terminal encoded in `tty_nr`, `?` for none.
pub fn tty_name(tty_nr: i32) -> String {
    if tty_nr == 0 {
        return "?".to_string();
    }
    let nr = tty_nr as u32;
    let major = (nr >> 8) & 0xfff;
    let minor = (nr & 0xff) | ((nr >> 12) & 0xfff00);
    match major {
        4 if minor < 64 => format!("tty{minor}"),
        4 => format!("ttyS{}", minor - 64),
        136..=143 => format!("pts/{}", (major - 136) * 256 + minor),
        _ => format!("{major}:{minor}"),
    }
}

/// A process as `ps` shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub stat: ProcessStat,
    pub uid: u32,
    /// Full command line, or `[comm]` for kernel threads
    pub command: String,
}

/// Read one process. Fails if it vanished or is unreadable.
pub fn read_process(pid: i32) -> io::Result<Process> {
    let dir = Path::new(PROC).join(pid.to_string());
    let invalid =
        |what: &str| io::Error::new(io::ErrorKind::InvalidData, format!("malformed {what}"));

    let stat = parse_stat(&fs::read_to_string(dir.join("stat"))?).ok_or_else(|| invalid("stat"))?;
    let uid = parse_uid(&fs::read_to_string(dir.join("status"))?).ok_or_else(|| invalid("status"))?;
    let command = match fs::read(dir.join("cmdline")).map(|raw| parse_cmdline(&raw)) {
        Ok(cmd) if !cmd.is_empty() => cmd,
        _ => format!("[{}]", stat.comm),
    };

    Ok(Process { stat, uid, command })
}

/// PIDs currently listed in `/proc`, ascending.
pub fn pids() -> io::Result<Vec<i32>> {
    let mut pids: Vec<i32> = fs::read_dir(PROC)?
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().to_str().and_then(|n| n.parse().ok()))
        .collect();
    pids.sort_unstable();
    Ok(pids)
}

/// Boot time (seconds since the epoch) from the `btime` line of `/proc/stat`.
pub fn parse_btime(stat: &str) -> Option<i64> {
    stat.lines()
        .find_map(|line| line.strip_prefix("btime"))
        .and_then(|v| v.trim().parse().ok())
}

pub fn boot_time() -> io::Result<i64> {
    let text = fs::read_to_string(Path::new(PROC).join("stat"))?;
    parse_btime(&text)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no btime in /proc/stat"))
}

/// Seconds since boot from `/proc/uptime`.
pub fn uptime() -> io::Result<f64> {
    let text = fs::read_to_string(Path::new(PROC).join("uptime"))?;
    text.split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed /proc/uptime"))
}

// ============================================================================
// Mounts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub device: String,
    pub mount_point: String,
    pub fstype: String,
}

/// Undo the octal escapes (`\040` for space) used in `/proc/mounts`.
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = std::str::from_utf8(&bytes[i + 1..i + 4]).ok();
            if let Some(value) = digits.and_then(|d| u8::from_str_radix(d, 8).ok()) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub fn parse_mounts(text: &str) -> Vec<Mount> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            Some(Mount {
                device: unescape_octal(fields.next()?),
                mount_point: unescape_octal(fields.next()?),
                fstype: fields.next()?.to_string(),
            })
        })
        .collect()
}

pub fn mounts() -> io::Result<Vec<Mount>> {
    Ok(parse_mounts(&fs::read_to_string(Path::new(PROC).join("mounts"))?))
}

// ============================================================================
// Memory
// ============================================================================

/// Values from `/proc/meminfo`, in bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub mem_available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shmem: u64,
    pub sreclaimable: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemInfo {
    /// Page cache plus reclaimable slab, as `free` reports it
    pub fn buff_cache(&self) -> u64 {
        self.buffers + self.cached + self.sreclaimable
    }

    pub fn mem_used(&self) -> u64 {
        self.mem_total
            .saturating_sub(self.mem_free)
            .saturating_sub(self.buff_cache())
    }

    pub fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

pub fn parse_meminfo(text: &str) -> MemInfo {
    let mut info = MemInfo::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let mut parts = value.split_whitespace();
        let Some(amount) = parts.next().and_then(|v| v.parse::<u64>().ok()) else {
            continue;
        };
        let bytes = match parts.next() {
            Some("kB") => amount * 1024,
            _ => amount,
        };
        let slot = match key.trim() {
            "MemTotal" => &mut info.mem_total,
            "MemFree" => &mut info.mem_free,
            "MemAvailable" => &mut info.mem_available,
            "Buffers" => &mut info.buffers,
            "Cached" => &mut info.cached,
            "Shmem" => &mut info.shmem,
            "SReclaimable" => &mut info.sreclaimable,
            "SwapTotal" => &mut info.swap_total,
            "SwapFree" => &mut info.swap_free,
            _ => continue,
        };
        *slot = bytes;
    }
    info
}

pub fn meminfo() -> io::Result<MemInfo> {
    Ok(parse_meminfo(&fs::read_to_string(Path::new(PROC).join("meminfo"))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_with_awkward_comm() {
        let line = "4242 (my (odd) prog) S 1 4242 4242 34817 4242 4194560 100 0 0 0 \
                    250 30 0 0 20 0 1 0 12345 10485760 512 18446744073709551615";
        let stat = parse_stat(line).unwrap();
        assert_eq!(stat.pid, 4242);
        assert_eq!(stat.comm, "my (odd) prog");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1);
        assert_eq!(stat.tty_nr, 34817);
        assert_eq!(stat.utime, 250);
        assert_eq!(stat.stime, 30);
        assert_eq!(stat.starttime, 12345);
        assert_eq!(stat.vsize, 10485760);
        assert_eq!(stat.rss, 512);
    }

    #[test]
    fn test_parse_stat_rejects_truncated() {
        assert!(parse_stat("12 (x) S 1 2").is_none());
        assert!(parse_stat("garbage").is_none());
    }

    #[test]
    fn test_tty_names() {
        assert_eq!(tty_name(0), "?");
        assert_eq!(tty_name(34817), "pts/1");
        assert_eq!(tty_name(1025), "tty1");
        assert_eq!(tty_name((4 << 8) | 64), "ttyS0");
    }

    #[test]
    fn test_parse_uid_and_cmdline() {
        let status = "Name:\tbash\nUid:\t1000\t1000\t1000\t1000\nGid:\t100\n";
        assert_eq!(parse_uid(status), Some(1000));
        assert_eq!(parse_cmdline(b"vim\0-u\0NONE\0"), "vim -u NONE");
        assert_eq!(parse_cmdline(b""), "");
    }

    #[test]
    fn test_parse_btime() {
        let stat = "cpu  1 2 3\nctxt 99\nbtime 1700000000\nprocesses 5\n";
        assert_eq!(parse_btime(stat), Some(1_700_000_000));
    }

    #[test]
    fn test_parse_mounts_unescapes() {
        let text = "/dev/sda1 / ext4 rw 0 0\n/dev/sdb1 /mnt/my\\040disk vfat rw 0 0\n";
        let mounts = parse_mounts(text);
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[1].mount_point, "/mnt/my disk");
        assert_eq!(mounts[0].fstype, "ext4");
    }

    #[test]
    fn test_parse_meminfo() {
        let text = "MemTotal:       16000 kB\nMemFree:         4000 kB\nBuffers:          500 kB\n\
                    Cached:          2500 kB\nSReclaimable:     1000 kB\nSwapTotal:       8000 kB\n\
                    SwapFree:        6000 kB\nHugePages_Total:    0\n";
        let info = parse_meminfo(text);
        assert_eq!(info.mem_total, 16000 * 1024);
        assert_eq!(info.buff_cache(), 4000 * 1024);
        assert_eq!(info.mem_used(), 8000 * 1024);
        assert_eq!(info.swap_used(), 2000 * 1024);
    }
}

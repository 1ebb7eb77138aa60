//! Thin safe wrappers over the libc calls the utilities need

use std::ffi::{CStr, CString};
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn check(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

// ============================================================================
// Signals and processes
// ============================================================================

/// Signal names without the `SIG` prefix, in number order.
pub const SIGNALS: &[(&str, libc::c_int)] = &[
    ("HUP", libc::SIGHUP),
    ("INT", libc::SIGINT),
    ("QUIT", libc::SIGQUIT),
    ("ILL", libc::SIGILL),
    ("TRAP", libc::SIGTRAP),
    ("ABRT", libc::SIGABRT),
    ("BUS", libc::SIGBUS),
    ("FPE", libc::SIGFPE),
    ("KILL", libc::SIGKILL),
    ("USR1", libc::SIGUSR1),
    ("SEGV", libc::SIGSEGV),
    ("USR2", libc::SIGUSR2),
    ("PIPE", libc::SIGPIPE),
    ("ALRM", libc::SIGALRM),
    ("TERM", libc::SIGTERM),
    ("CHLD", libc::SIGCHLD),
    ("CONT", libc::SIGCONT),
    ("STOP", libc::SIGSTOP),
    ("TSTP", libc::SIGTSTP),
    ("TTIN", libc::SIGTTIN),
    ("TTOU", libc::SIGTTOU),
    ("URG", libc::SIGURG),
    ("XCPU", libc::SIGXCPU),
    ("XFSZ", libc::SIGXFSZ),
    ("VTALRM", libc::SIGVTALRM),
    ("PROF", libc::SIGPROF),
    ("WINCH", libc::SIGWINCH),
    ("IO", libc::SIGIO),
    ("SYS", libc::SIGSYS),
];

/// Resolve `9`, `KILL`, `SIGKILL` or `kill` to a signal number.
pub fn signal_number(text: &str) -> Option<libc::c_int> {
    if let Ok(num) = text.parse::<libc::c_int>() {
        return (num == 0 || SIGNALS.iter().any(|(_, n)| *n == num)).then_some(num);
    }
    let upper = text.to_ascii_uppercase();
    let name = upper.strip_prefix("SIG").unwrap_or(&upper);
    SIGNALS.iter().find(|(n, _)| *n == name).map(|(_, num)| *num)
}

pub fn signal_name(num: libc::c_int) -> Option<&'static str> {
    SIGNALS.iter().find(|(_, n)| *n == num).map(|(name, _)| *name)
}

/// Send `signal` to `pid`.
pub fn kill(pid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    // SAFETY: kill(2) takes plain integers and touches no memory
    check(unsafe { libc::kill(pid, signal) })
}

pub fn parent_pid() -> libc::pid_t {
    // SAFETY: getppid(2) always succeeds
    unsafe { libc::getppid() }
}

pub fn current_uid() -> u32 {
    // SAFETY: getuid(2) always succeeds
    unsafe { libc::getuid() }
}

/// Clock ticks per second, for converting `/proc` times.
pub fn clock_ticks() -> u64 {
    // SAFETY: sysconf only reads a configuration value
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        100
    }
}

pub fn page_size() -> u64 {
    // SAFETY: as above
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

// ============================================================================
// Users
// ============================================================================

/// Login name for `uid`, if the password database knows it.
pub fn user_name(uid: u32) -> Option<String> {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: zeroed passwd is a valid out-parameter
        let mut pwd: libc::passwd = unsafe { mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        // SAFETY: buf outlives the call and its length is passed along
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };

        if rc == libc::ERANGE && buf.len() < 1 << 20 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            return None;
        }
        // SAFETY: on success pw_name points at a NUL-terminated string in buf
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

/// Numeric uid for a login name.
pub fn user_id(name: &str) -> Option<u32> {
    let c_name = CString::new(name).ok()?;
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: see user_name
        let mut pwd: libc::passwd = unsafe { mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        // SAFETY: c_name and buf outlive the call
        let rc = unsafe {
            libc::getpwnam_r(c_name.as_ptr(), &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };

        if rc == libc::ERANGE && buf.len() < 1 << 20 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        return Some(pwd.pw_uid);
    }
}

// ============================================================================
// System identification and filesystems
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uname {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

fn c_field(raw: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = raw.iter().take_while(|c| **c != 0).map(|c| *c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn uname() -> io::Result<Uname> {
    // SAFETY: zeroed utsname is a valid out-parameter
    let mut buf: libc::utsname = unsafe { mem::zeroed() };
    // SAFETY: buf is a live, writable utsname
    check(unsafe { libc::uname(&mut buf) })?;
    Ok(Uname {
        sysname: c_field(&buf.sysname),
        nodename: c_field(&buf.nodename),
        release: c_field(&buf.release),
        version: c_field(&buf.version),
        machine: c_field(&buf.machine),
    })
}

/// Capacity of the filesystem holding a path, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub total: u64,
    pub free: u64,
    /// Free space available to unprivileged users
    pub available: u64,
}

impl FsStats {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }

    /// Use% the way df computes it: used over used-plus-available, rounded up.
    pub fn use_percent(&self) -> Option<u64> {
        let denom = self.used() + self.available;
        if denom == 0 {
            return None;
        }
        Some((self.used() * 100).div_ceil(denom))
    }
}

pub fn statvfs(path: &Path) -> io::Result<FsStats> {
    let c_path = CString::new(path.as_os_str().as_bytes())?;
    // SAFETY: zeroed statvfs is a valid out-parameter
    let mut st: libc::statvfs = unsafe { mem::zeroed() };
    // SAFETY: c_path is NUL-terminated and st is writable
    check(unsafe { libc::statvfs(c_path.as_ptr(), &mut st) })?;

    let frsize = st.f_frsize as u64;
    Ok(FsStats {
        total: st.f_blocks as u64 * frsize,
        free: st.f_bfree as u64 * frsize,
        available: st.f_bavail as u64 * frsize,
    })
}

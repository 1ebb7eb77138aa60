//! `ls` - list directory contents

use chrono::{DateTime, Duration, Local};
use clap::Parser;
use console::style;
use std::fs::{self, Metadata};
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::helpers::grid;
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "ls",
    version = VERSION,
    about = "List information about each PATH (default '.'), sorted by name",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct LsArgs {
    /// Do not ignore entries starting with '.'
    #[arg(short = 'a')]
    pub all: bool,

    /// Use a long listing format
    #[arg(short = 'l')]
    pub long: bool,

    /// Reverse the sort order
    #[arg(short = 'r')]
    pub reverse: bool,

    /// List subdirectories recursively
    #[arg(short = 'R')]
    pub recursive: bool,

    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

struct Entry {
    name: String,
    path: PathBuf,
    /// Not following symlinks
    meta: Metadata,
}

impl Entry {
    fn is_dir(&self) -> bool {
        self.meta.is_dir()
    }
}

/// `drwxr-xr-x` style mode string.
pub fn mode_string(mode: u32) -> String {
    let kind = match mode & libc::S_IFMT {
        libc::S_IFDIR => 'd',
        libc::S_IFLNK => 'l',
        libc::S_IFIFO => 'p',
        libc::S_IFSOCK => 's',
        libc::S_IFCHR => 'c',
        libc::S_IFBLK => 'b',
        _ => '-',
    };
    let mut out = String::with_capacity(10);
    out.push(kind);

    // (read, write, execute bit, special bit, special char when x set / unset)
    let triads = [
        (0o400, 0o200, 0o100, 0o4000, 's', 'S'),
        (0o040, 0o020, 0o010, 0o2000, 's', 'S'),
        (0o004, 0o002, 0o001, 0o1000, 't', 'T'),
    ];
    for (r, w, x, special, on, off) in triads {
        out.push(if mode & r != 0 { 'r' } else { '-' });
        out.push(if mode & w != 0 { 'w' } else { '-' });
        out.push(match (mode & x != 0, mode & special != 0) {
            (true, true) => on,
            (false, true) => off,
            (true, false) => 'x',
            (false, false) => '-',
        });
    }
    out
}

fn timestamp(meta: &Metadata) -> String {
    let Ok(modified) = meta.modified() else {
        return "?".to_string();
    };
    let time = DateTime::<Local>::from(modified);
    let age = Local::now().signed_duration_since(time);
    if age > Duration::days(182) || age < Duration::hours(-1) {
        time.format("%b %e  %Y").to_string()
    } else {
        time.format("%b %e %H:%M").to_string()
    }
}

impl LsArgs {
    fn display_name(&self, ctx: &Ctx<'_>, entry: &Entry) -> String {
        if entry.is_dir() && ctx.terminal && ctx.config.color() {
            style(&entry.name).blue().bold().force_styling(true).to_string()
        } else {
            entry.name.clone()
        }
    }

    fn sort(&self, entries: &mut [Entry]) {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        if self.reverse {
            entries.reverse();
        }
    }

    /// Entries of `dir`, filtered and sorted.
    fn read(&self, dir: &Path) -> Result<Vec<Entry>, UtilError> {
        let mut entries = Vec::new();
        if self.all {
            for name in [".", ".."] {
                let path = dir.join(name);
                let meta = fs::symlink_metadata(&path).with_path(&path)?;
                entries.push(Entry {
                    name: name.to_string(),
                    path,
                    meta,
                });
            }
        }
        for item in fs::read_dir(dir).with_path(dir)? {
            let item = item.with_path(dir)?;
            let name = item.file_name().to_string_lossy().into_owned();
            if !self.all && name.starts_with('.') {
                continue;
            }
            let path = item.path();
            let meta = fs::symlink_metadata(&path).with_path(&path)?;
            entries.push(Entry { name, path, meta });
        }
        self.sort(&mut entries);
        Ok(entries)
    }

    fn render(&self, ctx: &mut Ctx<'_>, entries: &[Entry]) -> Result<(), UtilError> {
        if self.long {
            let width = |value: fn(&Metadata) -> u64| {
                entries
                    .iter()
                    .map(|e| value(&e.meta).to_string().len())
                    .max()
                    .unwrap_or(1)
            };
            let links_w = width(|m| m.nlink());
            let size_w = width(Metadata::len);
            for entry in entries {
                let mut line = format!(
                    "{} {:>links_w$} {:>size_w$} {} {}",
                    mode_string(entry.meta.permissions().mode()),
                    entry.meta.nlink(),
                    entry.meta.len(),
                    timestamp(&entry.meta),
                    self.display_name(ctx, entry),
                );
                if entry.meta.file_type().is_symlink() {
                    if let Ok(target) = fs::read_link(&entry.path) {
                        line.push_str(&format!(" -> {}", target.display()));
                    }
                }
                ctx.line(line)?;
            }
            return Ok(());
        }

        let names: Vec<String> = entries.iter().map(|e| self.display_name(ctx, e)).collect();
        if ctx.terminal {
            for line in grid(&names, ctx.config.width()) {
                ctx.line(line)?;
            }
        } else {
            for name in names {
                ctx.line(name)?;
            }
        }
        Ok(())
    }

    fn list_dir(&self, ctx: &mut Ctx<'_>, dir: &Path, header: bool) -> Result<(), UtilError> {
        let entries = match self.read(dir) {
            Ok(entries) => entries,
            Err(e) => {
                ctx.report(&e);
                return Ok(());
            }
        };
        if header {
            ctx.line(format_args!("{}:", dir.display()))?;
        }
        self.render(ctx, &entries)?;

        if self.recursive {
            for entry in entries.iter().filter(|e| e.is_dir() && e.name != "." && e.name != "..") {
                ctx.line("")?;
                self.list_dir(ctx, &entry.path, true)?;
            }
        }
        Ok(())
    }
}

impl Utility for LsArgs {
    const NAME: &'static str = "ls";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let paths = if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for path in &paths {
            // Operands follow symlinks to directories; dangling links still list
            let meta = fs::metadata(path).or_else(|_| fs::symlink_metadata(path));
            match meta.with_path(path) {
                Ok(meta) if meta.is_dir() => dirs.push(path.clone()),
                Ok(_) => {
                    let meta = fs::symlink_metadata(path).with_path(path)?;
                    files.push(Entry {
                        name: path.display().to_string(),
                        path: path.clone(),
                        meta,
                    });
                }
                Err(e) => ctx.report(&e),
            }
        }

        self.sort(&mut files);
        dirs.sort();
        if self.reverse {
            dirs.reverse();
        }

        self.render(ctx, &files)?;
        let headers = paths.len() > 1 || self.recursive;
        for (idx, dir) in dirs.iter().enumerate() {
            if idx > 0 || !files.is_empty() {
                ctx.line("")?;
            }
            self.list_dir(ctx, dir, headers)?;
        }
        Ok(())
    }
}

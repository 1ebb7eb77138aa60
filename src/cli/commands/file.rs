//! `file` - determine file type

use clap::Parser;
use std::fs::{self, File};
use std::io::Read;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::{PathContext, UtilError};

/// Bytes read from the start of a file for classification.
const SNIFF_LEN: usize = 4096;

/// Signatures checked at offset 0.
const MAGIC: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "PNG image data"),
    (b"\xff\xd8\xff", "JPEG image data"),
    (b"GIF87a", "GIF image data"),
    (b"GIF89a", "GIF image data"),
    (b"%PDF-", "PDF document"),
    (b"PK\x03\x04", "Zip archive data"),
    (b"PK\x05\x06", "Zip archive data (empty)"),
    (b"\x1f\x8b", "gzip compressed data"),
    (b"BZh", "bzip2 compressed data"),
    (b"\xfd7zXZ\x00", "XZ compressed data"),
    (b"7z\xbc\xaf\x27\x1c", "7-zip archive data"),
    (b"\x7fELF", "ELF executable"),
    (b"\x00asm", "WebAssembly binary module"),
    (b"SQLite format 3\x00", "SQLite 3.x database"),
];

/// Labels guessed from the extension once content says nothing more.
const EXTENSIONS: &[(&[&str], &str)] = &[
    (&["c", "h"], "C source"),
    (&["rs"], "Rust source"),
    (&["go"], "Go source"),
    (&["py"], "Python script"),
    (&["sh", "bash"], "shell script"),
    (&["html", "htm"], "HTML document"),
    (&["css"], "CSS stylesheet"),
    (&["json"], "JSON data"),
    (&["yaml", "yml"], "YAML document"),
    (&["toml"], "TOML document"),
    (&["md"], "Markdown document"),
    (&["xml"], "XML document"),
    (&["csv"], "CSV text"),
];

#[derive(Parser, Debug)]
#[command(
    name = "file",
    version = VERSION,
    about = "Determine the type of each FILE",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct FileArgs {
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub std: StdFlags,
}

fn by_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map(|(_, label)| *label)
}

/// Classify file content. `head` is the first bytes of the file.
pub fn classify(path: &Path, head: &[u8]) -> String {
    if head.is_empty() {
        return "empty".to_string();
    }
    if let Some((_, label)) = MAGIC.iter().find(|(magic, _)| head.starts_with(magic)) {
        return label.to_string();
    }
    if head.len() > 262 && &head[257..262] == b"ustar" {
        return "POSIX tar archive".to_string();
    }

    let text = if head.contains(&0) {
        None
    } else if head.is_ascii() {
        Some("ASCII text")
    } else {
        // A multi-byte character may be cut at the end of the sample
        match std::str::from_utf8(head) {
            Ok(_) => Some("UTF-8 Unicode text"),
            Err(e) if e.error_len().is_none() => Some("UTF-8 Unicode text"),
            Err(_) => None,
        }
    };

    match text {
        Some(text) => {
            if let Some(interp) = shebang(head) {
                format!("{interp} script, {text} executable")
            } else if let Some(label) = by_extension(path) {
                format!("{label}, {text}")
            } else {
                text.to_string()
            }
        }
        None => by_extension(path).unwrap_or("data").to_string(),
    }
}

/// Interpreter named on a `#!` line, without its directory or `env`.
fn shebang(head: &[u8]) -> Option<String> {
    let line = head.strip_prefix(b"#!")?;
    let end = line.iter().position(|&b| b == b'\n').unwrap_or(line.len());
    let line = std::str::from_utf8(&line[..end]).ok()?;
    let mut words = line.split_whitespace();
    let mut program = words.next()?;
    if program.ends_with("/env") {
        program = words.find(|w| !w.starts_with('-'))?;
    }
    program.rsplit('/').next().map(str::to_string)
}

/// Describe `path` by its filesystem kind, falling back to its content.
pub fn describe(path: &Path) -> Result<String, UtilError> {
    let meta = fs::symlink_metadata(path).with_path(path)?;
    let kind = meta.file_type();
    if kind.is_symlink() {
        let target = fs::read_link(path).with_path(path)?;
        return Ok(format!("symbolic link to {}", target.display()));
    }
    if kind.is_dir() {
        return Ok("directory".to_string());
    }
    if kind.is_fifo() {
        return Ok("fifo (named pipe)".to_string());
    }
    if kind.is_socket() {
        return Ok("socket".to_string());
    }
    if kind.is_char_device() {
        return Ok("character special".to_string());
    }
    if kind.is_block_device() {
        return Ok("block special".to_string());
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)
        .and_then(|f| f.take(SNIFF_LEN as u64).read_to_end(&mut head))
        .with_path(path)?;
    Ok(classify(path, &head))
}

impl Utility for FileArgs {
    const NAME: &'static str = "file";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        for path in &self.files {
            match describe(path) {
                Ok(kind) => ctx.line(format_args!("{}: {kind}", path.display()))?,
                Err(e) => ctx.report(&e),
            }
        }
        Ok(())
    }
}

//! Archive codecs: gzip-compressed tar and ZIP
//!
//! Operand problems (an unreadable input, an entry that would land outside
//! the destination) are collected in [`Report::errors`] so the caller can
//! report them one by one; only failures that make the archive itself
//! unusable come back as `Err`.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashSet;
use std::fs::{self, File, Permissions};
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::error::{PathContext, UtilError};
use crate::core::walk::walk_error;

/// What an archive operation did, entry by entry.
#[derive(Debug, Default)]
pub struct Report {
    /// Entry names written, extracted, or copied over
    pub entries: Vec<String>,
    pub errors: Vec<UtilError>,
    /// Inputs left out because they are the archive being written
    pub skipped: Vec<PathBuf>,
}

/// One member of an archive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

/// Name an operand is stored under: its last path component.
fn stored_name(path: &Path) -> Result<String, UtilError> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let absolute = fs::canonicalize(path).with_path(path)?;
    absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            UtilError::failed(format!(
                "{}: cannot archive the root directory",
                path.display()
            ))
        })
}

/// Archive member name of `path`, found by walking the operand `root`
/// that is stored as `base`.
fn member_name(base: &str, root: &Path, path: &Path) -> String {
    let mut name = base.to_string();
    let rel = path.strip_prefix(root).unwrap_or(path);
    for part in rel.components() {
        if let Component::Normal(part) = part {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

/// Device and inode, to recognise the archive among its own inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    fn of(meta: &fs::Metadata) -> Self {
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    /// Whether `path` (symlinks followed) is this file.
    fn matches(self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|meta| Self::of(&meta) == self)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

// ============================================================================
// tar.gz
// ============================================================================

/// Write `inputs` into a new gzip-compressed tar at `archive`.
///
/// Directories are stored recursively under their base name.
pub fn create_tar_gz(archive: &Path, inputs: &[PathBuf]) -> Result<Report, UtilError> {
    let file = File::create(archive).with_path(archive)?;
    let own = file.metadata().map(|meta| FileId::of(&meta)).with_path(archive)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let mut report = Report::default();

    for input in inputs {
        let name = match stored_name(input) {
            Ok(name) => name,
            Err(e) => {
                report.errors.push(e);
                continue;
            }
        };

        let meta = match fs::metadata(input) {
            Ok(meta) => meta,
            Err(e) => {
                report.errors.push(UtilError::path(input, e));
                continue;
            }
        };

        tracing::debug!(input = %input.display(), %name, "adding to tar");
        if meta.is_dir() {
            append_tree(&mut builder, input, &name, own, &mut report);
        } else if FileId::of(&meta) == own {
            report.skipped.push(input.clone());
        } else {
            match builder.append_path_with_name(input, &name) {
                Ok(()) => report.entries.push(name),
                Err(e) => report.errors.push(UtilError::path(input, e)),
            }
        }
    }

    let encoder = builder.into_inner().with_path(archive)?;
    encoder.finish().with_path(archive)?;
    Ok(report)
}

/// Store the directory `root` under `base`, pre-order, leaving out the
/// archive itself.
fn append_tree<W: io::Write>(
    builder: &mut tar::Builder<W>,
    root: &Path,
    base: &str,
    own: FileId,
    report: &mut Report,
) {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.errors.push(walk_error(e));
                continue;
            }
        };
        let path = entry.path();
        let name = member_name(base, root, path);

        let added = if entry.file_type().is_dir() {
            builder.append_dir(&name, path)
        } else if own.matches(path) {
            report.skipped.push(path.to_path_buf());
            continue;
        } else {
            builder.append_path_with_name(path, &name)
        };

        match added {
            Ok(()) => report.entries.push(name),
            Err(e) => report.errors.push(UtilError::path(path, e)),
        }
    }
}

/// List the members of a gzip-compressed tar.
pub fn list_tar_gz(archive: &Path) -> Result<Vec<ArchiveEntry>, UtilError> {
    let file = File::open(archive).with_path(archive)?;
    let mut reader = tar::Archive::new(GzDecoder::new(file));
    let mut listing = Vec::new();

    for entry in reader.entries().with_path(archive)? {
        let entry = entry.with_path(archive)?;
        let name = entry.path().with_path(archive)?.display().to_string();
        listing.push(ArchiveEntry {
            name,
            size: entry.size(),
            is_dir: entry.header().entry_type().is_dir(),
        });
    }

    Ok(listing)
}

/// Extract a gzip-compressed tar into `dest`.
///
/// Members whose path would escape `dest` are skipped and reported.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<Report, UtilError> {
    let file = File::open(archive).with_path(archive)?;
    let mut reader = tar::Archive::new(GzDecoder::new(file));
    let mut report = Report::default();

    fs::create_dir_all(dest).with_path(dest)?;

    for entry in reader.entries().with_path(archive)? {
        let mut entry = entry.with_path(archive)?;
        let name = entry.path().with_path(archive)?.display().to_string();

        match entry.unpack_in(dest) {
            Ok(true) => report.entries.push(name),
            Ok(false) => report.errors.push(UtilError::failed(format!(
                "{name}: refusing to extract outside {}",
                dest.display()
            ))),
            Err(e) => report.errors.push(UtilError::io(name, e)),
        }
    }

    Ok(report)
}

// ============================================================================
// ZIP
// ============================================================================

/// A file or directory scheduled for a ZIP archive.
#[derive(Debug)]
struct Planned {
    name: String,
    /// `None` for directory entries
    source: Option<PathBuf>,
}

/// Expand operands into archive members. Directories need `recursive`.
/// `own` is the archive already on disk, which is never planned.
fn plan_zip(
    inputs: &[PathBuf],
    recursive: bool,
    own: Option<FileId>,
    report: &mut Report,
) -> Vec<Planned> {
    let is_archive = |path: &Path| own.is_some_and(|own| own.matches(path));
    let mut planned = Vec::new();

    for input in inputs {
        let base = match stored_name(input) {
            Ok(name) => name,
            Err(e) => {
                report.errors.push(e);
                continue;
            }
        };

        match fs::metadata(input) {
            Err(e) => report.errors.push(UtilError::path(input, e)),
            Ok(meta) if !meta.is_dir() && own == Some(FileId::of(&meta)) => {
                report.skipped.push(input.clone());
            }
            Ok(meta) if !meta.is_dir() => planned.push(Planned {
                name: base,
                source: Some(input.clone()),
            }),
            Ok(_) if !recursive => report.errors.push(UtilError::failed(format!(
                "{}: is a directory (use -r)",
                input.display()
            ))),
            Ok(_) => {
                for entry in WalkDir::new(input).sort_by_file_name() {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(e) => {
                            report.errors.push(walk_error(e));
                            continue;
                        }
                    };
                    let mut name = member_name(&base, input, entry.path());
                    if entry.file_type().is_dir() {
                        name.push('/');
                        planned.push(Planned { name, source: None });
                    } else if is_archive(entry.path()) {
                        report.skipped.push(entry.path().to_path_buf());
                    } else {
                        planned.push(Planned {
                            name,
                            source: Some(entry.path().to_path_buf()),
                        });
                    }
                }
            }
        }
    }

    planned
}

fn write_planned<W: io::Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    planned: &[Planned],
    report: &mut Report,
) -> Result<(), UtilError> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for item in planned {
        let Some(ref source) = item.source else {
            writer.add_directory(item.name.as_str(), options)?;
            report.entries.push(item.name.clone());
            continue;
        };

        let mut file = match File::open(source) {
            Ok(file) => file,
            Err(e) => {
                report.errors.push(UtilError::path(source, e));
                continue;
            }
        };
        let mode = file
            .metadata()
            .map(|m| m.permissions().mode())
            .unwrap_or(0o644);

        tracing::debug!(source = %source.display(), name = %item.name, "adding to zip");
        writer.start_file(item.name.as_str(), options.unix_permissions(mode))?;
        io::copy(&mut file, writer).with_path(source)?;
        report.entries.push(item.name.clone());
    }

    Ok(())
}

/// Write a ZIP archive at `archive` holding `inputs`.
///
/// With `update`, members of an existing archive are carried over
/// unchanged (raw-copied, no recompression) except those replaced by a
/// same-named input. The new archive is assembled in a temporary file next
/// to `archive` and renamed over it only once complete, so a failure leaves
/// the original untouched.
pub fn write_zip(
    archive: &Path,
    inputs: &[PathBuf],
    update: bool,
    recursive: bool,
) -> Result<Report, UtilError> {
    let mut report = Report::default();
    let own = fs::metadata(archive).ok().map(|meta| FileId::of(&meta));
    let planned = plan_zip(inputs, recursive, own, &mut report);

    let existing = if update && archive.exists() {
        Some(File::open(archive).with_path(archive)?)
    } else {
        None
    };
    let permissions = match existing {
        Some(ref file) => file.metadata().with_path(archive)?.permissions(),
        None => Permissions::from_mode(0o644),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".unixkit-zip")
        .tempfile_in(parent_dir(archive))
        .with_path(parent_dir(archive))?;

    {
        let mut writer = ZipWriter::new(temp.as_file_mut());

        if let Some(file) = existing {
            let replaced: HashSet<&str> = planned.iter().map(|p| p.name.as_str()).collect();
            let mut old = ZipArchive::new(file)?;
            for i in 0..old.len() {
                let member = old.by_index(i)?;
                if replaced.contains(member.name()) {
                    tracing::debug!(name = member.name(), "replacing member");
                    continue;
                }
                let name = member.name().to_string();
                writer.raw_copy_file(member)?;
                report.entries.push(name);
            }
        }

        write_planned(&mut writer, &planned, &mut report)?;
        writer.finish()?;
    }

    temp.as_file()
        .set_permissions(permissions)
        .with_path(temp.path())?;
    temp.persist(archive).map_err(|e| UtilError::path(archive, e.error))?;

    Ok(report)
}

/// List the members of a ZIP archive.
pub fn list_zip(archive: &Path) -> Result<Vec<ArchiveEntry>, UtilError> {
    let file = File::open(archive).with_path(archive)?;
    let mut zip = ZipArchive::new(file)?;
    let mut listing = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let member = zip.by_index(i)?;
        listing.push(ArchiveEntry {
            name: member.name().to_string(),
            size: member.size(),
            is_dir: member.is_dir(),
        });
    }

    Ok(listing)
}

/// Extract a ZIP archive into `dest`.
///
/// Members with absolute names or `..` components are refused.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<Report, UtilError> {
    let file = File::open(archive).with_path(archive)?;
    let mut zip = ZipArchive::new(file)?;
    let mut report = Report::default();

    fs::create_dir_all(dest).with_path(dest)?;

    for i in 0..zip.len() {
        let mut member = zip.by_index(i)?;
        let name = member.name().to_string();

        let Some(rel) = member.enclosed_name().map(Path::to_path_buf) else {
            report.errors.push(UtilError::failed(format!(
                "{name}: refusing to extract outside {}",
                dest.display()
            )));
            continue;
        };
        let target = dest.join(rel);

        let result = if member.is_dir() {
            fs::create_dir_all(&target).with_path(&target)
        } else {
            extract_member(&mut member, &target)
        };

        match result {
            Ok(()) => report.entries.push(name),
            Err(e) => report.errors.push(e),
        }
    }

    Ok(report)
}

fn extract_member(member: &mut zip::read::ZipFile<'_>, target: &Path) -> Result<(), UtilError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    let mut out = File::create(target).with_path(target)?;
    io::copy(member, &mut out).with_path(target)?;
    if let Some(mode) = member.unix_mode() {
        fs::set_permissions(target, Permissions::from_mode(mode & 0o7777)).with_path(target)?;
    }
    Ok(())
}

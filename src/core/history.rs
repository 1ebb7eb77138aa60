//! Shell history file access for `history`, `ii` and `in`

use std::fs::{self, File, Permissions};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::error::{PathContext, UtilError};

/// The history file as a list of commands, oldest first.
///
/// Blank lines are dropped and surrounding whitespace trimmed, so positions
/// are the 1-based indices `history` prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    path: PathBuf,
    entries: Vec<String>,
}

impl History {
    /// Read the history at `path`. A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self, UtilError> {
        let entries = match File::open(path) {
            Ok(file) => {
                let mut entries = Vec::new();
                for line in BufReader::new(file).lines() {
                    let line = line.with_path(path)?;
                    let line = line.trim();
                    if !line.is_empty() {
                        entries.push(line.to_string());
                    }
                }
                entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(UtilError::path(path, e)),
        };

        tracing::debug!(path = %path.display(), count = entries.len(), "loaded history");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at 1-based `position`.
    pub fn get(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(String::as_str)
    }

    /// Most recent entry accepted by `keep`.
    pub fn last_where(&self, keep: impl Fn(&str) -> bool) -> Option<&str> {
        self.entries.iter().rev().map(String::as_str).find(|e| keep(e))
    }

    /// Remove the entry at 1-based `position`, returning it.
    pub fn delete(&mut self, position: usize) -> Result<String, UtilError> {
        if position == 0 || position > self.entries.len() {
            return Err(UtilError::failed(format!(
                "{position}: history position out of range (1-{})",
                self.entries.len()
            )));
        }
        Ok(self.entries.remove(position - 1))
    }

    /// Write the entries back, replacing the file atomically.
    pub fn save(&self) -> Result<(), UtilError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = fs::metadata(&self.path)
            .map(|m| m.permissions())
            .unwrap_or_else(|_| Permissions::from_mode(0o600));

        let mut temp = tempfile::NamedTempFile::new_in(dir).with_path(dir)?;
        for entry in &self.entries {
            writeln!(temp, "{entry}").with_path(temp.path())?;
        }
        temp.as_file().sync_all().with_path(temp.path())?;
        temp.as_file()
            .set_permissions(permissions)
            .with_path(temp.path())?;
        temp.persist(&self.path)
            .map_err(|e| UtilError::path(&self.path, e.error))?;
        Ok(())
    }

    /// Empty the history file, creating it if needed.
    pub fn clear(path: &Path) -> Result<(), UtilError> {
        File::create(path).with_path(path)?;
        Ok(())
    }
}

/// Split a history line into program and arguments on whitespace.
pub fn split_command(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Run `words[0]` with the remaining words as arguments, inheriting the
/// standard streams. A non-zero exit becomes an error.
pub fn replay(words: &[String]) -> Result<(), UtilError> {
    let Some((program, args)) = words.split_first() else {
        return Err(UtilError::failed("empty command in history"));
    };

    tracing::debug!(%program, ?args, "replaying history entry");
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("cannot run '{program}'"))?;

    if status.success() {
        Ok(())
    } else {
        Err(UtilError::failed(match status.code() {
            Some(code) => format!("'{program}' exited with status {code}"),
            None => format!("'{program}' was terminated by a signal"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_history(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join(".bash_history");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_skips_blank_lines_and_trims() {
        let tmp = tempdir().unwrap();
        let path = write_history(tmp.path(), "ls -l\n\n   \n  echo hi  \n");
        let history = History::load(&path).unwrap();
        assert_eq!(history.entries(), ["ls -l", "echo hi"]);
        assert_eq!(history.get(2), Some("echo hi"));
        assert_eq!(history.get(0), None);
        assert_eq!(history.get(3), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempdir().unwrap();
        let history = History::load(&tmp.path().join("nope")).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_delete_and_save() {
        let tmp = tempdir().unwrap();
        let path = write_history(tmp.path(), "one\ntwo\nthree\n");
        let mut history = History::load(&path).unwrap();

        assert_eq!(history.delete(2).unwrap(), "two");
        assert!(history.delete(3).is_err());
        history.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\nthree\n");
    }

    #[test]
    fn test_last_where_skips_rejected() {
        let tmp = tempdir().unwrap();
        let path = write_history(tmp.path(), "make\nii\nii --x\n");
        let history = History::load(&path).unwrap();
        assert_eq!(history.last_where(|e| !e.starts_with("ii")), Some("make"));
    }

    #[test]
    fn test_clear_truncates() {
        let tmp = tempdir().unwrap();
        let path = write_history(tmp.path(), "a\nb\n");
        History::clear(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("  ls   -la  /tmp "), ["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_replay_reports_failure() {
        assert!(replay(&["true".to_string()]).is_ok());
        let err = replay(&["false".to_string()]).unwrap_err();
        assert!(err.to_string().contains("status 1"));
        assert!(replay(&[]).is_err());
    }
}

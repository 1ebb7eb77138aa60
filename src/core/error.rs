//! Error type shared by every utility

use miette::Diagnostic;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors a utility can report.
///
/// Usage errors stop the invocation before anything touches the filesystem.
/// Path and I/O errors are per-operand: executors report them through
/// [`crate::cli::Ctx::report`] and carry on with the next operand.
#[derive(Debug, Error, Diagnostic)]
pub enum UtilError {
    /// Bad flag, missing operand, malformed number
    #[error("{0}")]
    #[diagnostic(
        code(unixkit::usage),
        help("try '-h' or '--help' for more information")
    )]
    Usage(String),

    /// An OS error tied to one operand
    #[error("{}: {}", path.display(), describe(source))]
    #[diagnostic(code(unixkit::path))]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An OS error with free-form context
    #[error("{context}: {}", describe(source))]
    #[diagnostic(code(unixkit::io))]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A failure that has no underlying OS error
    #[error("{0}")]
    #[diagnostic(code(unixkit::failed))]
    Failed(String),

    #[error("zip archive: {0}")]
    #[diagnostic(code(unixkit::zip))]
    Zip(#[from] zip::result::ZipError),
}

impl UtilError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn path(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Path {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Render an `io::Error` the way the classic tools do, short text
/// without the trailing `(os error N)`.
fn describe(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        io::ErrorKind::AlreadyExists => "File exists".to_string(),
        _ => {
            let full = err.to_string();
            match full.find(" (os error") {
                Some(idx) => full[..idx].to_string(),
                None => full,
            }
        }
    }
}

/// Attach a path to an `io::Result`.
pub trait PathContext<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T, UtilError>;
    fn with_context(self, context: impl FnOnce() -> String) -> Result<T, UtilError>;
}

impl<T> PathContext<T> for io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T, UtilError> {
        self.map_err(|e| UtilError::path(path, e))
    }

    fn with_context(self, context: impl FnOnce() -> String) -> Result<T, UtilError> {
        self.map_err(|e| UtilError::io(context(), e))
    }
}

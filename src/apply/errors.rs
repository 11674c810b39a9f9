use crate::lines::LineError;
use crate::safety::SafetyError;
use crate::schema::Range;
use crate::uri::UriError;
use std::path::PathBuf;
use thiserror::Error;

/// Every variant aborts the whole apply call.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("{operation} operation has no target location")]
    MissingTarget { operation: &'static str },

    #[error("rename operation needs both oldUri and newUri")]
    MissingRenameEndpoints,

    #[error("filesystem error on {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Location(#[from] UriError),

    #[error("target already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("{file}: line {line} is out of range (file has {line_count} lines)")]
    LineOutOfRange {
        file: PathBuf,
        line: u32,
        line_count: usize,
    },

    #[error("{file}: range {range} starts after it ends")]
    InvalidRange { file: PathBuf, range: Range },

    #[error("{file}: edits overlap at {first} and {second}")]
    OverlappingEdits {
        file: PathBuf,
        first: Range,
        second: Range,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

impl ApplyError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ApplyError::Filesystem { path, source }
    }

    pub(crate) fn from_line(file: impl Into<PathBuf>, error: LineError) -> Self {
        let file = file.into();
        match error {
            LineError::LineOutOfRange { line, line_count } => ApplyError::LineOutOfRange {
                file,
                line,
                line_count,
            },
            LineError::InvalidRange(range) => ApplyError::InvalidRange { file, range },
        }
    }
}

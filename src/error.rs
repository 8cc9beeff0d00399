//! Error types for the namespace engine.

use crate::FileId;

/// Broad classification of an [`FsError`].
///
/// Callers layered above the namespace (a file-I/O adapter, a shell) map
/// these kinds onto their own external error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A precondition on an argument was violated.
    InvalidArgument,
    /// The object was in the wrong state for the call.
    IllegalState,
    /// A path or file does not exist.
    NotFound,
    /// A directory was required.
    NotADirectory,
    /// A non-directory file was required.
    NotAFile,
    /// A directory still has entries.
    DirectoryNotEmpty,
    /// Too many symbolic links were followed.
    Loop,
}

/// Namespace error type with contextual variants.
///
/// All errors are detected synchronously and locally; none of them are
/// retriable inside the engine itself.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::{ErrorKind, FsError};
///
/// let err = FsError::AlreadyExists { name: "foo".into(), operation: "link" };
/// assert_eq!(err.to_string(), "link: already exists: foo");
/// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Namespace mutation errors
    /// `.` or `..` was passed to an operation that only accepts ordinary names.
    #[error("{operation}: reserved name: {name}")]
    ReservedName {
        /// The reserved name.
        name: String,
        /// The operation that was refused.
        operation: &'static str,
    },

    /// An entry with the same canonical name already exists.
    #[error("{operation}: already exists: {name}")]
    AlreadyExists {
        /// The conflicting name or path.
        name: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A table operation named an entry the directory does not have.
    #[error("{operation}: no such entry: {name}")]
    NoSuchEntry {
        /// The missing name.
        name: String,
        /// The operation that was refused.
        operation: &'static str,
    },

    /// Path or entry does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path (or entry name) that was not found.
        path: String,
    },

    /// A file id that is not (or no longer) present in the file table.
    #[error("file not found: {id}")]
    FileNotFound {
        /// The missing id.
        id: FileId,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
    },

    /// Expected a non-directory file but found a directory.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is a directory.
        path: String,
    },

    /// Directory is not empty when it should be.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: String,
    },

    /// Symbolic link resolution exceeded the maximum depth.
    #[error("too many levels of symbolic links: {path}")]
    SymlinkLoop {
        /// The path being resolved.
        path: String,
    },

    // Path service errors
    /// A URI was requested for a relative path.
    #[error("path must be absolute: {path}")]
    NotAbsolute {
        /// The relative path.
        path: String,
    },

    /// A path string could not be parsed.
    #[error("invalid path: {input} ({reason})")]
    InvalidPath {
        /// The input that failed to parse.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A URI could not be built or decomposed.
    #[error("invalid uri: {uri} ({reason})")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A path matcher pattern was malformed or used an unknown syntax.
    #[error("invalid pattern: {pattern} ({reason})")]
    InvalidPattern {
        /// The `syntax:pattern` input.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two normalizations that cannot be combined were requested together.
    #[error("conflicting normalizations: {first} and {second}")]
    ConflictingNormalizations {
        /// The first normalization.
        first: &'static str,
        /// The normalization that conflicts with it.
        second: &'static str,
    },

    // State errors
    /// The owning filesystem of a path service was bound twice.
    #[error("file system may not be set twice")]
    FileSystemAlreadySet,
}

impl FsError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::ReservedName { .. }
            | FsError::AlreadyExists { .. }
            | FsError::NoSuchEntry { .. }
            | FsError::NotAbsolute { .. }
            | FsError::InvalidPath { .. }
            | FsError::InvalidUri { .. }
            | FsError::InvalidPattern { .. }
            | FsError::ConflictingNormalizations { .. } => ErrorKind::InvalidArgument,
            FsError::NotFound { .. } | FsError::FileNotFound { .. } => ErrorKind::NotFound,
            FsError::NotADirectory { .. } => ErrorKind::NotADirectory,
            FsError::NotAFile { .. } => ErrorKind::NotAFile,
            FsError::DirectoryNotEmpty { .. } => ErrorKind::DirectoryNotEmpty,
            FsError::SymlinkLoop { .. } => ErrorKind::Loop,
            FsError::FileSystemAlreadySet => ErrorKind::IllegalState,
        }
    }

    /// Returns `true` if this error is a violated argument precondition.
    ///
    /// Same as `self.kind() == ErrorKind::InvalidArgument`.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}

//! # PathType Trait
//!
//! Strategy trait describing a filesystem's path syntax.
//!
//! ## Responsibility
//! - Split a path string into an optional root and a list of names
//! - Render a root and names back into a path string
//! - Map paths to and from the path component of a URI
//!
//! ## Implementors
//! - [`UnixPathType`]: `/` root, `/` separator
//! - [`WindowsPathType`]: drive (`C:\`) and UNC (`\\host\share\`) roots, `\` separator

use std::fmt;

use url::Url;

use crate::FsError;

mod unix;
mod windows;

pub use unix::UnixPathType;
pub use windows::WindowsPathType;

/// The result of parsing a path string: an optional root and the names
/// following it, both still in raw string form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseResult {
    /// The root, if the path is absolute.
    pub root: Option<String>,
    /// The names, in path order.
    pub names: Vec<String>,
}

impl ParseResult {
    /// Creates a parse result.
    pub fn new(root: Option<String>, names: Vec<String>) -> Self {
        Self { root, names }
    }

    /// Returns `true` if a root was parsed.
    pub fn is_absolute(&self) -> bool {
        self.root.is_some()
    }
}

/// Strategy trait for path syntax.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one instance is shared by every path
/// of a namespace.
///
/// # Object Safety
///
/// The trait is object-safe and is stored as `Arc<dyn PathType>`.
pub trait PathType: Send + Sync + fmt::Debug {
    /// The canonical separator.
    fn separator(&self) -> char;

    /// Separators accepted on input in addition to [`separator`](Self::separator).
    fn other_separators(&self) -> &str {
        ""
    }

    /// Parses a path string.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the string is not a valid path for this syntax
    fn parse_path(&self, path: &str) -> Result<ParseResult, FsError>;

    /// Renders a root and names as a path string.
    fn format_path(&self, root: Option<&str>, names: &[&str]) -> String;

    /// Renders an absolute path as the (unencoded) path component of a URI.
    fn to_uri_path(&self, root: &str, names: &[&str]) -> String;

    /// Parses the (decoded) path component of a URI.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the URI path does not describe an absolute path
    fn parse_uri_path(&self, uri_path: &str) -> Result<ParseResult, FsError>;

    /// Joins raw path strings with the canonical separator.
    fn join(&self, parts: &[&str]) -> String {
        parts.join(self.separator().to_string().as_str())
    }

    /// All separator characters, canonical first.
    fn separators(&self) -> String {
        let mut all = String::new();
        all.push(self.separator());
        all.push_str(self.other_separators());
        all
    }

    /// Builds a URI for an absolute path, relative to the filesystem's URI.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidUri`] if a name is `.` or `..`, or the result is not
    ///   a valid URI
    fn to_uri(&self, base: &Url, root: &str, names: &[&str]) -> Result<Url, FsError> {
        let path = self.to_uri_path(root, names);
        // URI parsing removes dot segments, even percent-encoded ones
        if let Some(dot) = names.iter().find(|name| matches!(**name, "." | "..")) {
            return Err(FsError::InvalidUri {
                uri: format!("{}{}", base.as_str().trim_end_matches('/'), path),
                reason: format!("path contains the name `{dot}`; normalize it first"),
            });
        }
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let uri = format!("{}{}", base.as_str().trim_end_matches('/'), encoded);
        Url::parse(&uri).map_err(|e| FsError::InvalidUri {
            uri,
            reason: e.to_string(),
        })
    }

    /// Decomposes a URI produced by [`to_uri`](Self::to_uri).
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidUri`] if the path is not valid UTF-8 after decoding
    /// - [`FsError::InvalidPath`] if it does not describe an absolute path
    fn from_uri(&self, uri: &Url) -> Result<ParseResult, FsError> {
        let decoded = urlencoding::decode(uri.path()).map_err(|e| FsError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        self.parse_uri_path(&decoded)
    }
}

/// Splits `path` on any of `separators`, dropping empty names.
pub(crate) fn split_names(path: &str, separators: &str) -> Vec<String> {
    path.split(|c: char| separators.contains(c))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn invalid_path(input: &str, reason: impl Into<String>) -> FsError {
    FsError::InvalidPath {
        input: input.to_owned(),
        reason: reason.into(),
    }
}

//! Unix path syntax.

use super::{ParseResult, PathType, invalid_path, split_names};
use crate::FsError;

/// Unix-style paths: a single `/` root and `/` as the only separator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixPathType;

impl PathType for UnixPathType {
    fn separator(&self) -> char {
        '/'
    }

    fn parse_path(&self, path: &str) -> Result<ParseResult, FsError> {
        if path.contains('\0') {
            return Err(invalid_path(path, "nul character not allowed"));
        }
        let root = path.starts_with('/').then(|| "/".to_owned());
        Ok(ParseResult::new(root, split_names(path, "/")))
    }

    fn format_path(&self, root: Option<&str>, names: &[&str]) -> String {
        let mut out = String::from(root.unwrap_or(""));
        out.push_str(&self.join(names));
        out
    }

    fn to_uri_path(&self, _root: &str, names: &[&str]) -> String {
        format!("/{}", self.join(names))
    }

    fn parse_uri_path(&self, uri_path: &str) -> Result<ParseResult, FsError> {
        if !uri_path.starts_with('/') {
            return Err(invalid_path(uri_path, "uri path must be absolute"));
        }
        self.parse_path(uri_path)
    }
}

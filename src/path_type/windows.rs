//! Windows path syntax.

use super::{ParseResult, PathType, invalid_path, split_names};
use crate::FsError;

/// Characters that may not appear in a Windows file name.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Windows-style paths.
///
/// Roots are drive letters (`C:\`) or UNC shares (`\\host\share\`). `\` is the
/// canonical separator and `/` is accepted on input. Drive-relative paths
/// (`C:foo`) and root-relative paths (`\foo`) are rejected, since the
/// namespace has no per-drive working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPathType;

impl WindowsPathType {
    fn parse_unc_root<'a>(
        &self,
        original: &str,
        path: &'a str,
    ) -> Result<(String, &'a str), FsError> {
        let rest = &path[2..];
        let (host, rest) = rest.split_once('\\').unwrap_or((rest, ""));
        if host.is_empty() {
            return Err(invalid_path(original, "UNC path is missing host name"));
        }
        let (share, rest) = rest.split_once('\\').unwrap_or((rest, ""));
        if share.is_empty() {
            return Err(invalid_path(original, "UNC path is missing share name"));
        }
        Ok((format!("\\\\{host}\\{share}\\"), rest))
    }

    fn parse_drive_root<'a>(
        &self,
        original: &str,
        path: &'a str,
    ) -> Result<Option<(String, &'a str)>, FsError> {
        let mut chars = path.chars();
        let (Some(letter), Some(':')) = (chars.next(), chars.next()) else {
            return Ok(None);
        };
        if !letter.is_ascii_alphabetic() {
            return Ok(None);
        }
        match chars.next() {
            Some('\\') => Ok(Some((format!("{letter}:\\"), &path[3..]))),
            _ => Err(invalid_path(
                original,
                "drive-relative paths are not supported",
            )),
        }
    }

    fn check_names(&self, original: &str, names: &[String]) -> Result<(), FsError> {
        for name in names {
            if let Some(c) = name
                .chars()
                .find(|c| RESERVED_CHARS.contains(c) || (*c as u32) < 0x20)
            {
                return Err(invalid_path(
                    original,
                    format!("illegal char {c:?} in name {name:?}"),
                ));
            }
        }
        Ok(())
    }
}

impl PathType for WindowsPathType {
    fn separator(&self) -> char {
        '\\'
    }

    fn other_separators(&self) -> &str {
        "/"
    }

    fn parse_path(&self, path: &str) -> Result<ParseResult, FsError> {
        let normalized = path.replace('/', "\\");

        let (root, rest) = if normalized.starts_with("\\\\") {
            let (root, rest) = self.parse_unc_root(path, &normalized)?;
            (Some(root), rest)
        } else if normalized.starts_with('\\') {
            return Err(invalid_path(
                path,
                "root-relative paths are not supported",
            ));
        } else {
            match self.parse_drive_root(path, &normalized)? {
                Some((root, rest)) => (Some(root), rest),
                None => (None, normalized.as_str()),
            }
        };

        let names = split_names(rest, "\\");
        self.check_names(path, &names)?;
        Ok(ParseResult::new(root, names))
    }

    fn format_path(&self, root: Option<&str>, names: &[&str]) -> String {
        let mut out = String::from(root.unwrap_or(""));
        out.push_str(&self.join(names));
        out
    }

    fn to_uri_path(&self, root: &str, names: &[&str]) -> String {
        let mut out = String::new();
        if let Some(unc) = root.strip_prefix("\\\\") {
            out.push_str("//");
            out.push_str(&unc.replace('\\', "/"));
        } else {
            out.push('/');
            out.push_str(&root.replace('\\', "/"));
        }
        out.push_str(&names.join("/"));
        out
    }

    fn parse_uri_path(&self, uri_path: &str) -> Result<ParseResult, FsError> {
        let path = if uri_path.starts_with("//") {
            uri_path.to_owned()
        } else if let Some(rest) = uri_path.strip_prefix('/') {
            if rest.len() == 2 && rest.ends_with(':') {
                format!("{rest}\\")
            } else {
                rest.to_owned()
            }
        } else {
            return Err(invalid_path(uri_path, "uri path must be absolute"));
        };

        let parsed = self.parse_path(&path)?;
        if !parsed.is_absolute() {
            return Err(invalid_path(uri_path, "uri path must have a root"));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn parse_drive_path() {
        let parsed = WindowsPathType.parse_path("C:\\foo\\bar").unwrap();
        assert_eq!(parsed.root.as_deref(), Some("C:\\"));
        assert_eq!(parsed.names, vec!["foo", "bar"]);
    }

    #[test]
    fn parse_accepts_forward_slashes() {
        let parsed = WindowsPathType.parse_path("C:/foo/bar").unwrap();
        assert_eq!(parsed.root.as_deref(), Some("C:\\"));
        assert_eq!(parsed.names, vec!["foo", "bar"]);
    }

    #[test]
    fn parse_unc_path() {
        let parsed = WindowsPathType.parse_path("\\\\host\\share\\dir\\file").unwrap();
        assert_eq!(parsed.root.as_deref(), Some("\\\\host\\share\\"));
        assert_eq!(parsed.names, vec!["dir", "file"]);

        let parsed = WindowsPathType.parse_path("//host/share").unwrap();
        assert_eq!(parsed.root.as_deref(), Some("\\\\host\\share\\"));
        assert!(parsed.names.is_empty());
    }

    #[test]
    fn parse_unc_requires_share() {
        assert!(WindowsPathType.parse_path("\\\\host").is_err());
        assert!(WindowsPathType.parse_path("\\\\\\share").is_err());
    }

    #[test]
    fn parse_relative() {
        let parsed = WindowsPathType.parse_path("foo\\bar").unwrap();
        assert!(!parsed.is_absolute());
        assert_eq!(parsed.names, vec!["foo", "bar"]);
    }

    #[test]
    fn parse_rejects_drive_relative_and_root_relative() {
        assert!(WindowsPathType.parse_path("C:foo").is_err());
        assert!(WindowsPathType.parse_path("C:").is_err());
        assert!(WindowsPathType.parse_path("\\foo").is_err());
    }

    #[test]
    fn parse_rejects_reserved_characters() {
        let err = WindowsPathType.parse_path("C:\\foo\\b?r").unwrap_err();
        assert!(err.to_string().contains("b?r"));
        assert!(WindowsPathType.parse_path("a:b").is_err());
    }

    #[test]
    fn format_path() {
        assert_eq!(
            WindowsPathType.format_path(Some("C:\\"), &["foo", "bar"]),
            "C:\\foo\\bar"
        );
        assert_eq!(WindowsPathType.format_path(Some("C:\\"), &[]), "C:\\");
        assert_eq!(WindowsPathType.format_path(None, &["a", "b"]), "a\\b");
    }

    #[test]
    fn uri_paths() {
        assert_eq!(WindowsPathType.to_uri_path("C:\\", &["foo"]), "/C:/foo");
        assert_eq!(
            WindowsPathType.to_uri_path("\\\\host\\share\\", &["foo"]),
            "//host/share/foo"
        );
    }

    #[test]
    fn drive_uri_round_trip() {
        let base = Url::parse("anyfs://win").unwrap();
        let uri = WindowsPathType.to_uri(&base, "C:\\", &["foo", "bar"]).unwrap();
        let parsed = WindowsPathType.from_uri(&uri).unwrap();
        assert_eq!(parsed.root.as_deref(), Some("C:\\"));
        assert_eq!(parsed.names, vec!["foo", "bar"]);
    }

    #[test]
    fn parse_uri_path_for_bare_drive() {
        let parsed = WindowsPathType.parse_uri_path("/C:").unwrap();
        assert_eq!(parsed.root.as_deref(), Some("C:\\"));
    }
}

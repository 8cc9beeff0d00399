//! Glob and regex path matchers.

use std::fmt;

use regex::Regex;

use crate::{FsError, VfsPath};

/// Matches paths against a `glob:` or `regex:` pattern.
///
/// The match is made against the whole string form of the path.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::{Configuration, PathService};
///
/// let service = PathService::from_config(&Configuration::unix()).unwrap();
/// let matcher = service.create_path_matcher("glob:/src/**/*.rs").unwrap();
/// assert!(matcher.matches(&service.parse_path("/src/a/b/lib.rs", &[]).unwrap()));
/// assert!(!matcher.matches(&service.parse_path("/src/lib.rs.bak", &[]).unwrap()));
/// ```
#[derive(Clone)]
pub struct PathMatcher {
    pattern: String,
    regex: Regex,
}

impl PathMatcher {
    /// Parses `syntax:pattern`. The syntax name is case-insensitive.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPattern`] for a missing or unknown syntax, or a malformed pattern
    pub fn new(syntax_and_pattern: &str, separators: &str) -> Result<Self, FsError> {
        let invalid = |reason: String| FsError::InvalidPattern {
            pattern: syntax_and_pattern.to_owned(),
            reason,
        };

        let (syntax, pattern) = syntax_and_pattern
            .split_once(':')
            .ok_or_else(|| invalid("expected syntax:pattern".into()))?;

        let regex = match syntax.to_ascii_lowercase().as_str() {
            "glob" => glob_to_regex(pattern, separators).map_err(invalid)?,
            "regex" => pattern.to_owned(),
            other => return Err(invalid(format!("unsupported syntax {other:?}"))),
        };

        let regex = Regex::new(&format!("^(?:{regex})$")).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            pattern: syntax_and_pattern.to_owned(),
            regex,
        })
    }

    /// Returns `true` if the path's string form matches.
    pub fn matches(&self, path: &VfsPath) -> bool {
        self.regex.is_match(&path.to_string())
    }

    /// Returns `true` if `s` matches.
    pub fn matches_str(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }

    /// The original `syntax:pattern` string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathMatcher")
            .field("pattern", &self.pattern)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// Translates a glob into a regex body (unanchored).
fn glob_to_regex(glob: &str, separators: &str) -> Result<String, String> {
    let seps = regex::escape(separators);
    let not_sep = format!("[^{seps}]");

    let mut out = String::new();
    let mut chars = glob.chars().peekable();
    let mut in_group = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "trailing escape character".to_owned())?;
                out.push_str(&regex::escape(escaped.encode_utf8(&mut [0; 4])));
            }
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str(&not_sep);
                    out.push('*');
                }
            }
            '?' => out.push_str(&not_sep),
            '[' => translate_class(&mut chars, separators, &mut out)?,
            '{' => {
                if in_group {
                    return Err("nested groups are not supported".into());
                }
                in_group = true;
                out.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    if in_group {
        return Err("unclosed group".into());
    }
    Ok(out)
}

fn translate_class(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    separators: &str,
    out: &mut String,
) -> Result<(), String> {
    out.push('[');
    if chars.peek() == Some(&'!') {
        chars.next();
        out.push('^');
    }

    let mut first = true;
    loop {
        let c = chars.next().ok_or_else(|| "unclosed character class".to_owned())?;
        match c {
            ']' if !first => break,
            '-' => out.push('-'),
            c if separators.contains(c) => {
                return Err("separator not allowed in character class".into());
            }
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
        first = false;
    }
    out.push(']');
    Ok(())
}

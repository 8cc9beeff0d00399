//! String normalizations applied to names.

use std::fmt;
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::FsError;

/// A normalization that can be applied to the display or canonical form of a
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Normalization {
    /// Unicode composed form (NFC).
    Nfc,
    /// Unicode decomposed form (NFD).
    Nfd,
    /// Full Unicode case folding.
    CaseFoldUnicode,
    /// ASCII-only case folding.
    CaseFoldAscii,
}

impl Normalization {
    /// Short identifier used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Normalization::Nfc => "NFC",
            Normalization::Nfd => "NFD",
            Normalization::CaseFoldUnicode => "CASE_FOLD_UNICODE",
            Normalization::CaseFoldAscii => "CASE_FOLD_ASCII",
        }
    }

    fn is_unicode_form(self) -> bool {
        matches!(self, Normalization::Nfc | Normalization::Nfd)
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type NormalizeFn = dyn Fn(&str) -> String + Send + Sync;

/// A string normalization function injected into the path service.
///
/// Built either from a set of [`Normalization`]s or from an arbitrary
/// function. Cloning is cheap.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::{Normalization, PathNormalizer};
///
/// let fold = PathNormalizer::new(&[Normalization::CaseFoldAscii]).unwrap();
/// assert_eq!(fold.normalize("ReadMe.TXT"), "readme.txt");
///
/// assert!(PathNormalizer::new(&[Normalization::Nfc, Normalization::Nfd]).is_err());
/// ```
#[derive(Clone)]
pub struct PathNormalizer {
    f: Arc<NormalizeFn>,
    label: Arc<str>,
}

impl PathNormalizer {
    /// The identity normalizer.
    pub fn none() -> Self {
        Self::from_fn("none", str::to_owned)
    }

    /// Combines the given normalizations.
    ///
    /// The Unicode form is applied first, then case folding. Requesting both
    /// NFC and NFD, or both case folds, fails.
    pub fn new(normalizations: &[Normalization]) -> Result<Self, FsError> {
        let mut form = None;
        let mut fold = None;
        for &n in normalizations {
            let slot = if n.is_unicode_form() {
                &mut form
            } else {
                &mut fold
            };
            match *slot {
                Some(existing) if existing != n => {
                    return Err(FsError::ConflictingNormalizations {
                        first: Normalization::as_str(existing),
                        second: n.as_str(),
                    });
                }
                _ => *slot = Some(n),
            }
        }

        if form.is_none() && fold.is_none() {
            return Ok(Self::none());
        }

        let label = [form, fold]
            .iter()
            .flatten()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join("+");

        Ok(Self::from_fn(label, move |s: &str| {
            let s: String = match form {
                Some(Normalization::Nfc) => s.nfc().collect(),
                Some(Normalization::Nfd) => s.nfd().collect(),
                _ => s.to_owned(),
            };
            match fold {
                Some(Normalization::CaseFoldUnicode) => s.to_lowercase(),
                Some(Normalization::CaseFoldAscii) => s.to_ascii_lowercase(),
                _ => s,
            }
        }))
    }

    /// Wraps an arbitrary normalization function.
    pub fn from_fn<F>(label: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            label: label.into(),
        }
    }

    /// Applies the normalization.
    pub fn normalize(&self, s: &str) -> String {
        (self.f)(s)
    }
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for PathNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathNormalizer").field(&self.label).finish()
    }
}

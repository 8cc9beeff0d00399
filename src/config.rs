//! Namespace configuration.

use std::sync::Arc;

use crate::{Normalization, PathType, UnixPathType, WindowsPathType};

/// Configuration for a [`Namespace`](crate::Namespace) and its
/// [`PathService`](crate::PathService).
///
/// Start from a preset and adjust it with the `with_*` methods.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::{Configuration, Normalization};
///
/// let config = Configuration::unix()
///     .with_roots(["/"])
///     .with_working_directory("/home/user")
///     .with_canonical_normalization(&[Normalization::CaseFoldAscii])
///     .with_canonical_equality(true);
/// assert_eq!(config.working_directory(), "/home/user");
/// ```
#[derive(Debug, Clone)]
pub struct Configuration {
    path_type: Arc<dyn PathType>,
    roots: Vec<String>,
    working_directory: String,
    display_normalizations: Vec<Normalization>,
    canonical_normalizations: Vec<Normalization>,
    equality_uses_canonical_form: bool,
}

impl Configuration {
    /// Unix-like: `/` root, `/work` working directory, no normalization,
    /// case-sensitive equality.
    pub fn unix() -> Self {
        Self {
            path_type: Arc::new(UnixPathType),
            roots: vec!["/".into()],
            working_directory: "/work".into(),
            display_normalizations: Vec::new(),
            canonical_normalizations: Vec::new(),
            equality_uses_canonical_form: false,
        }
    }

    /// Mac OS X-like: Unix paths, names displayed in NFC, identified by NFD
    /// with ASCII case folding, and compared by canonical form.
    pub fn osx() -> Self {
        Self::unix()
            .with_display_normalization(&[Normalization::Nfc])
            .with_canonical_normalization(&[Normalization::Nfd, Normalization::CaseFoldAscii])
            .with_canonical_equality(true)
    }

    /// Windows-like: `C:\` root, `C:\work` working directory, ASCII case
    /// folding, and compared by canonical form.
    pub fn windows() -> Self {
        Self {
            path_type: Arc::new(WindowsPathType),
            roots: vec!["C:\\".into()],
            working_directory: "C:\\work".into(),
            display_normalizations: Vec::new(),
            canonical_normalizations: vec![Normalization::CaseFoldAscii],
            equality_uses_canonical_form: true,
        }
    }

    /// Replaces the path type.
    pub fn with_path_type(mut self, path_type: Arc<dyn PathType>) -> Self {
        self.path_type = path_type;
        self
    }

    /// Replaces the root names. The first root is the default.
    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the working directory, created when the namespace is built.
    pub fn with_working_directory(mut self, path: impl Into<String>) -> Self {
        self.working_directory = path.into();
        self
    }

    /// Sets the normalizations applied to the display form of names.
    pub fn with_display_normalization(mut self, normalizations: &[Normalization]) -> Self {
        self.display_normalizations = normalizations.to_vec();
        self
    }

    /// Sets the normalizations applied to the canonical form of names.
    pub fn with_canonical_normalization(mut self, normalizations: &[Normalization]) -> Self {
        self.canonical_normalizations = normalizations.to_vec();
        self
    }

    /// Chooses whether path equality, hashing and ordering use canonical forms.
    pub fn with_canonical_equality(mut self, canonical: bool) -> Self {
        self.equality_uses_canonical_form = canonical;
        self
    }

    /// The path type.
    pub fn path_type(&self) -> &Arc<dyn PathType> {
        &self.path_type
    }

    /// The root names.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// The working directory path string.
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// The display normalizations.
    pub fn display_normalizations(&self) -> &[Normalization] {
        &self.display_normalizations
    }

    /// The canonical normalizations.
    pub fn canonical_normalizations(&self) -> &[Normalization] {
        &self.canonical_normalizations
    }

    /// Whether equality uses canonical forms.
    pub fn equality_uses_canonical_form(&self) -> bool {
        self.equality_uses_canonical_form
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::unix()
    }
}

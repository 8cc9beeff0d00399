//! # PathService
//!
//! Creates [`VfsPath`] values and owns the equality, hashing and ordering
//! policy every path of one namespace shares.
//!
//! ## Responsibility
//! - Turn strings and URIs into paths, and paths back into strings and URIs
//! - Apply the configured display and canonical normalizers to names
//! - Hash and compare paths by canonical or display form, consistently
//! - Build path matchers using the path type's separators
//!
//! ## Dependencies
//! - [`PathType`] for root/separator/URI syntax
//! - [`PathNormalizer`] for the display and canonical name forms

use std::cmp::Ordering;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use url::Url;

use crate::path::PathData;
use crate::path_type::ParseResult;
use crate::{Configuration, FsError, Name, PathMatcher, PathNormalizer, PathType, VfsPath};

/// Identity of one namespace instance.
///
/// Mixed into every path hash so paths of different namespaces do not
/// collide systematically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileSystemId(u64);

impl FileSystemId {
    /// Allocates an id that is unique within the process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fs#{}", self.0)
    }
}

/// Service for creating paths and handling other path-related operations.
///
/// A service is shared (`Arc<PathService>`) by every path it creates; paths
/// created by different services never compare equal.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::{Configuration, PathService};
///
/// let service = PathService::from_config(&Configuration::unix()).unwrap();
/// let path = service.parse_path("/foo", &["bar", "", "baz"]).unwrap();
/// assert_eq!(path.to_string(), "/foo/bar/baz");
/// assert!(path.is_absolute());
/// ```
pub struct PathService {
    path_type: Arc<dyn PathType>,
    display_normalizer: PathNormalizer,
    canonical_normalizer: PathNormalizer,
    equality_uses_canonical_form: bool,
    file_system: OnceLock<FileSystemId>,
    empty_path: OnceLock<Arc<PathData>>,
}

impl PathService {
    /// Creates a service from its parts.
    pub fn new(
        path_type: Arc<dyn PathType>,
        display_normalizer: PathNormalizer,
        canonical_normalizer: PathNormalizer,
        equality_uses_canonical_form: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            path_type,
            display_normalizer,
            canonical_normalizer,
            equality_uses_canonical_form,
            file_system: OnceLock::new(),
            empty_path: OnceLock::new(),
        })
    }

    /// Creates a service for the given configuration.
    ///
    /// # Errors
    ///
    /// - [`FsError::ConflictingNormalizations`] if a normalization set is invalid
    pub fn from_config(config: &Configuration) -> Result<Arc<Self>, FsError> {
        Ok(Self::new(
            Arc::clone(config.path_type()),
            PathNormalizer::new(config.display_normalizations())?,
            PathNormalizer::new(config.canonical_normalizations())?,
            config.equality_uses_canonical_form(),
        ))
    }

    /// Binds the namespace this service creates paths for.
    ///
    /// # Errors
    ///
    /// - [`FsError::FileSystemAlreadySet`] if a namespace was already bound
    pub fn set_file_system(&self, id: FileSystemId) -> Result<(), FsError> {
        self.file_system
            .set(id)
            .map_err(|_| FsError::FileSystemAlreadySet)?;
        tracing::debug!(file_system = %id, "bound path service");
        Ok(())
    }

    /// The bound namespace, if any.
    pub fn file_system(&self) -> Option<FileSystemId> {
        self.file_system.get().copied()
    }

    /// The path syntax.
    pub fn path_type(&self) -> &Arc<dyn PathType> {
        &self.path_type
    }

    /// The canonical separator as a string.
    pub fn separator(&self) -> String {
        self.path_type.separator().to_string()
    }

    /// Whether equality, hashing and ordering use canonical name forms.
    pub fn equality_uses_canonical_form(&self) -> bool {
        self.equality_uses_canonical_form
    }

    /// Returns the shared empty path: no root and a single empty name.
    ///
    /// The value is built once, on first use, and every later call (and every
    /// [`create_path`](Self::create_path) that ends up empty) shares it.
    pub fn empty_path(self: &Arc<Self>) -> VfsPath {
        let data = self
            .empty_path
            .get_or_init(|| Arc::new(PathData::new(None, vec![Name::EMPTY])));
        VfsPath::from_parts(Arc::clone(self), Arc::clone(data))
    }

    /// Returns the [`Name`] form of a string.
    pub fn name(&self, name: &str) -> Name {
        match name {
            "" => Name::EMPTY,
            "." => Name::SELF,
            ".." => Name::PARENT,
            _ => Name::create(
                self.display_normalizer.normalize(name),
                self.canonical_normalizer.normalize(name),
            ),
        }
    }

    /// Returns the [`Name`] forms of the given strings.
    pub fn names<I, S>(&self, names: I) -> Vec<Name>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| self.name(n.as_ref())).collect()
    }

    /// Returns a root path.
    pub fn create_root(self: &Arc<Self>, root: Name) -> VfsPath {
        self.create_path(Some(root), [])
    }

    /// Returns a single-name relative path.
    pub fn create_file_name(self: &Arc<Self>, name: Name) -> VfsPath {
        self.create_path(None, [name])
    }

    /// Returns a relative path with the given names.
    pub fn create_relative_path(
        self: &Arc<Self>,
        names: impl IntoIterator<Item = Name>,
    ) -> VfsPath {
        self.create_path(None, names)
    }

    /// Returns a path with the given root (if any) and names.
    ///
    /// Empty names are dropped. A result with neither root nor names is the
    /// shared [`empty_path`](Self::empty_path).
    pub fn create_path(
        self: &Arc<Self>,
        root: Option<Name>,
        names: impl IntoIterator<Item = Name>,
    ) -> VfsPath {
        let names: Vec<Name> = names.into_iter().filter(|n| !n.is_empty()).collect();
        if root.is_none() && names.is_empty() {
            return self.empty_path();
        }
        VfsPath::from_parts(Arc::clone(self), Arc::new(PathData::new(root, names)))
    }

    /// Parses the given strings as a path.
    ///
    /// Empty strings are skipped; the rest are joined with the separator
    /// before parsing.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the joined string is not a valid path
    pub fn parse_path(self: &Arc<Self>, first: &str, more: &[&str]) -> Result<VfsPath, FsError> {
        let parts: Vec<&str> = std::iter::once(first)
            .chain(more.iter().copied())
            .filter(|s| !s.is_empty())
            .collect();
        let joined = self.path_type.join(&parts);
        let parsed = self.path_type.parse_path(&joined)?;
        Ok(self.to_path(parsed))
    }

    fn to_path(self: &Arc<Self>, parsed: ParseResult) -> VfsPath {
        let root = parsed.root.as_deref().map(|r| self.name(r));
        let names = self.names(&parsed.names);
        self.create_path(root, names)
    }

    /// Returns the string form of a path.
    pub fn to_string(&self, path: &VfsPath) -> String {
        let names: Vec<&str> = path.names().iter().map(Name::display).collect();
        self.path_type
            .format_path(path.root().map(Name::display), &names)
    }

    /// Feeds the hash of a path into `state`.
    ///
    /// Mixes in the bound namespace id, then either the canonical or the
    /// display forms of the root and names, matching [`compare`](Self::compare).
    pub fn hash<H: Hasher>(&self, path: &VfsPath, state: &mut H) {
        self.file_system().map_or(0, FileSystemId::get).hash(state);
        if self.equality_uses_canonical_form {
            path.root().hash(state);
            for name in path.names() {
                name.hash(state);
            }
        } else {
            path.root().map(Name::display).hash(state);
            for name in path.names() {
                name.display().hash(state);
            }
        }
    }

    /// Returns a hash code for a path.
    pub fn hash_code(&self, path: &VfsPath) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(path, &mut hasher);
        hasher.finish()
    }

    /// Compares two names under the configured policy.
    pub fn compare_names(&self, a: &Name, b: &Name) -> Ordering {
        if self.equality_uses_canonical_form {
            a.cmp(b)
        } else {
            a.display().cmp(b.display())
        }
    }

    /// Compares two paths: roots first (a missing root sorts last), then the
    /// names lexicographically.
    pub fn compare(&self, a: &VfsPath, b: &VfsPath) -> Ordering {
        let roots = match (a.root(), b.root()) {
            (Some(x), Some(y)) => self.compare_names(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        roots.then_with(|| {
            let (xs, ys) = (a.names(), b.names());
            xs.iter()
                .zip(ys)
                .map(|(x, y)| self.compare_names(x, y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| xs.len().cmp(&ys.len()))
        })
    }

    /// Returns the URI of an absolute path, relative to the namespace URI.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotAbsolute`] if `path` has no root
    /// - [`FsError::InvalidUri`] if the URI cannot be built
    pub fn to_uri(&self, base: &Url, path: &VfsPath) -> Result<Url, FsError> {
        let Some(root) = path.root() else {
            return Err(FsError::NotAbsolute {
                path: self.to_string(path),
            });
        };
        let names: Vec<&str> = path.names().iter().map(Name::display).collect();
        self.path_type.to_uri(base, root.display(), &names)
    }

    /// Converts the path of a URI into a path of this service.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidUri`] or [`FsError::InvalidPath`] if the URI path is malformed
    pub fn from_uri(self: &Arc<Self>, uri: &Url) -> Result<VfsPath, FsError> {
        let parsed = self.path_type.from_uri(uri)?;
        Ok(self.to_path(parsed))
    }

    /// Returns a matcher for a `syntax:pattern` string (`glob:` or `regex:`).
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPattern`] for an unknown syntax or a malformed pattern
    pub fn create_path_matcher(&self, syntax_and_pattern: &str) -> Result<PathMatcher, FsError> {
        PathMatcher::new(syntax_and_pattern, &self.path_type.separators())
    }
}

impl fmt::Debug for PathService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathService")
            .field("path_type", &self.path_type)
            .field("display_normalizer", &self.display_normalizer)
            .field("canonical_normalizer", &self.canonical_normalizer)
            .field("equality_uses_canonical_form", &self.equality_uses_canonical_form)
            .field("file_system", &self.file_system.get())
            .finish()
    }
}

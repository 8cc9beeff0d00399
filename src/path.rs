//! Structural path values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{FsError, Name, PathService};

/// Root and names of a path, shared between clones.
#[derive(Debug)]
pub(crate) struct PathData {
    root: Option<Name>,
    names: Vec<Name>,
}

impl PathData {
    pub(crate) fn new(root: Option<Name>, names: Vec<Name>) -> Self {
        Self { root, names }
    }
}

/// A path: an optional root name followed by a sequence of names.
///
/// Paths are created by a [`PathService`] and keep a reference to it; the
/// service decides how paths are rendered, compared and hashed. Equality,
/// hashing and ordering therefore always agree with each other under the
/// service's canonical-or-display policy. Paths created by different services
/// are never equal.
///
/// The empty relative path is represented by a single [`Name::EMPTY`] name,
/// never by an empty sequence.
///
/// Cloning is cheap.
#[derive(Clone)]
pub struct VfsPath {
    service: Arc<PathService>,
    data: Arc<PathData>,
}

impl VfsPath {
    pub(crate) fn from_parts(service: Arc<PathService>, data: Arc<PathData>) -> Self {
        Self { service, data }
    }

    /// The service that created this path.
    pub fn service(&self) -> &Arc<PathService> {
        &self.service
    }

    /// The root name, if this path is absolute.
    pub fn root(&self) -> Option<&Name> {
        self.data.root.as_ref()
    }

    /// The names after the root.
    pub fn names(&self) -> &[Name] {
        &self.data.names
    }

    /// Returns `true` if this path has a root.
    pub fn is_absolute(&self) -> bool {
        self.data.root.is_some()
    }

    /// Returns `true` for the empty relative path.
    pub fn is_empty_path(&self) -> bool {
        self.data.root.is_none() && self.data.names.len() == 1 && self.data.names[0].is_empty()
    }

    /// Number of names; the empty path has one.
    pub fn name_count(&self) -> usize {
        self.data.names.len()
    }

    /// Returns `true` if both values share the same underlying path data.
    pub fn ptr_eq(a: &VfsPath, b: &VfsPath) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }

    /// The last name as a relative path, or `None` for a root path.
    pub fn file_name(&self) -> Option<VfsPath> {
        self.data
            .names
            .last()
            .map(|name| self.service.create_file_name(name.clone()))
    }

    /// The path without its last name.
    ///
    /// A root path and a single-name relative path have no parent; a single
    /// name under a root has the root as its parent.
    pub fn parent(&self) -> Option<VfsPath> {
        match self.data.names.split_last() {
            None => None,
            Some((_, [])) => self.root_path(),
            Some((_, init)) => Some(
                self.service
                    .create_path(self.data.root.clone(), init.iter().cloned()),
            ),
        }
    }

    /// The root as a path of its own.
    pub fn root_path(&self) -> Option<VfsPath> {
        self.data
            .root
            .clone()
            .map(|root| self.service.create_root(root))
    }

    /// Resolves `other` against this path.
    ///
    /// An absolute `other` is returned as is; an empty `other` returns this
    /// path; otherwise the names of `other` are appended.
    pub fn resolve(&self, other: &VfsPath) -> VfsPath {
        if other.is_absolute() || self.is_empty_path() {
            return other.clone();
        }
        if other.is_empty_path() {
            return self.clone();
        }
        let names = self.data.names.iter().chain(&other.data.names).cloned();
        self.service.create_path(self.data.root.clone(), names)
    }

    /// Parses `other` with this path's service and resolves it.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `other` does not parse
    pub fn resolve_str(&self, other: &str) -> Result<VfsPath, FsError> {
        let other = self.service.parse_path(other, &[])?;
        Ok(self.resolve(&other))
    }

    /// Returns `true` if this path begins with the root and names of `other`.
    pub fn starts_with(&self, other: &VfsPath) -> bool {
        let same_root = match (self.root(), other.root()) {
            (Some(a), Some(b)) => self.service.compare_names(a, b).is_eq(),
            (None, None) => true,
            _ => false,
        };
        same_root
            && other.name_count() <= self.name_count()
            && other
                .names()
                .iter()
                .zip(self.names())
                .all(|(a, b)| self.service.compare_names(a, b).is_eq())
    }

    /// Removes `.` names and folds `..` into the preceding name.
    ///
    /// `..` directly under a root is dropped; leading `..` names of a
    /// relative path are kept.
    pub fn normalize(&self) -> VfsPath {
        let mut names: Vec<Name> = Vec::with_capacity(self.data.names.len());
        for name in &self.data.names {
            if *name == Name::SELF {
                continue;
            }
            if *name == Name::PARENT {
                match names.last() {
                    Some(last) if *last != Name::PARENT => {
                        names.pop();
                    }
                    None if self.is_absolute() => {}
                    _ => names.push(Name::PARENT),
                }
                continue;
            }
            names.push(name.clone());
        }
        self.service.create_path(self.data.root.clone(), names)
    }
}

impl PartialEq for VfsPath {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.service, &other.service) && self.service.compare(self, other).is_eq()
    }
}

impl Eq for VfsPath {}

impl Hash for VfsPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service.hash(self, state);
    }
}

impl PartialOrd for VfsPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VfsPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.service.compare(self, other).then_with(|| {
            // Keeps Ord consistent with Eq for paths of different services.
            Arc::as_ptr(&self.service)
                .cast::<()>()
                .cmp(&Arc::as_ptr(&other.service).cast::<()>())
        })
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.service.to_string(self))
    }
}

impl fmt::Debug for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VfsPath({:?})", self.service.to_string(self))
    }
}

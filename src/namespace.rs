//! # Namespace
//!
//! A complete in-memory namespace: a [`PathService`], a [`FileTree`] with one
//! root directory per configured root, and a working directory.
//!
//! Every operation takes the tree lock once, so the directory entries and
//! link counts it changes become visible to other threads together.

use std::sync::Arc;

use url::Url;

use crate::{
    Configuration, ContentStore, DirectoryEntry, File, FileId, FileSystemId, FileTable, FileTree,
    FsError, LinkOption, MemoryContent, Name, PathService, VfsPath,
};

/// URI scheme of namespace URIs.
pub const URI_SCHEME: &str = "anyfs";

/// An in-memory directory tree addressed by [`VfsPath`]s.
///
/// Relative paths are resolved against the working directory.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::{Configuration, Namespace};
///
/// let ns = Namespace::new(Configuration::unix()).unwrap();
/// let dir = ns.path("/work/docs", &[]).unwrap();
/// ns.create_directory(&dir).unwrap();
/// ns.create_file(&ns.path("docs/readme.txt", &[]).unwrap()).unwrap();
///
/// let names: Vec<String> = ns.read_dir(&dir).unwrap().iter().map(|n| n.to_string()).collect();
/// assert_eq!(names, ["readme.txt"]);
/// assert_eq!(ns.link_count(&dir).unwrap(), 2);
/// ```
#[derive(Debug)]
pub struct Namespace {
    id: FileSystemId,
    uri: Url,
    path_service: Arc<PathService>,
    tree: FileTree,
    working_directory: FileId,
    working_directory_path: VfsPath,
}

impl Namespace {
    /// Builds a namespace: binds a fresh [`FileSystemId`] to a new path
    /// service, creates the roots, then the working directory and any
    /// missing directories above it.
    ///
    /// # Errors
    ///
    /// - [`FsError::ConflictingNormalizations`] for an invalid normalization set
    /// - [`FsError::InvalidPath`] if a root is not a bare root path, or no root is configured
    /// - [`FsError::NotAbsolute`] if the working directory is relative
    pub fn new(config: Configuration) -> Result<Self, FsError> {
        let path_service = PathService::from_config(&config)?;
        let id = FileSystemId::next();
        path_service.set_file_system(id)?;

        let uri_string = format!("{URI_SCHEME}://ns-{}", id.get());
        let uri = Url::parse(&uri_string).map_err(|e| FsError::InvalidUri {
            uri: uri_string,
            reason: e.to_string(),
        })?;

        let mut table = FileTable::new();
        let mut roots = Vec::with_capacity(config.roots().len());
        for root in config.roots() {
            let path = path_service.parse_path(root, &[])?;
            let name = match path.root() {
                Some(name) if path.names().is_empty() => name.clone(),
                _ => {
                    return Err(FsError::InvalidPath {
                        input: root.clone(),
                        reason: "not a root".into(),
                    });
                }
            };
            roots.push(table.create_root(name)?);
        }
        let default_root = roots.first().copied().ok_or_else(|| FsError::InvalidPath {
            input: String::new(),
            reason: "at least one root is required".into(),
        })?;

        let working_directory_path = path_service.parse_path(config.working_directory(), &[])?;
        if !working_directory_path.is_absolute() {
            return Err(FsError::NotAbsolute {
                path: working_directory_path.to_string(),
            });
        }
        let working_directory =
            create_directories(&mut table, default_root, &working_directory_path)?;

        tracing::debug!(
            file_system = %id,
            roots = ?config.roots(),
            working_directory = %working_directory_path,
            "created namespace"
        );

        Ok(Self {
            id,
            uri,
            path_service,
            tree: FileTree::new(table),
            working_directory,
            working_directory_path,
        })
    }

    /// The namespace's unique id.
    pub fn id(&self) -> FileSystemId {
        self.id
    }

    /// The namespace URI, `anyfs://ns-<id>`.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The service creating this namespace's paths.
    pub fn path_service(&self) -> &Arc<PathService> {
        &self.path_service
    }

    /// The file tree.
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// The working directory path.
    pub fn working_directory(&self) -> &VfsPath {
        &self.working_directory_path
    }

    /// Parses a path; see [`PathService::parse_path`].
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the joined string is not a valid path
    pub fn path(&self, first: &str, more: &[&str]) -> Result<VfsPath, FsError> {
        self.path_service.parse_path(first, more)
    }

    /// Returns `path` resolved against the working directory.
    pub fn absolute(&self, path: &VfsPath) -> VfsPath {
        self.working_directory_path.resolve(path)
    }

    /// Returns the URI of `path`, made absolute first.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidUri`] if the path contains `.` or `..`, or the URI
    ///   cannot be built
    pub fn to_uri(&self, path: &VfsPath) -> Result<Url, FsError> {
        self.path_service.to_uri(&self.uri, &self.absolute(path))
    }

    /// Returns the path named by a URI of this namespace.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidUri`] if the URI belongs to another namespace or is malformed
    pub fn path_from_uri(&self, uri: &Url) -> Result<VfsPath, FsError> {
        if uri.scheme() != self.uri.scheme() || uri.host_str() != self.uri.host_str() {
            return Err(FsError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("not a uri of {}", self.uri),
            });
        }
        self.path_service.from_uri(uri)
    }

    /// Resolves `path` to the entry naming it.
    ///
    /// # Errors
    ///
    /// See [`FileTable::lookup`].
    pub fn lookup(&self, path: &VfsPath, option: LinkOption) -> Result<DirectoryEntry, FsError> {
        self.tree.lookup(self.working_directory, path, option)
    }

    /// Returns `true` if `path` resolves.
    pub fn exists(&self, path: &VfsPath, option: LinkOption) -> bool {
        self.lookup(path, option).is_ok()
    }

    /// Creates an empty directory at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if `path` exists
    /// - [`FsError::NotFound`] if the parent is missing
    /// - [`FsError::NotADirectory`] if the parent is not a directory
    pub fn create_directory(&self, path: &VfsPath) -> Result<FileId, FsError> {
        self.create(path, FileTable::create_directory)
    }

    /// Creates `path` and any missing directories above it.
    ///
    /// Existing directories along the way are kept.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if an existing name on the way is not a directory
    pub fn create_directories(&self, path: &VfsPath) -> Result<FileId, FsError> {
        let mut table = self.tree.write();
        create_directories(&mut table, self.working_directory, path)
    }

    /// Creates an empty regular file at `path`, held in memory.
    ///
    /// # Errors
    ///
    /// Same as [`create_directory`](Self::create_directory).
    pub fn create_file(&self, path: &VfsPath) -> Result<FileId, FsError> {
        self.create_file_with(path, Arc::new(MemoryContent::new()))
    }

    /// Creates a regular file at `path` backed by `content`.
    ///
    /// # Errors
    ///
    /// Same as [`create_directory`](Self::create_directory).
    pub fn create_file_with(
        &self,
        path: &VfsPath,
        content: Arc<dyn ContentStore>,
    ) -> Result<FileId, FsError> {
        self.create(path, |table| table.create_regular(content))
    }

    /// Creates a symbolic link at `path` pointing to `target`.
    ///
    /// The target is stored as given; it need not exist.
    ///
    /// # Errors
    ///
    /// Same as [`create_directory`](Self::create_directory).
    pub fn create_symlink(&self, path: &VfsPath, target: &VfsPath) -> Result<FileId, FsError> {
        let target = target.clone();
        self.create(path, |table| table.create_symlink(target))
    }

    fn create(
        &self,
        path: &VfsPath,
        make: impl FnOnce(&mut FileTable) -> FileId,
    ) -> Result<FileId, FsError> {
        let mut table = self.tree.write();
        let (dir, name) = self.parent_and_name(&table, path)?;
        if table.get(dir, &name)?.is_some() {
            return Err(FsError::AlreadyExists {
                name: path.to_string(),
                operation: "create",
            });
        }

        let file = make(&mut table);
        if let Err(e) = table.link(dir, name, file) {
            table.discard(file);
            return Err(e);
        }
        tracing::debug!(file_system = %self.id, path = %path, %file, "created");
        Ok(file)
    }

    /// Adds `link` as a new name for the file at `existing`.
    ///
    /// A symbolic link at `existing` is linked itself, not its target.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotAFile`] if `existing` is a directory
    /// - [`FsError::AlreadyExists`] if `link` exists
    /// - [`FsError::NotFound`] if `existing` or the parent of `link` is missing
    pub fn link(&self, link: &VfsPath, existing: &VfsPath) -> Result<(), FsError> {
        let mut table = self.tree.write();
        let target = table
            .lookup(self.working_directory, existing, LinkOption::NoFollow)?
            .file();
        if table.file(target).is_some_and(File::is_directory) {
            return Err(FsError::NotAFile {
                path: existing.to_string(),
            });
        }

        let (dir, name) = self.parent_and_name(&table, link)?;
        table.link(dir, name, target).map_err(|e| match e {
            FsError::AlreadyExists { .. } => FsError::AlreadyExists {
                name: link.to_string(),
                operation: "link",
            },
            e => e,
        })?;
        tracing::debug!(file_system = %self.id, link = %link, existing = %existing, "linked");
        Ok(())
    }

    /// Removes the entry at `path`; a symbolic link is removed itself.
    ///
    /// The file is released once its last link is gone.
    ///
    /// # Errors
    ///
    /// - [`FsError::DirectoryNotEmpty`] if `path` is a directory with entries
    /// - [`FsError::InvalidPath`] if `path` is a root directory
    /// - [`FsError::ReservedName`] if `path` ends in `.` or `..`
    /// - [`FsError::NotFound`] if `path` does not exist
    pub fn delete(&self, path: &VfsPath) -> Result<(), FsError> {
        let mut table = self.tree.write();
        let entry = table.lookup(self.working_directory, path, LinkOption::NoFollow)?;
        if entry.name().is_reserved() {
            return Err(FsError::ReservedName {
                name: entry.name().to_string(),
                operation: "delete",
            });
        }
        if let Some(dir) = table.directory(entry.file()) {
            if dir.parent() == Some(entry.file()) {
                return Err(FsError::InvalidPath {
                    input: path.to_string(),
                    reason: "cannot delete a root directory".into(),
                });
            }
            if !dir.is_empty() {
                return Err(FsError::DirectoryNotEmpty {
                    path: path.to_string(),
                });
            }
        }

        let released = table.unlink(entry.directory(), entry.name())?;
        tracing::debug!(
            file_system = %self.id,
            path = %path,
            released = released.is_some(),
            "deleted"
        );
        Ok(())
    }

    /// Names in the directory at `path`, sorted by display form.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `path` is not a directory
    pub fn read_dir(&self, path: &VfsPath) -> Result<Vec<Name>, FsError> {
        let table = self.tree.read();
        let entry = table.lookup(self.working_directory, path, LinkOption::Follow)?;
        table
            .directory(entry.file())
            .map(|dir| dir.snapshot())
            .ok_or_else(|| FsError::NotADirectory {
                path: path.to_string(),
            })
    }

    /// Link count of the file at `path`, following a final symbolic link.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `path` does not exist
    pub fn link_count(&self, path: &VfsPath) -> Result<u32, FsError> {
        self.with_file(path, LinkOption::Follow, |file| Ok(file.links()))
    }

    /// The content of the regular file at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotAFile`] if `path` is not a regular file
    pub fn content(&self, path: &VfsPath) -> Result<Arc<dyn ContentStore>, FsError> {
        self.with_file(path, LinkOption::Follow, |file| {
            file.as_regular().cloned().ok_or_else(|| FsError::NotAFile {
                path: path.to_string(),
            })
        })
    }

    /// The target of the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `path` is not a symbolic link
    pub fn read_link(&self, path: &VfsPath) -> Result<VfsPath, FsError> {
        self.with_file(path, LinkOption::NoFollow, |file| {
            file.as_symlink().cloned().ok_or_else(|| FsError::InvalidPath {
                input: path.to_string(),
                reason: "not a symbolic link".into(),
            })
        })
    }

    fn with_file<T>(
        &self,
        path: &VfsPath,
        option: LinkOption,
        f: impl FnOnce(&File) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let table = self.tree.read();
        let id = table.lookup(self.working_directory, path, option)?.file();
        let file = table.file(id).ok_or(FsError::FileNotFound { id })?;
        f(file)
    }

    /// Splits `path` into its (existing) parent directory and final name.
    fn parent_and_name(
        &self,
        table: &FileTable,
        path: &VfsPath,
    ) -> Result<(FileId, Name), FsError> {
        let Some(name) = path.names().last().filter(|_| !path.is_empty_path()) else {
            return Err(FsError::AlreadyExists {
                name: path.to_string(),
                operation: "create",
            });
        };
        let parent = path
            .parent()
            .unwrap_or_else(|| self.path_service.empty_path());
        let dir = table
            .lookup(self.working_directory, &parent, LinkOption::Follow)?
            .file();
        if table.directory(dir).is_none() {
            return Err(FsError::NotADirectory {
                path: parent.to_string(),
            });
        }
        Ok((dir, name.clone()))
    }
}

/// Creates every missing directory of `path`, relative paths under `base`.
fn create_directories(
    table: &mut FileTable,
    base: FileId,
    path: &VfsPath,
) -> Result<FileId, FsError> {
    let service = path.service();
    let mut dir = match path.root() {
        Some(root) => table.root(root).ok_or_else(|| FsError::NotFound {
            path: path.to_string(),
        })?,
        None => base,
    };

    let names = path.names();
    for (i, name) in names.iter().enumerate().filter(|(_, n)| !n.is_empty()) {
        let prefix = service.create_relative_path(names[..=i].iter().cloned());
        let prefix = match path.root_path() {
            Some(root) => root.resolve(&prefix),
            None => prefix,
        };
        dir = match table.lookup(base, &prefix, LinkOption::Follow) {
            Ok(entry) if table.directory(entry.file()).is_some() => entry.file(),
            Ok(_) => {
                return Err(FsError::NotADirectory {
                    path: prefix.to_string(),
                });
            }
            Err(FsError::NotFound { .. }) => {
                let created = table.create_directory();
                if let Err(e) = table.link(dir, name.clone(), created) {
                    table.discard(created);
                    return Err(e);
                }
                created
            }
            Err(e) => return Err(e),
        };
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix() -> Namespace {
        Namespace::new(Configuration::unix()).unwrap()
    }

    fn p(ns: &Namespace, s: &str) -> VfsPath {
        ns.path(s, &[]).unwrap()
    }

    #[test]
    fn working_directory_is_created() {
        let ns = unix();
        let work = p(&ns, "/work");
        assert!(ns.exists(&work, LinkOption::Follow));
        assert_eq!(ns.working_directory(), &work);
        assert_eq!(ns.link_count(&work).unwrap(), 2);
        assert_eq!(ns.read_dir(&p(&ns, "/")).unwrap(), vec![Name::simple("work")]);
    }

    #[test]
    fn nested_working_directory() {
        let config = Configuration::unix().with_working_directory("/home/user");
        let ns = Namespace::new(config).unwrap();
        assert!(ns.exists(&p(&ns, "/home"), LinkOption::Follow));
        assert!(ns.exists(&p(&ns, "/home/user"), LinkOption::Follow));
        assert!(!ns.exists(&p(&ns, "/work"), LinkOption::Follow));
    }

    #[test]
    fn ids_are_unique_and_bound() {
        let a = unix();
        let b = unix();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.path_service().file_system(), Some(a.id()));
        assert_ne!(a.uri(), b.uri());
        assert_eq!(a.uri().scheme(), URI_SCHEME);
    }

    #[test]
    fn relative_working_directory_rejected() {
        let err = Namespace::new(Configuration::unix().with_working_directory("work")).unwrap_err();
        assert!(matches!(err, FsError::NotAbsolute { .. }));
    }

    #[test]
    fn bad_roots_rejected() {
        let err = Namespace::new(Configuration::unix().with_roots(["/a"])).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));

        let none: [&str; 0] = [];
        let err = Namespace::new(Configuration::unix().with_roots(none)).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));
    }

    #[test]
    fn create_existing_fails_without_leaking() {
        let ns = unix();
        let before = ns.tree().read().len();
        let err = ns.create_file(&p(&ns, "/work")).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }));
        assert!(ns.create_directory(&p(&ns, "/")).is_err());
        assert_eq!(ns.tree().read().len(), before);
    }

    #[test]
    fn create_under_missing_or_file_parent_fails() {
        let ns = unix();
        let err = ns.create_file(&p(&ns, "/nope/x")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));

        ns.create_file(&p(&ns, "f")).unwrap();
        let err = ns.create_file(&p(&ns, "f/x")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    #[test]
    fn create_directories_keeps_existing() {
        let ns = unix();
        let id = ns.create_directories(&p(&ns, "/work/a/b/c")).unwrap();
        assert_eq!(ns.lookup(&p(&ns, "a/b/c"), LinkOption::Follow).unwrap().file(), id);
        assert_eq!(ns.create_directories(&p(&ns, "a/b/c")).unwrap(), id);

        ns.create_file(&p(&ns, "a/file")).unwrap();
        let err = ns.create_directories(&p(&ns, "a/file/d")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    #[test]
    fn hard_links() {
        let ns = unix();
        let original = p(&ns, "original");
        let copy = p(&ns, "/copy");
        let id = ns.create_file(&original).unwrap();
        ns.link(&copy, &original).unwrap();

        assert_eq!(ns.lookup(&copy, LinkOption::Follow).unwrap().file(), id);
        assert_eq!(ns.link_count(&original).unwrap(), 2);
        ns.delete(&original).unwrap();
        assert_eq!(ns.link_count(&copy).unwrap(), 1);
    }

    #[test]
    fn hard_link_to_directory_refused() {
        let ns = unix();
        let err = ns.link(&p(&ns, "dirlink"), &p(&ns, "/work")).unwrap_err();
        assert!(matches!(err, FsError::NotAFile { .. }));
    }

    #[test]
    fn hard_link_onto_existing_name_refused() {
        let ns = unix();
        ns.create_file(&p(&ns, "a")).unwrap();
        ns.create_file(&p(&ns, "b")).unwrap();
        let err = ns.link(&p(&ns, "b"), &p(&ns, "a")).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }));
        assert_eq!(ns.link_count(&p(&ns, "a")).unwrap(), 1);
    }

    #[test]
    fn delete_rules() {
        let ns = unix();
        ns.create_directory(&p(&ns, "d")).unwrap();
        ns.create_file(&p(&ns, "d/f")).unwrap();

        let err = ns.delete(&p(&ns, "d")).unwrap_err();
        assert!(matches!(err, FsError::DirectoryNotEmpty { .. }));

        let err = ns.delete(&p(&ns, "/")).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));

        let err = ns.delete(&p(&ns, "d/.")).unwrap_err();
        assert!(matches!(err, FsError::ReservedName { .. }));

        ns.delete(&p(&ns, "d/f")).unwrap();
        ns.delete(&p(&ns, "d")).unwrap();
        assert!(!ns.exists(&p(&ns, "d"), LinkOption::NoFollow));

        let err = ns.delete(&p(&ns, "d")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[test]
    fn symlinks_are_deleted_not_followed() {
        let ns = unix();
        let target = ns.create_file(&p(&ns, "target")).unwrap();
        ns.create_symlink(&p(&ns, "link"), &p(&ns, "target")).unwrap();
        assert_eq!(ns.lookup(&p(&ns, "link"), LinkOption::Follow).unwrap().file(), target);
        assert_eq!(ns.read_link(&p(&ns, "link")).unwrap(), p(&ns, "target"));

        ns.delete(&p(&ns, "link")).unwrap();
        assert!(ns.exists(&p(&ns, "target"), LinkOption::Follow));
        assert!(ns.read_link(&p(&ns, "target")).is_err());
    }

    #[test]
    fn file_content() {
        let ns = unix();
        ns.create_file_with(&p(&ns, "data"), Arc::new(MemoryContent::from_bytes(b"hello")))
            .unwrap();
        let content = ns.content(&p(&ns, "data")).unwrap();
        assert_eq!(content.size(), 5);

        let err = ns.content(&p(&ns, "/work")).unwrap_err();
        assert!(matches!(err, FsError::NotAFile { .. }));
    }

    #[test]
    fn read_dir_of_file_fails() {
        let ns = unix();
        ns.create_file(&p(&ns, "f")).unwrap();
        let err = ns.read_dir(&p(&ns, "f")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    #[test]
    fn uri_round_trip() {
        let ns = unix();
        let path = p(&ns, "a b/c");
        let uri = ns.to_uri(&path).unwrap();
        assert_eq!(uri.as_str(), format!("anyfs://ns-{}/work/a%20b/c", ns.id().get()));
        assert_eq!(ns.path_from_uri(&uri).unwrap(), p(&ns, "/work/a b/c"));

        let other = unix();
        assert!(other.path_from_uri(&uri).is_err());
    }

    #[tracing_test::traced_test]
    #[test]
    fn operations_are_logged() {
        let ns = unix();
        ns.create_file(&p(&ns, "logged")).unwrap();
        ns.delete(&p(&ns, "logged")).unwrap();
        assert!(logs_contain("created namespace"));
        assert!(logs_contain("deleted"));
    }
}

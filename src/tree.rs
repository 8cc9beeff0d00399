//! # FileTree
//!
//! The lock around a [`FileTable`] and path resolution over it.
//!
//! ## Resolution
//!
//! [`FileTable::lookup`] walks a path one name at a time:
//! - an absolute path starts at the root directory named by its root
//! - a relative path starts at the given base directory
//! - every name except the last must resolve to a directory, following
//!   symbolic links on the way
//! - the last name follows a symbolic link only with [`LinkOption::Follow`]
//!
//! Symbolic link targets are resolved relative to the directory containing
//! the link. More than [`MAX_SYMLINK_DEPTH`] links in one resolution fails
//! with [`FsError::SymlinkLoop`].

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{DirectoryEntry, File, FileId, FileTable, FsError, Name, VfsPath};

/// Maximum number of symbolic links followed in one resolution.
pub const MAX_SYMLINK_DEPTH: usize = 40;

/// Whether the final name of a path follows a symbolic link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkOption {
    /// Resolve a final symbolic link to its target.
    #[default]
    Follow,
    /// Return the symbolic link itself.
    NoFollow,
}

/// A [`FileTable`] shared between threads.
///
/// Readers take the shared lock, mutations the exclusive one. Each link or
/// unlink therefore changes the entry and the link count together from the
/// point of view of every other thread.
#[derive(Debug, Default)]
pub struct FileTree {
    table: RwLock<FileTable>,
}

impl FileTree {
    /// Wraps a table.
    pub fn new(table: FileTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    /// Acquires the shared lock.
    pub fn read(&self) -> RwLockReadGuard<'_, FileTable> {
        self.table.read()
    }

    /// Acquires the exclusive lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, FileTable> {
        self.table.write()
    }

    /// Resolves `path` under the shared lock.
    ///
    /// # Errors
    ///
    /// See [`FileTable::lookup`].
    pub fn lookup(
        &self,
        base: FileId,
        path: &VfsPath,
        option: LinkOption,
    ) -> Result<DirectoryEntry, FsError> {
        self.read().lookup(base, path, option)
    }
}

impl FileTable {
    /// Resolves `path`, relative paths against directory `base`.
    ///
    /// Returns the entry naming the file. A path with no names (a root, or the
    /// empty path) resolves to the entry linking the directory into its
    /// parent.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if a root or name does not exist
    /// - [`FsError::NotADirectory`] if a non-final name is not a directory
    /// - [`FsError::SymlinkLoop`] if too many symbolic links are followed
    pub fn lookup(
        &self,
        base: FileId,
        path: &VfsPath,
        option: LinkOption,
    ) -> Result<DirectoryEntry, FsError> {
        let mut followed = 0;
        self.lookup_at(base, path, option, &mut followed)
    }

    fn lookup_at(
        &self,
        base: FileId,
        path: &VfsPath,
        option: LinkOption,
        followed: &mut usize,
    ) -> Result<DirectoryEntry, FsError> {
        let not_found = || FsError::NotFound {
            path: path.to_string(),
        };

        let mut dir = match path.root() {
            Some(root) => self.root(root).ok_or_else(not_found)?,
            None => base,
        };

        let names = path.names();
        let Some((last, init)) = names.split_last().filter(|_| !path.is_empty_path()) else {
            return self
                .directory(dir)
                .and_then(|table| table.entry())
                .ok_or_else(not_found);
        };

        for name in init {
            let entry = self.step(dir, name, path)?.ok_or_else(not_found)?;
            let entry = self.follow(entry, LinkOption::Follow, path, followed)?;
            if !self.file(entry.file()).is_some_and(File::is_directory) {
                return Err(FsError::NotADirectory {
                    path: path.to_string(),
                });
            }
            dir = entry.file();
        }

        let entry = self.step(dir, last, path)?.ok_or_else(not_found)?;
        self.follow(entry, option, path, followed)
    }

    fn step(
        &self,
        dir: FileId,
        name: &Name,
        path: &VfsPath,
    ) -> Result<Option<DirectoryEntry>, FsError> {
        let file = self.file(dir).ok_or_else(|| FsError::NotFound {
            path: path.to_string(),
        })?;
        let table = file.as_directory().ok_or_else(|| FsError::NotADirectory {
            path: path.to_string(),
        })?;
        Ok(table.get(name))
    }

    fn follow(
        &self,
        entry: DirectoryEntry,
        option: LinkOption,
        path: &VfsPath,
        followed: &mut usize,
    ) -> Result<DirectoryEntry, FsError> {
        if option == LinkOption::NoFollow {
            return Ok(entry);
        }
        let Some(target) = self.file(entry.file()).and_then(File::as_symlink) else {
            return Ok(entry);
        };
        // counts every link of the resolution, nested targets included
        if *followed >= MAX_SYMLINK_DEPTH {
            return Err(FsError::SymlinkLoop {
                path: path.to_string(),
            });
        }
        *followed += 1;
        tracing::trace!(link = %entry.name(), target = %target, "following symbolic link");
        self.lookup_at(entry.directory(), target, LinkOption::Follow, followed)
    }
}

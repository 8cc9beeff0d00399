//! # FileTable
//!
//! Arena of files keyed by [`FileId`], and the linking protocol that keeps
//! directory entries and link counts consistent.
//!
//! ## Responsibility
//! - Allocate files with monotonically increasing ids
//! - Link and unlink names in directory tables, adjusting link counts
//! - Wire `.` and `..` of directories as they are linked and unlinked
//! - Release files whose link count drops to zero
//!
//! Directory entries hold ids rather than references, so the cycles formed by
//! `.` and `..` cost nothing to tear down: a file lives exactly as long as its
//! link count keeps it in the arena.
//!
//! ## Thread Safety
//!
//! `FileTable` itself is not synchronized; [`FileTree`](crate::FileTree) puts
//! it behind a lock so each operation is atomic with respect to observers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    ContentStore, DirectoryEntry, DirectoryTable, File, FileContent, FileId, FsError, Name,
    VfsPath,
};

/// Arena of files and the super-root directory that holds the roots.
#[derive(Debug)]
pub struct FileTable {
    files: HashMap<FileId, File>,
    next_id: u64,
    super_root: FileId,
}

impl FileTable {
    /// Creates a table containing only the super-root directory.
    ///
    /// The super-root maps root names (such as `/` or `C:\`) to root
    /// directories; its own `.` and `..` refer to itself.
    pub fn new() -> Self {
        let mut table = Self {
            files: HashMap::new(),
            next_id: 0,
            super_root: FileId(0),
        };
        let super_root = table.create_directory();
        table.attach_super_root(super_root);
        table
    }

    /// Makes `dir` the super-root: its `.` and `..` both refer to itself.
    ///
    /// Setting `.` counts as one link, which keeps the super-root alive.
    ///
    /// # Errors
    ///
    /// - [`FsError::FileNotFound`] / [`FsError::NotADirectory`] for bad ids
    pub fn set_super_root(&mut self, dir: FileId) -> Result<(), FsError> {
        self.require_directory_mut(dir)?;
        self.attach_super_root(dir);
        Ok(())
    }

    /// `dir` must be a live directory.
    fn attach_super_root(&mut self, dir: FileId) {
        if let Some(file) = self.files.get_mut(&dir) {
            let self_linked = file
                .as_directory_mut()
                .is_some_and(|table| table.attach(dir, Name::EMPTY));
            if self_linked {
                file.increment_links();
            }
        }
        self.super_root = dir;
    }

    /// The super-root directory.
    pub fn super_root(&self) -> FileId {
        self.super_root
    }

    fn allocate(&mut self, content: impl FnOnce(FileId) -> FileContent) -> FileId {
        let id = FileId(self.next_id);
        self.next_id += 1;
        self.files.insert(id, File::new(id, content(id)));
        id
    }

    /// Creates an unlinked, empty directory.
    pub fn create_directory(&mut self) -> FileId {
        self.allocate(|id| FileContent::Directory(DirectoryTable::new(id)))
    }

    /// Creates an unlinked regular file owning `content`.
    pub fn create_regular(&mut self, content: Arc<dyn ContentStore>) -> FileId {
        self.allocate(|_| FileContent::Regular(content))
    }

    /// Creates an unlinked symbolic link to `target`.
    pub fn create_symlink(&mut self, target: VfsPath) -> FileId {
        self.allocate(|_| FileContent::Symlink(target))
    }

    /// Returns the file with the given id.
    pub fn file(&self, id: FileId) -> Option<&File> {
        self.files.get(&id)
    }

    /// Returns the table of the directory with the given id.
    pub fn directory(&self, id: FileId) -> Option<&DirectoryTable> {
        self.files.get(&id).and_then(File::as_directory)
    }

    /// Looks up `name` in directory `dir`.
    ///
    /// # Errors
    ///
    /// - [`FsError::FileNotFound`] if `dir` does not exist
    /// - [`FsError::NotADirectory`] if `dir` is not a directory
    pub fn get(&self, dir: FileId, name: &Name) -> Result<Option<DirectoryEntry>, FsError> {
        Ok(self.require_directory(dir)?.get(name))
    }

    /// Number of live files, the super-root included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always `false`: the super-root is never released.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn require_file(&self, id: FileId) -> Result<&File, FsError> {
        self.files.get(&id).ok_or(FsError::FileNotFound { id })
    }

    fn require_directory(&self, id: FileId) -> Result<&DirectoryTable, FsError> {
        self.require_file(id)?
            .as_directory()
            .ok_or_else(|| FsError::NotADirectory {
                path: id.to_string(),
            })
    }

    fn require_directory_mut(&mut self, id: FileId) -> Result<&mut DirectoryTable, FsError> {
        self.files
            .get_mut(&id)
            .ok_or(FsError::FileNotFound { id })?
            .as_directory_mut()
            .ok_or_else(|| FsError::NotADirectory {
                path: id.to_string(),
            })
    }

    /// Links `file` into directory `dir` under `name`.
    ///
    /// Increments the file's link count. If `file` is a directory, its `..`
    /// is set to `dir`, its name to `name`, and its `.` to itself if not set
    /// yet; setting `.` counts as a link too, so a directory linked for the
    /// first time goes from 0 to 2 links.
    ///
    /// # Errors
    ///
    /// - [`FsError::ReservedName`] if `name` is `.` or `..`
    /// - [`FsError::AlreadyExists`] if `dir` already has an entry named `name`
    /// - [`FsError::FileNotFound`] / [`FsError::NotADirectory`] for bad ids
    pub fn link(&mut self, dir: FileId, name: Name, file: FileId) -> Result<(), FsError> {
        if name.is_reserved() {
            return Err(FsError::ReservedName {
                name: name.to_string(),
                operation: "link",
            });
        }
        self.require_file(file)?;

        let table = self.require_directory_mut(dir)?;
        if table.contains(&name) {
            return Err(FsError::AlreadyExists {
                name: name.to_string(),
                operation: "link",
            });
        }
        table.insert(name.clone(), file);

        let target = self
            .files
            .get_mut(&file)
            .ok_or(FsError::FileNotFound { id: file })?;
        target.increment_links();
        let self_linked = target
            .as_directory_mut()
            .is_some_and(|table| table.attach(dir, name.clone()));
        if self_linked {
            target.increment_links();
        }

        tracing::trace!(%dir, %name, %file, links = target.links(), "linked");
        Ok(())
    }

    /// Removes the entry `name` from directory `dir`.
    ///
    /// Decrements the file's link count. If the file is a directory, its `.`
    /// and `..` are cleared and the count is decremented once more for `.`.
    /// When the count reaches zero the file leaves the arena and is returned;
    /// a released directory releases its remaining entries in turn.
    ///
    /// # Errors
    ///
    /// - [`FsError::ReservedName`] if `name` is `.` or `..`
    /// - [`FsError::NoSuchEntry`] if `dir` has no entry named `name`
    /// - [`FsError::FileNotFound`] / [`FsError::NotADirectory`] for bad ids
    pub fn unlink(&mut self, dir: FileId, name: &Name) -> Result<Option<File>, FsError> {
        if name.is_reserved() {
            return Err(FsError::ReservedName {
                name: name.to_string(),
                operation: "unlink",
            });
        }
        let file = self
            .require_directory_mut(dir)?
            .remove(name)
            .ok_or_else(|| FsError::NoSuchEntry {
                name: name.to_string(),
                operation: "unlink",
            })?;

        tracing::trace!(%dir, %name, %file, "unlinking");
        Ok(self.drop_link(file))
    }

    /// Drops one entry's reference to `file`, releasing it at zero links.
    ///
    /// Entries of released directories are dropped in turn, using a work list
    /// so that deep trees do not grow the call stack.
    fn drop_link(&mut self, file: FileId) -> Option<File> {
        let mut released = self.decrement(file)?;
        let mut pending = match released.as_directory_mut() {
            Some(table) => table.drain(),
            None => Vec::new(),
        };
        while let Some(child) = pending.pop() {
            if let Some(mut child) = self.decrement(child) {
                if let Some(table) = child.as_directory_mut() {
                    pending.extend(table.drain());
                }
            }
        }
        Some(released)
    }

    /// Removes one link from `file` and takes it out of the arena at zero.
    fn decrement(&mut self, file: FileId) -> Option<File> {
        let target = self.files.get_mut(&file)?;
        target.decrement_links();
        let self_unlinked = target
            .as_directory_mut()
            .is_some_and(DirectoryTable::detach);
        if self_unlinked {
            target.decrement_links();
        }

        if target.links() > 0 {
            tracing::trace!(%file, links = target.links(), "unlinked");
            return None;
        }
        tracing::trace!(%file, "released");
        self.files.remove(&file)
    }

    /// Makes `dir` a root: its `..` refers to itself.
    ///
    /// `dir` is normally linked under the super-root first, which sets its
    /// name and `.`.
    ///
    /// # Errors
    ///
    /// - [`FsError::FileNotFound`] / [`FsError::NotADirectory`] for bad ids
    pub fn set_root(&mut self, dir: FileId) -> Result<(), FsError> {
        self.require_directory_mut(dir)?.set_parent(dir);
        Ok(())
    }

    /// Creates a root directory named `name` under the super-root.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if a root with that name exists
    pub fn create_root(&mut self, name: Name) -> Result<FileId, FsError> {
        let root = self.create_directory();
        if let Err(e) = self.link(self.super_root, name.clone(), root) {
            self.discard(root);
            return Err(e);
        }
        self.set_root(root)?;
        tracing::debug!(%name, %root, "created root directory");
        Ok(root)
    }

    /// Returns the root directory named `name`.
    pub fn root(&self, name: &Name) -> Option<FileId> {
        self.directory(self.super_root)?
            .get(name)
            .map(|entry| entry.file())
    }

    /// Names of all roots, in listing order.
    pub fn roots(&self) -> Vec<Name> {
        self.directory(self.super_root)
            .map(DirectoryTable::snapshot)
            .unwrap_or_default()
    }

    /// Removes a file that was never linked.
    ///
    /// Returns `None` (and leaves the file in place) if it has links.
    pub fn discard(&mut self, id: FileId) -> Option<File> {
        if self.files.get(&id)?.links() > 0 {
            return None;
        }
        self.files.remove(&id)
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

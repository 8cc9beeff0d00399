//! Inode-like files.

use std::fmt;
use std::sync::Arc;

use crate::{ContentStore, DirectoryTable, VfsPath};

/// Unique identifier of a file within one [`FileTable`](crate::FileTable).
///
/// Ids are allocated monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a file holds.
#[derive(Debug)]
pub enum FileContent {
    /// A directory and its entries.
    Directory(DirectoryTable),
    /// Byte content of a regular file.
    Regular(Arc<dyn ContentStore>),
    /// Target of a symbolic link.
    Symlink(VfsPath),
}

/// A file: an id, a link count and exactly one content payload.
///
/// The link count is the number of directory entries naming this file. A
/// linked directory also counts its own `.` entry, so a directory with a
/// single parent has two links.
#[derive(Debug)]
pub struct File {
    id: FileId,
    links: u32,
    content: FileContent,
}

impl File {
    pub(crate) fn new(id: FileId, content: FileContent) -> Self {
        Self {
            id,
            links: 0,
            content,
        }
    }

    /// The file's id.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Current link count.
    pub fn links(&self) -> u32 {
        self.links
    }

    pub(crate) fn increment_links(&mut self) {
        self.links += 1;
    }

    pub(crate) fn decrement_links(&mut self) {
        self.links = self.links.saturating_sub(1);
    }

    /// The content payload.
    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Returns `true` if this file is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self.content, FileContent::Directory(_))
    }

    /// Returns `true` if this file is a regular file.
    pub fn is_regular(&self) -> bool {
        matches!(self.content, FileContent::Regular(_))
    }

    /// Returns `true` if this file is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self.content, FileContent::Symlink(_))
    }

    /// The directory table, if this is a directory.
    pub fn as_directory(&self) -> Option<&DirectoryTable> {
        match &self.content {
            FileContent::Directory(table) => Some(table),
            _ => None,
        }
    }

    pub(crate) fn as_directory_mut(&mut self) -> Option<&mut DirectoryTable> {
        match &mut self.content {
            FileContent::Directory(table) => Some(table),
            _ => None,
        }
    }

    /// The byte content, if this is a regular file.
    pub fn as_regular(&self) -> Option<&Arc<dyn ContentStore>> {
        match &self.content {
            FileContent::Regular(store) => Some(store),
            _ => None,
        }
    }

    /// The link target, if this is a symbolic link.
    pub fn as_symlink(&self) -> Option<&VfsPath> {
        match &self.content {
            FileContent::Symlink(target) => Some(target),
            _ => None,
        }
    }
}

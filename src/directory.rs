//! Directory tables and the entries they hand out.

use std::collections::HashMap;

use crate::{FileId, Name};

/// A read-only `(directory, name, file)` triple returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectoryEntry {
    directory: FileId,
    name: Name,
    file: FileId,
}

impl DirectoryEntry {
    /// Creates an entry.
    pub fn new(directory: FileId, name: Name, file: FileId) -> Self {
        Self {
            directory,
            name,
            file,
        }
    }

    /// The directory containing the entry.
    pub fn directory(&self) -> FileId {
        self.directory
    }

    /// The entry's name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The file the entry refers to.
    pub fn file(&self) -> FileId {
        self.file
    }
}

/// The entries of a directory.
///
/// Maps names to file ids by canonical form. Once the owning directory is
/// linked into the tree, the table also answers for `.` (the directory
/// itself) and `..` (its parent); those two entries are never created or
/// removed through [`FileTable::link`](crate::FileTable::link) and
/// [`FileTable::unlink`](crate::FileTable::unlink) directly.
///
/// Tables are mutated only through the [`FileTable`](crate::FileTable) that
/// owns them, which keeps link counts in step with entries.
#[derive(Debug)]
pub struct DirectoryTable {
    owner: FileId,
    entries: HashMap<Name, FileId>,
    self_entry: Option<FileId>,
    parent_entry: Option<FileId>,
    name: Option<Name>,
}

impl DirectoryTable {
    pub(crate) fn new(owner: FileId) -> Self {
        Self {
            owner,
            entries: HashMap::new(),
            self_entry: None,
            parent_entry: None,
            name: None,
        }
    }

    /// The id of the directory file that owns this table.
    pub fn owner(&self) -> FileId {
        self.owner
    }

    /// Looks up an entry by canonical name, including `.` and `..`.
    pub fn get(&self, name: &Name) -> Option<DirectoryEntry> {
        if *name == Name::SELF {
            return self
                .self_entry
                .map(|file| DirectoryEntry::new(file, Name::SELF, file));
        }
        if *name == Name::PARENT {
            let dir = self.self_entry?;
            return self
                .parent_entry
                .map(|parent| DirectoryEntry::new(dir, Name::PARENT, parent));
        }
        self.entries
            .get_key_value(name)
            .map(|(linked, &file)| DirectoryEntry::new(self.owner, linked.clone(), file))
    }

    /// Returns `true` if an ordinary entry with this name exists.
    pub fn contains(&self, name: &Name) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of all ordinary entries, sorted by display string.
    ///
    /// `.` and `..` are never included. The order does not depend on how
    /// names are normalized, so listings are stable even when lookups fold
    /// case.
    pub fn snapshot(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.entries.keys().cloned().collect();
        names.sort_by(Name::display_order);
        names
    }

    /// Number of entries, counting `.` and `..` when present.
    pub fn size(&self) -> usize {
        self.entries.len()
            + usize::from(self.self_entry.is_some())
            + usize::from(self.parent_entry.is_some())
    }

    /// Returns `true` if the table has no entries besides `.` and `..`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The parent directory (the `..` entry).
    pub fn parent(&self) -> Option<FileId> {
        self.parent_entry
    }

    /// The directory itself (the `.` entry).
    pub fn self_file(&self) -> Option<FileId> {
        self.self_entry
    }

    /// The name this directory is linked under in its parent.
    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    /// The entry linking this directory into its parent.
    pub fn entry(&self) -> Option<DirectoryEntry> {
        match (self.parent_entry, &self.name, self.self_entry) {
            (Some(parent), Some(name), Some(this)) => {
                Some(DirectoryEntry::new(parent, name.clone(), this))
            }
            _ => None,
        }
    }

    pub(crate) fn insert(&mut self, name: Name, file: FileId) {
        self.entries.insert(name, file);
    }

    pub(crate) fn remove(&mut self, name: &Name) -> Option<FileId> {
        self.entries.remove(name)
    }

    pub(crate) fn drain(&mut self) -> Vec<FileId> {
        self.entries.drain().map(|(_, file)| file).collect()
    }

    /// Records the parent and name, and sets `.` if it was unset. Returns
    /// `true` if `.` was newly set.
    pub(crate) fn attach(&mut self, parent: FileId, name: Name) -> bool {
        self.parent_entry = Some(parent);
        self.name = Some(name);
        if self.self_entry.is_none() {
            self.self_entry = Some(self.owner);
            true
        } else {
            false
        }
    }

    /// Clears `.`, `..` and the name. Returns `true` if `.` was set.
    pub(crate) fn detach(&mut self) -> bool {
        self.parent_entry = None;
        self.name = None;
        self.self_entry.take().is_some()
    }

    pub(crate) fn set_parent(&mut self, parent: FileId) {
        self.parent_entry = Some(parent);
    }
}

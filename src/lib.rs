//! # anyfs-namespace
//!
//! The in-memory **namespace engine** of a virtual filesystem: directory
//! tables, hard links, link counts and the paths that address them.
//!
//! This crate maintains a hierarchical directory tree entirely in memory. It
//! parses and normalizes path names, keeps `.`/`..` entries and link counts
//! consistent as files are linked and unlinked, and makes path equality,
//! hashing and ordering follow one configurable policy (case-sensitive or
//! not, Unicode-normalized or not). Byte storage is left to a
//! [`ContentStore`].
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyfs_namespace::{Configuration, LinkOption, Namespace};
//!
//! let ns = Namespace::new(Configuration::windows())?;
//!
//! let report = ns.path("C:\\work\\Report.txt", &[])?;
//! ns.create_file(&report)?;
//! ns.link(&ns.path("copy.txt", &[])?, &report)?;
//!
//! // Windows names are matched case-insensitively
//! let same = ns.path("c:/WORK/report.TXT", &[])?;
//! assert_eq!(same, report);
//! assert!(ns.exists(&same, LinkOption::Follow));
//! assert_eq!(ns.link_count(&same)?, 2);
//! # Ok::<(), anyfs_namespace::FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Namespace`] | Roots, working directory and create/link/delete operations |
//! | [`PathService`] | Parses, renders, hashes and compares [`VfsPath`]s |
//! | [`Name`] | A path component with display and canonical forms |
//! | [`DirectoryTable`] | Entries of one directory, plus `.` and `..` |
//! | [`FileTable`] | Arena of [`File`]s and the link/unlink protocol |
//! | [`FileTree`] | The arena behind a lock, with path resolution |
//! | [`Configuration`] | Path syntax, roots and normalization policy |
//! | [`FsError`] | Error type with context |
//!
//! ---
//!
//! ## Names and Equality
//!
//! Every [`Name`] carries a display form (what listings show) and a canonical
//! form (what lookups match on). The forms come from the configured
//! [`Normalization`]s, so `Configuration::windows()` stores `Foo` but finds it
//! as `FOO`, while directory listings still show `Foo`. Listings are sorted by
//! display form, never by canonical form.
//!
//! ---
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, FsError>`. Errors carry the
//! offending name or path:
//!
//! ```rust
//! use anyfs_namespace::{ErrorKind, FsError};
//!
//! let err = FsError::ReservedName { name: "..".into(), operation: "link" };
//! assert_eq!(err.to_string(), "link: reserved name: ..");
//! assert_eq!(err.kind(), ErrorKind::InvalidArgument);
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`Namespace`], [`PathService`] and [`VfsPath`] are `Send + Sync`. A
//! namespace serializes mutations through one lock around its [`FileTable`],
//! so a directory entry and the link count of the file it names always change
//! together as seen from other threads.
//!
//! ---
//!
//! ## Logging
//!
//! Events are emitted through [`tracing`]: `trace` for every link and unlink,
//! `debug` for namespace-level operations. No subscriber is installed.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`Name`], [`FileId`], [`DirectoryEntry`] and [`Normalization`] |

// Private modules
mod config;
mod content;
mod directory;
mod error;
mod file;
mod file_table;
mod name;
mod namespace;
mod normalization;
mod path;
mod path_matcher;
mod path_service;
mod path_type;
mod tree;

// Public re-exports - error types
pub use error::{ErrorKind, FsError};

// Public re-exports - names and paths
pub use name::Name;
pub use normalization::{Normalization, PathNormalizer};
pub use path::VfsPath;
pub use path_matcher::PathMatcher;
pub use path_service::{FileSystemId, PathService};
pub use path_type::{ParseResult, PathType, UnixPathType, WindowsPathType};

// Public re-exports - files and directories
pub use content::{ContentStore, MemoryContent};
pub use directory::{DirectoryEntry, DirectoryTable};
pub use file::{File, FileContent, FileId};
pub use file_table::FileTable;
pub use tree::{FileTree, LinkOption, MAX_SYMLINK_DEPTH};

// Public re-exports - namespace
pub use config::Configuration;
pub use namespace::{Namespace, URI_SCHEME};

//! Basic usage of the namespace engine.
//!
//! Builds a Unix-like namespace, creates a few files and directories, links
//! and deletes names, and shows how link counts and listings follow along.
//!
//! Run with: `cargo run --example basic_usage`

use std::sync::Arc;

use anyfs_namespace::{
    Configuration, ContentStore, FsError, LinkOption, MemoryContent, Namespace,
};

fn main() -> Result<(), FsError> {
    // =========================================================================
    // Step 1: Create a namespace
    // =========================================================================

    let ns = Namespace::new(Configuration::unix())?;
    println!("namespace {} at {}", ns.id(), ns.uri());
    println!("working directory: {}", ns.working_directory());

    // =========================================================================
    // Step 2: Directories and files
    // =========================================================================

    let docs = ns.path("/work/docs/2024", &[])?;
    ns.create_directories(&docs)?;

    let notes = ns.path("docs/2024/notes.txt", &[])?;
    let content = Arc::new(MemoryContent::from_bytes(b"hello"));
    ns.create_file_with(&notes, content)?;
    println!("{} is {} bytes", ns.absolute(&notes), ns.content(&notes)?.size());

    // =========================================================================
    // Step 3: Hard links and symbolic links
    // =========================================================================

    let alias = ns.path("/work/notes-alias.txt", &[])?;
    ns.link(&alias, &notes)?;
    println!("links to notes.txt: {}", ns.link_count(&notes)?);

    let latest = ns.path("/work/latest", &[])?;
    ns.create_symlink(&latest, &ns.path("docs/2024", &[])?)?;
    println!("{latest} -> {}", ns.read_link(&latest)?);

    let through_link = ns.path("/work/latest/notes.txt", &[])?;
    println!("exists through link: {}", ns.exists(&through_link, LinkOption::Follow));

    // =========================================================================
    // Step 4: Listings, deletion and URIs
    // =========================================================================

    let listing: Vec<String> = ns
        .read_dir(&ns.path("/work", &[])?)?
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("/work: {}", listing.join(", "));

    ns.delete(&alias)?;
    println!("links after delete: {}", ns.link_count(&notes)?);

    match ns.delete(&docs) {
        Err(FsError::DirectoryNotEmpty { path }) => println!("refused: {path} is not empty"),
        other => println!("unexpected: {other:?}"),
    }

    let uri = ns.to_uri(&notes)?;
    println!("{uri} names {}", ns.path_from_uri(&uri)?);

    Ok(())
}

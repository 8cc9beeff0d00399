//! Integration tests exercising the public surface end to end.
//!
//! These tests verify that:
//! 1. Directory tables keep entries, `.`/`..` and link counts in step
//! 2. Equality, hashing and ordering of paths follow the configured policy
//! 3. Paths survive the trip through URIs
//! 4. Namespaces stay consistent under concurrent mutation

use anyfs_namespace::*;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::thread;

fn path(ns: &Namespace, s: &str) -> VfsPath {
    ns.path(s, &[]).unwrap()
}

fn names(list: &[Name]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

// =============================================================================
// Directory Tables
// =============================================================================

#[test]
fn link_adds_exactly_one_entry() {
    let mut table = FileTable::new();
    let root = table.create_root(Name::simple("/")).unwrap();

    for (i, name) in ["a", "b", "ć", "with space"].into_iter().enumerate() {
        let size = table.directory(root).unwrap().size();
        let file = table.create_regular(Arc::new(MemoryContent::new()));
        table.link(root, Name::simple(name), file).unwrap();

        let dir = table.directory(root).unwrap();
        assert_eq!(dir.size(), size + 1, "after {i} links");
        assert_eq!(
            dir.get(&Name::simple(name)),
            Some(DirectoryEntry::new(root, Name::simple(name), file))
        );
    }
}

#[test]
fn failed_link_leaves_table_unchanged() {
    let mut table = FileTable::new();
    let root = table.create_root(Name::simple("/")).unwrap();
    let first = table.create_directory();
    let second = table.create_directory();
    table.link(root, Name::simple("x"), first).unwrap();
    let before = table.directory(root).unwrap().snapshot();

    let err = table.link(root, Name::simple("x"), second).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(table.directory(root).unwrap().snapshot(), before);
    assert_eq!(table.get(root, &Name::simple("x")).unwrap().unwrap().file(), first);
    assert_eq!(table.file(second).unwrap().links(), 0);
}

#[test]
fn reserved_names_are_refused_everywhere() {
    let mut table = FileTable::new();
    let root = table.create_root(Name::simple("/")).unwrap();
    let never_linked = table.create_directory();
    let file = table.create_regular(Arc::new(MemoryContent::new()));

    for dir in [root, never_linked] {
        for name in [Name::SELF, Name::PARENT] {
            assert!(table.link(dir, name.clone(), file).unwrap_err().is_invalid_argument());
            assert!(table.unlink(dir, &name).unwrap_err().is_invalid_argument());
        }
    }
}

#[test]
fn directory_link_count_lifecycle() {
    let mut table = FileTable::new();
    let root = table.create_root(Name::simple("/")).unwrap();
    let dir = table.create_directory();
    assert_eq!(table.file(dir).unwrap().links(), 0);

    table.link(root, Name::simple("d"), dir).unwrap();
    assert_eq!(table.file(dir).unwrap().links(), 2);
    let t = table.directory(dir).unwrap();
    assert_eq!(t.get(&Name::SELF).unwrap().file(), dir);
    assert_eq!(t.get(&Name::PARENT).unwrap().file(), root);

    let released = table.unlink(root, &Name::simple("d")).unwrap().unwrap();
    assert_eq!(released.links(), 0);
    let t = released.as_directory().unwrap();
    assert!(t.get(&Name::SELF).is_none());
    assert!(t.get(&Name::PARENT).is_none());
}

// =============================================================================
// Listings and Case Sensitivity
// =============================================================================

#[test]
fn listings_use_display_order_and_skip_self_and_parent() {
    let ns = Namespace::new(Configuration::windows()).unwrap();
    for name in ["bar", "FOO", "Baz"] {
        ns.create_file(&path(&ns, name)).unwrap();
    }

    let listed = names(&ns.read_dir(&path(&ns, ".")).unwrap());
    assert_eq!(listed, ["Baz", "FOO", "bar"]);
}

#[test]
fn case_insensitive_lookup() {
    let ns = Namespace::new(Configuration::windows()).unwrap();
    let id = ns.create_directory(&path(&ns, "Bar")).unwrap();

    for spelling in ["bar", "BAR", "Bar", "c:\\work\\bAR"] {
        assert_eq!(ns.lookup(&path(&ns, spelling), LinkOption::Follow).unwrap().file(), id);
    }
    let err = ns.create_file(&path(&ns, "BAR")).unwrap_err();
    assert!(matches!(err, FsError::AlreadyExists { .. }));
    assert_eq!(names(&ns.read_dir(&path(&ns, "")).unwrap()), ["Bar"]);
}

#[test]
fn unix_lookup_is_case_sensitive() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    ns.create_file(&path(&ns, "bar")).unwrap();
    ns.create_file(&path(&ns, "BAR")).unwrap();
    assert_eq!(names(&ns.read_dir(&path(&ns, "")).unwrap()), ["BAR", "bar"]);
}

#[test]
fn osx_matches_unicode_forms() {
    let ns = Namespace::new(Configuration::osx()).unwrap();
    let id = ns.create_file(&path(&ns, "caf\u{e9}")).unwrap();

    let decomposed = path(&ns, "CAFE\u{301}");
    assert_eq!(ns.lookup(&decomposed, LinkOption::Follow).unwrap().file(), id);
    assert_eq!(decomposed, path(&ns, "caf\u{e9}"));
}

// =============================================================================
// Path Equality, Hashing and Ordering
// =============================================================================

#[test]
fn compare_agrees_with_hash() {
    for config in [Configuration::unix(), Configuration::windows(), Configuration::osx()] {
        let ns = Namespace::new(config).unwrap();
        let service = ns.path_service();
        let inputs = ["a", "A", "a/b", "A/B", "b", "/", "/a", "/A/b", ""];
        let inputs: Vec<&str> = if service.separator() == "\\" {
            vec!["a", "A", "a\\b", "A\\B", "b", "C:\\", "c:\\a", "C:\\A\\b", ""]
        } else {
            inputs.to_vec()
        };
        let paths: Vec<VfsPath> = inputs.iter().map(|s| path(&ns, s)).collect();

        for a in &paths {
            for b in &paths {
                if service.compare(a, b).is_eq() {
                    assert_eq!(service.hash_code(a), service.hash_code(b), "{a} vs {b}");
                    assert_eq!(a, b);
                }
                assert_eq!(service.compare(a, b), service.compare(b, a).reverse());
            }
        }

        let hashed: HashSet<VfsPath> = paths.iter().cloned().collect();
        let ordered: BTreeSet<VfsPath> = paths.iter().cloned().collect();
        assert_eq!(hashed.len(), ordered.len());
    }
}

#[test]
fn paths_of_different_namespaces_differ() {
    let a = Namespace::new(Configuration::unix()).unwrap();
    let b = Namespace::new(Configuration::unix()).unwrap();
    assert_ne!(path(&a, "/x"), path(&b, "/x"));
    assert_ne!(a.path_service().file_system(), b.path_service().file_system());
}

#[test]
fn empty_path_is_shared_under_concurrent_first_use() {
    let service = PathService::from_config(&Configuration::unix()).unwrap();
    let paths: Vec<VfsPath> = thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = &service;
                s.spawn(move || {
                    if i % 2 == 0 {
                        service.empty_path()
                    } else {
                        service.create_path(None, [])
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for p in &paths {
        assert!(VfsPath::ptr_eq(p, &paths[0]));
        assert!(p.is_empty_path());
    }
    assert!(VfsPath::ptr_eq(&service.parse_path("", &[]).unwrap(), &paths[0]));
}

#[test]
fn binding_a_service_twice_is_illegal() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    let err = ns.path_service().set_file_system(FileSystemId::next()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalState);
    assert_eq!(ns.path_service().file_system(), Some(ns.id()));
}

// =============================================================================
// URIs
// =============================================================================

#[test]
fn uri_round_trip() {
    for (config, inputs) in [
        (Configuration::unix(), vec!["/", "/foo", "/foo/bar baz/%", "/ü/ñ"]),
        (
            Configuration::windows(),
            vec!["C:\\", "C:\\foo\\bar", "\\\\host\\share\\dir", "C:\\a b"],
        ),
    ] {
        let ns = Namespace::new(config).unwrap();
        let service = ns.path_service();
        for input in inputs {
            let p = path(&ns, input);
            let uri = service.to_uri(ns.uri(), &p).unwrap();
            let back = service.from_uri(&uri).unwrap();
            assert_eq!(back, p, "{input} -> {uri}");
            assert_eq!(service.to_uri(ns.uri(), &back).unwrap(), uri);
        }
    }
}

#[test]
fn uri_of_relative_path_fails() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    let err = ns
        .path_service()
        .to_uri(ns.uri(), &path(&ns, "relative"))
        .unwrap_err();
    assert!(matches!(err, FsError::NotAbsolute { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // the namespace itself makes paths absolute first
    assert!(ns.to_uri(&path(&ns, "relative")).is_ok());
}

#[test]
fn uri_never_names_a_different_path() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    let service = ns.path_service();
    for input in ["/a/./b", "/a/../b", "/a/b/.."] {
        let p = path(&ns, input);
        match service.to_uri(ns.uri(), &p) {
            Ok(uri) => assert_eq!(service.from_uri(&uri).unwrap(), p, "{input}"),
            Err(err) => assert!(matches!(err, FsError::InvalidUri { .. }), "{input}"),
        }
    }
    assert!(ns.to_uri(&path(&ns, "/a/../b")).is_err());
}

// =============================================================================
// Path Matchers
// =============================================================================

#[test]
fn matchers_use_path_type_separators() {
    let ns = Namespace::new(Configuration::windows()).unwrap();
    let matcher = ns.path_service().create_path_matcher("glob:C:\\\\work\\\\*.txt").unwrap();
    assert!(matcher.matches(&path(&ns, "C:/work/a.txt")));
    assert!(!matcher.matches(&path(&ns, "C:/work/sub/a.txt")));
}

// =============================================================================
// Namespace Operations
// =============================================================================

#[test]
fn hard_links_share_one_file() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    let a = path(&ns, "/work/a");
    let b = path(&ns, "/b");
    ns.create_file(&a).unwrap();
    ns.link(&b, &a).unwrap();

    ns.content(&a).unwrap().write_at(0, b"shared");
    let mut buf = [0; 6];
    assert_eq!(ns.content(&b).unwrap().read_at(0, &mut buf), 6);
    assert_eq!(&buf, b"shared");

    assert_eq!(ns.link_count(&b).unwrap(), 2);
    ns.delete(&a).unwrap();
    assert_eq!(ns.link_count(&b).unwrap(), 1);
    ns.delete(&b).unwrap();
    assert!(!ns.exists(&b, LinkOption::NoFollow));
}

#[test]
fn nested_directory_link_counts() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    ns.create_directories(&path(&ns, "/a/b/c")).unwrap();
    for dir in ["/a", "/a/b", "/a/b/c"] {
        assert_eq!(ns.link_count(&path(&ns, dir)).unwrap(), 2, "{dir}");
    }
    let err = ns.delete(&path(&ns, "/a/b")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryNotEmpty);
}

#[test]
fn symlinks_resolve_relative_to_their_directory() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    ns.create_directories(&path(&ns, "/data/v1")).unwrap();
    let file = ns.create_file(&path(&ns, "/data/v1/file")).unwrap();
    ns.create_symlink(&path(&ns, "/data/current"), &path(&ns, "v1")).unwrap();

    let via_link = path(&ns, "/data/current/file");
    assert_eq!(ns.lookup(&via_link, LinkOption::Follow).unwrap().file(), file);

    ns.create_symlink(&path(&ns, "/self"), &path(&ns, "/self")).unwrap();
    let err = ns.lookup(&path(&ns, "/self"), LinkOption::Follow).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Loop);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_link_and_unlink_stay_consistent() {
    let ns = Namespace::new(Configuration::unix()).unwrap();
    let ns = &ns;

    thread::scope(|s| {
        for t in 0..4 {
            s.spawn(move || {
                for i in 0..50 {
                    let dir = path(ns, &format!("/work/t{t}-{i}"));
                    let file = path(ns, &format!("/work/t{t}-{i}/f"));
                    let link = path(ns, &format!("/work/t{t}-{i}-link"));
                    ns.create_directory(&dir).unwrap();
                    ns.create_file(&file).unwrap();
                    ns.link(&link, &file).unwrap();
                    ns.delete(&file).unwrap();
                    ns.delete(&dir).unwrap();
                    ns.delete(&link).unwrap();
                }
            });
        }

        s.spawn(move || {
            for _ in 0..200 {
                let work_path = path(ns, "/work");
                let table = ns.tree().read();
                let work = table
                    .lookup(table.super_root(), &work_path, LinkOption::Follow)
                    .unwrap();
                let work_dir = table.directory(work.file()).unwrap();
                for name in work_dir.snapshot() {
                    assert!(!name.is_reserved());
                    let entry = work_dir.get(&name).unwrap();
                    let file = table.file(entry.file()).unwrap();
                    match file.as_directory() {
                        Some(dir) => {
                            assert_eq!(file.links(), 2);
                            assert_eq!(dir.self_file(), Some(entry.file()));
                            assert_eq!(dir.parent(), Some(work.file()));
                        }
                        None => assert!(file.links() >= 1),
                    }
                }
            }
        });
    });

    assert!(ns.read_dir(&path(ns, "/work")).unwrap().is_empty());
}

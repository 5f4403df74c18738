use std::io::{Cursor, Write};

use jarview_archive::{ArchiveError, JavaArchive};
use zip::write::FileOptions;

/// The smallest structurally valid class file: empty constant pool, no
/// members, no attributes.
fn class_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes()); // minor_version
    buf.extend_from_slice(&52u16.to_be_bytes()); // major_version
    buf.extend_from_slice(&1u16.to_be_bytes()); // constant_pool_count
    for _ in 0..6 {
        // access_flags, this_class, super_class, interfaces_count,
        // fields_count, methods_count
        buf.extend_from_slice(&0u16.to_be_bytes());
    }
    buf.extend_from_slice(&0u16.to_be_bytes()); // attributes_count
    buf
}

fn write_jar(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
    }

    zip.finish().unwrap()
}

fn with_archive(entries: &[(&str, &[u8])], f: impl FnOnce(JavaArchive)) {
    f(JavaArchive::read("test.jar", write_jar(entries)).unwrap());
}

#[test]
fn test_package_chains_are_deduplicated() {
    let class = class_bytes();
    with_archive(
        &[
            ("a/b/C.class", &class),
            ("a/b/D.class", &class),
            ("a/E.class", &class),
        ],
        |archive| {
            let tree = archive.tree();
            let root = tree.node(archive.root());
            assert_eq!(1, root.subpackages().len());

            let a = tree.subpackage(archive.root(), "a").unwrap();
            assert_eq!(1, tree.node(a).subpackages().len());
            let names = |id| {
                tree.node(id)
                    .classes()
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
            };
            assert_eq!(vec!["E"], names(a));

            let b = tree.subpackage(a, "b").unwrap();
            assert_eq!(vec!["C", "D"], names(b));
        },
    );
}

#[test]
fn test_enumeration_is_deterministic() {
    let class = class_bytes();
    with_archive(
        &[
            ("a/b/C.class", &class),
            ("a/b/D.class", &class),
            ("a/E.class", &class),
        ],
        |archive| {
            let first = archive.classes().map(|c| c.name.clone()).collect::<Vec<_>>();
            let second = archive.classes().map(|c| c.name.clone()).collect::<Vec<_>>();

            // Pre-order, self before children, siblings as inserted.
            assert_eq!(vec!["E", "C", "D"], first);
            assert_eq!(first, second);
        },
    );
}

#[test]
fn test_directory_markers_are_never_resources() {
    with_archive(
        &[("a/", b""), ("a/notes.txt", b"hi")],
        |archive| {
            let resources = archive.resources().collect::<Vec<_>>();
            assert_eq!(1, resources.len());
            assert_eq!("notes", resources[0].name);
        },
    );
}

#[test]
fn test_manifest_is_stored_under_the_mf_extension() {
    with_archive(
        &[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")],
        |archive| {
            let tree = archive.tree();
            let meta_inf = tree.subpackage(archive.root(), "META-INF").unwrap();
            let manifest = &tree.node(meta_inf).resources()[0];

            assert_eq!("MANIFEST", manifest.name);
            assert_eq!("MF", manifest.extension);
            assert_eq!(b"Manifest-Version: 1.0\n".to_vec(), manifest.content);
        },
    );
}

#[test]
fn test_other_entries_become_resources() {
    with_archive(&[("res/logo.png", b"\x89PNG")], |archive| {
        let resource = archive.resources().next().unwrap();
        assert_eq!("logo", resource.name);
        assert_eq!("png", resource.extension);
        assert_eq!(b"\x89PNG".to_vec(), resource.content);
    });
}

#[test]
fn test_classes_without_a_package_land_at_the_root() {
    let class = class_bytes();
    with_archive(&[("Main.class", &class)], |archive| {
        let root = archive.tree().node(archive.root());
        assert_eq!("Main", root.classes()[0].name);
        assert_eq!("52.0", root.classes()[0].class_file.version());
    });
}

#[test]
fn test_a_malformed_entry_is_isolated() {
    let class = class_bytes();
    with_archive(
        &[
            ("a/Good.class", &class),
            ("a/Bad.class", b"this is not a class file"),
        ],
        |archive| {
            assert_eq!(1, archive.classes().count());
            assert_eq!(1, archive.skipped().len());

            let skipped = &archive.skipped()[0];
            assert_eq!("a/Bad.class", skipped.path);
            assert!(matches!(skipped.error, ArchiveError::ClassFile(_)));
        },
    );
}

#[test]
fn test_qualified_names() {
    let class = class_bytes();
    with_archive(&[("a/b/C.class", &class)], |archive| {
        let tree = archive.tree();
        let a = tree.subpackage(archive.root(), "a").unwrap();
        let b = tree.subpackage(a, "b").unwrap();

        assert_eq!("a.b", tree.qualified_name(b));
        assert_eq!(Some(a), tree.node(b).parent());
    });
}

#[test]
fn test_an_empty_jar_has_an_empty_tree() {
    with_archive(&[], |archive| {
        assert_eq!(0, archive.classes().count());
        assert_eq!(0, archive.resources().count());
        assert_eq!(vec![archive.root()], archive.packages().collect::<Vec<_>>());
    });
}

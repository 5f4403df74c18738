use std::io::{Cursor, Read, Seek};

use jarview_class_file::ClassFile;
use zip::ZipArchive;

use crate::{
    tree::{Class, Classes, PackageId, PackageTree, Packages, Resource, Resources},
    ArchiveError, Result,
};

/// How an entry path is handled, decided by suffix alone.
#[derive(Debug, PartialEq, Eq)]
pub enum EntryKind {
    Class,
    Manifest,
    /// Directory marker (trailing separator). Skipped outright, never
    /// attached as a resource.
    Directory,
    Other,
}
impl EntryKind {
    pub fn from_path(path: &str) -> EntryKind {
        if path.ends_with('/') {
            EntryKind::Directory
        } else if path.ends_with(".class") {
            EntryKind::Class
        } else if path.ends_with(".MF") {
            EntryKind::Manifest
        } else {
            EntryKind::Other
        }
    }
}

/// An entry that failed to decode, with the error that stopped it. The
/// rest of the archive is unaffected.
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: String,
    pub error: ArchiveError,
}

/// A jar opened into a browsable package tree.
pub struct JavaArchive {
    tree: PackageTree,
    skipped: Vec<SkippedEntry>,
}
impl JavaArchive {
    /// Reads the whole container, decoding every `.class` entry and
    /// attaching everything else as resources.
    ///
    /// Entries are visited in the container's native order; each one is
    /// fully drained into memory and released before the next is opened.
    /// A malformed entry does not abort the walk: it is logged, recorded
    /// under [`skipped`](Self::skipped) and left out of the tree.
    /// Container-level failures (an unreadable ZIP) are fatal.
    pub fn read<R: Read + Seek>(name: &str, reader: R) -> Result<JavaArchive> {
        let mut zip = ZipArchive::new(reader)?;
        let mut tree = PackageTree::new(name);
        let mut skipped = Vec::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            let path = entry.name().to_owned();
            let mut content = Vec::with_capacity(prealloc_size(entry.size()));
            entry.read_to_end(&mut content)?;
            drop(entry);

            if let Err(error) = attach_entry(&mut tree, &path, content) {
                log::warn!("skipping entry {}: {}", path, error);
                skipped.push(SkippedEntry { path, error });
            }
        }

        Ok(JavaArchive { tree, skipped })
    }

    pub fn tree(&self) -> &PackageTree {
        &self.tree
    }

    pub fn root(&self) -> PackageId {
        self.tree.root()
    }

    pub fn classes(&self) -> Classes<'_> {
        self.tree.classes(self.tree.root())
    }

    pub fn resources(&self) -> Resources<'_> {
        self.tree.resources(self.tree.root())
    }

    pub fn packages(&self) -> Packages<'_> {
        self.tree.packages(self.tree.root())
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }
}

/// Pre-allocation hint for an entry's content buffer. The declared size
/// comes from the central directory and is untrusted, so it is capped;
/// `read_to_end` grows the buffer past the cap as real bytes arrive.
fn prealloc_size(declared: u64) -> usize {
    const CAP: u64 = 1 << 20;
    declared.min(CAP) as usize
}

fn attach_entry(tree: &mut PackageTree, path: &str, content: Vec<u8>) -> Result<()> {
    let kind = EntryKind::from_path(path);
    if kind == EntryKind::Directory {
        return Ok(());
    }

    let (dir, file_name) = match path.rsplit_once('/') {
        Some((dir, file_name)) => (dir, file_name),
        None => ("", path),
    };
    if file_name.is_empty() {
        return Err(ArchiveError::UnsupportedEntry(path.to_owned()));
    }

    let package = tree.ensure_path(dir.split('/').filter(|s| !s.is_empty()));

    match kind {
        EntryKind::Class => {
            let class_file = ClassFile::parse(Cursor::new(content))?;
            let name = file_name
                .strip_suffix(".class")
                .unwrap_or(file_name)
                .to_owned();
            tree.add_class(package, Class { name, class_file });
        }
        EntryKind::Manifest => {
            // The manifest is kept as a plain resource under the fixed MF
            // extension.
            let name = file_name.strip_suffix(".MF").unwrap_or(file_name).to_owned();
            tree.add_resource(
                package,
                Resource {
                    name,
                    extension: "MF".to_owned(),
                    content,
                },
            );
        }
        // Directories returned above; anything else is a plain resource.
        _ => {
            let (name, extension) = match file_name.rsplit_once('.') {
                Some((name, extension)) => (name.to_owned(), extension.to_owned()),
                None => (file_name.to_owned(), String::new()),
            };
            tree.add_resource(
                package,
                Resource {
                    name,
                    extension,
                    content,
                },
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod entry_kind_tests {
    use super::*;

    #[test]
    fn it_should_classify_by_suffix() {
        assert_eq!(EntryKind::Class, EntryKind::from_path("a/b/C.class"));
        assert_eq!(
            EntryKind::Manifest,
            EntryKind::from_path("META-INF/MANIFEST.MF")
        );
        assert_eq!(EntryKind::Directory, EntryKind::from_path("a/b/"));
        assert_eq!(EntryKind::Other, EntryKind::from_path("res/logo.png"));
        assert_eq!(EntryKind::Other, EntryKind::from_path("README"));
    }

    #[test]
    fn it_should_cap_the_preallocation_hint() {
        assert_eq!(0, prealloc_size(0));
        assert_eq!(512, prealloc_size(512));
        assert_eq!(1 << 20, prealloc_size(u64::MAX));
    }
}

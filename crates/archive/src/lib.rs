//! Opens a jar (a ZIP container) and rebuilds the package hierarchy its
//! entry paths describe, decoding every class file along the way.

mod archive;
mod error;
mod tree;

pub use archive::{EntryKind, JavaArchive, SkippedEntry};
pub use error::ArchiveError;
pub use tree::{Class, Classes, PackageId, PackageNode, PackageTree, Packages, Resource, Resources};

pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;

use thiserror::Error;

use jarview_class_file::ClassFileError;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
    /// An entry whose path fits no classification. Non-fatal; the entry is
    /// reported and skipped.
    #[error("Unsupported entry: {0:?}")]
    UnsupportedEntry(String),
}

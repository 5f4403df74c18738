use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    /// The source ran out mid-field.
    #[error(transparent)]
    TruncatedInput(#[from] std::io::Error),
    #[error("Bad magic identifier: 0x{0:X}")]
    BadMagic(u32),
    #[error("Malformed constant pool: {0}")]
    MalformedConstantPool(String),
    /// An index that does not lead to a usable entry of the expected kind.
    /// Raised on dereference, never during the structural decode itself.
    #[error("Dangling reference: expected {expected} at index {index}, found {found}")]
    DanglingReference {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("No Utf8 constant with value {0:?}")]
    NotFound(String),
}

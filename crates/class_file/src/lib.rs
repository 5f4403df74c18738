// https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
mod constant_pool;
mod error;
mod mutf8;
mod parser;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use attributes::{
    Attribute, AttributeData, AttributeDecoder, AttributeRegistry, Attributes, CodeAttribute,
    ExceptionTableEntry,
};
pub use constant_pool::{
    ClassInfo, ConstantPool, CpInfo, InvokeDynamicInfo, MethodHandleInfo, MethodTypeInfo,
    NameAndTypeInfo, RefInfo, StringInfo,
};
pub use error::ClassFileError;
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

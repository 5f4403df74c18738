use std::io::{Read, Seek};

use crate::{
    attributes::Attributes, constant_pool::ClassInfo, parser::Parser, ClassAccessFlags,
    ConstantPool, FieldAccessFlags, MethodAccessFlags, Result,
};

/// A fully decoded class file. Built once, immutable afterwards; the raw
/// this/super/name indices stay as read and are resolved lazily by the
/// accessors, so a class with unused bad references still decodes.
#[derive(Debug)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: impl Read + Seek) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    /// Format version string, e.g. `"52.0"` for a Java 8 class.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }

    pub fn class_name(&self) -> Result<&str> {
        // The entry at this_class must be a Class_info representing the
        // class or interface defined by this file.
        let ClassInfo { name_index } = self.constant_pool.class_info(self.this_class)?;
        self.constant_pool.utf8(*name_index)
    }

    /// `None` when super_class is zero, which only java/lang/Object may
    /// declare.
    pub fn super_class_name(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }

        let ClassInfo { name_index } = self.constant_pool.class_info(self.super_class)?;
        self.constant_pool.utf8(*name_index).map(Some)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    /// Index of the Utf8 constant equal to `name`.
    pub fn find_constant(&self, name: &str) -> Result<u16> {
        self.constant_pool.find_utf8(name)
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: FieldAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

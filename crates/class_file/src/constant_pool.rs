use crate::{ClassFileError, Result};

/// Kind-checked resolution of a constant pool index. Index 0, an
/// out-of-range index, a reserved slot, or a wrong variant all surface as
/// `DanglingReference`, never a panic or a silent default.
#[macro_export]
macro_rules! expect_cp_info {
    ($cp:expr, $index:expr, $variant:ident) => {{
        let index: u16 = $index;
        match $cp.get(index) {
            Some($crate::CpInfo::$variant(ref n)) => Ok(n),
            Some(c) => Err($crate::ClassFileError::DanglingReference {
                index,
                expected: stringify!($variant),
                found: c.kind(),
            }),
            None => Err($crate::ClassFileError::DanglingReference {
                index,
                expected: stringify!($variant),
                found: "absent",
            }),
        }
    }};
}

/// The per-class table of shared constants. Logical indices are 1-based;
/// slot 0 is always absent and the slot after a Long or Double entry is
/// reserved ([`CpInfo::Unusable`]).
#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// The declared constant_pool_count; usable indices are `1..count()`.
    pub fn count(&self) -> u16 {
        self.cp_infos.len() as u16 + 1
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        index
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i as usize))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        expect_cp_info!(self, index, Utf8).map(String::as_str)
    }

    pub fn class_info(&self, index: u16) -> Result<&ClassInfo> {
        expect_cp_info!(self, index, Class)
    }

    pub fn name_and_type(&self, index: u16) -> Result<&NameAndTypeInfo> {
        expect_cp_info!(self, index, NameAndType)
    }

    /// Resolves a Class entry down to the name it points at.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = self.class_info(index)?;
        self.utf8(*name_index)
    }

    /// Linear scan for the Utf8 entry equal to `name`. Diagnostics only,
    /// not the hot path.
    pub fn find_utf8(&self, name: &str) -> Result<u16> {
        for (i, cp_info) in self.cp_infos.iter().enumerate() {
            if let CpInfo::Utf8(s) = cp_info {
                if s == name {
                    return Ok(i as u16 + 1);
                }
            }
        }

        Err(ClassFileError::NotFound(name.to_owned()))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
    /// The second logical slot of a Long or Double entry. Never a valid
    /// target of a reference.
    Unusable,
}
impl CpInfo {
    pub fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class(_) => "Class",
            CpInfo::String(_) => "String",
            CpInfo::FieldRef(_) => "FieldRef",
            CpInfo::MethodRef(_) => "MethodRef",
            CpInfo::InterfaceMethodRef(_) => "InterfaceMethodRef",
            CpInfo::NameAndType(_) => "NameAndType",
            CpInfo::MethodHandle(_) => "MethodHandle",
            CpInfo::MethodType(_) => "MethodType",
            CpInfo::InvokeDynamic(_) => "InvokeDynamic",
            CpInfo::Unusable => "Unusable",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The entry at name_index must be a Utf8 representing a binary class or
    // interface name in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use crate::{constant_pool::ConstantPool, parser::Parser, Result};

/// A named, length-delimited extension record on a class, field, method or
/// Code block. The name index always resolves to a Utf8 entry; the payload
/// is structured only for names known to the [`AttributeRegistry`].
#[derive(Debug)]
pub struct Attribute {
    pub name_index: u16,
    pub data: AttributeData,
}

pub enum AttributeData {
    Code(CodeAttribute),
    /// Raw payload of an attribute nobody registered a decoder for,
    /// preserved byte for byte.
    Opaque(Vec<u8>),
}
impl fmt::Debug for AttributeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeData::Code(code) => f.debug_tuple("Code").field(code).finish(),
            AttributeData::Opaque(payload) => write!(f, "Opaque({} bytes)", payload.len()),
        }
    }
}

#[derive(Debug)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|a| constant_pool.utf8(a.name_index).map_or(false, |s| s == name))
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match &a.data {
            AttributeData::Code(code) => Some(code),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}
impl ExceptionTableEntry {
    /// Name of the caught class; `None` when `catch_type` is 0, meaning the
    /// handler catches anything.
    pub fn catch_type_name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Option<&'a str>> {
        if self.catch_type == 0 {
            return Ok(None);
        }
        constant_pool.class_name(self.catch_type).map(Some)
    }
}

/// The one attribute this crate interprets: a method body with its stack
/// and local sizing, opaque instruction bytes, exception table and nested
/// attributes.
#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

pub type AttributeDecoder = fn(&[u8], &ConstantPool, &AttributeRegistry) -> Result<AttributeData>;

/// Name-keyed attribute dispatch. Unregistered names keep their payload as
/// opaque bytes.
pub struct AttributeRegistry {
    decoders: HashMap<&'static str, AttributeDecoder>,
}
impl AttributeRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, decoder: AttributeDecoder) {
        self.decoders.insert(name, decoder);
    }

    pub fn decoder_for(&self, name: &str) -> Option<AttributeDecoder> {
        self.decoders.get(name).copied()
    }
}
impl Default for AttributeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("Code", decode_code);
        registry
    }
}

/// Each attribute is bounded by its declared length, so recursing through
/// nested attributes with the same registry terminates.
fn decode_code(
    payload: &[u8],
    constant_pool: &ConstantPool,
    registry: &AttributeRegistry,
) -> Result<AttributeData> {
    Parser::new(Cursor::new(payload))
        .parse_code_attribute(constant_pool, registry)
        .map(AttributeData::Code)
}

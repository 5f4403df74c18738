use std::io::{BufReader, Read, Seek};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    attributes::{
        Attribute, AttributeData, AttributeRegistry, Attributes, CodeAttribute, ExceptionTableEntry,
    },
    class_file::{ClassFile, FieldInfo, MethodInfo},
    constant_pool::{
        ClassInfo, ConstantPool, CpInfo, InvokeDynamicInfo, MethodHandleInfo, MethodTypeInfo,
        NameAndTypeInfo, RefInfo, StringInfo,
    },
    mutf8, ClassAccessFlags, ClassFileError, FieldAccessFlags, MethodAccessFlags, Result,
};

type Endian = BigEndian;

pub struct Parser<R> {
    r: BufReader<R>,
}
impl<R: Read + Seek> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: BufReader::new(r),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_with(&AttributeRegistry::default())
    }

    /// Runs the full grammar in declaration order. All-or-nothing: any
    /// structural failure aborts without publishing a partial value.
    pub fn parse_with(&mut self, registry: &AttributeRegistry) -> Result<ClassFile> {
        let _ = self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = ClassAccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool, registry))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool, registry))
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count, &constant_pool, registry)?;

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(
        &mut self,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<FieldInfo> {
        let access_flags = FieldAccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count, constant_pool, registry)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(
        &mut self,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<MethodInfo> {
        let access_flags = MethodAccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count, constant_pool, registry)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            0xCAFEBABE => Ok(()),
            magic_identifier => Err(ClassFileError::BadMagic(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;
        if constant_pool_count == 0 {
            return Err(ClassFileError::MalformedConstantPool(
                "declared count is zero".to_owned(),
            ));
        }

        let mut count = constant_pool_count as usize - 1;
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let index = res.len() as u16 + 1;
            let (cp_info, slot_size) = self.parse_cp_info(index)?;
            if slot_size > count {
                return Err(ClassFileError::MalformedConstantPool(format!(
                    "two-slot entry at index {} overruns the declared count",
                    index
                )));
            }
            res.push(cp_info);
            (0..slot_size - 1).for_each(|_| res.push(CpInfo::Unusable));

            count -= slot_size;
        }
        Ok(ConstantPool::new(res))
    }

    /// One tagged entry plus the number of logical slots it occupies; Long
    /// and Double take two, the second being reserved.
    fn parse_cp_info(&mut self, index: u16) -> Result<(CpInfo, usize)> {
        let tag = self.read_u8()?;
        let (cp_info, slot_size) = match tag {
            1 => (self.parse_utf8()?, 1),
            3 => (self.parse_integer()?, 1),
            4 => (self.parse_float()?, 1),
            5 => (self.parse_long()?, 2),
            6 => (self.parse_double()?, 2),
            7 => (self.parse_class_info()?, 1),
            8 => (self.parse_string()?, 1),
            9 => (self.parse_field_ref()?, 1),
            10 => (self.parse_method_ref()?, 1),
            11 => (self.parse_interface_method_ref()?, 1),
            12 => (self.parse_name_and_type_info()?, 1),
            15 => (self.parse_method_handle()?, 1),
            16 => (self.parse_method_type_info()?, 1),
            18 => (self.parse_invoke_dynamic_info()?, 1),
            _ => {
                return Err(ClassFileError::MalformedConstantPool(format!(
                    "unknown tag {} at index {}",
                    tag, index
                )))
            }
        };

        Ok((cp_info, slot_size))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let mut bytes = vec![0u8; length as usize];
        self.r.read_exact(&mut bytes)?;

        let s = mutf8::decode(&bytes).map_err(|e| {
            ClassFileError::MalformedConstantPool(format!("invalid modified UTF-8: {}", e))
        })?;
        Ok(CpInfo::Utf8(s))
    }

    fn parse_integer(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Integer(self.read_i32()?))
    }

    fn parse_float(&mut self) -> Result<CpInfo> {
        Ok(CpInfo::Float(f32::from_bits(self.read_u32()?)))
    }

    fn parse_long(&mut self) -> Result<CpInfo> {
        let high_bytes = self.read_u32()?;
        let low_bytes = self.read_u32()?;

        Ok(CpInfo::Long(
            (((high_bytes as u64) << 32) | low_bytes as u64) as i64,
        ))
    }

    fn parse_double(&mut self) -> Result<CpInfo> {
        let high_bytes = self.read_u32()?;
        let low_bytes = self.read_u32()?;

        Ok(CpInfo::Double(f64::from_bits(
            ((high_bytes as u64) << 32) | low_bytes as u64,
        )))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.read_u16()?;

        Ok(CpInfo::String(StringInfo { string_index }))
    }

    fn parse_field_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::FieldRef(ref_info))
    }

    fn parse_method_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::MethodRef(ref_info))
    }

    fn parse_interface_method_ref(&mut self) -> Result<CpInfo> {
        let ref_info = self.parse_ref_info()?;

        Ok(CpInfo::InterfaceMethodRef(ref_info))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::MethodType(MethodTypeInfo { descriptor_index }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<CpInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(CpInfo::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<Attribute> {
        let name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let mut payload = vec![0u8; attribute_length as usize];
        self.r.read_exact(&mut payload)?;

        let name = constant_pool.utf8(name_index)?;
        let data = match registry.decoder_for(name) {
            Some(decode) => decode(&payload, constant_pool, registry)?,
            None => AttributeData::Opaque(payload),
        };

        Ok(Attribute { name_index, data })
    }

    pub(crate) fn parse_code_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let mut code = vec![0u8; code_length as usize];
        self.r.read_exact(&mut code)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes_count = self.read_u16()?;
        let attributes = self.parse_attributes(attributes_count, constant_pool, registry)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_attributes(
        &mut self,
        attributes_count: u16,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool, registry))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert!(Parser::new(Cursor::new([0xca, 0xfe, 0xba, 0xbe]))
            .parse_magic_identifier()
            .is_ok());
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(matches!(
            Parser::new(Cursor::new([0xca, 0xfe, 0xba])).parse_magic_identifier(),
            Err(ClassFileError::TruncatedInput(_))
        ));
    }

    #[test]
    fn it_should_fail_if_the_magic_identifier_is_incorrect() {
        assert!(matches!(
            Parser::new(Cursor::new([0xca, 0xfe, 0xba, 0xbf])).parse_magic_identifier(),
            Err(ClassFileError::BadMagic(0xCAFEBABF))
        ));
    }
}

use binrw::BinRead;
use flagset::{flags, FlagSet};

use super::constant_pool::ConstantPool;
use super::{AttributeInfo, U2, U4};

flags! {
    pub enum ClassAccessFlags: U2 {
        Public = 0x0001,
        Final = 0x0010,
        Super = 0x0020,
        Interface = 0x0200,
        Abstract = 0x0400,
        Synthetic = 0x1000,
        Annotation = 0x2000,
        Enum = 0x4000,
        Module = 0x8000,
    }

    pub enum FieldAccessFlags: U2 {
        Public = 0x0001,
        Private = 0x0002,
        Protected = 0x0004,
        Static = 0x0008,
        Final = 0x0010,
        Volatile = 0x0040,
        Transient = 0x0080,
        Synthetic = 0x1000,
        Enum = 0x4000,
    }

    pub enum MethodAccessFlags: U2 {
        Public = 0x0001,
        Private = 0x0002,
        Protected = 0x0004,
        Static = 0x0008,
        Final = 0x0010,
        Synchronized = 0x0020,
        Bridge = 0x0040,
        Varargs = 0x0080,
        Native = 0x0100,
        Abstract = 0x0400,
        Strict = 0x0800,
        Synthetic = 0x1000,
    }
}

/// The parsed in-memory representation of a class file (spec §3/§4.1).
#[derive(BinRead, Debug, Clone)]
#[br(big, magic = 0xCAFE_BABEu32)]
pub struct ClassFile {
    pub minor_version: U2,
    pub major_version: U2,
    #[br(temp)]
    constant_pool_count: U2,
    #[br(args(constant_pool_count.saturating_sub(1)))]
    pub constant_pool: ConstantPool,
    access_flags_raw: U2,
    pub this_class: U2,
    pub super_class: U2,
    #[br(temp)]
    interfaces_count: U2,
    #[br(count = interfaces_count)]
    pub interfaces: Vec<U2>,
    #[br(temp)]
    fields_count: U2,
    #[br(count = fields_count)]
    pub fields: Vec<FieldInfo>,
    #[br(temp)]
    methods_count: U2,
    #[br(count = methods_count)]
    pub methods: Vec<MethodInfo>,
    #[br(temp)]
    attributes_count: U2,
    #[br(count = attributes_count)]
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    pub const MAGIC: U4 = super::CLASS_MAGIC;

    pub fn access_flags(&self) -> FlagSet<ClassAccessFlags> {
        FlagSet::new_truncated(self.access_flags_raw)
    }

    /// The class's own internal (slash-separated) name.
    pub fn class_name(&self) -> std::borrow::Cow<'_, str> {
        self.constant_pool.class_name(self.this_class as usize)
    }

    /// The superclass's internal name, or `None` for `java/lang/Object`
    /// (spec: `super_class == 0` means the root object).
    pub fn super_class_name(&self) -> Option<std::borrow::Cow<'_, str>> {
        if self.super_class == 0 {
            None
        } else {
            Some(self.constant_pool.class_name(self.super_class as usize))
        }
    }

    pub fn interface_names(&self) -> Vec<std::borrow::Cow<'_, str>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index as usize))
            .collect()
    }

    /// Finds a method by exact name and descriptor text.
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| {
            self.constant_pool.utf8(m.name_index as usize) == name
                && self.constant_pool.utf8(m.descriptor_index as usize) == descriptor
        })
    }
}

#[derive(BinRead, Debug, Clone)]
#[br(big)]
pub struct FieldInfo {
    access_flags_raw: U2,
    pub name_index: U2,
    pub descriptor_index: U2,
    #[br(temp)]
    attributes_count: U2,
    #[br(count = attributes_count)]
    pub attributes: Vec<AttributeInfo>,
}

impl FieldInfo {
    pub fn access_flags(&self) -> FlagSet<FieldAccessFlags> {
        FlagSet::new_truncated(self.access_flags_raw)
    }
}

#[derive(BinRead, Debug, Clone)]
#[br(big)]
pub struct MethodInfo {
    access_flags_raw: U2,
    pub name_index: U2,
    pub descriptor_index: U2,
    #[br(temp)]
    attributes_count: U2,
    #[br(count = attributes_count)]
    pub attributes: Vec<AttributeInfo>,
}

impl MethodInfo {
    pub fn access_flags(&self) -> FlagSet<MethodAccessFlags> {
        FlagSet::new_truncated(self.access_flags_raw)
    }

    /// Finds and parses this method's `Code` attribute, if it has one
    /// (native/abstract methods don't).
    pub fn code(&self, pool: &ConstantPool) -> Option<super::CodeAttribute> {
        self.attributes
            .iter()
            .find(|attr| pool.utf8(attr.attribute_name_index as usize) == "Code")
            .and_then(|attr| super::CodeAttribute::parse(&attr.info).ok())
    }
}

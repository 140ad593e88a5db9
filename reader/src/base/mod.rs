mod attribute_info;
mod classfile;
mod constant_pool;
mod error;

pub use attribute_info::{AttributeInfo, CodeAttribute, ExceptionTableEntry};
pub use classfile::{
    ClassAccessFlags, ClassFile, FieldAccessFlags, FieldInfo, MethodAccessFlags, MethodInfo,
};
pub use constant_pool::{
    ClassInfo, ConstantPool, ConstantPoolEntry, ConstantPoolInfo, DoubleInfo, FieldRefInfo,
    FloatInfo, InterfaceMethodRefInfo, IntegerInfo, LongInfo, MethodRefInfo, NameAndTypeInfo,
    StringInfo, Utf8Info,
};
pub use error::ClassFileError;

use binrw::BinRead;
use std::fs;
use std::io::Cursor;
use std::path::Path;

pub type U1 = u8;
pub type U2 = u16;
pub type U4 = u32;

/// Magic number every class file must begin with.
pub const CLASS_MAGIC: U4 = 0xCAFE_BABE;

/// Reads and decodes a class file from disk.
///
/// Streaming: every declared length is consumed exactly, and no seeks
/// beyond already-read offsets are performed.
pub fn parse(path: &Path) -> Result<ClassFile, ClassFileError> {
    let bytes = fs::read(path).map_err(|source| ClassFileError::Io { source })?;
    let mut cursor = Cursor::new(bytes);
    ClassFile::read(&mut cursor).map_err(ClassFileError::from_binrw)
}

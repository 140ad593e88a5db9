use binrw::BinRead;

use super::{U1, U2, U4};

/// A class/field/method-level attribute, read generically as a name index
/// plus its raw payload bytes (spec §4.1: "all other attributes are skipped
/// by length").
///
/// The only attribute this crate interprets further is `Code`, parsed on
/// demand from `info` by [`CodeAttribute::parse`] once the attribute's name
/// has been resolved against the owning constant pool.
#[derive(BinRead, Debug, Clone)]
#[br(big)]
pub struct AttributeInfo {
    pub attribute_name_index: U2,
    attribute_length: U4,
    #[br(count = attribute_length)]
    pub info: Vec<U1>,
}

/// The body of a method: its bytecode, its exception table, and nested
/// attributes (the latter skipped by the core, per spec §4.1).
#[derive(BinRead, Debug, Clone)]
#[br(big)]
pub struct CodeAttribute {
    pub max_stack: U2,
    pub max_locals: U2,
    code_length: U4,
    #[br(count = code_length)]
    pub code: Vec<U1>,
    exception_table_length: U2,
    #[br(count = exception_table_length)]
    pub exception_table: Vec<ExceptionTableEntry>,
    attributes_count: U2,
    #[br(count = attributes_count)]
    pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
    /// Parses a `Code` attribute out of an [`AttributeInfo`]'s raw payload.
    pub fn parse(raw: &[U1]) -> binrw::BinResult<Self> {
        let mut cursor = std::io::Cursor::new(raw);
        CodeAttribute::read(&mut cursor)
    }
}

/// One entry of a method's exception table. Half-open range `[start_pc, end_pc)`;
/// `catch_type` is a Class pool index, or 0 for catch-all/finally.
#[derive(BinRead, Debug, Clone, Copy)]
#[br(big)]
pub struct ExceptionTableEntry {
    pub start_pc: U2,
    pub end_pc: U2,
    pub handler_pc: U2,
    pub catch_type: U2,
}

impl ExceptionTableEntry {
    /// Whether `pc` falls in this entry's half-open protected range.
    pub fn covers(&self, pc: usize) -> bool {
        (self.start_pc as usize) <= pc && pc < (self.end_pc as usize)
    }
}

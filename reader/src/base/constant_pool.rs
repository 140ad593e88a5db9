use std::borrow::Cow;

use binrw::{BinRead, BinResult};
use cesu8::from_java_cesu8;
use std::io::{Read, Seek};

use super::{U1, U2, U4};

/// The constant pool: a 1-indexed, tag-discriminated table of literals and
/// symbolic references shared by all code in a class.
///
/// `entries[i]` holds the logical pool slot `i + 1` (slot 0 is never stored;
/// callers always address the pool through 1-based indices via [`ConstantPool::get`]
/// and friends).
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl BinRead for ConstantPool {
    type Args<'a> = (U2,);

    fn read_options<R: std::io::Read + std::io::Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let entries = parse_constant_pool(reader, endian, (args.0,))?;
        Ok(ConstantPool { entries })
    }
}

/// Carries the tag and 1-based entry index of an unrecognized constant pool
/// tag through `binrw::Error::Custom`, so [`super::ClassFileError::from_binrw`]
/// can downcast it back into the typed `UnknownConstantTag` variant instead
/// of a generic wrapped error.
#[derive(Debug)]
pub(crate) struct UnknownConstantTagMarker {
    pub tag: u8,
    pub index: usize,
}

impl std::fmt::Display for UnknownConstantTagMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown constant pool tag {} at entry {}", self.tag, self.index)
    }
}

impl std::error::Error for UnknownConstantTagMarker {}

/// Either a real constant pool entry, or the unused second slot that trails
/// a `Long`/`Double` entry.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ConstantPoolEntry {
    Entry(ConstantPoolInfo),
    Tombstone,
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ConstantPoolInfo {
    Utf8Info(Utf8Info),
    IntegerInfo(IntegerInfo),
    FloatInfo(FloatInfo),
    LongInfo(LongInfo),
    DoubleInfo(DoubleInfo),
    ClassInfo(ClassInfo),
    StringInfo(StringInfo),
    FieldRefInfo(FieldRefInfo),
    MethodRefInfo(MethodRefInfo),
    InterfaceMethodRefInfo(InterfaceMethodRefInfo),
    NameAndTypeInfo(NameAndTypeInfo),
}

#[derive(BinRead, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
#[br(big)]
pub struct Utf8Info {
    length: U2,
    #[br(count = length)]
    bytes: Vec<U1>,
}

impl Utf8Info {
    /// Decodes the JVM modified-UTF-8 (CESU-8) payload to a Rust string.
    ///
    /// Falls back to a lossy decode rather than failing: disassembly should
    /// proceed even over a payload that isn't valid CESU-8.
    pub fn as_str(&self) -> Cow<'_, str> {
        from_java_cesu8(&self.bytes).unwrap_or_else(|_| String::from_utf8_lossy(&self.bytes))
    }
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct IntegerInfo {
    bytes: U4,
}

impl IntegerInfo {
    pub fn value(&self) -> i32 {
        self.bytes as i32
    }
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct FloatInfo {
    bytes: U4,
}

impl FloatInfo {
    pub fn value(&self) -> f32 {
        f32::from_bits(self.bytes)
    }
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct LongInfo {
    high_bytes: U4,
    low_bytes: U4,
}

impl LongInfo {
    pub fn value(&self) -> i64 {
        (((self.high_bytes as u64) << 32) | (self.low_bytes as u64)) as i64
    }
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct DoubleInfo {
    high_bytes: U4,
    low_bytes: U4,
}

impl DoubleInfo {
    pub fn value(&self) -> f64 {
        let bits = ((self.high_bytes as u64) << 32) | (self.low_bytes as u64);
        f64::from_bits(bits)
    }
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct ClassInfo {
    pub name_index: U2,
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct StringInfo {
    pub string_index: U2,
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct NameAndTypeInfo {
    pub name_index: U2,
    pub descriptor_index: U2,
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct FieldRefInfo {
    pub class_index: U2,
    pub name_and_type_index: U2,
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct MethodRefInfo {
    pub class_index: U2,
    pub name_and_type_index: U2,
}

#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(big)]
pub struct InterfaceMethodRefInfo {
    pub class_index: U2,
    pub name_and_type_index: U2,
}

/// Reads `count` logical constant pool entries (`count = constant_pool_count - 1`),
/// expanding `Long`/`Double` into their real entry plus a trailing [`ConstantPoolEntry::Tombstone`].
#[binrw::parser(reader, endian)]
fn parse_constant_pool(count: U2) -> BinResult<Vec<ConstantPoolEntry>> {
    let count = count as usize;
    let mut entries = Vec::with_capacity(count);
    while entries.len() < count {
        let pos = reader.stream_position()?;
        let tag = U1::read_options(reader, endian, ())?;
        let (info, wide) = match tag {
            1 => (
                ConstantPoolInfo::Utf8Info(Utf8Info::read_options(reader, endian, ())?),
                false,
            ),
            3 => (
                ConstantPoolInfo::IntegerInfo(IntegerInfo::read_options(reader, endian, ())?),
                false,
            ),
            4 => (
                ConstantPoolInfo::FloatInfo(FloatInfo::read_options(reader, endian, ())?),
                false,
            ),
            5 => (
                ConstantPoolInfo::LongInfo(LongInfo::read_options(reader, endian, ())?),
                true,
            ),
            6 => (
                ConstantPoolInfo::DoubleInfo(DoubleInfo::read_options(reader, endian, ())?),
                true,
            ),
            7 => (
                ConstantPoolInfo::ClassInfo(ClassInfo::read_options(reader, endian, ())?),
                false,
            ),
            8 => (
                ConstantPoolInfo::StringInfo(StringInfo::read_options(reader, endian, ())?),
                false,
            ),
            9 => (
                ConstantPoolInfo::FieldRefInfo(FieldRefInfo::read_options(reader, endian, ())?),
                false,
            ),
            10 => (
                ConstantPoolInfo::MethodRefInfo(MethodRefInfo::read_options(reader, endian, ())?),
                false,
            ),
            11 => (
                ConstantPoolInfo::InterfaceMethodRefInfo(InterfaceMethodRefInfo::read_options(
                    reader, endian, (),
                )?),
                false,
            ),
            12 => (
                ConstantPoolInfo::NameAndTypeInfo(NameAndTypeInfo::read_options(
                    reader, endian, (),
                )?),
                false,
            ),
            other => {
                return Err(binrw::Error::Custom {
                    pos,
                    err: Box::new(UnknownConstantTagMarker {
                        tag: other,
                        index: entries.len() + 1,
                    }),
                })
            }
        };
        entries.push(ConstantPoolEntry::Entry(info));
        if wide {
            entries.push(ConstantPoolEntry::Tombstone);
        }
    }
    Ok(entries)
}

/// Sentinel text returned by the fail-soft resolver helpers when an index is
/// out of range, zero, or doesn't point at the expected tag.
const INVALID: &str = "[invalid pool index]";

impl ConstantPool {
    pub fn inner(&self) -> &[ConstantPoolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a 1-based pool index to its entry, or `None` if the index is
    /// 0, out of range, or a tombstone.
    pub fn get(&self, index: usize) -> Option<&ConstantPoolInfo> {
        if index == 0 {
            return None;
        }
        match self.entries.get(index - 1)? {
            ConstantPoolEntry::Entry(info) => Some(info),
            ConstantPoolEntry::Tombstone => None,
        }
    }

    /// Resolves a Utf8 entry to its decoded text, failing soft to a sentinel
    /// string rather than erroring (spec §4.2).
    pub fn utf8(&self, index: usize) -> Cow<'_, str> {
        match self.get(index) {
            Some(ConstantPoolInfo::Utf8Info(info)) => info.as_str(),
            _ => Cow::Borrowed(INVALID),
        }
    }

    /// Resolves a Class entry to its internal (slash-separated) name.
    pub fn class_name(&self, index: usize) -> Cow<'_, str> {
        match self.get(index) {
            Some(ConstantPoolInfo::ClassInfo(info)) => self.utf8(info.name_index as usize),
            _ => Cow::Borrowed(INVALID),
        }
    }

    /// Resolves a String entry to its literal text.
    pub fn string_literal(&self, index: usize) -> Cow<'_, str> {
        match self.get(index) {
            Some(ConstantPoolInfo::StringInfo(info)) => self.utf8(info.string_index as usize),
            _ => Cow::Borrowed(INVALID),
        }
    }

    /// Resolves a NameAndType entry to its `(name, descriptor)` pair.
    pub fn name_and_type(&self, index: usize) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        match self.get(index) {
            Some(ConstantPoolInfo::NameAndTypeInfo(info)) => Some((
                self.utf8(info.name_index as usize),
                self.utf8(info.descriptor_index as usize),
            )),
            _ => None,
        }
    }

    /// Resolves any of the three "ref" entry kinds to `(class_name, member_name, descriptor)`.
    pub fn member_ref(&self, index: usize) -> Option<(Cow<'_, str>, Cow<'_, str>, Cow<'_, str>)> {
        let (class_index, nat_index) = match self.get(index)? {
            ConstantPoolInfo::FieldRefInfo(r) => (r.class_index, r.name_and_type_index),
            ConstantPoolInfo::MethodRefInfo(r) => (r.class_index, r.name_and_type_index),
            ConstantPoolInfo::InterfaceMethodRefInfo(r) => (r.class_index, r.name_and_type_index),
            _ => return None,
        };
        let (name, descriptor) = self.name_and_type(nat_index as usize)?;
        Some((self.class_name(class_index as usize), name, descriptor))
    }

    /// Renders a human-readable description of a pool slot by tag (spec §4.2).
    pub fn describe(&self, index: usize) -> String {
        match self.get(index) {
            Some(ConstantPoolInfo::Utf8Info(info)) => format!("Utf8: {:?}", info.as_str()),
            Some(ConstantPoolInfo::IntegerInfo(info)) => format!("int {}", info.value()),
            Some(ConstantPoolInfo::FloatInfo(info)) => format!("float {}", info.value()),
            Some(ConstantPoolInfo::LongInfo(info)) => format!("long {}", info.value()),
            Some(ConstantPoolInfo::DoubleInfo(info)) => format!("double {}", info.value()),
            Some(ConstantPoolInfo::ClassInfo(_)) => format!("class {}", self.class_name(index)),
            Some(ConstantPoolInfo::StringInfo(_)) => {
                format!("String {:?}", self.string_literal(index))
            }
            Some(ConstantPoolInfo::NameAndTypeInfo(_)) => match self.name_and_type(index) {
                Some((name, descriptor)) => format!("{name}:{descriptor}"),
                None => INVALID.to_string(),
            },
            Some(
                ConstantPoolInfo::FieldRefInfo(_)
                | ConstantPoolInfo::MethodRefInfo(_)
                | ConstantPoolInfo::InterfaceMethodRefInfo(_),
            ) => match self.member_ref(index) {
                Some((class, name, descriptor)) => {
                    format!("{class}.\"{name}\":{descriptor}")
                }
                None => INVALID.to_string(),
            },
            None => INVALID.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use binrw::BinReaderExt;
    use std::io::Cursor;

    #[test]
    fn read_utf8_info() {
        let data = [0x00, 0x0B, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0xE2, 0x9C, 0x8B, 0xF0, 0x9F, 0x98];
        let mut reader = Cursor::new(&data);
        let info: Utf8Info = reader.read_be().unwrap();
        assert_eq!(info.length, 11);
    }

    #[test]
    fn load_utf8_in_constant_pool() {
        let data = [0x01, 0x00, 0x03, b'f', b'o', b'o'];
        let mut reader = Cursor::new(&data);
        let pool = ConstantPool::read_args(&mut reader, (1,)).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.utf8(1), "foo");
        assert_eq!(pool.utf8(0), INVALID);
        assert_eq!(pool.utf8(99), INVALID);
    }

    #[test]
    fn long_entry_occupies_two_slots() {
        // tag 5 (Long), high=0, low=42
        let data = [0x05, 0, 0, 0, 0, 0, 0, 0, 42];
        let mut reader = Cursor::new(&data);
        let pool = ConstantPool::read_args(&mut reader, (2,)).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(matches!(
            pool.inner()[1],
            ConstantPoolEntry::Tombstone
        ));
        match pool.get(1) {
            Some(ConstantPoolInfo::LongInfo(info)) => assert_eq!(info.value(), 42),
            other => panic!("expected LongInfo, got {other:?}"),
        }
        // The tombstone slot must never resolve as a first-class entry.
        assert!(pool.get(2).is_none());
    }

    #[test]
    fn unknown_tag_is_malformed() {
        let data = [0x99, 0, 0];
        let mut reader = Cursor::new(&data);
        let result = ConstantPool::read_args(&mut reader, (1,));
        assert!(result.is_err());
    }
}

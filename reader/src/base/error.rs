use snafu::Snafu;

use super::constant_pool::UnknownConstantTagMarker;

/// Errors that can occur while reading a class file.
///
/// `BadMagic` and `UnknownConstantTag`/`Truncated` are the `MalformedClassFile`
/// family from the spec's error taxonomy; `Io` is the `IoError` family.
#[derive(Debug, Snafu)]
pub enum ClassFileError {
    #[snafu(display("bad magic number: expected 0xCAFEBABE, found {found:#010X}"))]
    BadMagic { found: u32 },

    #[snafu(display("unknown constant pool tag {tag} at entry {index}"))]
    UnknownConstantTag { tag: u8, index: usize },

    #[snafu(display("truncated {what}: expected more bytes than the stream had"))]
    Truncated { what: String },

    #[snafu(display("I/O error reading class file: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("malformed class file: {source}"))]
    Binrw { source: binrw::Error },
}

impl ClassFileError {
    /// Classifies a raw `binrw` failure into the spec's error taxonomy where
    /// possible, falling back to a generic wrapped error otherwise.
    pub(crate) fn from_binrw(source: binrw::Error) -> Self {
        match &source {
            binrw::Error::BadMagic { found, .. } => {
                if let Some(found) = found.downcast_ref::<u32>() {
                    return ClassFileError::BadMagic { found: *found };
                }
                ClassFileError::Binrw { source }
            }
            binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                ClassFileError::Truncated {
                    what: "class file".to_string(),
                }
            }
            binrw::Error::Custom { err, .. } => {
                if let Some(marker) = err.downcast_ref::<UnknownConstantTagMarker>() {
                    return ClassFileError::UnknownConstantTag {
                        tag: marker.tag,
                        index: marker.index,
                    };
                }
                ClassFileError::Binrw { source }
            }
            _ => ClassFileError::Binrw { source },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::ConstantPool;
    use binrw::BinRead;
    use std::io::Cursor;

    #[test]
    fn unknown_constant_tag_is_typed_not_generic() {
        let data = [0x99, 0, 0]; // tag 0x99 doesn't exist
        let mut cursor = Cursor::new(&data);
        let source = ConstantPool::read_args(&mut cursor, (1,)).unwrap_err();
        let err = ClassFileError::from_binrw(source);
        match err {
            ClassFileError::UnknownConstantTag { tag, index } => {
                assert_eq!(tag, 0x99);
                assert_eq!(index, 1);
            }
            other => panic!("expected UnknownConstantTag, got {other:?}"),
        }
    }
}

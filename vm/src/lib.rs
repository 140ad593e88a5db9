//! The interpreter (spec §2.3, §4.4): heap, frames, method area, opcode
//! dispatch, and exception-table handler search.

pub mod fault;
pub mod frame;
pub mod heap;
pub mod method_area;
pub mod opcode;
pub mod thread;

use std::io::Write;

use reader::base::ClassFile;

pub use fault::Fault;
pub use heap::Heap;
pub use method_area::MethodArea;
pub use thread::{ExecutionError, Thread};

/// Runs `class`'s entry point to completion, writing any `println` output
/// to `out` (spec §2.3: "a single operation `execute(class)`").
///
/// This is a thin convenience wrapper around [`Thread::execute`] for callers
/// (such as `cmd`) that don't need to keep the heap around once the class
/// has finished running.
pub fn execute<W: Write>(class: &ClassFile, out: &mut W) -> Result<(), ExecutionError> {
    Thread::new().execute(class, out)
}

#[cfg(test)]
mod test {
    use super::*;
    use binrw::BinRead;
    use std::io::Cursor;

    /// Builds a minimal class with a `static main([Ljava/lang/String;)V`
    /// that runs `code` and returns. Mirrors `disasm`'s own
    /// `minimal_class_bytes` helper.
    fn class_with_main(code: &[u8]) -> ClassFile {
        let mut b = Vec::new();
        b.extend_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        b.extend_from_slice(&[0, 0]); // minor
        b.extend_from_slice(&[0, 52]); // major

        // Constant pool:
        // #1 Utf8 "Main"
        // #2 Class -> #1
        // #3 Utf8 "main"
        // #4 Utf8 "([Ljava/lang/String;)V"
        // #5 Utf8 "Code"
        b.extend_from_slice(&[0, 6]); // constant_pool_count (5 + slot0)
        b.push(1);
        b.extend_from_slice(&[0, 4]);
        b.extend_from_slice(b"Main");
        b.push(7);
        b.extend_from_slice(&[0, 1]);
        b.push(1);
        b.extend_from_slice(&[0, 4]);
        b.extend_from_slice(b"main");
        let descriptor = b"([Ljava/lang/String;)V";
        b.push(1);
        b.extend_from_slice(&(descriptor.len() as u16).to_be_bytes());
        b.extend_from_slice(descriptor);
        b.push(1);
        b.extend_from_slice(&[0, 4]);
        b.extend_from_slice(b"Code");

        b.extend_from_slice(&[0, 0x21]); // access_flags
        b.extend_from_slice(&[0, 2]); // this_class
        b.extend_from_slice(&[0, 0]); // super_class
        b.extend_from_slice(&[0, 0]); // interfaces_count
        b.extend_from_slice(&[0, 0]); // fields_count

        b.extend_from_slice(&[0, 1]); // methods_count
        b.extend_from_slice(&[0, 0x09]); // access_flags: public static
        b.extend_from_slice(&[0, 3]); // name_index -> "main"
        b.extend_from_slice(&[0, 4]); // descriptor_index
        b.extend_from_slice(&[0, 1]); // attributes_count

        // Code attribute
        b.extend_from_slice(&[0, 5]); // attribute_name_index -> "Code"
        let mut code_attr = Vec::new();
        code_attr.extend_from_slice(&[0, 4]); // max_stack
        code_attr.extend_from_slice(&[0, 2]); // max_locals
        code_attr.extend_from_slice(&(code.len() as u32).to_be_bytes());
        code_attr.extend_from_slice(code);
        code_attr.extend_from_slice(&[0, 0]); // exception_table_length
        code_attr.extend_from_slice(&[0, 0]); // attributes_count
        b.extend_from_slice(&(code_attr.len() as u32).to_be_bytes());
        b.extend_from_slice(&code_attr);

        b.extend_from_slice(&[0, 0]); // class attributes_count

        let mut cursor = Cursor::new(b);
        ClassFile::read(&mut cursor).unwrap()
    }

    #[test]
    fn execute_runs_main_to_completion() {
        // iconst_2; iconst_3; iadd; pop; return
        let code = [0x05u8, 0x06, 0x60, 0x57, 0xb1];
        let class = class_with_main(&code);
        let mut out = Vec::new();
        execute(&class, &mut out).unwrap();
    }

    #[test]
    fn execute_fails_when_main_is_missing() {
        let mut class = class_with_main(&[0xb1]);
        class.methods.clear();
        let mut out = Vec::new();
        let err = execute(&class, &mut out).unwrap_err();
        assert!(matches!(err, ExecutionError::MainNotFound { .. }));
    }
}

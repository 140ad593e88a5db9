use reader::base::{ConstantPool, ConstantPoolInfo};

use crate::frame::Frame;
use crate::heap::{Heap, HeapObject};

/// `ldc`: Integer constants push directly; String constants allocate a
/// fresh heap String every time (no interning, spec §4.4.3/§8).
pub fn ldc(frame: &mut Frame, heap: &mut Heap, pool: &ConstantPool, index: u16) {
    match pool.get(index as usize) {
        Some(ConstantPoolInfo::IntegerInfo(info)) => frame.push_i32(info.value()),
        Some(ConstantPoolInfo::StringInfo(info)) => {
            let text = pool.utf8(info.string_index as usize);
            let reference = heap.allocate(HeapObject::string(text.as_bytes()));
            frame.push_ref(reference);
        }
        other => {
            log::warn!("ldc #{index} does not resolve to an Integer or String: {other:?}");
            frame.push_i32(0);
        }
    }
}

/// `ldc2_w`: pushes a Long or Double constant (spec §4.4.3).
pub fn ldc2_w(frame: &mut Frame, pool: &ConstantPool, index: u16) {
    match pool.get(index as usize) {
        Some(ConstantPoolInfo::LongInfo(info)) => frame.push_i64(info.value()),
        Some(ConstantPoolInfo::DoubleInfo(info)) => frame.push_f64(info.value()),
        other => {
            log::warn!("ldc2_w #{index} does not resolve to a Long or Double: {other:?}");
            frame.push_i64(0);
        }
    }
}

use std::borrow::Cow;
use std::io::Write;

use reader::base::ConstantPool;
use reader::descriptor::parse_method_descriptor;

use crate::fault::Fault;
use crate::frame::Frame;
use crate::heap::{field_slot, Heap, HeapKind, HeapObject};

/// `new`: allocates a fixed-capacity `ClassInstance` and records the
/// resolved class name (spec §4.4.4).
pub fn new_instance(frame: &mut Frame, heap: &mut Heap, pool: &ConstantPool, index: u16) {
    let class_name = pool.class_name(index as usize).into_owned();
    let reference = heap.allocate(HeapObject::class_instance(class_name));
    frame.push_ref(reference);
}

/// `getstatic` is stubbed: it always pushes the reserved print-sink
/// reference (spec §4.4.3).
pub fn getstatic(frame: &mut Frame) {
    frame.push_ref(Heap::PRINT_SINK_REF);
}

fn resolved_field_name(pool: &ConstantPool, index: u16) -> String {
    pool.member_ref(index as usize)
        .map(|(_, name, _)| name.into_owned())
        .unwrap_or_default()
}

pub fn getfield(frame: &mut Frame, heap: &Heap, pool: &ConstantPool, index: u16) -> Result<(), Fault> {
    let object_ref = frame.pop_ref()?;
    let object = heap.get(object_ref).ok_or(Fault::NullPointer)?;
    let slot = field_slot(&resolved_field_name(pool, index));
    frame.push_word(object.words.get(slot).copied().unwrap_or(0));
    Ok(())
}

pub fn putfield(
    frame: &mut Frame,
    heap: &mut Heap,
    pool: &ConstantPool,
    index: u16,
) -> Result<(), Fault> {
    let value = frame.pop_word()?;
    let object_ref = frame.pop_ref()?;
    let slot = field_slot(&resolved_field_name(pool, index));
    let object = heap.get_mut(object_ref).ok_or(Fault::NullPointer)?;
    if let Some(word) = object.words.get_mut(slot) {
        *word = value;
    }
    Ok(())
}

/// `newarray`: allocates a `PrimitiveArray` of the requested element type and
/// length. A negative length raises `NegativeArraySizeException` (spec §4.4.4).
pub fn newarray(frame: &mut Frame, heap: &mut Heap, element_type: u8) -> Result<(), Fault> {
    let count = frame.pop_i32()?;
    if count < 0 {
        return Err(Fault::NegativeArraySize);
    }
    let reference = heap.allocate(HeapObject::primitive_array(element_type, count as usize));
    frame.push_ref(reference);
    Ok(())
}

pub fn anewarray(
    frame: &mut Frame,
    heap: &mut Heap,
    pool: &ConstantPool,
    index: u16,
) -> Result<(), Fault> {
    let count = frame.pop_i32()?;
    if count < 0 {
        return Err(Fault::NegativeArraySize);
    }
    let class_name = pool.class_name(index as usize).into_owned();
    let reference = heap.allocate(HeapObject::ref_array(class_name, count as usize));
    frame.push_ref(reference);
    Ok(())
}

pub fn arraylength(frame: &mut Frame, heap: &Heap) -> Result<(), Fault> {
    let array_ref = frame.pop_ref()?;
    let array = heap.get(array_ref).ok_or(Fault::NullPointer)?;
    frame.push_i32(array.size as i32);
    Ok(())
}

pub fn iaload(frame: &mut Frame, heap: &Heap) -> Result<(), Fault> {
    let index = frame.pop_i32()?;
    let array_ref = frame.pop_ref()?;
    let array = heap.get(array_ref).ok_or(Fault::NullPointer)?;
    let word = array
        .words
        .get(index as usize)
        .copied()
        .ok_or(Fault::ArrayIndexOutOfBounds)?;
    frame.push_i32(word as i32);
    Ok(())
}

pub fn iastore(frame: &mut Frame, heap: &mut Heap) -> Result<(), Fault> {
    let value = frame.pop_i32()?;
    let index = frame.pop_i32()?;
    let array_ref = frame.pop_ref()?;
    let array = heap.get_mut(array_ref).ok_or(Fault::NullPointer)?;
    let slot = array
        .words
        .get_mut(index as usize)
        .ok_or(Fault::ArrayIndexOutOfBounds)?;
    *slot = value as u32;
    Ok(())
}

/// The one recognized host-library sink (spec §1/§4.4.5/§6): a resolved
/// member reference whose class and name are `java/io/PrintStream.println`.
fn is_println_sink(pool: &ConstantPool, index: u16) -> bool {
    match pool.member_ref(index as usize) {
        Some((class, name, _descriptor)) => {
            format!("{class}.{name}").contains("java/io/PrintStream.println")
        }
        None => false,
    }
}

/// Emits the popped argument: a reference to a `String` heap object emits
/// its bytes, anything else is printed as a decimal integer (spec §4.4.5/§6).
fn print_sink(word: u32, heap: &Heap, out: &mut dyn Write) {
    let text = match heap.get(word) {
        Some(object) if object.kind == HeapKind::String => {
            let bytes: Vec<u8> = object.words.iter().map(|&w| w as u8).collect();
            String::from_utf8_lossy(&bytes).into_owned()
        }
        _ => (word as i32).to_string(),
    };
    let _ = writeln!(out, "{text}");
}

fn member_ref_or_blank(pool: &ConstantPool, index: u16) -> (Cow<'_, str>, Cow<'_, str>, Cow<'_, str>) {
    pool.member_ref(index as usize)
        .unwrap_or((Cow::Borrowed(""), Cow::Borrowed(""), Cow::Borrowed("")))
}

/// `invokestatic` on the print sink performs the print; any other static
/// call is stubbed: its operands are popped and the target is logged (spec
/// §4.4.5).
pub fn invoke_static(
    frame: &mut Frame,
    heap: &mut Heap,
    pool: &ConstantPool,
    index: u16,
    out: &mut dyn Write,
) -> Result<(), Fault> {
    if is_println_sink(pool, index) {
        let value = frame.pop_word()?;
        print_sink(value, heap, out);
        return Ok(());
    }
    let (class, name, descriptor) = member_ref_or_blank(pool, index);
    let argc = parse_method_descriptor(&descriptor)
        .map(|d| d.args_slot_count())
        .unwrap_or(0);
    for _ in 0..argc {
        frame.pop_word()?;
    }
    log::info!("invokestatic (stubbed): {class}.{name}:{descriptor}");
    Ok(())
}

/// `invokespecial`: consumes the receiver reference and logs the target.
/// Sufficient for constructor chaining in the simplified model (spec §4.4.5).
pub fn invoke_special(frame: &mut Frame, pool: &ConstantPool, index: u16) -> Result<(), Fault> {
    let receiver = frame.pop_ref()?;
    let (class, name, descriptor) = member_ref_or_blank(pool, index);
    log::info!("invokespecial (stubbed): {class}.{name}:{descriptor} on ref {receiver}");
    Ok(())
}

/// `invokevirtual`: the print sink performs the print; otherwise performs
/// the simplified polymorphic dispatch of spec §4.4.5 — locate the receiver
/// past its arguments (counting operand-stack *slots*, per REDESIGN FLAG
/// #1, not logical parameters), fail if null, read its runtime class name,
/// and log the dispatch decision without pushing a nested frame.
pub fn invoke_virtual(
    frame: &mut Frame,
    heap: &mut Heap,
    pool: &ConstantPool,
    index: u16,
    out: &mut dyn Write,
) -> Result<(), Fault> {
    if is_println_sink(pool, index) {
        let value = frame.pop_word()?;
        frame.pop_ref()?;
        print_sink(value, heap, out);
        return Ok(());
    }
    let (class, name, descriptor) = member_ref_or_blank(pool, index);
    let argc_slots = parse_method_descriptor(&descriptor)
        .map(|d| d.args_slot_count())
        .unwrap_or(0);
    for _ in 0..argc_slots {
        frame.pop_word()?;
    }
    let receiver = frame.pop_ref()?;
    let runtime_class_name = heap
        .get(receiver)
        .map(|object| object.class_name.clone())
        .ok_or(Fault::NullPointer)?;
    log::info!("invokevirtual (stubbed): {class}.{name}:{descriptor} on a {runtime_class_name} instance");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn println_sink_matches_on_class_and_name() {
        // member_ref needs a real pool to resolve against; exercised end to
        // end in vm::thread's seed-scenario tests instead. This only checks
        // the literal match predicate in isolation via a synthetic string.
        assert!(format!("{}.{}", "java/io/PrintStream", "println")
            .contains("java/io/PrintStream.println"));
        assert!(!format!("{}.{}", "java/io/PrintStream", "print")
            .contains("java/io/PrintStream.println"));
    }
}

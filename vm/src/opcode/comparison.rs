use crate::fault::Fault;
use crate::frame::Frame;

/// Absolute target of a 16-bit branch delta relative to the opcode's own
/// offset (spec §4.4.3: "16-bit signed branch delta relative to the
/// opcode's offset").
pub fn branch_target(opcode_offset: usize, delta: i16) -> usize {
    (opcode_offset as i64 + delta as i64) as usize
}

/// Pops one int and evaluates `pred` against it; returns the branch target
/// if taken.
pub fn if_cond(
    frame: &mut Frame,
    opcode_offset: usize,
    delta: i16,
    pred: impl Fn(i32) -> bool,
) -> Result<Option<usize>, Fault> {
    let value = frame.pop_i32()?;
    Ok(pred(value).then(|| branch_target(opcode_offset, delta)))
}

/// Pops two ints (`a`, `b` in push order) and evaluates `pred(a, b)`;
/// returns the branch target if taken.
pub fn if_icmp(
    frame: &mut Frame,
    opcode_offset: usize,
    delta: i16,
    pred: impl Fn(i32, i32) -> bool,
) -> Result<Option<usize>, Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    Ok(pred(a, b).then(|| branch_target(opcode_offset, delta)))
}

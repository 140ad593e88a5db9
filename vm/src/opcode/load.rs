use crate::fault::Fault;
use crate::frame::Frame;

pub fn iload(frame: &mut Frame, index: usize) -> Result<(), Fault> {
    let value = frame.load_local_i32(index)?;
    frame.push_i32(value);
    Ok(())
}

pub fn lload(frame: &mut Frame, index: usize) -> Result<(), Fault> {
    let value = frame.load_local_i64(index)?;
    frame.push_i64(value);
    Ok(())
}

pub fn aload(frame: &mut Frame, index: usize) -> Result<(), Fault> {
    let reference = frame.load_local_ref(index)?;
    frame.push_ref(reference);
    Ok(())
}

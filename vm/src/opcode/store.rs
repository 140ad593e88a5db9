use crate::fault::Fault;
use crate::frame::Frame;

pub fn istore(frame: &mut Frame, index: usize) -> Result<(), Fault> {
    let value = frame.pop_i32()?;
    frame.store_local_i32(index, value)
}

pub fn lstore(frame: &mut Frame, index: usize) -> Result<(), Fault> {
    let value = frame.pop_i64()?;
    frame.store_local_i64(index, value)
}

pub fn astore(frame: &mut Frame, index: usize) -> Result<(), Fault> {
    let reference = frame.pop_ref()?;
    frame.store_local_ref(index, reference)
}

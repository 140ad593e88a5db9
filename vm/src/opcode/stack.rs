use crate::fault::Fault;
use crate::frame::Frame;

pub fn pop(frame: &mut Frame) -> Result<(), Fault> {
    frame.pop_word()?;
    Ok(())
}

pub fn pop2(frame: &mut Frame) -> Result<(), Fault> {
    frame.pop_word()?;
    frame.pop_word()?;
    Ok(())
}

pub fn dup(frame: &mut Frame) -> Result<(), Fault> {
    let top = *frame
        .operand_stack
        .last()
        .ok_or(Fault::StackUnderflow)?;
    frame.push_word(top);
    Ok(())
}

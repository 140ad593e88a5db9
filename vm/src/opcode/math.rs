use crate::fault::Fault;
use crate::frame::Frame;

pub fn iadd(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    frame.push_i32(a.wrapping_add(b));
    Ok(())
}

pub fn isub(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    frame.push_i32(a.wrapping_sub(b));
    Ok(())
}

pub fn imul(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    frame.push_i32(a.wrapping_mul(b));
    Ok(())
}

/// `idiv` with a zero divisor raises `ArithmeticException` (spec §4.4.3).
pub fn idiv(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    if b == 0 {
        return Err(Fault::Arithmetic);
    }
    frame.push_i32(a.wrapping_div(b));
    Ok(())
}

pub fn irem(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    if b == 0 {
        return Err(Fault::Arithmetic);
    }
    frame.push_i32(a.wrapping_rem(b));
    Ok(())
}

pub fn ineg(frame: &mut Frame) -> Result<(), Fault> {
    let a = frame.pop_i32()?;
    frame.push_i32(a.wrapping_neg());
    Ok(())
}

pub fn ladd(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i64()?;
    let a = frame.pop_i64()?;
    frame.push_i64(a.wrapping_add(b));
    Ok(())
}

/// Shift amount masked by 0x1F (spec §4.4.3).
pub fn ishl(frame: &mut Frame) -> Result<(), Fault> {
    let shift = frame.pop_i32()?;
    let value = frame.pop_i32()?;
    frame.push_i32(value.wrapping_shl((shift & 0x1f) as u32));
    Ok(())
}

pub fn ishr(frame: &mut Frame) -> Result<(), Fault> {
    let shift = frame.pop_i32()?;
    let value = frame.pop_i32()?;
    frame.push_i32(value.wrapping_shr((shift & 0x1f) as u32));
    Ok(())
}

pub fn iand(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    frame.push_i32(a & b);
    Ok(())
}

pub fn ior(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    frame.push_i32(a | b);
    Ok(())
}

pub fn ixor(frame: &mut Frame) -> Result<(), Fault> {
    let b = frame.pop_i32()?;
    let a = frame.pop_i32()?;
    frame.push_i32(a ^ b);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use reader::base::ConstantPool;
    use std::io::Cursor;

    fn frame_with(values: &[i32]) -> Frame<'static> {
        use binrw::BinRead;
        let data: [u8; 2] = [0x00, 0x00];
        let mut cursor = Cursor::new(&data[..]);
        let pool: &'static ConstantPool =
            Box::leak(Box::new(ConstantPool::read_args(&mut cursor, (0,)).unwrap()));
        let code: &'static [u8] = &[];
        let table: &'static [reader::base::ExceptionTableEntry] = &[];
        let mut frame = Frame::new(0, 8, code, table, pool);
        for &v in values {
            frame.push_i32(v);
        }
        frame
    }

    #[test]
    fn iadd_wraps_on_overflow() {
        let mut frame = frame_with(&[i32::MAX, 1]);
        iadd(&mut frame).unwrap();
        assert_eq!(frame.pop_i32().unwrap(), i32::MIN);
    }

    #[test]
    fn idiv_by_zero_is_arithmetic_fault() {
        let mut frame = frame_with(&[1, 0]);
        assert_eq!(idiv(&mut frame).unwrap_err(), Fault::Arithmetic);
    }

    #[test]
    fn idiv_divides_in_order() {
        let mut frame = frame_with(&[7, 2]);
        idiv(&mut frame).unwrap();
        assert_eq!(frame.pop_i32().unwrap(), 3);
    }

    #[test]
    fn ishl_masks_shift_by_0x1f() {
        let mut frame = frame_with(&[1, 32]); // 32 & 0x1f == 0
        ishl(&mut frame).unwrap();
        assert_eq!(frame.pop_i32().unwrap(), 1);
    }
}

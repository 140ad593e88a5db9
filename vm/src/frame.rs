use reader::base::{ConstantPool, ExceptionTableEntry};

use crate::fault::Fault;

/// An activation record: operand stack and locals as flat 32-bit words, a pc,
/// and non-owning borrows of the method's code, exception table, and owning
/// class's constant pool (spec §3 "Frame", §9 "Borrowed state inside
/// frames"). The class that produced these borrows must outlive the frame.
pub struct Frame<'a> {
    pub locals: Vec<u32>,
    pub operand_stack: Vec<u32>,
    pub pc: usize,
    pub code: &'a [u8],
    pub exception_table: &'a [ExceptionTableEntry],
    pub constant_pool: &'a ConstantPool,
}

impl<'a> Frame<'a> {
    pub fn new(
        max_locals: u16,
        max_stack: u16,
        code: &'a [u8],
        exception_table: &'a [ExceptionTableEntry],
        constant_pool: &'a ConstantPool,
    ) -> Self {
        Frame {
            locals: vec![0; max_locals as usize],
            operand_stack: Vec::with_capacity(max_stack as usize),
            pc: 0,
            code,
            exception_table,
            constant_pool,
        }
    }

    pub fn push_word(&mut self, word: u32) {
        self.operand_stack.push(word);
    }

    pub fn pop_word(&mut self) -> Result<u32, Fault> {
        self.operand_stack.pop().ok_or(Fault::StackUnderflow)
    }

    pub fn push_i32(&mut self, value: i32) {
        self.push_word(value as u32);
    }

    pub fn pop_i32(&mut self) -> Result<i32, Fault> {
        self.pop_word().map(|w| w as i32)
    }

    pub fn push_ref(&mut self, reference: u32) {
        self.push_word(reference);
    }

    pub fn pop_ref(&mut self) -> Result<u32, Fault> {
        self.pop_word()
    }

    /// Pushes a category-2 value: low word, then high (spec §4.4.2).
    pub fn push_cat2(&mut self, bits: u64) {
        self.push_word(bits as u32);
        self.push_word((bits >> 32) as u32);
    }

    /// Pops a category-2 value: high word, then low; reconstructs via
    /// `(high << 32) | low` (spec §4.4.2).
    pub fn pop_cat2(&mut self) -> Result<u64, Fault> {
        let high = self.pop_word()?;
        let low = self.pop_word()?;
        Ok(((high as u64) << 32) | (low as u64))
    }

    pub fn push_i64(&mut self, value: i64) {
        self.push_cat2(value as u64);
    }

    pub fn pop_i64(&mut self) -> Result<i64, Fault> {
        self.pop_cat2().map(|bits| bits as i64)
    }

    pub fn push_f64(&mut self, value: f64) {
        self.push_cat2(value.to_bits());
    }

    fn load_local(&self, index: usize) -> Result<u32, Fault> {
        self.locals.get(index).copied().ok_or(Fault::StackUnderflow)
    }

    fn store_local(&mut self, index: usize, value: u32) -> Result<(), Fault> {
        *self
            .locals
            .get_mut(index)
            .ok_or(Fault::StackUnderflow)? = value;
        Ok(())
    }

    pub fn load_local_i32(&self, index: usize) -> Result<i32, Fault> {
        self.load_local(index).map(|w| w as i32)
    }

    pub fn store_local_i32(&mut self, index: usize, value: i32) -> Result<(), Fault> {
        self.store_local(index, value as u32)
    }

    pub fn load_local_ref(&self, index: usize) -> Result<u32, Fault> {
        self.load_local(index)
    }

    pub fn store_local_ref(&mut self, index: usize, reference: u32) -> Result<(), Fault> {
        self.store_local(index, reference)
    }

    /// Category-2 locals occupy two consecutive slots, low word first.
    pub fn load_local_i64(&self, index: usize) -> Result<i64, Fault> {
        let low = self.load_local(index)?;
        let high = self.load_local(index + 1)?;
        Ok((((high as u64) << 32) | (low as u64)) as i64)
    }

    pub fn store_local_i64(&mut self, index: usize, value: i64) -> Result<(), Fault> {
        let bits = value as u64;
        self.store_local(index, bits as u32)?;
        self.store_local(index + 1, (bits >> 32) as u32)
    }

    /// Finds the first exception-table entry covering `faulting_pc`. Any
    /// non-zero `catch_type` is treated as a match, per the simplified
    /// baseline (spec §4.4.7/§9).
    pub fn find_handler(&self, faulting_pc: usize) -> Option<usize> {
        self.exception_table
            .iter()
            .find(|entry| entry.covers(faulting_pc))
            .map(|entry| entry.handler_pc as usize)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reader::base::ConstantPool;
    use std::io::Cursor;

    fn empty_pool() -> ConstantPool {
        use binrw::BinRead;
        let data: [u8; 2] = [0x00, 0x00];
        let mut cursor = Cursor::new(&data[..]);
        ConstantPool::read_args(&mut cursor, (0,)).unwrap()
    }

    #[test]
    fn category2_round_trips_through_the_stack() {
        let pool = empty_pool();
        let code = [];
        let table = [];
        let mut frame = Frame::new(2, 4, &code, &table, &pool);
        frame.push_i64(-42);
        assert_eq!(frame.pop_i64().unwrap(), -42);

        frame.push_f64(3.5);
        let bits = frame.pop_cat2().unwrap();
        assert_eq!(f64::from_bits(bits), 3.5);
    }

    #[test]
    fn category2_locals_occupy_two_slots() {
        let pool = empty_pool();
        let code = [];
        let table = [];
        let mut frame = Frame::new(4, 4, &code, &table, &pool);
        frame.store_local_i64(0, i64::MIN).unwrap();
        assert_eq!(frame.load_local_i64(0).unwrap(), i64::MIN);
        // slot 2 untouched
        assert_eq!(frame.load_local_i32(2).unwrap(), 0);
    }

    #[test]
    fn pop_on_empty_stack_is_stack_underflow() {
        let pool = empty_pool();
        let code = [];
        let table = [];
        let mut frame = Frame::new(0, 0, &code, &table, &pool);
        assert_eq!(frame.pop_word().unwrap_err(), Fault::StackUnderflow);
    }
}

//! The fetch-decode-execute loop (spec §4.4.8) and the thread-local state it
//! owns: the heap and the current frame.
//!
//! The simplified model never pushes a nested frame for `invoke*` (spec
//! §4.4.5), so a single frame runs to completion before `execute` returns;
//! the frame/heap split still mirrors the spec's "stack of activation
//! frames" + "heap vector" ownership (§2), ready to grow a real call stack.

use std::io::{Cursor, Write};

use reader::base::{ClassFile, ConstantPool};
use reader::bytecode::{decode_instruction, DecodeError, Opcode};
use snafu::Snafu;

use crate::fault::Fault;
use crate::frame::Frame;
use crate::heap::{Heap, HeapObject};
use crate::opcode::{comparison, constant, load, math, reference, stack, store};

/// The entry point descriptor the spec requires (§2, §4.4.1): a static
/// `main` method shaped `([Ljava/lang/String;)V`.
pub const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

#[derive(Debug, Snafu)]
pub enum ExecutionError {
    #[snafu(display("no static main([Ljava/lang/String;)V in {class}"))]
    MainNotFound { class: String },

    #[snafu(display("unsupported opcode {opcode} at offset {offset}"))]
    UnsupportedOpcode { opcode: String, offset: usize },

    #[snafu(display("failed to decode instruction: {source}"))]
    Decode { source: DecodeError },

    #[snafu(display("uncaught {fault} at pc {pc}"))]
    UncaughtFault { fault: Fault, pc: usize },
}

impl From<DecodeError> for ExecutionError {
    fn from(source: DecodeError) -> Self {
        ExecutionError::Decode { source }
    }
}

/// What a single dispatched instruction does to control flow.
enum Control {
    Next,
    Jump(usize),
    Return,
}

/// A fault routes through exception-table handler search (§4.4.7); any
/// other failure is immediately terminal (§4.4.8, point 2).
enum DispatchError {
    Fault(Fault),
    Fatal(ExecutionError),
}

impl From<Fault> for DispatchError {
    fn from(fault: Fault) -> Self {
        DispatchError::Fault(fault)
    }
}

/// Owns the heap for the lifetime of one thread of execution (spec §5:
/// single-threaded, no preemption).
pub struct Thread {
    pub heap: Heap,
}

impl Thread {
    pub fn new() -> Self {
        Thread { heap: Heap::new() }
    }

    /// Locates `class`'s entry point, builds its initial frame, and runs it
    /// to completion (spec §2, §4.4.1), writing any `println` output to `out`.
    pub fn execute(&mut self, class: &ClassFile, out: &mut dyn Write) -> Result<(), ExecutionError> {
        let pool = &class.constant_pool;
        let method =
            class
                .find_method("main", MAIN_DESCRIPTOR)
                .ok_or_else(|| ExecutionError::MainNotFound {
                    class: class.class_name().into_owned(),
                })?;
        let code = method
            .code(pool)
            .ok_or_else(|| ExecutionError::MainNotFound {
                class: class.class_name().into_owned(),
            })?;

        let mut frame = Frame::new(
            code.max_locals,
            code.max_stack,
            &code.code,
            &code.exception_table,
            pool,
        );
        // argument slot 0 would hold the string-array argument; the
        // simplified model leaves it as the null sentinel (spec §4.4.1).
        if !frame.locals.is_empty() {
            frame.locals[0] = 0;
        }

        self.run_frame(&mut frame, pool, out)
    }

    fn run_frame(
        &mut self,
        frame: &mut Frame,
        pool: &ConstantPool,
        out: &mut dyn Write,
    ) -> Result<(), ExecutionError> {
        loop {
            let start_pc = frame.pc;
            if start_pc >= frame.code.len() {
                return Ok(());
            }
            let mut cursor = Cursor::new(frame.code);
            cursor.set_position(start_pc as u64);
            let (len, op) = decode_instruction(&mut cursor, 0)?;
            frame.pc = start_pc + len;

            match self.dispatch(frame, pool, &op, start_pc, out) {
                Ok(Control::Next) => continue,
                Ok(Control::Jump(target)) => {
                    frame.pc = target;
                    continue;
                }
                Ok(Control::Return) => return Ok(()),
                Err(DispatchError::Fatal(e)) => return Err(e),
                Err(DispatchError::Fault(fault)) => match frame.find_handler(start_pc) {
                    Some(handler_pc) => {
                        frame.operand_stack.clear();
                        let reference =
                            self.heap.allocate(HeapObject::exception(fault.exception_class_name()));
                        frame.operand_stack.push(reference);
                        frame.pc = handler_pc;
                        continue;
                    }
                    None => return Err(ExecutionError::UncaughtFault { fault, pc: start_pc }),
                },
            }
        }
    }

    /// Executes one decoded instruction against `frame` (spec §4.4.3's
    /// table). Anything outside that table is `UnsupportedOpcode`, fatal
    /// per §4.4.8 — the interpreter's dispatch is strictly a subset of what
    /// `reader::bytecode` can decode (see SPEC_FULL.md §4.4 "ADDED").
    fn dispatch(
        &mut self,
        frame: &mut Frame,
        pool: &ConstantPool,
        op: &Opcode,
        start_pc: usize,
        out: &mut dyn Write,
    ) -> Result<Control, DispatchError> {
        use Control::Next;
        match op {
            Opcode::IConstM1 => {
                frame.push_i32(-1);
                Ok(Next)
            }
            Opcode::IConst0 => {
                frame.push_i32(0);
                Ok(Next)
            }
            Opcode::IConst1 => {
                frame.push_i32(1);
                Ok(Next)
            }
            Opcode::IConst2 => {
                frame.push_i32(2);
                Ok(Next)
            }
            Opcode::IConst3 => {
                frame.push_i32(3);
                Ok(Next)
            }
            Opcode::IConst4 => {
                frame.push_i32(4);
                Ok(Next)
            }
            Opcode::IConst5 => {
                frame.push_i32(5);
                Ok(Next)
            }
            Opcode::LConst0 => {
                frame.push_i64(0);
                Ok(Next)
            }
            Opcode::LConst1 => {
                frame.push_i64(1);
                Ok(Next)
            }
            Opcode::Bipush(v) => {
                frame.push_i32(*v as i32);
                Ok(Next)
            }
            Opcode::Sipush(v) => {
                frame.push_i32(*v as i32);
                Ok(Next)
            }
            Opcode::Ldc(i) => {
                constant::ldc(frame, &mut self.heap, pool, *i as u16);
                Ok(Next)
            }
            Opcode::LdcW(i) => {
                constant::ldc(frame, &mut self.heap, pool, *i);
                Ok(Next)
            }
            Opcode::Ldc2W(i) => {
                constant::ldc2_w(frame, pool, *i);
                Ok(Next)
            }
            Opcode::ILoad(i) => {
                load::iload(frame, *i as usize)?;
                Ok(Next)
            }
            Opcode::ILoad0 => {
                load::iload(frame, 0)?;
                Ok(Next)
            }
            Opcode::ILoad1 => {
                load::iload(frame, 1)?;
                Ok(Next)
            }
            Opcode::ILoad2 => {
                load::iload(frame, 2)?;
                Ok(Next)
            }
            Opcode::ILoad3 => {
                load::iload(frame, 3)?;
                Ok(Next)
            }
            Opcode::LLoad(i) => {
                load::lload(frame, *i as usize)?;
                Ok(Next)
            }
            Opcode::LLoad0 => {
                load::lload(frame, 0)?;
                Ok(Next)
            }
            Opcode::LLoad1 => {
                load::lload(frame, 1)?;
                Ok(Next)
            }
            Opcode::LLoad2 => {
                load::lload(frame, 2)?;
                Ok(Next)
            }
            Opcode::LLoad3 => {
                load::lload(frame, 3)?;
                Ok(Next)
            }
            Opcode::ALoad(i) => {
                load::aload(frame, *i as usize)?;
                Ok(Next)
            }
            Opcode::ALoad0 => {
                load::aload(frame, 0)?;
                Ok(Next)
            }
            Opcode::ALoad1 => {
                load::aload(frame, 1)?;
                Ok(Next)
            }
            Opcode::ALoad2 => {
                load::aload(frame, 2)?;
                Ok(Next)
            }
            Opcode::ALoad3 => {
                load::aload(frame, 3)?;
                Ok(Next)
            }
            Opcode::IStore(i) => {
                store::istore(frame, *i as usize)?;
                Ok(Next)
            }
            Opcode::IStore0 => {
                store::istore(frame, 0)?;
                Ok(Next)
            }
            Opcode::IStore1 => {
                store::istore(frame, 1)?;
                Ok(Next)
            }
            Opcode::IStore2 => {
                store::istore(frame, 2)?;
                Ok(Next)
            }
            Opcode::IStore3 => {
                store::istore(frame, 3)?;
                Ok(Next)
            }
            Opcode::LStore(i) => {
                store::lstore(frame, *i as usize)?;
                Ok(Next)
            }
            Opcode::LStore0 => {
                store::lstore(frame, 0)?;
                Ok(Next)
            }
            Opcode::LStore1 => {
                store::lstore(frame, 1)?;
                Ok(Next)
            }
            Opcode::LStore2 => {
                store::lstore(frame, 2)?;
                Ok(Next)
            }
            Opcode::LStore3 => {
                store::lstore(frame, 3)?;
                Ok(Next)
            }
            Opcode::AStore(i) => {
                store::astore(frame, *i as usize)?;
                Ok(Next)
            }
            Opcode::AStore0 => {
                store::astore(frame, 0)?;
                Ok(Next)
            }
            Opcode::AStore1 => {
                store::astore(frame, 1)?;
                Ok(Next)
            }
            Opcode::AStore2 => {
                store::astore(frame, 2)?;
                Ok(Next)
            }
            Opcode::AStore3 => {
                store::astore(frame, 3)?;
                Ok(Next)
            }
            Opcode::Pop => {
                stack::pop(frame)?;
                Ok(Next)
            }
            Opcode::Pop2 => {
                stack::pop2(frame)?;
                Ok(Next)
            }
            Opcode::Dup => {
                stack::dup(frame)?;
                Ok(Next)
            }
            Opcode::IAdd => {
                math::iadd(frame)?;
                Ok(Next)
            }
            Opcode::ISub => {
                math::isub(frame)?;
                Ok(Next)
            }
            Opcode::IMul => {
                math::imul(frame)?;
                Ok(Next)
            }
            Opcode::IDiv => {
                math::idiv(frame)?;
                Ok(Next)
            }
            Opcode::IRem => {
                math::irem(frame)?;
                Ok(Next)
            }
            Opcode::INeg => {
                math::ineg(frame)?;
                Ok(Next)
            }
            Opcode::LAdd => {
                math::ladd(frame)?;
                Ok(Next)
            }
            Opcode::IShl => {
                math::ishl(frame)?;
                Ok(Next)
            }
            Opcode::IShr => {
                math::ishr(frame)?;
                Ok(Next)
            }
            Opcode::IAnd => {
                math::iand(frame)?;
                Ok(Next)
            }
            Opcode::IOr => {
                math::ior(frame)?;
                Ok(Next)
            }
            Opcode::IXor => {
                math::ixor(frame)?;
                Ok(Next)
            }
            Opcode::IfEq(d) => branch_if(comparison::if_cond(frame, start_pc, *d, |v| v == 0)?),
            Opcode::IfNe(d) => branch_if(comparison::if_cond(frame, start_pc, *d, |v| v != 0)?),
            Opcode::IfLt(d) => branch_if(comparison::if_cond(frame, start_pc, *d, |v| v < 0)?),
            Opcode::IfGe(d) => branch_if(comparison::if_cond(frame, start_pc, *d, |v| v >= 0)?),
            Opcode::IfGt(d) => branch_if(comparison::if_cond(frame, start_pc, *d, |v| v > 0)?),
            Opcode::IfLe(d) => branch_if(comparison::if_cond(frame, start_pc, *d, |v| v <= 0)?),
            Opcode::IfICmpEq(d) => {
                branch_if(comparison::if_icmp(frame, start_pc, *d, |a, b| a == b)?)
            }
            Opcode::IfICmpNe(d) => {
                branch_if(comparison::if_icmp(frame, start_pc, *d, |a, b| a != b)?)
            }
            Opcode::IfICmpLt(d) => {
                branch_if(comparison::if_icmp(frame, start_pc, *d, |a, b| a < b)?)
            }
            Opcode::IfICmpGe(d) => {
                branch_if(comparison::if_icmp(frame, start_pc, *d, |a, b| a >= b)?)
            }
            Opcode::IfICmpGt(d) => {
                branch_if(comparison::if_icmp(frame, start_pc, *d, |a, b| a > b)?)
            }
            Opcode::IfICmpLe(d) => {
                branch_if(comparison::if_icmp(frame, start_pc, *d, |a, b| a <= b)?)
            }
            Opcode::Goto(d) => Ok(Control::Jump(comparison::branch_target(start_pc, *d))),
            Opcode::GotoW(d) => Ok(Control::Jump((start_pc as i64 + *d as i64) as usize)),
            Opcode::New(i) => {
                reference::new_instance(frame, &mut self.heap, pool, *i);
                Ok(Next)
            }
            Opcode::GetField(i) => {
                reference::getfield(frame, &self.heap, pool, *i)?;
                Ok(Next)
            }
            Opcode::PutField(i) => {
                reference::putfield(frame, &mut self.heap, pool, *i)?;
                Ok(Next)
            }
            // getstatic is stubbed to the print sink regardless of the
            // resolved field (spec §4.4.3); the pool index is unused.
            Opcode::GetStatic(_) => {
                reference::getstatic(frame);
                Ok(Next)
            }
            Opcode::NewArray(t) => {
                reference::newarray(frame, &mut self.heap, *t)?;
                Ok(Next)
            }
            Opcode::ANewArray(i) => {
                reference::anewarray(frame, &mut self.heap, pool, *i)?;
                Ok(Next)
            }
            Opcode::ArrayLength => {
                reference::arraylength(frame, &self.heap)?;
                Ok(Next)
            }
            Opcode::IALoad => {
                reference::iaload(frame, &self.heap)?;
                Ok(Next)
            }
            Opcode::IAStore => {
                reference::iastore(frame, &mut self.heap)?;
                Ok(Next)
            }
            Opcode::InvokeStatic(i) => {
                reference::invoke_static(frame, &mut self.heap, pool, *i, out)?;
                Ok(Next)
            }
            Opcode::InvokeSpecial(i) => {
                reference::invoke_special(frame, pool, *i)?;
                Ok(Next)
            }
            Opcode::InvokeVirtual(i) => {
                reference::invoke_virtual(frame, &mut self.heap, pool, *i, out)?;
                Ok(Next)
            }
            Opcode::Return => Ok(Control::Return),
            other => Err(DispatchError::Fatal(ExecutionError::UnsupportedOpcode {
                opcode: format!("{other:?}"),
                offset: start_pc,
            })),
        }
    }
}

impl Default for Thread {
    fn default() -> Self {
        Self::new()
    }
}

fn branch_if(target: Option<usize>) -> Result<Control, DispatchError> {
    Ok(match target {
        Some(t) => Control::Jump(t),
        None => Control::Next,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use reader::base::ExceptionTableEntry;
    use std::io::Cursor as TestCursor;

    fn empty_pool() -> ConstantPool {
        use binrw::BinRead;
        let data: [u8; 2] = [0x00, 0x00];
        let mut cursor = TestCursor::new(&data[..]);
        ConstantPool::read_args(&mut cursor, (0,)).unwrap()
    }

    #[test]
    fn arithmetic_leaves_the_sum_in_a_local() {
        // iconst_2; iconst_3; iadd; istore_1; return
        let code = [0x05u8, 0x06, 0x60, 0x3c, 0xb1];
        let pool = empty_pool();
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(2, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        thread.run_frame(&mut frame, &pool, &mut out).unwrap();
        assert_eq!(frame.load_local_i32(1).unwrap(), 5);
    }

    #[test]
    fn division_by_zero_is_caught_by_a_catch_all_handler() {
        // iconst_1; iconst_0; idiv
        let code = [0x04u8, 0x03, 0x6c];
        let pool = empty_pool();
        let table = [ExceptionTableEntry {
            start_pc: 0,
            end_pc: 3,
            handler_pc: 3,
            catch_type: 0,
        }];
        let mut frame = Frame::new(0, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        thread.run_frame(&mut frame, &pool, &mut out).unwrap();
        assert_eq!(frame.pc, 3);
        assert_eq!(frame.operand_stack.len(), 1);
        let reference = frame.operand_stack[0];
        assert_eq!(
            thread.heap.get(reference).unwrap().class_name,
            "java/lang/ArithmeticException"
        );
    }

    #[test]
    fn division_by_zero_without_a_handler_is_fatal() {
        let code = [0x04u8, 0x03, 0x6c];
        let pool = empty_pool();
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(0, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        let err = thread.run_frame(&mut frame, &pool, &mut out).unwrap_err();
        assert!(matches!(err, ExecutionError::UncaughtFault { pc: 2, .. }));
    }

    #[test]
    fn branch_not_taken_runs_the_fallthrough() {
        // iconst_1; ifeq +6 (skips bipush 9; istore_1); bipush 9; istore_1; return
        let code = [0x04u8, 0x99, 0x00, 0x06, 0x10, 0x09, 0x3c, 0xb1];
        let pool = empty_pool();
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(2, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        thread.run_frame(&mut frame, &pool, &mut out).unwrap();
        assert_eq!(frame.load_local_i32(1).unwrap(), 9);
    }

    #[test]
    fn branch_taken_skips_the_fallthrough() {
        // iconst_0; ifeq +6; bipush 9; istore_1; return
        let code = [0x03u8, 0x99, 0x00, 0x06, 0x10, 0x09, 0x3c, 0xb1];
        let pool = empty_pool();
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(2, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        thread.run_frame(&mut frame, &pool, &mut out).unwrap();
        assert_eq!(frame.load_local_i32(1).unwrap(), 0);
    }

    #[test]
    fn array_store_then_load_round_trips_the_value() {
        // iconst_3; newarray int; dup; iconst_0; bipush 7; iastore; iconst_0; iaload; return
        let code = [
            0x06u8, 0xbc, 0x0a, 0x59, 0x03, 0x10, 0x07, 0x4f, 0x03, 0x2e, 0xb1,
        ];
        let pool = empty_pool();
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(0, 8, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        thread.run_frame(&mut frame, &pool, &mut out).unwrap();
        assert_eq!(frame.pop_i32().unwrap(), 7);
    }

    fn println_pool_bytes() -> Vec<u8> {
        let mut b = Vec::new();
        b.push(1); // #1 Utf8 "hi"
        b.extend_from_slice(&[0, 2]);
        b.extend_from_slice(b"hi");
        b.push(8); // #2 String -> #1
        b.extend_from_slice(&[0, 1]);
        b.push(1); // #3 Utf8 "java/io/PrintStream"
        let class_name = b"java/io/PrintStream";
        b.extend_from_slice(&(class_name.len() as u16).to_be_bytes());
        b.extend_from_slice(class_name);
        b.push(7); // #4 Class -> #3
        b.extend_from_slice(&[0, 3]);
        b.push(1); // #5 Utf8 "println"
        b.extend_from_slice(&[0, 7]);
        b.extend_from_slice(b"println");
        b.push(1); // #6 Utf8 "(Ljava/lang/String;)V"
        let descriptor = b"(Ljava/lang/String;)V";
        b.extend_from_slice(&(descriptor.len() as u16).to_be_bytes());
        b.extend_from_slice(descriptor);
        b.push(12); // #7 NameAndType -> #5, #6
        b.extend_from_slice(&[0, 5]);
        b.extend_from_slice(&[0, 6]);
        b.push(10); // #8 Methodref -> #4, #7
        b.extend_from_slice(&[0, 4]);
        b.extend_from_slice(&[0, 7]);
        b
    }

    #[test]
    fn println_of_a_string_literal_writes_its_bytes() {
        use binrw::BinRead;
        let pool_bytes = println_pool_bytes();
        let mut cursor = TestCursor::new(pool_bytes);
        let pool = ConstantPool::read_args(&mut cursor, (8,)).unwrap();

        // getstatic #0 (unused); ldc #2; invokevirtual #8; return
        let code = [0xb2u8, 0x00, 0x00, 0x12, 0x02, 0xb6, 0x00, 0x08, 0xb1];
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(0, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        thread.run_frame(&mut frame, &pool, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hi\n");
    }

    #[test]
    fn unsupported_opcode_is_fatal() {
        // jsr is decoded but never executed by the interpreter's subset.
        let code = [0xa8u8, 0x00, 0x03];
        let pool = empty_pool();
        let table: [ExceptionTableEntry; 0] = [];
        let mut frame = Frame::new(0, 4, &code, &table, &pool);
        let mut thread = Thread::new();
        let mut out = Vec::new();
        let err = thread.run_frame(&mut frame, &pool, &mut out).unwrap_err();
        assert!(matches!(err, ExecutionError::UnsupportedOpcode { .. }));
    }
}

use reader::base::ClassFile;
use reader::bytecode::{decode_instruction, Opcode, WideInstruction};
use std::io::{self, Cursor, Write};

/// Emits a human-readable disassembly of a parsed class: header, full
/// constant pool (with resolved cross-reference comments), fields, methods,
/// and — for every method carrying a `Code` attribute — its decoded
/// bytecode stream.
pub fn disassemble<W: Write>(w: &mut W, class: &ClassFile) -> io::Result<()> {
    let pool = &class.constant_pool;

    writeln!(
        w,
        "class file version {}.{}",
        class.major_version, class.minor_version
    )?;
    writeln!(w)?;
    writeln!(
        w,
        "class {} extends {}{}",
        class.class_name(),
        class.super_class_name().as_deref().unwrap_or("<none>"),
        if class.interfaces.is_empty() {
            String::new()
        } else {
            format!(
                " implements {}",
                class
                    .interface_names()
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    )?;
    writeln!(w, "  flags: {:#06x}", class.access_flags().bits())?;
    writeln!(w)?;

    writeln!(w, "Constant pool:")?;
    for (slot, entry) in pool.inner().iter().enumerate() {
        let index = slot + 1;
        // A tombstone is the unused second slot of a Long/Double; it's not
        // separately printed (spec §4.3).
        if matches!(entry, reader::base::ConstantPoolEntry::Tombstone) {
            continue;
        }
        writeln!(w, "  #{index} = {}", pool.describe(index))?;
    }
    writeln!(w)?;

    writeln!(w, "Fields:")?;
    for field in &class.fields {
        writeln!(
            w,
            "  {} {} (flags {:#06x})",
            pool.utf8(field.descriptor_index as usize),
            pool.utf8(field.name_index as usize),
            field.access_flags().bits(),
        )?;
    }
    writeln!(w)?;

    writeln!(w, "Methods:")?;
    for method in &class.methods {
        writeln!(
            w,
            "  {} {} (flags {:#06x})",
            pool.utf8(method.descriptor_index as usize),
            pool.utf8(method.name_index as usize),
            method.access_flags().bits(),
        )?;
        if let Some(code) = method.code(pool) {
            writeln!(
                w,
                "    Code: max_stack={}, max_locals={}",
                code.max_stack, code.max_locals
            )?;
            disassemble_bytecode(w, &code.code, pool)?;
            if !code.exception_table.is_empty() {
                writeln!(w, "    Exception table:")?;
                writeln!(w, "     from    to  target type")?;
                for entry in &code.exception_table {
                    let catch = if entry.catch_type == 0 {
                        "any".to_string()
                    } else {
                        pool.class_name(entry.catch_type as usize).to_string()
                    };
                    writeln!(
                        w,
                        "     {:5}  {:4}  {:6}  {catch}",
                        entry.start_pc, entry.end_pc, entry.handler_pc
                    )?;
                }
            }
        }
    }

    Ok(())
}

fn disassemble_bytecode<W: Write>(
    w: &mut W,
    code: &[u8],
    pool: &reader::base::ConstantPool,
) -> io::Result<()> {
    let mut cursor = Cursor::new(code);
    loop {
        let offset = cursor.position() as usize;
        if offset >= code.len() {
            break;
        }
        match decode_instruction(&mut cursor, 0) {
            Ok((_len, op)) => {
                let (mnemonic, operand, comment) = render(&op, offset, pool);
                match comment {
                    Some(comment) => {
                        writeln!(w, "      {offset:4}: {mnemonic}{operand:<20} // {comment}")?
                    }
                    None => writeln!(w, "      {offset:4}: {mnemonic}{operand}")?,
                }
            }
            Err(err) => {
                log::warn!("decode error at offset {offset}: {err}");
                writeln!(w, "      {offset:4}: <decode error: {err}>")?;
                break;
            }
        }
    }
    Ok(())
}

/// Renders one instruction as `(mnemonic, operand text, resolved pool comment)`.
/// Branch targets are printed as absolute offsets (`offset + delta`), per the
/// disassembler's contract that jump targets are shown resolved, not relative.
fn render(
    op: &Opcode,
    offset: usize,
    pool: &reader::base::ConstantPool,
) -> (&'static str, String, Option<String>) {
    let branch = |delta: i16| format!(" {}", offset as i64 + delta as i64);
    let branch_w = |delta: i32| format!(" {}", offset as i64 + delta as i64);
    match op {
        Opcode::Nop => ("nop", String::new(), None),
        Opcode::AConstNull => ("aconst_null", String::new(), None),
        Opcode::IConstM1 => ("iconst_m1", String::new(), None),
        Opcode::IConst0 => ("iconst_0", String::new(), None),
        Opcode::IConst1 => ("iconst_1", String::new(), None),
        Opcode::IConst2 => ("iconst_2", String::new(), None),
        Opcode::IConst3 => ("iconst_3", String::new(), None),
        Opcode::IConst4 => ("iconst_4", String::new(), None),
        Opcode::IConst5 => ("iconst_5", String::new(), None),
        Opcode::LConst0 => ("lconst_0", String::new(), None),
        Opcode::LConst1 => ("lconst_1", String::new(), None),
        Opcode::FConst0 => ("fconst_0", String::new(), None),
        Opcode::FConst1 => ("fconst_1", String::new(), None),
        Opcode::FConst2 => ("fconst_2", String::new(), None),
        Opcode::DConst0 => ("dconst_0", String::new(), None),
        Opcode::DConst1 => ("dconst_1", String::new(), None),
        Opcode::Bipush(v) => ("bipush", format!(" {v}"), None),
        Opcode::Sipush(v) => ("sipush", format!(" {v}"), None),
        Opcode::Ldc(i) => ("ldc", format!(" #{i}"), Some(pool.describe(*i as usize))),
        Opcode::LdcW(i) => (
            "ldc_w",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::Ldc2W(i) => (
            "ldc2_w",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::ILoad(i) => ("iload", format!(" {i}"), None),
        Opcode::LLoad(i) => ("lload", format!(" {i}"), None),
        Opcode::FLoad(i) => ("fload", format!(" {i}"), None),
        Opcode::DLoad(i) => ("dload", format!(" {i}"), None),
        Opcode::ALoad(i) => ("aload", format!(" {i}"), None),
        Opcode::ILoad0 => ("iload_0", String::new(), None),
        Opcode::ILoad1 => ("iload_1", String::new(), None),
        Opcode::ILoad2 => ("iload_2", String::new(), None),
        Opcode::ILoad3 => ("iload_3", String::new(), None),
        Opcode::LLoad0 => ("lload_0", String::new(), None),
        Opcode::LLoad1 => ("lload_1", String::new(), None),
        Opcode::LLoad2 => ("lload_2", String::new(), None),
        Opcode::LLoad3 => ("lload_3", String::new(), None),
        Opcode::FLoad0 => ("fload_0", String::new(), None),
        Opcode::FLoad1 => ("fload_1", String::new(), None),
        Opcode::FLoad2 => ("fload_2", String::new(), None),
        Opcode::FLoad3 => ("fload_3", String::new(), None),
        Opcode::DLoad0 => ("dload_0", String::new(), None),
        Opcode::DLoad1 => ("dload_1", String::new(), None),
        Opcode::DLoad2 => ("dload_2", String::new(), None),
        Opcode::DLoad3 => ("dload_3", String::new(), None),
        Opcode::ALoad0 => ("aload_0", String::new(), None),
        Opcode::ALoad1 => ("aload_1", String::new(), None),
        Opcode::ALoad2 => ("aload_2", String::new(), None),
        Opcode::ALoad3 => ("aload_3", String::new(), None),
        Opcode::IALoad => ("iaload", String::new(), None),
        Opcode::LALoad => ("laload", String::new(), None),
        Opcode::FALoad => ("faload", String::new(), None),
        Opcode::DALoad => ("daload", String::new(), None),
        Opcode::AALoad => ("aaload", String::new(), None),
        Opcode::BALoad => ("baload", String::new(), None),
        Opcode::CALoad => ("caload", String::new(), None),
        Opcode::SALoad => ("saload", String::new(), None),
        Opcode::IStore(i) => ("istore", format!(" {i}"), None),
        Opcode::LStore(i) => ("lstore", format!(" {i}"), None),
        Opcode::FStore(i) => ("fstore", format!(" {i}"), None),
        Opcode::DStore(i) => ("dstore", format!(" {i}"), None),
        Opcode::AStore(i) => ("astore", format!(" {i}"), None),
        Opcode::IStore0 => ("istore_0", String::new(), None),
        Opcode::IStore1 => ("istore_1", String::new(), None),
        Opcode::IStore2 => ("istore_2", String::new(), None),
        Opcode::IStore3 => ("istore_3", String::new(), None),
        Opcode::LStore0 => ("lstore_0", String::new(), None),
        Opcode::LStore1 => ("lstore_1", String::new(), None),
        Opcode::LStore2 => ("lstore_2", String::new(), None),
        Opcode::LStore3 => ("lstore_3", String::new(), None),
        Opcode::FStore0 => ("fstore_0", String::new(), None),
        Opcode::FStore1 => ("fstore_1", String::new(), None),
        Opcode::FStore2 => ("fstore_2", String::new(), None),
        Opcode::FStore3 => ("fstore_3", String::new(), None),
        Opcode::DStore0 => ("dstore_0", String::new(), None),
        Opcode::DStore1 => ("dstore_1", String::new(), None),
        Opcode::DStore2 => ("dstore_2", String::new(), None),
        Opcode::DStore3 => ("dstore_3", String::new(), None),
        Opcode::AStore0 => ("astore_0", String::new(), None),
        Opcode::AStore1 => ("astore_1", String::new(), None),
        Opcode::AStore2 => ("astore_2", String::new(), None),
        Opcode::AStore3 => ("astore_3", String::new(), None),
        Opcode::IAStore => ("iastore", String::new(), None),
        Opcode::LAStore => ("lastore", String::new(), None),
        Opcode::FAStore => ("fastore", String::new(), None),
        Opcode::DAStore => ("dastore", String::new(), None),
        Opcode::AAStore => ("aastore", String::new(), None),
        Opcode::BAStore => ("bastore", String::new(), None),
        Opcode::CAStore => ("castore", String::new(), None),
        Opcode::SAStore => ("sastore", String::new(), None),
        Opcode::Pop => ("pop", String::new(), None),
        Opcode::Pop2 => ("pop2", String::new(), None),
        Opcode::Dup => ("dup", String::new(), None),
        Opcode::DupX1 => ("dup_x1", String::new(), None),
        Opcode::DupX2 => ("dup_x2", String::new(), None),
        Opcode::Dup2 => ("dup2", String::new(), None),
        Opcode::Dup2X1 => ("dup2_x1", String::new(), None),
        Opcode::Dup2X2 => ("dup2_x2", String::new(), None),
        Opcode::Swap => ("swap", String::new(), None),
        Opcode::IAdd => ("iadd", String::new(), None),
        Opcode::LAdd => ("ladd", String::new(), None),
        Opcode::FAdd => ("fadd", String::new(), None),
        Opcode::DAdd => ("dadd", String::new(), None),
        Opcode::ISub => ("isub", String::new(), None),
        Opcode::LSub => ("lsub", String::new(), None),
        Opcode::FSub => ("fsub", String::new(), None),
        Opcode::DSub => ("dsub", String::new(), None),
        Opcode::IMul => ("imul", String::new(), None),
        Opcode::LMul => ("lmul", String::new(), None),
        Opcode::FMul => ("fmul", String::new(), None),
        Opcode::DMul => ("dmul", String::new(), None),
        Opcode::IDiv => ("idiv", String::new(), None),
        Opcode::LDiv => ("ldiv", String::new(), None),
        Opcode::FDiv => ("fdiv", String::new(), None),
        Opcode::DDiv => ("ddiv", String::new(), None),
        Opcode::IRem => ("irem", String::new(), None),
        Opcode::LRem => ("lrem", String::new(), None),
        Opcode::FRem => ("frem", String::new(), None),
        Opcode::DRem => ("drem", String::new(), None),
        Opcode::INeg => ("ineg", String::new(), None),
        Opcode::LNeg => ("lneg", String::new(), None),
        Opcode::FNeg => ("fneg", String::new(), None),
        Opcode::DNeg => ("dneg", String::new(), None),
        Opcode::IShl => ("ishl", String::new(), None),
        Opcode::LShl => ("lshl", String::new(), None),
        Opcode::IShr => ("ishr", String::new(), None),
        Opcode::LShr => ("lshr", String::new(), None),
        Opcode::IUshr => ("iushr", String::new(), None),
        Opcode::LUshr => ("lushr", String::new(), None),
        Opcode::IAnd => ("iand", String::new(), None),
        Opcode::LAnd => ("land", String::new(), None),
        Opcode::IOr => ("ior", String::new(), None),
        Opcode::LOr => ("lor", String::new(), None),
        Opcode::IXor => ("ixor", String::new(), None),
        Opcode::LXor => ("lxor", String::new(), None),
        Opcode::IInc(index, value) => ("iinc", format!(" {index} {value}"), None),
        Opcode::I2L => ("i2l", String::new(), None),
        Opcode::I2F => ("i2f", String::new(), None),
        Opcode::I2D => ("i2d", String::new(), None),
        Opcode::L2I => ("l2i", String::new(), None),
        Opcode::L2F => ("l2f", String::new(), None),
        Opcode::L2D => ("l2d", String::new(), None),
        Opcode::F2I => ("f2i", String::new(), None),
        Opcode::F2L => ("f2l", String::new(), None),
        Opcode::F2D => ("f2d", String::new(), None),
        Opcode::D2I => ("d2i", String::new(), None),
        Opcode::D2L => ("d2l", String::new(), None),
        Opcode::D2F => ("d2f", String::new(), None),
        Opcode::I2B => ("i2b", String::new(), None),
        Opcode::I2C => ("i2c", String::new(), None),
        Opcode::I2S => ("i2s", String::new(), None),
        Opcode::LCmp => ("lcmp", String::new(), None),
        Opcode::FCmpL => ("fcmpl", String::new(), None),
        Opcode::FCmpG => ("fcmpg", String::new(), None),
        Opcode::DCmpL => ("dcmpl", String::new(), None),
        Opcode::DCmpG => ("dcmpg", String::new(), None),
        Opcode::IfEq(d) => ("ifeq", branch(*d), None),
        Opcode::IfNe(d) => ("ifne", branch(*d), None),
        Opcode::IfLt(d) => ("iflt", branch(*d), None),
        Opcode::IfGe(d) => ("ifge", branch(*d), None),
        Opcode::IfGt(d) => ("ifgt", branch(*d), None),
        Opcode::IfLe(d) => ("ifle", branch(*d), None),
        Opcode::IfICmpEq(d) => ("if_icmpeq", branch(*d), None),
        Opcode::IfICmpNe(d) => ("if_icmpne", branch(*d), None),
        Opcode::IfICmpLt(d) => ("if_icmplt", branch(*d), None),
        Opcode::IfICmpGe(d) => ("if_icmpge", branch(*d), None),
        Opcode::IfICmpGt(d) => ("if_icmpgt", branch(*d), None),
        Opcode::IfICmpLe(d) => ("if_icmple", branch(*d), None),
        Opcode::IfACmpEq(d) => ("if_acmpeq", branch(*d), None),
        Opcode::IfACmpNe(d) => ("if_acmpne", branch(*d), None),
        Opcode::Goto(d) => ("goto", branch(*d), None),
        Opcode::Jsr(d) => ("jsr", branch(*d), None),
        Opcode::Ret(i) => ("ret", format!(" {i}"), None),
        Opcode::TableSwitch(ts) => (
            "tableswitch",
            format!(
                " {{ default: {}, low: {}, high: {}, offsets: {:?} }}",
                offset as i64 + ts.default as i64,
                ts.low,
                ts.high,
                ts.jump_offsets
                    .iter()
                    .map(|d| offset as i64 + *d as i64)
                    .collect::<Vec<_>>()
            ),
            None,
        ),
        Opcode::LookupSwitch(ls) => (
            "lookupswitch",
            format!(
                " {{ default: {}, pairs: {:?} }}",
                offset as i64 + ls.default as i64,
                ls.match_offsets
                    .iter()
                    .map(|(m, d)| (*m, offset as i64 + *d as i64))
                    .collect::<Vec<_>>()
            ),
            None,
        ),
        Opcode::IReturn => ("ireturn", String::new(), None),
        Opcode::LReturn => ("lreturn", String::new(), None),
        Opcode::FReturn => ("freturn", String::new(), None),
        Opcode::DReturn => ("dreturn", String::new(), None),
        Opcode::AReturn => ("areturn", String::new(), None),
        Opcode::Return => ("return", String::new(), None),
        Opcode::GetStatic(i) => (
            "getstatic",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::PutStatic(i) => (
            "putstatic",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::GetField(i) => (
            "getfield",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::PutField(i) => (
            "putfield",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::InvokeVirtual(i) => (
            "invokevirtual",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::InvokeSpecial(i) => (
            "invokespecial",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::InvokeStatic(i) => (
            "invokestatic",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::InvokeInterface(i) => (
            "invokeinterface",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::InvokeDynamic(i) => (
            "invokedynamic",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::New(i) => ("new", format!(" #{i}"), Some(pool.describe(*i as usize))),
        Opcode::NewArray(t) => ("newarray", format!(" {}", array_type_name(*t)), None),
        Opcode::ANewArray(i) => (
            "anewarray",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::ArrayLength => ("arraylength", String::new(), None),
        Opcode::AThrow => ("athrow", String::new(), None),
        Opcode::CheckCast(i) => (
            "checkcast",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::InstanceOf(i) => (
            "instanceof",
            format!(" #{i}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::MonitorEnter => ("monitorenter", String::new(), None),
        Opcode::MonitorExit => ("monitorexit", String::new(), None),
        Opcode::Wide(inner) => ("wide", format!(" {inner:?}"), None),
        Opcode::MultiANewArray(i, dims) => (
            "multianewarray",
            format!(" #{i} {dims}"),
            Some(pool.describe(*i as usize)),
        ),
        Opcode::IfNull(d) => ("ifnull", branch(*d), None),
        Opcode::IfNonNull(d) => ("ifnonnull", branch(*d), None),
        Opcode::GotoW(d) => ("goto_w", branch_w(*d), None),
        Opcode::JsrW(d) => ("jsr_w", branch_w(*d), None),
        Opcode::Breakpoint => ("breakpoint", String::new(), None),
        Opcode::ImpDep1 => ("impdep1", String::new(), None),
        Opcode::ImpDep2 => ("impdep2", String::new(), None),
    }
}

fn array_type_name(code: u8) -> &'static str {
    match code {
        4 => "boolean",
        5 => "char",
        6 => "float",
        7 => "double",
        8 => "byte",
        9 => "short",
        10 => "int",
        11 => "long",
        _ => "<unknown>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::BinRead;
    use std::io::Cursor as TestCursor;

    /// Builds a minimal but well-formed class file: no fields, no methods,
    /// a single Class constant pointing at itself as `this_class`.
    fn minimal_class_bytes() -> Vec<u8> {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE];
        bytes.extend_from_slice(&[0, 0]); // minor
        bytes.extend_from_slice(&[0, 52]); // major
        bytes.extend_from_slice(&[0, 3]); // constant_pool_count (2 entries + slot 0)
        bytes.push(7); // tag Class
        bytes.extend_from_slice(&[0, 2]); // name_index -> #2
        bytes.push(1); // tag Utf8
        bytes.extend_from_slice(&[0, 4]); // length
        bytes.extend_from_slice(b"Main");
        bytes.extend_from_slice(&[0, 0x21]); // access_flags
        bytes.extend_from_slice(&[0, 1]); // this_class
        bytes.extend_from_slice(&[0, 0]); // super_class
        bytes.extend_from_slice(&[0, 0]); // interfaces_count
        bytes.extend_from_slice(&[0, 0]); // fields_count
        bytes.extend_from_slice(&[0, 0]); // methods_count
        bytes.extend_from_slice(&[0, 0]); // attributes_count
        bytes
    }

    #[test]
    fn disassembles_minimal_class_without_error() {
        use binrw::BinRead;
        let bytes = minimal_class_bytes();
        let mut cursor = TestCursor::new(bytes);
        let class = ClassFile::read(&mut cursor).unwrap();

        let mut out = Vec::new();
        disassemble(&mut out, &class).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("class Main"));
        assert!(text.contains("Constant pool:"));
    }

    #[test]
    fn bytecode_listing_shows_resolved_branch_targets() {
        // iconst_0 (1 byte) ; ifeq +5 (3 bytes) ; iconst_1 ; istore_1 ; return
        let code = [0x03u8, 0x99, 0x00, 0x05, 0x04, 0x3c, 0xb1];
        let mut out = Vec::new();
        let pool_bytes: Vec<u8> = vec![0, 1]; // cp_count=1 => no entries
        let mut cursor = TestCursor::new(pool_bytes);
        let pool = reader::base::ConstantPool::read_args(
            &mut cursor,
            (0u16,),
        )
        .unwrap();
        disassemble_bytecode(&mut out, &code, &pool).unwrap();
        let text = String::from_utf8(out).unwrap();
        // ifeq sits at offset 1; 1 + 5 = 6 is the resolved absolute target.
        assert!(text.contains("ifeq 6"));
    }
}

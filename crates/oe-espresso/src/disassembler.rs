//! Instruction disassembler built on the descriptor and alias tables.

use crate::decoder::{InstructionInfo, InstructionSet};
use crate::fields::{is_field_marker, Instruction, InstructionField};
use crate::table::InstructionId;

/// One disassembled operand
#[derive(Debug, Clone)]
pub enum Argument {
    /// A named register (r3, f5, crf2, spr8)
    Register(String),
    /// A branch target address
    Address(u32),
    /// An immediate printed in hex when large
    ValueSigned(i32),
    /// An immediate printed in hex when large
    ValueUnsigned(u32),
    /// A small constant printed in decimal
    Constant(u32),
}

impl Argument {
    fn to_text(&self) -> String {
        match self {
            Argument::Register(name) => name.clone(),
            Argument::Address(addr) => format!("@{:08X}", addr),
            Argument::ValueSigned(v) => {
                if *v < -9 {
                    format!("-0x{:X}", -v)
                } else if *v > 9 {
                    format!("0x{:X}", v)
                } else {
                    format!("{}", v)
                }
            }
            Argument::ValueUnsigned(v) => {
                if *v > 9 {
                    format!("0x{:X}", v)
                } else {
                    format!("{}", v)
                }
            }
            Argument::Constant(v) => format!("{}", v),
        }
    }
}

/// A disassembled instruction
#[derive(Debug, Clone)]
pub struct Disassembly {
    pub address: u32,
    pub name: String,
    pub args: Vec<Argument>,
    pub text: String,
}

fn disassemble_field(
    cia: u32,
    instr: Instruction,
    field: InstructionField,
) -> Option<Argument> {
    use InstructionField::*;

    Some(match field {
        Bd => {
            let target = if instr.aa() {
                instr.bd_offset() as u32
            } else {
                cia.wrapping_add(instr.bd_offset() as u32)
            };
            Argument::Address(target)
        }
        Li => {
            let target = if instr.aa() {
                instr.li_offset() as u32
            } else {
                cia.wrapping_add(instr.li_offset() as u32)
            };
            Argument::Address(target)
        }
        Bo => Argument::Constant(instr.bo()),
        Bi => Argument::Constant(instr.bi()),
        Rd | Rs => Argument::Register(format!("r{}", instr.rd())),
        Ra => Argument::Register(format!("r{}", instr.ra())),
        Rb => Argument::Register(format!("r{}", instr.rb())),
        FrD | FrS => Argument::Register(format!("f{}", instr.frd())),
        FrA => Argument::Register(format!("f{}", instr.fra())),
        FrB => Argument::Register(format!("f{}", instr.frb())),
        FrC => Argument::Register(format!("f{}", instr.frc())),
        CrfD => Argument::Register(format!("crf{}", instr.crfd())),
        CrfS => Argument::Register(format!("crf{}", instr.crfs())),
        CrbD => Argument::Constant(instr.crbd()),
        CrbA => Argument::Constant(instr.crba()),
        CrbB => Argument::Constant(instr.crbb()),
        Crm => Argument::Constant(instr.crm()),
        D => Argument::ValueSigned(instr.d()),
        Simm => Argument::ValueSigned(instr.simm()),
        Uimm => Argument::ValueUnsigned(instr.uimm()),
        Imm => Argument::ValueUnsigned(instr.imm()),
        Qd => Argument::ValueSigned(instr.qd()),
        Sh => Argument::Constant(instr.sh()),
        Mb => Argument::Constant(instr.mb()),
        Me => Argument::Constant(instr.me()),
        Nb => Argument::Constant(instr.nb()),
        To => Argument::Constant(instr.to()),
        Fm => Argument::Constant(instr.fm()),
        Sr => Argument::Constant(instr.sr()),
        Kcn => Argument::Constant(instr.kcn()),
        Spr => Argument::Register(format!("spr{}", instr.spr())),
        Tbr => Argument::Register(format!("tbr{}", instr.tbr())),
        _ => return None,
    })
}

/// Disassemble one instruction word.
///
/// Returns `None` for undefined encodings.
pub fn disassemble(set: &InstructionSet, instr: Instruction, address: u32) -> Option<Disassembly> {
    let data = set.decode(instr)?;
    let alias = set.find_alias(data, instr);

    let mut name = alias.map(|a| a.name).unwrap_or(data.name).to_string();

    // Operand order: destination fields first, then sources; fields both
    // read and written (update forms) print once, from the read list.
    let mut fields: Vec<InstructionField> = Vec::new();

    for &field in &data.write {
        if data.read.contains(&field) || fields.contains(&field) || is_field_marker(field) {
            continue;
        }
        fields.push(field);
    }

    for &field in &data.read {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }

    let mut args: Vec<Argument> = Vec::new();

    for field in fields {
        // Fields consumed by an alias comparison are implied by the
        // simplified mnemonic
        if let Some(alias) = alias {
            if alias.opcode.iter().any(|op| op.field == field) {
                continue;
            }
        }

        if let Some(arg) = disassemble_field(address, instr, field) {
            args.push(arg);
        }
    }

    if matches!(
        data.id,
        InstructionId::Bc | InstructionId::Bcctr | InstructionId::Bclr
    ) {
        check_branch_condition_alias(instr, data, &mut name, &mut args);
    }

    for &field in &data.flags {
        match field {
            InstructionField::Aa if instr.aa() => name.push('a'),
            InstructionField::Lk if instr.lk() => name.push('l'),
            InstructionField::Oe if instr.oe() => name.push('o'),
            InstructionField::Rc if instr.rc() => name.push('.'),
            _ => {}
        }
    }

    let mut text = name.clone();
    for (i, arg) in args.iter().enumerate() {
        text.push_str(if i == 0 { " " } else { ", " });
        text.push_str(&arg.to_text());
    }

    Some(Disassembly {
        address,
        name,
        args,
        text,
    })
}

fn check_branch_condition_alias(
    instr: Instruction,
    data: &InstructionInfo,
    name: &mut String,
    args: &mut Vec<Argument>,
) {
    let bo = instr.bo();
    let bi = instr.bi();

    // Unconditional form
    if bo == 20 && bi == 0 {
        let n = args.len().min(2);
        args.drain(..n);
        *name = match data.id {
            InstructionId::Bcctr => "bctr".to_string(),
            InstructionId::Bclr => "blr".to_string(),
            _ => "b".to_string(),
        };
        return;
    }

    let cond = match (bo, bi % 4) {
        (12, 0) => "blt",
        (4, 1) => "ble",
        (12, 2) => "beq",
        (4, 0) => "bge",
        (12, 1) => "bgt",
        (4, 2) => "bne",
        (12, 3) => "bso",
        (4, 3) => "bns",
        _ => return,
    };

    let n = args.len().min(2);
    args.drain(..n);
    args.push(Argument::Register(format!("cr{}", bi / 4)));
    *name = cond.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::InstructionSet;

    fn set() -> InstructionSet {
        InstructionSet::initialise()
    }

    #[test]
    fn test_disassemble_add() {
        let set = set();
        let dis = disassemble(&set, Instruction(0x7C64_2A14), 0x0200_0000).unwrap();
        assert_eq!(dis.text, "add r3, r4, r5");
    }

    #[test]
    fn test_disassemble_record_form() {
        let set = set();
        // add. r3, r4, r5
        let dis = disassemble(&set, Instruction(0x7C64_2A15), 0).unwrap();
        assert_eq!(dis.name, "add.");
    }

    #[test]
    fn test_disassemble_branch_target() {
        let set = set();
        // b +0x100 from 0x02000000
        let dis = disassemble(&set, Instruction(0x4800_0100), 0x0200_0000).unwrap();
        assert_eq!(dis.text, "b @02000100");
    }

    #[test]
    fn test_disassemble_conditional_branch_alias() {
        let set = set();
        // beq cr0, +8 => bc 12, 2, +8
        let word = (16 << 26) | (12 << 21) | (2 << 16) | 8;
        let dis = disassemble(&set, Instruction(word), 0x0200_0000).unwrap();
        assert!(dis.text.starts_with("beq"));
        assert!(dis.text.contains("cr0"));
    }

    #[test]
    fn test_disassemble_nop() {
        let set = set();
        let dis = disassemble(&set, Instruction(0x6000_0000), 0).unwrap();
        assert_eq!(dis.text, "nop");
    }

    #[test]
    fn test_disassemble_undefined() {
        let set = set();
        assert!(disassemble(&set, Instruction(0), 0).is_none());
    }
}

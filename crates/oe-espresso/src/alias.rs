//! Disassembly aliases.
//!
//! An alias names a simplified mnemonic for a base instruction when
//! particular operand fields take particular values, or when two operand
//! fields are equal (e.g. `mr rA, rS` for `or rA, rS, rS`). Aliases are
//! only consulted for human-readable output; execution always dispatches
//! on the base descriptor.

use crate::decoder::TableBuilder;
use crate::fields::InstructionField;
use crate::table::InstructionId;

/// Right-hand side of an alias field comparison
#[derive(Debug, Clone, Copy)]
pub enum AliasValue {
    Immediate(u32),
    Field(InstructionField),
}

/// One field comparison of an alias
#[derive(Debug, Clone, Copy)]
pub struct AliasOpcode {
    pub field: InstructionField,
    pub value: AliasValue,
}

/// Alternate mnemonic for a base instruction
#[derive(Debug, Clone)]
pub struct InstructionAlias {
    pub name: &'static str,
    pub id: InstructionId,
    pub opcode: Vec<AliasOpcode>,
}

macro_rules! alias {
    ($set:ident: $name:literal, $id:ident, [$($field:ident == $value:tt),+ $(,)?]) => {
        $set.define_alias(InstructionAlias {
            name: $name,
            id: InstructionId::$id,
            opcode: vec![$(AliasOpcode {
                field: InstructionField::$field,
                value: alias!(@value $value),
            }),+],
        });
    };
    (@value $value:literal) => { AliasValue::Immediate($value) };
    (@value $value:ident) => { AliasValue::Field(InstructionField::$value) };
}

/// Populate the alias table
pub(crate) fn define_aliases(set: &mut TableBuilder) {
    alias!(set: "nop", Ori, [Ra == 0, Rs == 0, Uimm == 0]);
    alias!(set: "li", Addi, [Ra == 0]);
    alias!(set: "lis", Addis, [Ra == 0]);
    alias!(set: "mr", Or, [Rb == Rs]);
    alias!(set: "not", Nor, [Rb == Rs]);
    alias!(set: "mtcr", Mtcrf, [Crm == 255]);
    alias!(set: "crclr", Crxor, [CrbA == CrbD, CrbB == CrbD]);
    alias!(set: "crset", Creqv, [CrbA == CrbD, CrbB == CrbD]);
    alias!(set: "crmove", Cror, [CrbB == CrbA]);
    alias!(set: "crnot", Crnor, [CrbB == CrbA]);
}

#[cfg(test)]
mod tests {
    use crate::decoder::InstructionSet;
    use crate::fields::Instruction;
    use crate::table::InstructionId;

    #[test]
    fn test_nop_alias() {
        let set = InstructionSet::initialise();
        // ori r0, r0, 0
        let word = Instruction(0x6000_0000);
        let info = set.decode(word).unwrap();
        assert_eq!(info.id, InstructionId::Ori);

        let alias = set.find_alias(info, word).unwrap();
        assert_eq!(alias.name, "nop");

        // ori r3, r3, 1 is not a nop
        let word = Instruction(0x6063_0001);
        assert!(set.find_alias(info, word).is_none());
    }

    #[test]
    fn test_mr_alias_field_comparison() {
        let set = InstructionSet::initialise();
        // or r3, r4, r4 => mr r3, r4
        let word = Instruction(0x7C83_2378);
        let info = set.decode(word).unwrap();
        assert_eq!(info.id, InstructionId::Or);
        let alias = set.find_alias(info, word).unwrap();
        assert_eq!(alias.name, "mr");

        // or r3, r4, r5 is a plain or
        let word = Instruction(0x7C83_2B78);
        assert!(set.find_alias(info, word).is_none());
    }

    #[test]
    fn test_li_alias() {
        let set = InstructionSet::initialise();
        // addi r3, r0, 100 => li r3, 100
        let word = Instruction(0x3860_0064);
        let info = set.decode(word).unwrap();
        let alias = set.find_alias(info, word).unwrap();
        assert_eq!(alias.name, "li");
    }
}

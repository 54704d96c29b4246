//! Instruction descriptors and the decode trie.
//!
//! The trie is built once from the instruction table: each level indexes
//! on one instruction field, and a child either resolves directly to a
//! descriptor or carries further field maps. Construction is
//! single-threaded; afterwards the structure is immutable and shared
//! read-only by every hardware thread.

use crate::alias::{define_aliases, AliasValue, InstructionAlias};
use crate::fields::{
    field_bitmask, field_name, field_start, field_value, field_width, Instruction,
    InstructionField,
};
use crate::table::{define_instructions, InstructionId};

/// One (field, required value) pair of an instruction's encoding
#[derive(Debug, Clone, Copy)]
pub struct InstructionOpcode {
    pub field: InstructionField,
    pub value: u32,
}

/// Immutable description of one instruction mnemonic
#[derive(Debug, Clone)]
pub struct InstructionInfo {
    pub id: InstructionId,
    pub name: &'static str,
    pub fullname: &'static str,
    /// Ordered encoding pairs; the decode trie nests in this order
    pub opcode: Vec<InstructionOpcode>,
    pub read: Vec<InstructionField>,
    pub write: Vec<InstructionField>,
    pub flags: Vec<InstructionField>,
}

impl InstructionInfo {
    /// Whether this instruction carries the given modifier flag
    pub fn has_flag(&self, field: InstructionField) -> bool {
        self.flags.contains(&field)
    }
}

#[derive(Debug, Default)]
struct TableEntry {
    instr: Option<InstructionId>,
    field_maps: Vec<FieldMap>,
}

#[derive(Debug)]
struct FieldMap {
    field: InstructionField,
    children: Vec<TableEntry>,
}

impl TableEntry {
    fn field_map(&mut self, field: InstructionField) -> Option<&mut FieldMap> {
        self.field_maps.iter_mut().find(|m| m.field == field)
    }

    fn add_table(&mut self, field: InstructionField) {
        if self.field_map(field).is_none() {
            let size = 1usize << field_width(field);
            let mut children = Vec::with_capacity(size);
            children.resize_with(size, TableEntry::default);
            self.field_maps.push(FieldMap { field, children });
        }
    }

    fn entry(&mut self, field: InstructionField, value: u32) -> &mut TableEntry {
        let map = self
            .field_map(field)
            .unwrap_or_else(|| panic!("missing field map for {}", field_name(field)));
        &mut map.children[value as usize]
    }

    fn add_instruction(&mut self, field: InstructionField, value: u32, id: InstructionId) {
        let slot = self.entry(field, value);
        if let Some(existing) = slot.instr {
            panic!(
                "ambiguous instruction encoding: {:?} and {:?} share ({}, {})",
                existing,
                id,
                field_name(field),
                value
            );
        }
        slot.instr = Some(id);
    }
}

/// Collects instruction and alias definitions during construction
pub struct TableBuilder {
    info: Vec<Option<InstructionInfo>>,
    aliases: Vec<InstructionAlias>,
}

impl TableBuilder {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn define(
        &mut self,
        id: InstructionId,
        name: &'static str,
        fullname: &'static str,
        opcode: Vec<InstructionOpcode>,
        read: Vec<InstructionField>,
        write: Vec<InstructionField>,
        flags: Vec<InstructionField>,
    ) {
        let slot = &mut self.info[id as usize];
        assert!(slot.is_none(), "duplicate instruction definition {:?}", id);
        *slot = Some(InstructionInfo {
            id,
            name,
            fullname,
            opcode,
            read,
            write,
            flags,
        });
    }

    pub(crate) fn define_alias(&mut self, alias: InstructionAlias) {
        self.aliases.push(alias);
    }
}

/// The built instruction set: descriptors, aliases and the decode trie
pub struct InstructionSet {
    info: Vec<InstructionInfo>,
    aliases: Vec<InstructionAlias>,
    root: TableEntry,
}

impl InstructionSet {
    /// Build the instruction set tables. Panics on an inconsistent
    /// instruction table; that is a defect in this crate, not a runtime
    /// condition.
    pub fn initialise() -> Self {
        let mut builder = TableBuilder {
            info: (0..InstructionId::COUNT).map(|_| None).collect(),
            aliases: Vec::new(),
        };

        define_instructions(&mut builder);
        define_aliases(&mut builder);

        let info: Vec<InstructionInfo> = builder
            .info
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.unwrap_or_else(|| panic!("instruction {} not defined", i)))
            .collect();

        let mut root = TableEntry::default();

        for instr in &info {
            let mut table = &mut root;

            // Resolve opcodes
            for op in &instr.opcode[..instr.opcode.len() - 1] {
                table.add_table(op.field);
                table = table.entry(op.field, op.value);
            }

            // Add the actual instruction entry
            let last = instr.opcode.last().unwrap();
            table.add_table(last.field);
            table.add_instruction(last.field, last.value, instr.id);
        }

        tracing::debug!(
            "Instruction set initialised: {} instructions, {} aliases",
            info.len(),
            builder.aliases.len()
        );

        Self {
            info,
            aliases: builder.aliases,
            root,
        }
    }

    /// Find the descriptor for an instruction id
    pub fn find(&self, id: InstructionId) -> &InstructionInfo {
        &self.info[id as usize]
    }

    /// All defined descriptors
    pub fn instructions(&self) -> &[InstructionInfo] {
        &self.info
    }

    /// Decode an instruction word to its descriptor.
    ///
    /// Never panics; undefined encodings decode to `None`.
    pub fn decode(&self, instr: Instruction) -> Option<&InstructionInfo> {
        let mut table = &self.root;

        loop {
            let mut next = table;

            for map in &table.field_maps {
                let value = field_value(map.field, instr) as usize;
                next = &map.children[value];

                if next.instr.is_some() || !next.field_maps.is_empty() {
                    break;
                }
            }

            if next.field_maps.is_empty() {
                return next.instr.map(|id| self.find(id));
            }

            table = next;
        }
    }

    /// Encode the canonical word for an instruction id: every encoding
    /// field at its required value, every operand field zero
    pub fn encode(&self, id: InstructionId) -> Instruction {
        let data = self.find(id);
        let mut word = 0u32;

        for op in &data.opcode {
            word |= op.value << field_start(op.field);
        }

        Instruction(word)
    }

    /// Check whether a word matches the encoding of a specific id
    pub fn is_a(&self, id: InstructionId, instr: Instruction) -> bool {
        self.find(id).opcode.iter().all(|op| {
            let mask = field_bitmask(op.field);
            let start = field_start(op.field);
            (instr.0 & mask) >> start == op.value
        })
    }

    /// Find a disassembly alias matching the given decoded instruction
    pub fn find_alias(
        &self,
        info: &InstructionInfo,
        instr: Instruction,
    ) -> Option<&InstructionAlias> {
        self.aliases.iter().find(|alias| {
            if alias.id != info.id {
                return false;
            }

            alias.opcode.iter().all(|op| {
                let x = field_value(op.field, instr);
                let y = match op.value {
                    AliasValue::Immediate(value) => value,
                    AliasValue::Field(field2) => field_value(field2, instr),
                };
                x == y
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> InstructionSet {
        InstructionSet::initialise()
    }

    #[test]
    fn test_decode_add() {
        let set = set();
        // add r3, r4, r5 => 0x7C642A14
        let info = set.decode(Instruction(0x7C64_2A14)).unwrap();
        assert_eq!(info.id, InstructionId::Add);
        assert_eq!(info.name, "add");
    }

    #[test]
    fn test_decode_addi() {
        let set = set();
        // addi r3, r0, 100
        let info = set.decode(Instruction(0x3860_0064)).unwrap();
        assert_eq!(info.id, InstructionId::Addi);
    }

    #[test]
    fn test_decode_sc_and_kc() {
        let set = set();
        // sc => opcd 17, bit 30 set
        let info = set.decode(Instruction(0x4400_0002)).unwrap();
        assert_eq!(info.id, InstructionId::Sc);

        // kc => opcd 17, bit 31 set
        let info = set.decode(Instruction(0x4400_0101)).unwrap();
        assert_eq!(info.id, InstructionId::Kc);
    }

    #[test]
    fn test_decode_undefined() {
        let set = set();
        // Primary opcode 0 is undefined
        assert!(set.decode(Instruction(0x0000_0000)).is_none());
        assert!(set.decode(Instruction(0x0000_0001)).is_none());
        // Undefined extended opcode under opcd 31
        assert!(set.decode(Instruction(0x7C00_03FE)).is_none());
    }

    #[test]
    fn test_decode_determinism() {
        let set = set();
        for word in [0u32, 0x7C64_2A14, 0xFFFF_FFFF, 0x4400_0002, 0x1234_5678] {
            let a = set.decode(Instruction(word)).map(|i| i.id);
            let b = set.decode(Instruction(word)).map(|i| i.id);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let set = set();
        for info in set.instructions() {
            let word = set.encode(info.id);
            let decoded = set
                .decode(word)
                .unwrap_or_else(|| panic!("{} does not decode", info.name));
            assert_eq!(decoded.id, info.id, "round trip failed for {}", info.name);
        }
    }

    #[test]
    fn test_is_a() {
        let set = set();
        let add = Instruction(0x7C64_2A14);
        assert!(set.is_a(InstructionId::Add, add));
        assert!(!set.is_a(InstructionId::Subf, add));
    }

    #[test]
    fn test_mfspr_spr_field() {
        let set = set();
        // mflr r0 => mfspr r0, LR
        let word = Instruction(0x7C08_02A6);
        let info = set.decode(word).unwrap();
        assert_eq!(info.id, InstructionId::Mfspr);
        assert_eq!(word.spr(), 8);
    }
}

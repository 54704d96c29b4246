//! The interpreter: one handler per opcode.
//!
//! Used for cold code, single stepping, and as the universal fallback
//! for instructions the translator has no native lowering for.

mod branch;
mod condition;
mod float;
mod integer;
mod loadstore;
mod paired;
mod system;

/// Argument builders shared with the translator's lowering pass
pub(crate) mod args {
    pub(crate) use super::branch::branch_args;
    pub(crate) use super::condition::cmp_args;
    pub(crate) use super::integer::{add_args, logical_args, rlw_args, shift_args};
    pub(crate) use super::loadstore::{load_args, store_args};
}

use oe_espresso::{Instruction, InstructionId, InstructionInfo};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;

/// Executes one instruction's semantics against the register file
pub type InterpHandler = fn(&mut Core, &ExecContext, Instruction) -> Result<(), Fault>;

/// Handler dispatch table, indexed by instruction id
pub struct Interpreter {
    handlers: Vec<Option<InterpHandler>>,
}

impl Interpreter {
    /// Build the dispatch table
    pub fn new() -> Self {
        let mut interp = Self {
            handlers: vec![None; InstructionId::COUNT],
        };

        branch::register(&mut interp);
        condition::register(&mut interp);
        float::register(&mut interp);
        integer::register(&mut interp);
        loadstore::register(&mut interp);
        paired::register(&mut interp);
        system::register(&mut interp);

        interp
    }

    pub(crate) fn register(&mut self, id: InstructionId, handler: InterpHandler) {
        debug_assert!(
            self.handlers[id as usize].is_none(),
            "duplicate handler for {:?}",
            id
        );
        self.handlers[id as usize] = Some(handler);
    }

    /// Handler for an instruction id, if one is implemented
    pub fn handler(&self, id: InstructionId) -> Option<InterpHandler> {
        self.handlers[id as usize]
    }

    pub fn has_instruction(&self, id: InstructionId) -> bool {
        self.handler(id).is_some()
    }

    /// Execute one decoded instruction.
    ///
    /// A missing handler is surfaced as an unimplemented-instruction
    /// fault, never silently skipped.
    pub fn execute(
        &self,
        core: &mut Core,
        ctx: &ExecContext,
        info: &InstructionInfo,
        instr: Instruction,
    ) -> Result<(), Fault> {
        match self.handler(info.id) {
            Some(handler) => handler(core, ctx, instr),
            None => Err(Fault::Unimplemented {
                addr: core.cia,
                word: instr.0,
                name: info.name,
            }),
        }
    }

    /// Fetch, decode and execute the instruction at `nia`
    pub fn step(&self, core: &mut Core, ctx: &ExecContext) -> Result<(), Fault> {
        core.cia = core.nia;

        let word = ctx
            .mem
            .read_be32(core.cia)
            .map_err(|_| Fault::FetchAccess { addr: core.cia })?;
        let instr = Instruction(word);

        let info = ctx
            .iset
            .decode(instr)
            .ok_or(Fault::IllegalInstruction {
                addr: core.cia,
                word,
            })?;

        core.nia = core.cia.wrapping_add(4);

        self.execute(core, ctx, info, instr)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

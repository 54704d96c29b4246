//! Branch handlers

use oe_espresso::{Instruction, InstructionId};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;
use crate::sema::{do_branch, BranchArgs, BranchKind};

use super::Interpreter;

pub(crate) fn branch_args(instr: Instruction, kind: BranchKind) -> BranchArgs {
    BranchArgs {
        kind,
        bo: instr.bo(),
        bi: instr.bi(),
        lk: instr.lk(),
    }
}

fn b(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_branch(
        core,
        &branch_args(
            instr,
            BranchKind::Direct {
                offset: instr.li_offset(),
                absolute: instr.aa(),
            },
        ),
    );
    Ok(())
}

fn bc(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_branch(
        core,
        &branch_args(
            instr,
            BranchKind::Conditional {
                offset: instr.bd_offset(),
                absolute: instr.aa(),
            },
        ),
    );
    Ok(())
}

fn bcctr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_branch(core, &branch_args(instr, BranchKind::ToCtr));
    Ok(())
}

fn bclr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_branch(core, &branch_args(instr, BranchKind::ToLr));
    Ok(())
}

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(B, b);
    interp.register(Bc, bc);
    interp.register(Bcctr, bcctr);
    interp.register(Bclr, bclr);
}

//! Compare, condition-register logical and condition-register move
//! handlers

use oe_espresso::registers::FpscrFlags;
use oe_espresso::{Instruction, InstructionId};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;
use crate::sema::{do_cmp, CmpArgs, CmpRhs};

use super::Interpreter;

pub(crate) fn cmp_args(instr: Instruction, signed: bool, immediate: bool) -> CmpArgs {
    let rhs = if immediate {
        if signed {
            CmpRhs::SignedImmediate(instr.simm())
        } else {
            CmpRhs::UnsignedImmediate(instr.uimm())
        }
    } else {
        CmpRhs::Register(instr.rb())
    };

    CmpArgs {
        crf: instr.crfd(),
        signed,
        ra: instr.ra(),
        rhs,
    }
}

fn cmp(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_cmp(core, &cmp_args(instr, true, false));
    Ok(())
}

fn cmpi(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_cmp(core, &cmp_args(instr, true, true));
    Ok(())
}

fn cmpl(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_cmp(core, &cmp_args(instr, false, false));
    Ok(())
}

fn cmpli(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_cmp(core, &cmp_args(instr, false, true));
    Ok(())
}

macro_rules! crb_handler {
    ($name:ident, |$a:ident, $b:ident| $expr:expr) => {
        fn $name(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            let $a = core.cr.bit(instr.crba());
            let $b = core.cr.bit(instr.crbb());
            core.cr.set_bit(instr.crbd(), $expr);
            Ok(())
        }
    };
}

crb_handler!(crand, |a, b| a & b);
crb_handler!(crandc, |a, b| a & !b);
crb_handler!(creqv, |a, b| !(a ^ b));
crb_handler!(crnand, |a, b| !(a & b));
crb_handler!(crnor, |a, b| !(a | b));
crb_handler!(cror, |a, b| a | b);
crb_handler!(crorc, |a, b| a | !b);
crb_handler!(crxor, |a, b| a ^ b);

fn mcrf(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let value = core.cr.field(instr.crfs());
    core.cr.set_field(instr.crfd(), value);
    Ok(())
}

fn mcrfs(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let shift = 4 * (7 - instr.crfs() as u32);
    let bits = (core.fpscr.0 >> shift) & 0xF;
    core.cr.set_field(instr.crfd(), bits);

    // Exception bits that were copied are cleared; other bits are left
    // alone. FEX and VX follow the normal rules.
    let exception_bits = FpscrFlags::FX.bits() | FpscrFlags::ALL_EXCEPTIONS.bits();
    let bits_to_clear = exception_bits & (0xF << shift);
    core.fpscr.0 &= !bits_to_clear;
    core.fpscr.update_fex_vx();
    Ok(())
}

fn mcrxr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.cr.set_field(instr.crfd(), core.xer.crxr());
    core.xer.clear_crxr();
    Ok(())
}

fn mfcr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.gpr[instr.rd()] = core.cr.0;
    Ok(())
}

fn mtcrf(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let s = core.gpr[instr.rs()];
    let crm = instr.crm();

    let mut mask = 0u32;
    for i in 0..8 {
        if crm & (1 << i) != 0 {
            mask |= 0xF << (i * 4);
        }
    }

    core.cr.0 = (s & mask) | (core.cr.0 & !mask);
    Ok(())
}

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(Cmp, cmp);
    interp.register(Cmpi, cmpi);
    interp.register(Cmpl, cmpl);
    interp.register(Cmpli, cmpli);
    interp.register(Crand, crand);
    interp.register(Crandc, crandc);
    interp.register(Creqv, creqv);
    interp.register(Crnand, crnand);
    interp.register(Crnor, crnor);
    interp.register(Cror, cror);
    interp.register(Crorc, crorc);
    interp.register(Crxor, crxor);
    interp.register(Mcrf, mcrf);
    interp.register(Mcrfs, mcrfs);
    interp.register(Mcrxr, mcrxr);
    interp.register(Mfcr, mfcr);
    interp.register(Mtcrf, mtcrf);
}

//! Integer arithmetic, logical, rotate and shift handlers

use oe_espresso::{Instruction, InstructionId};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;
use crate::sema::{
    do_add, do_logical, do_rlw, do_shift, record_cr0, record_overflow, AddArgs, AddFlags,
    LogicalArgs, LogicalFlags, LogicalOp, RlwArgs, ShiftArgs,
};

use super::Interpreter;

pub(crate) fn add_args(instr: Instruction, flags: AddFlags) -> AddArgs {
    AddArgs {
        flags,
        rd: instr.rd(),
        ra: instr.ra(),
        rb: instr.rb(),
        simm: instr.simm(),
        oe: instr.oe(),
        rc: instr.rc(),
    }
}

macro_rules! add_handler {
    ($name:ident, $($flag:ident)|+) => {
        fn $name(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            do_add(core, &add_args(instr, $(AddFlags::$flag)|+));
            Ok(())
        }
    };
}

add_handler!(add, CHECK_RECORD);
add_handler!(addc, CARRY | CHECK_RECORD);
add_handler!(adde, EXTENDED | CARRY | CHECK_RECORD);
add_handler!(addi, IMMEDIATE | ZERO_RA);
add_handler!(addic, IMMEDIATE | CARRY);
add_handler!(addicx, IMMEDIATE | CARRY | ALWAYS_RECORD);
add_handler!(addis, IMMEDIATE | SHIFTED | ZERO_RA);
add_handler!(addme, CHECK_RECORD | CARRY | EXTENDED | TO_MINUS_ONE);
add_handler!(addze, CHECK_RECORD | CARRY | EXTENDED | TO_ZERO);
add_handler!(subf, SUBTRACT | CHECK_RECORD);
add_handler!(subfc, CARRY | SUBTRACT | CHECK_RECORD);
add_handler!(subfe, EXTENDED | CARRY | SUBTRACT | CHECK_RECORD);
add_handler!(subfic, IMMEDIATE | CARRY | SUBTRACT);
add_handler!(subfme, TO_MINUS_ONE | EXTENDED | CARRY | CHECK_RECORD | SUBTRACT);
add_handler!(subfze, TO_ZERO | EXTENDED | CARRY | CHECK_RECORD | SUBTRACT);

pub(crate) fn logical_args(
    instr: Instruction,
    op: LogicalOp,
    flags: LogicalFlags,
) -> LogicalArgs {
    LogicalArgs {
        op,
        flags,
        ra: instr.ra(),
        rs: instr.rs(),
        rb: instr.rb(),
        uimm: instr.uimm(),
        rc: instr.rc(),
    }
}

macro_rules! logical_handler {
    ($name:ident, $op:ident, $($flag:ident)|+) => {
        fn $name(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            do_logical(core, &logical_args(instr, LogicalOp::$op, $(LogicalFlags::$flag)|+));
            Ok(())
        }
    };
}

logical_handler!(and, And, CHECK_RECORD);
logical_handler!(andc, And, CHECK_RECORD | COMPLEMENT);
logical_handler!(andi, And, ALWAYS_RECORD | IMMEDIATE);
logical_handler!(andis, And, ALWAYS_RECORD | IMMEDIATE | SHIFTED);
logical_handler!(eqv, Eqv, CHECK_RECORD);
logical_handler!(nand, Nand, CHECK_RECORD);
logical_handler!(nor, Nor, CHECK_RECORD);
logical_handler!(or, Or, CHECK_RECORD);
logical_handler!(orc, Or, CHECK_RECORD | COMPLEMENT);
logical_handler!(ori, Or, IMMEDIATE);
logical_handler!(oris, Or, IMMEDIATE | SHIFTED);
logical_handler!(xor, Xor, CHECK_RECORD);
logical_handler!(xori, Xor, IMMEDIATE);
logical_handler!(xoris, Xor, IMMEDIATE | SHIFTED);

fn cntlzw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.rs()].leading_zeros();
    core.gpr[instr.ra()] = a;

    if instr.rc() {
        record_cr0(core, a);
    }
    Ok(())
}

fn extsb(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.rs()] as u8 as i8 as i32 as u32;
    core.gpr[instr.ra()] = a;

    if instr.rc() {
        record_cr0(core, a);
    }
    Ok(())
}

fn extsh(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.rs()] as u16 as i16 as i32 as u32;
    core.gpr[instr.ra()] = a;

    if instr.rc() {
        record_cr0(core, a);
    }
    Ok(())
}

fn neg(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()];
    let d = (!a).wrapping_add(1);
    core.gpr[instr.rd()] = d;

    if instr.oe() {
        record_overflow(core, a == 0x8000_0000);
    }

    if instr.rc() {
        record_cr0(core, d);
    }
    Ok(())
}

fn divw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()] as i32;
    let b = core.gpr[instr.rb()] as i32;

    let overflow = b == 0 || (a as u32 == 0x8000_0000 && b == -1);

    let d = if overflow {
        // rD is -1 for a negative dividend, 0 otherwise
        if a < 0 {
            -1
        } else {
            0
        }
    } else {
        a.wrapping_div(b)
    } as u32;

    core.gpr[instr.rd()] = d;

    if instr.oe() {
        record_overflow(core, overflow);
    }

    if instr.rc() {
        record_cr0(core, d);
    }
    Ok(())
}

fn divwu(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()];
    let b = core.gpr[instr.rb()];

    let overflow = b == 0;
    let d = if overflow { 0 } else { a / b };

    core.gpr[instr.rd()] = d;

    if instr.oe() {
        record_overflow(core, overflow);
    }

    if instr.rc() {
        record_cr0(core, d);
    }
    Ok(())
}

fn mulhw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()] as i32 as i64;
    let b = core.gpr[instr.rb()] as i32 as i64;
    let d = ((a * b) >> 32) as u32;

    core.gpr[instr.rd()] = d;

    if instr.rc() {
        record_cr0(core, d);
    }
    Ok(())
}

fn mulhwu(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()] as u64;
    let b = core.gpr[instr.rb()] as u64;
    let d = ((a * b) >> 32) as u32;

    core.gpr[instr.rd()] = d;

    if instr.rc() {
        record_cr0(core, d);
    }
    Ok(())
}

fn mulli(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()] as i32 as i64;
    let b = instr.simm() as i64;
    core.gpr[instr.rd()] = (a * b) as u32;
    Ok(())
}

fn mullw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()] as i32 as i64;
    let b = core.gpr[instr.rb()] as i32 as i64;
    let product = a * b;
    let d = product as u32;

    core.gpr[instr.rd()] = d;

    if instr.oe() {
        record_overflow(core, !(-0x8000_0000..=0x7FFF_FFFF).contains(&product));
    }

    if instr.rc() {
        record_cr0(core, d);
    }
    Ok(())
}

pub(crate) fn rlw_args(instr: Instruction, insert: bool, immediate: bool) -> RlwArgs {
    RlwArgs {
        insert,
        immediate,
        ra: instr.ra(),
        rs: instr.rs(),
        sh_or_rb: if immediate {
            instr.sh() as usize
        } else {
            instr.rb()
        },
        mb: instr.mb(),
        me: instr.me(),
        rc: instr.rc(),
    }
}

fn rlwimi(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_rlw(core, &rlw_args(instr, true, true));
    Ok(())
}

fn rlwinm(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_rlw(core, &rlw_args(instr, false, true));
    Ok(())
}

fn rlwnm(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_rlw(core, &rlw_args(instr, false, false));
    Ok(())
}

pub(crate) fn shift_args(
    instr: Instruction,
    left: bool,
    arithmetic: bool,
    immediate: bool,
) -> ShiftArgs {
    ShiftArgs {
        left,
        arithmetic,
        immediate,
        ra: instr.ra(),
        rs: instr.rs(),
        sh_or_rb: if immediate {
            instr.sh() as usize
        } else {
            instr.rb()
        },
        rc: instr.rc(),
    }
}

fn slw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_shift(core, &shift_args(instr, true, false, false));
    Ok(())
}

fn sraw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_shift(core, &shift_args(instr, false, true, false));
    Ok(())
}

fn srawi(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_shift(core, &shift_args(instr, false, true, true));
    Ok(())
}

fn srw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    do_shift(core, &shift_args(instr, false, false, false));
    Ok(())
}

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(Add, add);
    interp.register(Addc, addc);
    interp.register(Adde, adde);
    interp.register(Addi, addi);
    interp.register(Addic, addic);
    interp.register(Addicx, addicx);
    interp.register(Addis, addis);
    interp.register(Addme, addme);
    interp.register(Addze, addze);
    interp.register(And, and);
    interp.register(Andc, andc);
    interp.register(Andi, andi);
    interp.register(Andis, andis);
    interp.register(Cntlzw, cntlzw);
    interp.register(Divw, divw);
    interp.register(Divwu, divwu);
    interp.register(Eqv, eqv);
    interp.register(Extsb, extsb);
    interp.register(Extsh, extsh);
    interp.register(Mulhw, mulhw);
    interp.register(Mulhwu, mulhwu);
    interp.register(Mulli, mulli);
    interp.register(Mullw, mullw);
    interp.register(Nand, nand);
    interp.register(Neg, neg);
    interp.register(Nor, nor);
    interp.register(Or, or);
    interp.register(Orc, orc);
    interp.register(Ori, ori);
    interp.register(Oris, oris);
    interp.register(Rlwimi, rlwimi);
    interp.register(Rlwinm, rlwinm);
    interp.register(Rlwnm, rlwnm);
    interp.register(Slw, slw);
    interp.register(Sraw, sraw);
    interp.register(Srawi, srawi);
    interp.register(Srw, srw);
    interp.register(Subf, subf);
    interp.register(Subfc, subfc);
    interp.register(Subfe, subfe);
    interp.register(Subfic, subfic);
    interp.register(Subfme, subfme);
    interp.register(Subfze, subfze);
    interp.register(Xor, xor);
    interp.register(Xori, xori);
    interp.register(Xoris, xoris);
}

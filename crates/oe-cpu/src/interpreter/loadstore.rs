//! Integer and floating-point load/store handlers

use oe_espresso::{Instruction, InstructionId};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;
use crate::sema::{do_load, do_store, LoadArgs, MemFlags, StoreArgs};

use super::float::{double_to_single_bits, single_bits_to_double};
use super::Interpreter;

pub(crate) fn load_args(instr: Instruction, width: u8, flags: MemFlags) -> LoadArgs {
    LoadArgs {
        width,
        flags,
        rd: instr.rd(),
        ra: instr.ra(),
        rb: instr.rb(),
        d: instr.d(),
    }
}

pub(crate) fn store_args(instr: Instruction, width: u8, flags: MemFlags) -> StoreArgs {
    StoreArgs {
        width,
        flags,
        rs: instr.rs(),
        ra: instr.ra(),
        rb: instr.rb(),
        d: instr.d(),
    }
}

macro_rules! load_handler {
    ($name:ident, $width:literal, $($flag:ident)|+) => {
        fn $name(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            do_load(core, ctx.mem, &load_args(instr, $width, $(MemFlags::$flag)|+))
        }
    };
}

macro_rules! store_handler {
    ($name:ident, $width:literal, $($flag:ident)|+) => {
        fn $name(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            do_store(core, ctx.mem, &store_args(instr, $width, $(MemFlags::$flag)|+))
        }
    };
}

load_handler!(lbz, 1, ZERO_RA);
load_handler!(lbzu, 1, UPDATE);
load_handler!(lbzux, 1, UPDATE | INDEXED);
load_handler!(lbzx, 1, INDEXED | ZERO_RA);
load_handler!(lha, 2, SIGN_EXTEND | ZERO_RA);
load_handler!(lhau, 2, SIGN_EXTEND | UPDATE);
load_handler!(lhaux, 2, SIGN_EXTEND | UPDATE | INDEXED);
load_handler!(lhax, 2, SIGN_EXTEND | INDEXED | ZERO_RA);
load_handler!(lhbrx, 2, BYTE_REVERSE | INDEXED | ZERO_RA);
load_handler!(lhz, 2, ZERO_RA);
load_handler!(lhzu, 2, UPDATE);
load_handler!(lhzux, 2, UPDATE | INDEXED);
load_handler!(lhzx, 2, INDEXED | ZERO_RA);
load_handler!(lwarx, 4, RESERVE | INDEXED | ZERO_RA);
load_handler!(lwbrx, 4, BYTE_REVERSE | INDEXED | ZERO_RA);
load_handler!(lwz, 4, ZERO_RA);
load_handler!(lwzu, 4, UPDATE);
load_handler!(lwzux, 4, UPDATE | INDEXED);
load_handler!(lwzx, 4, INDEXED | ZERO_RA);

store_handler!(stb, 1, ZERO_RA);
store_handler!(stbu, 1, UPDATE);
store_handler!(stbux, 1, UPDATE | INDEXED);
store_handler!(stbx, 1, ZERO_RA | INDEXED);
store_handler!(sth, 2, ZERO_RA);
store_handler!(sthu, 2, UPDATE);
store_handler!(sthux, 2, UPDATE | INDEXED);
store_handler!(sthx, 2, ZERO_RA | INDEXED);
store_handler!(sthbrx, 2, ZERO_RA | BYTE_REVERSE | INDEXED);
store_handler!(stw, 4, ZERO_RA);
store_handler!(stwu, 4, UPDATE);
store_handler!(stwux, 4, UPDATE | INDEXED);
store_handler!(stwx, 4, ZERO_RA | INDEXED);
store_handler!(stwbrx, 4, ZERO_RA | BYTE_REVERSE | INDEXED);
store_handler!(stwcx, 4, ZERO_RA | RESERVE | INDEXED);

fn float_ea(core: &Core, instr: Instruction, indexed: bool, zero_ra: bool) -> u32 {
    let ra = instr.ra();
    let base = if zero_ra && ra == 0 { 0 } else { core.gpr[ra] };

    if indexed {
        base.wrapping_add(core.gpr[instr.rb()])
    } else {
        base.wrapping_add(instr.d() as u32)
    }
}

fn load_float_single(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
    update: bool,
) -> Result<(), Fault> {
    let ea = float_ea(core, instr, indexed, !update);
    let bits = ctx.mem.read_be32(ea).map_err(|_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: false,
    })?;

    // A single-precision load replicates into both paired lanes
    let value = single_bits_to_double(bits);
    core.fpr[instr.frd()].ps0 = value;
    core.fpr[instr.frd()].ps1 = value;

    if update {
        core.gpr[instr.ra()] = ea;
    }
    Ok(())
}

fn load_float_double(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
    update: bool,
) -> Result<(), Fault> {
    let ea = float_ea(core, instr, indexed, !update);
    let bits = ctx.mem.read_be64(ea).map_err(|_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: false,
    })?;

    // lfd leaves the second paired lane alone
    core.fpr[instr.frd()].set_ps0_bits(bits);

    if update {
        core.gpr[instr.ra()] = ea;
    }
    Ok(())
}

fn store_float_single(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
    update: bool,
) -> Result<(), Fault> {
    let ea = float_ea(core, instr, indexed, !update);
    let bits = double_to_single_bits(core.fpr[instr.frs()].ps0);

    ctx.mem.write_be32(ea, bits).map_err(|_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: true,
    })?;

    if update {
        core.gpr[instr.ra()] = ea;
    }
    Ok(())
}

fn store_float_double(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
    update: bool,
) -> Result<(), Fault> {
    let ea = float_ea(core, instr, indexed, !update);
    let bits = core.fpr[instr.frs()].ps0_bits();

    ctx.mem.write_be64(ea, bits).map_err(|_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: true,
    })?;

    if update {
        core.gpr[instr.ra()] = ea;
    }
    Ok(())
}

macro_rules! float_handler {
    ($name:ident, $inner:ident, $indexed:literal, $update:literal) => {
        fn $name(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            $inner(core, ctx, instr, $indexed, $update)
        }
    };
}

float_handler!(lfs, load_float_single, false, false);
float_handler!(lfsu, load_float_single, false, true);
float_handler!(lfsx, load_float_single, true, false);
float_handler!(lfsux, load_float_single, true, true);
float_handler!(lfd, load_float_double, false, false);
float_handler!(lfdu, load_float_double, false, true);
float_handler!(lfdx, load_float_double, true, false);
float_handler!(lfdux, load_float_double, true, true);
float_handler!(stfs, store_float_single, false, false);
float_handler!(stfsu, store_float_single, false, true);
float_handler!(stfsx, store_float_single, true, false);
float_handler!(stfsux, store_float_single, true, true);
float_handler!(stfd, store_float_double, false, false);
float_handler!(stfdu, store_float_double, false, true);
float_handler!(stfdx, store_float_double, true, false);
float_handler!(stfdux, store_float_double, true, true);

fn stfiwx(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let ea = float_ea(core, instr, true, true);
    let value = core.fpr[instr.frs()].ps0_low_word();

    ctx.mem.write_be32(ea, value).map_err(|_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: true,
    })
}

// Load Multiple Words: fills registers from rD to r31 with consecutive
// words from memory
fn lmw(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let base = if instr.ra() == 0 {
        0
    } else {
        core.gpr[instr.ra()]
    };
    let mut ea = base.wrapping_add(instr.d() as u32);

    for r in instr.rd()..32 {
        core.gpr[r] = ctx.mem.read_be32(ea).map_err(|_| Fault::DataAccess {
            addr: core.cia,
            ea,
            write: false,
        })?;
        ea = ea.wrapping_add(4);
    }
    Ok(())
}

// Store Multiple Words: writes consecutive words to memory from rS to r31
fn stmw(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let base = if instr.ra() == 0 {
        0
    } else {
        core.gpr[instr.ra()]
    };
    let mut ea = base.wrapping_add(instr.d() as u32);

    for r in instr.rs()..32 {
        ctx.mem
            .write_be32(ea, core.gpr[r])
            .map_err(|_| Fault::DataAccess {
                addr: core.cia,
                ea,
                write: true,
            })?;
        ea = ea.wrapping_add(4);
    }
    Ok(())
}

// Load String Word: byte-by-byte version of lmw, wrapping from r31 to r0
fn lsw_generic(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
) -> Result<(), Fault> {
    let mut ea = if instr.ra() == 0 {
        0
    } else {
        core.gpr[instr.ra()]
    };

    let mut n = if indexed {
        ea = ea.wrapping_add(core.gpr[instr.rb()]);
        core.xer.byte_count()
    } else if instr.nb() != 0 {
        instr.nb()
    } else {
        32
    };

    let mut r = instr.rd().wrapping_sub(1);
    let mut i = 0u32;

    while n > 0 {
        if i == 0 {
            r = (r + 1) % 32;
            core.gpr[r] = 0;
        }

        let byte = ctx.mem.read_be8(ea).map_err(|_| Fault::DataAccess {
            addr: core.cia,
            ea,
            write: false,
        })?;
        core.gpr[r] |= (byte as u32) << (24 - i);

        i = (i + 8) % 32;
        ea = ea.wrapping_add(1);
        n -= 1;
    }
    Ok(())
}

fn lswi(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    lsw_generic(core, ctx, instr, false)
}

fn lswx(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    lsw_generic(core, ctx, instr, true)
}

fn stsw_generic(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
) -> Result<(), Fault> {
    let mut ea = if instr.ra() == 0 {
        0
    } else {
        core.gpr[instr.ra()]
    };

    let mut n = if indexed {
        ea = ea.wrapping_add(core.gpr[instr.rb()]);
        core.xer.byte_count()
    } else if instr.nb() != 0 {
        instr.nb()
    } else {
        32
    };

    let mut r = instr.rs().wrapping_sub(1);
    let mut i = 0u32;

    while n > 0 {
        if i == 0 {
            r = (r + 1) % 32;
        }

        let byte = (core.gpr[r] >> (24 - i)) as u8;
        ctx.mem.write_be8(ea, byte).map_err(|_| Fault::DataAccess {
            addr: core.cia,
            ea,
            write: true,
        })?;

        i = (i + 8) % 32;
        ea = ea.wrapping_add(1);
        n -= 1;
    }
    Ok(())
}

fn stswi(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    stsw_generic(core, ctx, instr, false)
}

fn stswx(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    stsw_generic(core, ctx, instr, true)
}

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(Lbz, lbz);
    interp.register(Lbzu, lbzu);
    interp.register(Lbzux, lbzux);
    interp.register(Lbzx, lbzx);
    interp.register(Lha, lha);
    interp.register(Lhau, lhau);
    interp.register(Lhaux, lhaux);
    interp.register(Lhax, lhax);
    interp.register(Lhbrx, lhbrx);
    interp.register(Lhz, lhz);
    interp.register(Lhzu, lhzu);
    interp.register(Lhzux, lhzux);
    interp.register(Lhzx, lhzx);
    interp.register(Lmw, lmw);
    interp.register(Lswi, lswi);
    interp.register(Lswx, lswx);
    interp.register(Lwarx, lwarx);
    interp.register(Lwbrx, lwbrx);
    interp.register(Lwz, lwz);
    interp.register(Lwzu, lwzu);
    interp.register(Lwzux, lwzux);
    interp.register(Lwzx, lwzx);
    interp.register(Stb, stb);
    interp.register(Stbu, stbu);
    interp.register(Stbux, stbux);
    interp.register(Stbx, stbx);
    interp.register(Sth, sth);
    interp.register(Sthbrx, sthbrx);
    interp.register(Sthu, sthu);
    interp.register(Sthux, sthux);
    interp.register(Sthx, sthx);
    interp.register(Stmw, stmw);
    interp.register(Stswi, stswi);
    interp.register(Stswx, stswx);
    interp.register(Stw, stw);
    interp.register(Stwbrx, stwbrx);
    interp.register(Stwcx, stwcx);
    interp.register(Stwu, stwu);
    interp.register(Stwux, stwux);
    interp.register(Stwx, stwx);
    interp.register(Lfd, lfd);
    interp.register(Lfdu, lfdu);
    interp.register(Lfdux, lfdux);
    interp.register(Lfdx, lfdx);
    interp.register(Lfs, lfs);
    interp.register(Lfsu, lfsu);
    interp.register(Lfsux, lfsux);
    interp.register(Lfsx, lfsx);
    interp.register(Stfd, stfd);
    interp.register(Stfdu, stfdu);
    interp.register(Stfdux, stfdux);
    interp.register(Stfdx, stfdx);
    interp.register(Stfiwx, stfiwx);
    interp.register(Stfs, stfs);
    interp.register(Stfsu, stfsu);
    interp.register(Stfsux, stfsux);
    interp.register(Stfsx, stfsx);
}

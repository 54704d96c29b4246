//! System, processor-control and cache-management handlers

use oe_espresso::registers::{Gqr, Msr, Spr, Xer};
use oe_espresso::{Instruction, InstructionId};

use crate::core::{Core, PVR_ESPRESSO};
use crate::fault::Fault;
use crate::machine::ExecContext;

use super::Interpreter;

fn sc(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let _ = instr;
    // The system call id rides in r0
    let handler = ctx.system_calls.get(core.gpr[0]);
    handler(core, ctx);
    Ok(())
}

fn kc(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let id = instr.kcn();

    let entry = ctx
        .kernel_calls
        .get(id)
        .ok_or(Fault::InvalidKernelCall { addr: core.cia, id })?;

    (entry.func)(core, ctx);
    Ok(())
}

fn rfi(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let _ = instr;
    core.msr = Msr(core.srr1);
    core.nia = core.srr0 & !3;
    Ok(())
}

fn mfmsr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.gpr[instr.rd()] = core.msr.0;
    Ok(())
}

fn mtmsr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.msr = Msr(core.gpr[instr.rs()]);
    Ok(())
}

fn mfspr(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let index = instr.spr();

    let value = match Spr::from_index(index) {
        Some(Spr::Xer) => core.xer.0,
        Some(Spr::Lr) => core.lr,
        Some(Spr::Ctr) => core.ctr,
        Some(Spr::Dsisr) => core.dsisr,
        Some(Spr::Dar) => core.dar,
        Some(Spr::Dec) => core.dec,
        Some(Spr::Srr0) => core.srr0,
        Some(Spr::Srr1) => core.srr1,
        Some(Spr::Sprg0) => core.sprg[0],
        Some(Spr::Sprg1) => core.sprg[1],
        Some(Spr::Sprg2) => core.sprg[2],
        Some(Spr::Sprg3) => core.sprg[3],
        Some(Spr::Pvr) => PVR_ESPRESSO,
        Some(Spr::Gqr0) => core.gqr[0].0,
        Some(Spr::Gqr1) => core.gqr[1].0,
        Some(Spr::Gqr2) => core.gqr[2].0,
        Some(Spr::Gqr3) => core.gqr[3].0,
        Some(Spr::Gqr4) => core.gqr[4].0,
        Some(Spr::Gqr5) => core.gqr[5].0,
        Some(Spr::Gqr6) => core.gqr[6].0,
        Some(Spr::Gqr7) => core.gqr[7].0,
        Some(Spr::Hid0) => core.hid0,
        Some(Spr::Hid2) => core.hid2,
        Some(Spr::Tbl) => ctx.time_base.read() as u32,
        Some(Spr::Tbu) => (ctx.time_base.read() >> 32) as u32,
        None => {
            tracing::warn!(
                "Unimplemented mfspr {} at 0x{:08x}",
                index,
                core.cia
            );
            0
        }
    };

    core.gpr[instr.rd()] = value;
    Ok(())
}

fn mtspr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let index = instr.spr();
    let value = core.gpr[instr.rs()];

    match Spr::from_index(index) {
        Some(Spr::Xer) => core.xer = Xer(value),
        Some(Spr::Lr) => core.lr = value,
        Some(Spr::Ctr) => core.ctr = value,
        Some(Spr::Dsisr) => core.dsisr = value,
        Some(Spr::Dar) => core.dar = value,
        Some(Spr::Dec) => core.dec = value,
        Some(Spr::Srr0) => core.srr0 = value,
        Some(Spr::Srr1) => core.srr1 = value,
        Some(Spr::Sprg0) => core.sprg[0] = value,
        Some(Spr::Sprg1) => core.sprg[1] = value,
        Some(Spr::Sprg2) => core.sprg[2] = value,
        Some(Spr::Sprg3) => core.sprg[3] = value,
        Some(Spr::Gqr0) => core.gqr[0] = Gqr(value),
        Some(Spr::Gqr1) => core.gqr[1] = Gqr(value),
        Some(Spr::Gqr2) => core.gqr[2] = Gqr(value),
        Some(Spr::Gqr3) => core.gqr[3] = Gqr(value),
        Some(Spr::Gqr4) => core.gqr[4] = Gqr(value),
        Some(Spr::Gqr5) => core.gqr[5] = Gqr(value),
        Some(Spr::Gqr6) => core.gqr[6] = Gqr(value),
        Some(Spr::Gqr7) => core.gqr[7] = Gqr(value),
        Some(Spr::Hid0) => core.hid0 = value,
        Some(Spr::Hid2) => core.hid2 = value,
        Some(Spr::Pvr) | Some(Spr::Tbl) | Some(Spr::Tbu) | None => {
            tracing::warn!(
                "Unimplemented mtspr {} at 0x{:08x}",
                index,
                core.cia
            );
        }
    }

    Ok(())
}

fn mftb(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let tb = ctx.time_base.read();

    // TBR numbering uses the same split-field encoding as SPRs
    let value = match instr.spr() {
        268 => tb as u32,
        269 => (tb >> 32) as u32,
        other => {
            tracing::warn!("Unimplemented mftb {} at 0x{:08x}", other, core.cia);
            0
        }
    };

    core.gpr[instr.rd()] = value;
    Ok(())
}

fn trap_condition(to: u32, a: u32, b: u32) -> bool {
    let (sa, sb) = (a as i32, b as i32);

    (sa < sb && to & 0x10 != 0)
        || (sa > sb && to & 0x08 != 0)
        || (a == b && to & 0x04 != 0)
        || (a < b && to & 0x02 != 0)
        || (a > b && to & 0x01 != 0)
}

fn tw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()];
    let b = core.gpr[instr.rb()];

    if trap_condition(instr.to(), a, b) {
        return Err(Fault::Trap { addr: core.cia });
    }
    Ok(())
}

fn twi(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.gpr[instr.ra()];
    let b = instr.simm() as u32;

    if trap_condition(instr.to(), a, b) {
        return Err(Fault::Trap { addr: core.cia });
    }
    Ok(())
}

// Memory synchronisation: host atomics already order our accesses, so
// the barriers only need to exist as decode points
fn sync(_core: &mut Core, _ctx: &ExecContext, _instr: Instruction) -> Result<(), Fault> {
    std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    Ok(())
}

fn isync(_core: &mut Core, _ctx: &ExecContext, _instr: Instruction) -> Result<(), Fault> {
    Ok(())
}

fn eieio(_core: &mut Core, _ctx: &ExecContext, _instr: Instruction) -> Result<(), Fault> {
    std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    Ok(())
}

fn cache_ea(core: &Core, instr: Instruction) -> u32 {
    let base = if instr.ra() == 0 {
        0
    } else {
        core.gpr[instr.ra()]
    };
    base.wrapping_add(core.gpr[instr.rb()])
}

fn cache_noop(_core: &mut Core, _ctx: &ExecContext, _instr: Instruction) -> Result<(), Fault> {
    Ok(())
}

fn dcbz(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let ea = cache_ea(core, instr);
    ctx.mem.zero_cache_line(ea).map_err(|_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: true,
    })
}

fn icbi(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let ea = cache_ea(core, instr);

    // Invalidate any translated block covering this line; this is the
    // guest's contract for making freshly written code visible
    if let Some(cache) = ctx.jit_cache {
        cache.invalidate(ea & !31, 32);
    }
    Ok(())
}

fn mfsr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.gpr[instr.rd()] = core.sr[instr.sr() as usize];
    Ok(())
}

fn mtsr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.sr[instr.sr() as usize] = core.gpr[instr.rd()];
    Ok(())
}

fn mfsrin(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let index = (core.gpr[instr.rb()] >> 28) as usize;
    core.gpr[instr.rd()] = core.sr[index];
    Ok(())
}

fn mtsrin(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let index = (core.gpr[instr.rb()] >> 28) as usize;
    core.sr[index] = core.gpr[instr.rd()];
    Ok(())
}

fn tlb_noop(_core: &mut Core, _ctx: &ExecContext, _instr: Instruction) -> Result<(), Fault> {
    Ok(())
}

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(Sc, sc);
    interp.register(Kc, kc);
    interp.register(Rfi, rfi);
    interp.register(Mfmsr, mfmsr);
    interp.register(Mtmsr, mtmsr);
    interp.register(Mfspr, mfspr);
    interp.register(Mtspr, mtspr);
    interp.register(Mftb, mftb);
    interp.register(Tw, tw);
    interp.register(Twi, twi);
    interp.register(Sync, sync);
    interp.register(Isync, isync);
    interp.register(Eieio, eieio);
    interp.register(Dcbf, cache_noop);
    interp.register(Dcbi, cache_noop);
    interp.register(Dcbst, cache_noop);
    interp.register(Dcbt, cache_noop);
    interp.register(Dcbtst, cache_noop);
    interp.register(Dcbz, dcbz);
    interp.register(DcbzL, dcbz);
    interp.register(Icbi, icbi);
    interp.register(Mfsr, mfsr);
    interp.register(Mtsr, mtsr);
    interp.register(Mfsrin, mfsrin);
    interp.register(Mtsrin, mtsrin);
    interp.register(Tlbie, tlb_noop);
    interp.register(Tlbsync, tlb_noop);
    // eciwx/ecowx intentionally have no handler; executing one surfaces
    // an unimplemented-instruction fault
}

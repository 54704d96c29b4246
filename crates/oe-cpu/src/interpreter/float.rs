//! Floating-point handlers.
//!
//! Scalar arithmetic operates on the ps0 lane in double precision.
//! FPSCR updates follow the hardware rules for the sticky invalid
//! operation bits, FPRF classification and the FX/FEX/VX summaries.

use oe_espresso::registers::{Fpscr, FpscrFlags, RoundMode};
use oe_espresso::{Instruction, InstructionId};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;

use super::Interpreter;

/// Widen single-precision bits to a double, preserving a signalling
/// NaN's payload without quieting it
pub(crate) fn single_bits_to_double(bits: u32) -> f64 {
    let exp = (bits >> 23) & 0xFF;
    let frac = bits & 0x007F_FFFF;

    if exp == 0xFF && frac != 0 && frac & 0x0040_0000 == 0 {
        let wide = ((bits as u64 & 0x8000_0000) << 32)
            | (0x7FFu64 << 52)
            | ((frac as u64) << 29);
        f64::from_bits(wide)
    } else {
        f32::from_bits(bits) as f64
    }
}

/// Narrow a double to single-precision bits the way the store unit
/// does: plain truncation for normal singles, a shifted-fraction
/// encoding for the denormal range
pub(crate) fn double_to_single_bits(d: f64) -> u32 {
    let bits = d.to_bits();
    let exp = ((bits >> 52) & 0x7FF) as i64;

    if exp > 896 || bits << 1 == 0 {
        ((bits >> 32) as u32 & 0xC000_0000) | ((bits >> 29) as u32 & 0x3FFF_FFFF)
    } else {
        let sign = (bits >> 63) as u32;
        let mantissa = bits & 0x000F_FFFF_FFFF_FFFF;
        let frac = ((1u64 << 23) | (mantissa >> 29)) >> (897 - exp);
        frac as u32 | (sign << 31)
    }
}

fn is_signalling_nan(d: f64) -> bool {
    let bits = d.to_bits();
    let exp = (bits >> 52) & 0x7FF;
    let frac = bits & 0x000F_FFFF_FFFF_FFFF;
    exp == 0x7FF && frac != 0 && frac & 0x0008_0000_0000_0000 == 0
}

/// FPRF classification of a double result
pub(crate) fn classify_fprf(d: f64) -> u32 {
    use std::num::FpCategory;

    match (d.classify(), d.is_sign_negative()) {
        (FpCategory::Nan, _) => 0b10001,
        (FpCategory::Infinite, true) => 0b01001,
        (FpCategory::Infinite, false) => 0b00101,
        (FpCategory::Zero, true) => 0b10010,
        (FpCategory::Zero, false) => 0b00010,
        (FpCategory::Subnormal, true) => 0b11000,
        (FpCategory::Subnormal, false) => 0b10100,
        (FpCategory::Normal, true) => 0b01000,
        (FpCategory::Normal, false) => 0b00100,
    }
}

/// cr1 receives the FX/FEX/VX/OX nibble for record-form FP instructions
pub(crate) fn record_cr1(core: &mut Core) {
    core.cr.set_field(1, core.fpscr.0 >> 28);
}

fn update_result_fprf(core: &mut Core, result: f64) {
    core.fpscr.set_fprf(classify_fprf(result));
}

/// Latch sticky invalid-operation bits for the given operands and
/// operation shape
#[derive(Clone, Copy, PartialEq)]
enum ArithKind {
    Add,
    Sub,
    Mul,
    Div,
}

fn update_invalid_bits(core: &mut Core, kind: ArithKind, a: f64, b: f64) {
    if is_signalling_nan(a) || is_signalling_nan(b) {
        core.fpscr.insert(FpscrFlags::VXSNAN);
    }

    match kind {
        ArithKind::Add | ArithKind::Sub => {
            if a.is_infinite() && b.is_infinite() {
                let effective_sub = (kind == ArithKind::Sub) ^ (a.is_sign_negative() != b.is_sign_negative());
                if effective_sub {
                    core.fpscr.insert(FpscrFlags::VXISI);
                }
            }
        }
        ArithKind::Mul => {
            if (a.is_infinite() && b == 0.0) || (a == 0.0 && b.is_infinite()) {
                core.fpscr.insert(FpscrFlags::VXIMZ);
            }
        }
        ArithKind::Div => {
            if a.is_infinite() && b.is_infinite() {
                core.fpscr.insert(FpscrFlags::VXIDI);
            }
            if a == 0.0 && b == 0.0 {
                core.fpscr.insert(FpscrFlags::VXZDZ);
            }
            if b == 0.0 && a != 0.0 && !a.is_nan() {
                core.fpscr.insert(FpscrFlags::ZX);
            }
        }
    }
}

fn arith_generic(
    core: &mut Core,
    instr: Instruction,
    kind: ArithKind,
    single: bool,
    use_frc: bool,
) {
    let old = core.fpscr;
    let a = core.fpr[instr.fra()].ps0;
    let b = if use_frc {
        core.fpr[instr.frc()].ps0
    } else {
        core.fpr[instr.frb()].ps0
    };

    update_invalid_bits(core, kind, a, b);

    let mut d = match kind {
        ArithKind::Add => a + b,
        ArithKind::Sub => a - b,
        ArithKind::Mul => a * b,
        ArithKind::Div => a / b,
    };

    if single {
        d = d as f32 as f64;
    }

    core.fpr[instr.frd()].ps0 = d;
    if single {
        core.fpr[instr.frd()].ps1 = d;
    }

    update_result_fprf(core, d);
    core.fpscr.update_fx_fex_vx(old);

    if instr.rc() {
        record_cr1(core);
    }
}

macro_rules! arith_handler {
    ($name:ident, $kind:ident, $single:literal, $use_frc:literal) => {
        fn $name(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            arith_generic(core, instr, ArithKind::$kind, $single, $use_frc);
            Ok(())
        }
    };
}

arith_handler!(fadd, Add, false, false);
arith_handler!(fadds, Add, true, false);
arith_handler!(fsub, Sub, false, false);
arith_handler!(fsubs, Sub, true, false);
arith_handler!(fmul, Mul, false, true);
arith_handler!(fmuls, Mul, true, true);
arith_handler!(fdiv, Div, false, false);
arith_handler!(fdivs, Div, true, false);

fn madd_generic(core: &mut Core, instr: Instruction, negate: bool, sub: bool, single: bool) {
    let old = core.fpscr;
    let a = core.fpr[instr.fra()].ps0;
    let b = core.fpr[instr.frb()].ps0;
    let c = core.fpr[instr.frc()].ps0;

    update_invalid_bits(core, ArithKind::Mul, a, c);

    let addend = if sub { -b } else { b };
    let mut d = a.mul_add(c, addend);

    if negate {
        d = -d;
    }

    if single {
        d = d as f32 as f64;
    }

    core.fpr[instr.frd()].ps0 = d;
    if single {
        core.fpr[instr.frd()].ps1 = d;
    }

    update_result_fprf(core, d);
    core.fpscr.update_fx_fex_vx(old);

    if instr.rc() {
        record_cr1(core);
    }
}

macro_rules! madd_handler {
    ($name:ident, $negate:literal, $sub:literal, $single:literal) => {
        fn $name(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            madd_generic(core, instr, $negate, $sub, $single);
            Ok(())
        }
    };
}

madd_handler!(fmadd, false, false, false);
madd_handler!(fmadds, false, false, true);
madd_handler!(fmsub, false, true, false);
madd_handler!(fmsubs, false, true, true);
madd_handler!(fnmadd, true, false, false);
madd_handler!(fnmadds, true, false, true);
madd_handler!(fnmsub, true, true, false);
madd_handler!(fnmsubs, true, true, true);

fn fres(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let old = core.fpscr;
    let b = core.fpr[instr.frb()].ps0;

    if is_signalling_nan(b) {
        core.fpscr.insert(FpscrFlags::VXSNAN);
    }
    if b == 0.0 {
        core.fpscr.insert(FpscrFlags::ZX);
    }

    let d = (1.0 / b) as f32 as f64;
    core.fpr[instr.frd()].ps0 = d;
    core.fpr[instr.frd()].ps1 = d;

    update_result_fprf(core, d);
    core.fpscr.update_fx_fex_vx(old);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn frsqrte(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let old = core.fpscr;
    let b = core.fpr[instr.frb()].ps0;

    if is_signalling_nan(b) {
        core.fpscr.insert(FpscrFlags::VXSNAN);
    }
    if b < 0.0 {
        core.fpscr.insert(FpscrFlags::VXSQRT);
    }
    if b == 0.0 {
        core.fpscr.insert(FpscrFlags::ZX);
    }

    let d = 1.0 / b.sqrt();
    core.fpr[instr.frd()].ps0 = d;

    update_result_fprf(core, d);
    core.fpscr.update_fx_fex_vx(old);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn fsel(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()].ps0;
    let d = if a >= 0.0 {
        core.fpr[instr.frc()].ps0
    } else {
        core.fpr[instr.frb()].ps0
    };

    core.fpr[instr.frd()].ps0 = d;

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn frsp(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let old = core.fpscr;
    let b = core.fpr[instr.frb()].ps0;

    if is_signalling_nan(b) {
        core.fpscr.insert(FpscrFlags::VXSNAN);
    }

    let d = b as f32 as f64;
    core.fpr[instr.frd()].ps0 = d;
    core.fpr[instr.frd()].ps1 = d;

    core.fpscr.set_fi(d != b);
    update_result_fprf(core, d);
    core.fpscr.update_fx_fex_vx(old);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn fctiw_generic(core: &mut Core, instr: Instruction, round_to_zero: bool) {
    let old = core.fpscr;
    let b = core.fpr[instr.frb()].ps0;

    let value = if round_to_zero {
        b.trunc()
    } else {
        match core.fpscr.rn() {
            RoundMode::Nearest => b.round_ties_even(),
            RoundMode::Zero => b.trunc(),
            RoundMode::Positive => b.ceil(),
            RoundMode::Negative => b.floor(),
        }
    };

    let result = if b.is_nan() {
        core.fpscr.insert(FpscrFlags::VXCVI);
        if is_signalling_nan(b) {
            core.fpscr.insert(FpscrFlags::VXSNAN);
        }
        i32::MIN
    } else if value > i32::MAX as f64 {
        core.fpscr.insert(FpscrFlags::VXCVI);
        i32::MAX
    } else if value < i32::MIN as f64 {
        core.fpscr.insert(FpscrFlags::VXCVI);
        i32::MIN
    } else {
        core.fpscr.set_fi(value != b);
        value as i32
    };

    core.fpr[instr.frd()]
        .set_ps0_bits(0xFFF8_0000_0000_0000 | (result as u32 as u64));

    core.fpscr.update_fx_fex_vx(old);

    if instr.rc() {
        record_cr1(core);
    }
}

fn fctiw(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fctiw_generic(core, instr, false);
    Ok(())
}

fn fctiwz(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fctiw_generic(core, instr, true);
    Ok(())
}

// Floating compare, shared with the paired-single compare handlers
pub(crate) fn fcmp_generic(core: &mut Core, instr: Instruction, ordered: bool, ps1: bool) {
    use oe_espresso::registers::ConditionRegisterFlag as Crf;

    let old = core.fpscr;
    let (a, b) = if ps1 {
        (core.fpr[instr.fra()].ps1, core.fpr[instr.frb()].ps1)
    } else {
        (core.fpr[instr.fra()].ps0, core.fpr[instr.frb()].ps0)
    };

    let c = if a.is_nan() || b.is_nan() {
        let snan = is_signalling_nan(a) || is_signalling_nan(b);
        if snan {
            core.fpscr.insert(FpscrFlags::VXSNAN);
        }
        if ordered && !(snan && core.fpscr.ve()) {
            core.fpscr.insert(FpscrFlags::VXVC);
        }
        Crf::UNORDERED
    } else if a < b {
        Crf::LESS_THAN
    } else if a > b {
        Crf::GREATER_THAN
    } else {
        Crf::EQUAL
    };

    core.cr.set_field(instr.crfd(), c.bits());
    core.fpscr.set_fpcc(c.bits());
    core.fpscr.update_fx_fex_vx(old);
}

fn fcmpo(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fcmp_generic(core, instr, true, false);
    Ok(())
}

fn fcmpu(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fcmp_generic(core, instr, false, false);
    Ok(())
}

// Sign-manipulation moves operate on raw bits and leave FPSCR alone
fn fabs_(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let bits = core.fpr[instr.frb()].ps0_bits() & !(1 << 63);
    core.fpr[instr.frd()].set_ps0_bits(bits);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn fnabs(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let bits = core.fpr[instr.frb()].ps0_bits() | (1 << 63);
    core.fpr[instr.frd()].set_ps0_bits(bits);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn fneg(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let bits = core.fpr[instr.frb()].ps0_bits() ^ (1 << 63);
    core.fpr[instr.frd()].set_ps0_bits(bits);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn fmr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.fpr[instr.frd()].ps0 = core.fpr[instr.frb()].ps0;

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn mffs(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.fpr[instr.frd()]
        .set_ps0_bits(0xFFF8_0000_0000_0000 | core.fpscr.0 as u64);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn mtfsf(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let fm = instr.fm();
    let bits = core.fpr[instr.frb()].ps0_bits() as u32;

    let mut mask = 0u32;
    for i in 0..8 {
        if fm & (1 << i) != 0 {
            mask |= 0xF << (i * 4);
        }
    }

    core.fpscr = Fpscr((core.fpscr.0 & !mask) | (bits & mask));
    core.fpscr.update_fex_vx();

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn mtfsb0(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.fpscr.0 &= !(1 << (31 - instr.crbd()));
    core.fpscr.update_fex_vx();

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn mtfsb1(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.fpscr.0 |= 1 << (31 - instr.crbd());
    core.fpscr.update_fex_vx();

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn mtfsfi(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let shift = 4 * (7 - instr.crfd() as u32);
    core.fpscr = Fpscr((core.fpscr.0 & !(0xF << shift)) | (instr.imm() << shift));
    core.fpscr.update_fex_vx();

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(Fabs, fabs_);
    interp.register(Fadd, fadd);
    interp.register(Fadds, fadds);
    interp.register(Fcmpo, fcmpo);
    interp.register(Fcmpu, fcmpu);
    interp.register(Fctiw, fctiw);
    interp.register(Fctiwz, fctiwz);
    interp.register(Fdiv, fdiv);
    interp.register(Fdivs, fdivs);
    interp.register(Fmadd, fmadd);
    interp.register(Fmadds, fmadds);
    interp.register(Fmr, fmr);
    interp.register(Fmsub, fmsub);
    interp.register(Fmsubs, fmsubs);
    interp.register(Fmul, fmul);
    interp.register(Fmuls, fmuls);
    interp.register(Fnabs, fnabs);
    interp.register(Fneg, fneg);
    interp.register(Fnmadd, fnmadd);
    interp.register(Fnmadds, fnmadds);
    interp.register(Fnmsub, fnmsub);
    interp.register(Fnmsubs, fnmsubs);
    interp.register(Fres, fres);
    interp.register(Frsp, frsp);
    interp.register(Frsqrte, frsqrte);
    interp.register(Fsel, fsel);
    interp.register(Fsub, fsub);
    interp.register(Fsubs, fsubs);
    interp.register(Mffs, mffs);
    interp.register(Mtfsb0, mtfsb0);
    interp.register(Mtfsb1, mtfsb1);
    interp.register(Mtfsf, mtfsf);
    interp.register(Mtfsfi, mtfsfi);
}

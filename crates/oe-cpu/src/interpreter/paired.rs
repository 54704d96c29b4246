//! Paired-single handlers.
//!
//! Arithmetic operates on both 64-bit lanes with single-precision
//! rounding; quantised loads and stores convert through the format and
//! scale selected by a graphics quantisation register.

use oe_espresso::registers::QuantizedDataType;
use oe_espresso::{Instruction, InstructionId};

use crate::core::Core;
use crate::fault::Fault;
use crate::machine::ExecContext;

use super::float::{double_to_single_bits, fcmp_generic, record_cr1, single_bits_to_double};
use super::Interpreter;

fn round_lane(d: f64) -> f64 {
    d as f32 as f64
}

fn ps_binary(
    core: &mut Core,
    instr: Instruction,
    use_frc: bool,
    op: impl Fn(f64, f64) -> f64,
) {
    let a = core.fpr[instr.fra()];
    let b = if use_frc {
        core.fpr[instr.frc()]
    } else {
        core.fpr[instr.frb()]
    };

    let d = &mut core.fpr[instr.frd()];
    d.ps0 = round_lane(op(a.ps0, b.ps0));
    d.ps1 = round_lane(op(a.ps1, b.ps1));

    if instr.rc() {
        record_cr1(core);
    }
}

fn ps_add(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_binary(core, instr, false, |a, b| a + b);
    Ok(())
}

fn ps_sub(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_binary(core, instr, false, |a, b| a - b);
    Ok(())
}

fn ps_mul(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_binary(core, instr, true, |a, b| a * b);
    Ok(())
}

fn ps_div(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_binary(core, instr, false, |a, b| a / b);
    Ok(())
}

fn ps_madd_generic(core: &mut Core, instr: Instruction, negate: bool, sub: bool) {
    let a = core.fpr[instr.fra()];
    let b = core.fpr[instr.frb()];
    let c = core.fpr[instr.frc()];

    let mut lane = |a: f64, c: f64, b: f64| {
        let addend = if sub { -b } else { b };
        let mut d = a.mul_add(c, addend);
        if negate {
            d = -d;
        }
        round_lane(d)
    };

    let ps0 = lane(a.ps0, c.ps0, b.ps0);
    let ps1 = lane(a.ps1, c.ps1, b.ps1);

    core.fpr[instr.frd()].ps0 = ps0;
    core.fpr[instr.frd()].ps1 = ps1;

    if instr.rc() {
        record_cr1(core);
    }
}

fn ps_madd(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_madd_generic(core, instr, false, false);
    Ok(())
}

fn ps_msub(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_madd_generic(core, instr, false, true);
    Ok(())
}

fn ps_nmadd(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_madd_generic(core, instr, true, false);
    Ok(())
}

fn ps_nmsub(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    ps_madd_generic(core, instr, true, true);
    Ok(())
}

fn ps_madds0(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()];
    let b = core.fpr[instr.frb()];
    let c = core.fpr[instr.frc()].ps0;

    core.fpr[instr.frd()].ps0 = round_lane(a.ps0.mul_add(c, b.ps0));
    core.fpr[instr.frd()].ps1 = round_lane(a.ps1.mul_add(c, b.ps1));

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_madds1(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()];
    let b = core.fpr[instr.frb()];
    let c = core.fpr[instr.frc()].ps1;

    core.fpr[instr.frd()].ps0 = round_lane(a.ps0.mul_add(c, b.ps0));
    core.fpr[instr.frd()].ps1 = round_lane(a.ps1.mul_add(c, b.ps1));

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_muls0(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()];
    let c = core.fpr[instr.frc()].ps0;

    core.fpr[instr.frd()].ps0 = round_lane(a.ps0 * c);
    core.fpr[instr.frd()].ps1 = round_lane(a.ps1 * c);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_muls1(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()];
    let c = core.fpr[instr.frc()].ps1;

    core.fpr[instr.frd()].ps0 = round_lane(a.ps0 * c);
    core.fpr[instr.frd()].ps1 = round_lane(a.ps1 * c);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_sum0(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()].ps0;
    let b = core.fpr[instr.frb()].ps1;
    let c = core.fpr[instr.frc()].ps1;

    core.fpr[instr.frd()].ps0 = round_lane(a + b);
    core.fpr[instr.frd()].ps1 = round_lane(c);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_sum1(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()].ps0;
    let b = core.fpr[instr.frb()].ps1;
    let c = core.fpr[instr.frc()].ps0;

    core.fpr[instr.frd()].ps0 = round_lane(c);
    core.fpr[instr.frd()].ps1 = round_lane(a + b);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_sel(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let a = core.fpr[instr.fra()];
    let b = core.fpr[instr.frb()];
    let c = core.fpr[instr.frc()];

    core.fpr[instr.frd()].ps0 = if a.ps0 >= 0.0 { c.ps0 } else { b.ps0 };
    core.fpr[instr.frd()].ps1 = if a.ps1 >= 0.0 { c.ps1 } else { b.ps1 };

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_res(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let b = core.fpr[instr.frb()];

    core.fpr[instr.frd()].ps0 = round_lane(1.0 / b.ps0);
    core.fpr[instr.frd()].ps1 = round_lane(1.0 / b.ps1);

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_rsqrte(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let b = core.fpr[instr.frb()];

    core.fpr[instr.frd()].ps0 = round_lane(1.0 / b.ps0.sqrt());
    core.fpr[instr.frd()].ps1 = round_lane(1.0 / b.ps1.sqrt());

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_mr(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    core.fpr[instr.frd()] = core.fpr[instr.frb()];

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_neg(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let b = core.fpr[instr.frb()];
    core.fpr[instr.frd()].ps0 = -b.ps0;
    core.fpr[instr.frd()].ps1 = -b.ps1;

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_abs(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let b = core.fpr[instr.frb()];
    core.fpr[instr.frd()].ps0 = b.ps0.abs();
    core.fpr[instr.frd()].ps1 = b.ps1.abs();

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

fn ps_nabs(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    let b = core.fpr[instr.frb()];
    core.fpr[instr.frd()].ps0 = -b.ps0.abs();
    core.fpr[instr.frd()].ps1 = -b.ps1.abs();

    if instr.rc() {
        record_cr1(core);
    }
    Ok(())
}

macro_rules! ps_merge {
    ($name:ident, $lane_a:ident, $lane_b:ident) => {
        fn $name(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            let a = core.fpr[instr.fra()].$lane_a;
            let b = core.fpr[instr.frb()].$lane_b;
            core.fpr[instr.frd()].ps0 = a;
            core.fpr[instr.frd()].ps1 = b;

            if instr.rc() {
                record_cr1(core);
            }
            Ok(())
        }
    };
}

ps_merge!(ps_merge00, ps0, ps0);
ps_merge!(ps_merge01, ps0, ps1);
ps_merge!(ps_merge10, ps1, ps0);
ps_merge!(ps_merge11, ps1, ps1);

fn ps_cmpu0(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fcmp_generic(core, instr, false, false);
    Ok(())
}

fn ps_cmpo0(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fcmp_generic(core, instr, true, false);
    Ok(())
}

fn ps_cmpu1(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fcmp_generic(core, instr, false, true);
    Ok(())
}

fn ps_cmpo1(core: &mut Core, _ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
    fcmp_generic(core, instr, true, true);
    Ok(())
}

// Quantised conversion

fn scale_exponent(scale: u32) -> i32 {
    let mut exp = scale as i32;
    exp -= (exp & 32) << 1; // Sign extend 6 bits
    exp
}

fn element_size(ty: QuantizedDataType) -> u32 {
    match ty {
        QuantizedDataType::Floating => 4,
        QuantizedDataType::Unsigned8 | QuantizedDataType::Signed8 => 1,
        QuantizedDataType::Unsigned16 | QuantizedDataType::Signed16 => 2,
    }
}

fn dequantize(
    core: &Core,
    ctx: &ExecContext,
    ea: u32,
    ty: QuantizedDataType,
    scale: u32,
) -> Result<f64, Fault> {
    let fault = |_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: false,
    };

    let exp = scale_exponent(scale);
    let factor = 2f64.powi(-exp);

    Ok(match ty {
        QuantizedDataType::Floating => {
            single_bits_to_double(ctx.mem.read_be32(ea).map_err(fault)?)
        }
        QuantizedDataType::Unsigned8 => ctx.mem.read_be8(ea).map_err(fault)? as f64 * factor,
        QuantizedDataType::Unsigned16 => ctx.mem.read_be16(ea).map_err(fault)? as f64 * factor,
        QuantizedDataType::Signed8 => {
            ctx.mem.read_be8(ea).map_err(fault)? as i8 as f64 * factor
        }
        QuantizedDataType::Signed16 => {
            ctx.mem.read_be16(ea).map_err(fault)? as i16 as f64 * factor
        }
    })
}

fn quantize(
    core: &Core,
    ctx: &ExecContext,
    ea: u32,
    value: f64,
    ty: QuantizedDataType,
    scale: u32,
) -> Result<(), Fault> {
    let fault = |_| Fault::DataAccess {
        addr: core.cia,
        ea,
        write: true,
    };

    let exp = scale_exponent(scale);
    let scaled = value * 2f64.powi(exp);

    match ty {
        QuantizedDataType::Floating => {
            let bits = double_to_single_bits(value);
            ctx.mem.write_be32(ea, bits).map_err(fault)?;
        }
        QuantizedDataType::Unsigned8 => {
            let v = if value.is_nan() {
                if value.is_sign_negative() {
                    0
                } else {
                    0xFF
                }
            } else {
                scaled.clamp(0.0, u8::MAX as f64) as u8
            };
            ctx.mem.write_be8(ea, v).map_err(fault)?;
        }
        QuantizedDataType::Unsigned16 => {
            let v = if value.is_nan() {
                if value.is_sign_negative() {
                    0
                } else {
                    0xFFFF
                }
            } else {
                scaled.clamp(0.0, u16::MAX as f64) as u16
            };
            ctx.mem.write_be16(ea, v).map_err(fault)?;
        }
        QuantizedDataType::Signed8 => {
            let v = if value.is_nan() {
                if value.is_sign_negative() {
                    -0x80
                } else {
                    0x7F
                }
            } else {
                scaled.clamp(i8::MIN as f64, i8::MAX as f64) as i8
            };
            ctx.mem.write_be8(ea, v as u8).map_err(fault)?;
        }
        QuantizedDataType::Signed16 => {
            let v = if value.is_nan() {
                if value.is_sign_negative() {
                    -0x8000
                } else {
                    0x7FFF
                }
            } else {
                scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16
            };
            ctx.mem.write_be16(ea, v as u16).map_err(fault)?;
        }
    }

    Ok(())
}

fn psq_load_generic(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
    update: bool,
) -> Result<(), Fault> {
    let ra = instr.ra();
    let base = if !update && ra == 0 { 0 } else { core.gpr[ra] };

    let (ea, single, gqr_index) = if indexed {
        (
            base.wrapping_add(core.gpr[instr.rb()]),
            instr.qw(),
            instr.qi_gqr(),
        )
    } else {
        (base.wrapping_add(instr.qd() as u32), instr.w(), instr.i_gqr())
    };

    let gqr = core.gqr[gqr_index];
    let ty = gqr.ld_type().unwrap_or(QuantizedDataType::Floating);
    let scale = gqr.ld_scale();

    let ps0 = dequantize(core, ctx, ea, ty, scale)?;
    let ps1 = if single {
        1.0
    } else {
        dequantize(core, ctx, ea + element_size(ty), ty, scale)?
    };

    core.fpr[instr.frd()].ps0 = ps0;
    core.fpr[instr.frd()].ps1 = ps1;

    if update {
        core.gpr[ra] = ea;
    }
    Ok(())
}

fn psq_store_generic(
    core: &mut Core,
    ctx: &ExecContext,
    instr: Instruction,
    indexed: bool,
    update: bool,
) -> Result<(), Fault> {
    let ra = instr.ra();
    let base = if !update && ra == 0 { 0 } else { core.gpr[ra] };

    let (ea, single, gqr_index) = if indexed {
        (
            base.wrapping_add(core.gpr[instr.rb()]),
            instr.qw(),
            instr.qi_gqr(),
        )
    } else {
        (base.wrapping_add(instr.qd() as u32), instr.w(), instr.i_gqr())
    };

    let gqr = core.gqr[gqr_index];
    let ty = gqr.st_type().unwrap_or(QuantizedDataType::Floating);
    let scale = gqr.st_scale();

    let value = core.fpr[instr.frs()];
    quantize(core, ctx, ea, value.ps0, ty, scale)?;
    if !single {
        quantize(core, ctx, ea + element_size(ty), value.ps1, ty, scale)?;
    }

    if update {
        core.gpr[ra] = ea;
    }
    Ok(())
}

macro_rules! psq_handler {
    ($name:ident, $inner:ident, $indexed:literal, $update:literal) => {
        fn $name(core: &mut Core, ctx: &ExecContext, instr: Instruction) -> Result<(), Fault> {
            $inner(core, ctx, instr, $indexed, $update)
        }
    };
}

psq_handler!(psq_l, psq_load_generic, false, false);
psq_handler!(psq_lu, psq_load_generic, false, true);
psq_handler!(psq_lx, psq_load_generic, true, false);
psq_handler!(psq_lux, psq_load_generic, true, true);
psq_handler!(psq_st, psq_store_generic, false, false);
psq_handler!(psq_stu, psq_store_generic, false, true);
psq_handler!(psq_stx, psq_store_generic, true, false);
psq_handler!(psq_stux, psq_store_generic, true, true);

pub(super) fn register(interp: &mut Interpreter) {
    use InstructionId::*;

    interp.register(PsAbs, ps_abs);
    interp.register(PsAdd, ps_add);
    interp.register(PsCmpo0, ps_cmpo0);
    interp.register(PsCmpo1, ps_cmpo1);
    interp.register(PsCmpu0, ps_cmpu0);
    interp.register(PsCmpu1, ps_cmpu1);
    interp.register(PsDiv, ps_div);
    interp.register(PsMadd, ps_madd);
    interp.register(PsMadds0, ps_madds0);
    interp.register(PsMadds1, ps_madds1);
    interp.register(PsMerge00, ps_merge00);
    interp.register(PsMerge01, ps_merge01);
    interp.register(PsMerge10, ps_merge10);
    interp.register(PsMerge11, ps_merge11);
    interp.register(PsMr, ps_mr);
    interp.register(PsMsub, ps_msub);
    interp.register(PsMul, ps_mul);
    interp.register(PsMuls0, ps_muls0);
    interp.register(PsMuls1, ps_muls1);
    interp.register(PsNabs, ps_nabs);
    interp.register(PsNeg, ps_neg);
    interp.register(PsNmadd, ps_nmadd);
    interp.register(PsNmsub, ps_nmsub);
    interp.register(PsRes, ps_res);
    interp.register(PsRsqrte, ps_rsqrte);
    interp.register(PsSel, ps_sel);
    interp.register(PsSub, ps_sub);
    interp.register(PsSum0, ps_sum0);
    interp.register(PsSum1, ps_sum1);
    interp.register(PsqL, psq_l);
    interp.register(PsqLu, psq_lu);
    interp.register(PsqLux, psq_lux);
    interp.register(PsqLx, psq_lx);
    interp.register(PsqSt, psq_st);
    interp.register(PsqStu, psq_stu);
    interp.register(PsqStux, psq_stux);
    interp.register(PsqStx, psq_stx);
}

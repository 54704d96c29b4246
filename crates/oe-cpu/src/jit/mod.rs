//! The dynamic translator.
//!
//! Guest blocks are identified at their first execution, lowered into
//! pre-extracted micro-operations and cached by start address. Lowering
//! builds the same argument structures the interpreter builds per
//! execution, and both engines run the same evaluators, so translated
//! and interpreted semantics cannot diverge. Instructions without a
//! native lowering dispatch their interpreter handler from inside the
//! block; mixed blocks are the normal case.

mod block;
mod cache;

pub use block::{BlockOp, Op, TranslatedBlock};
pub use cache::BlockCache;

use oe_espresso::fields::InstructionField;
use oe_espresso::{Instruction, InstructionId, InstructionInfo, InstructionSet};
use oe_memory::AddressSpace;

use crate::breakpoints::BreakpointFlags;
use crate::core::Core;
use crate::fault::Fault;
use crate::interpreter::Interpreter;
use crate::machine::ExecContext;
use crate::sema::{self, AddFlags, BranchKind, LogicalFlags, LogicalOp, MemFlags};

/// Why block execution returned to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockExit {
    /// Block finished or transferred control; continue at `nia`
    Continue,
    /// A breakpoint fired at `nia` before the instruction executed
    Breakpoint(BreakpointFlags),
}

fn add_op(instr: Instruction, flags: AddFlags) -> Op {
    Op::Add(crate::interpreter::args::add_args(instr, flags))
}

fn logical_op(instr: Instruction, op: LogicalOp, flags: LogicalFlags) -> Op {
    Op::Logical(crate::interpreter::args::logical_args(instr, op, flags))
}

fn cmp_op(instr: Instruction, signed: bool, immediate: bool) -> Op {
    Op::Cmp(crate::interpreter::args::cmp_args(instr, signed, immediate))
}

fn load_op(instr: Instruction, width: u8, flags: MemFlags) -> Op {
    Op::Load(crate::interpreter::args::load_args(instr, width, flags))
}

fn store_op(instr: Instruction, width: u8, flags: MemFlags) -> Op {
    Op::Store(crate::interpreter::args::store_args(instr, width, flags))
}

/// Lower one decoded instruction to a native op, or None for the
/// interpreter fallback
fn lower(id: InstructionId, instr: Instruction) -> Option<Op> {
    use InstructionId::*;

    Some(match id {
        Add => add_op(instr, AddFlags::CHECK_RECORD),
        Addc => add_op(instr, AddFlags::CARRY | AddFlags::CHECK_RECORD),
        Adde => add_op(instr, AddFlags::EXTENDED | AddFlags::CARRY | AddFlags::CHECK_RECORD),
        Addi => add_op(instr, AddFlags::IMMEDIATE | AddFlags::ZERO_RA),
        Addic => add_op(instr, AddFlags::IMMEDIATE | AddFlags::CARRY),
        Addicx => add_op(
            instr,
            AddFlags::IMMEDIATE | AddFlags::CARRY | AddFlags::ALWAYS_RECORD,
        ),
        Addis => add_op(instr, AddFlags::IMMEDIATE | AddFlags::SHIFTED | AddFlags::ZERO_RA),
        Addme => add_op(
            instr,
            AddFlags::CHECK_RECORD | AddFlags::CARRY | AddFlags::EXTENDED | AddFlags::TO_MINUS_ONE,
        ),
        Addze => add_op(
            instr,
            AddFlags::CHECK_RECORD | AddFlags::CARRY | AddFlags::EXTENDED | AddFlags::TO_ZERO,
        ),
        Subf => add_op(instr, AddFlags::SUBTRACT | AddFlags::CHECK_RECORD),
        Subfc => add_op(instr, AddFlags::CARRY | AddFlags::SUBTRACT | AddFlags::CHECK_RECORD),
        Subfe => add_op(
            instr,
            AddFlags::EXTENDED | AddFlags::CARRY | AddFlags::SUBTRACT | AddFlags::CHECK_RECORD,
        ),
        Subfic => add_op(instr, AddFlags::IMMEDIATE | AddFlags::CARRY | AddFlags::SUBTRACT),
        Subfme => add_op(
            instr,
            AddFlags::TO_MINUS_ONE
                | AddFlags::EXTENDED
                | AddFlags::CARRY
                | AddFlags::CHECK_RECORD
                | AddFlags::SUBTRACT,
        ),
        Subfze => add_op(
            instr,
            AddFlags::TO_ZERO
                | AddFlags::EXTENDED
                | AddFlags::CARRY
                | AddFlags::CHECK_RECORD
                | AddFlags::SUBTRACT,
        ),

        And => logical_op(instr, LogicalOp::And, LogicalFlags::CHECK_RECORD),
        Andc => logical_op(
            instr,
            LogicalOp::And,
            LogicalFlags::CHECK_RECORD | LogicalFlags::COMPLEMENT,
        ),
        Andi => logical_op(
            instr,
            LogicalOp::And,
            LogicalFlags::ALWAYS_RECORD | LogicalFlags::IMMEDIATE,
        ),
        Andis => logical_op(
            instr,
            LogicalOp::And,
            LogicalFlags::ALWAYS_RECORD | LogicalFlags::IMMEDIATE | LogicalFlags::SHIFTED,
        ),
        Eqv => logical_op(instr, LogicalOp::Eqv, LogicalFlags::CHECK_RECORD),
        Nand => logical_op(instr, LogicalOp::Nand, LogicalFlags::CHECK_RECORD),
        Nor => logical_op(instr, LogicalOp::Nor, LogicalFlags::CHECK_RECORD),
        Or => logical_op(instr, LogicalOp::Or, LogicalFlags::CHECK_RECORD),
        Orc => logical_op(
            instr,
            LogicalOp::Or,
            LogicalFlags::CHECK_RECORD | LogicalFlags::COMPLEMENT,
        ),
        Ori => logical_op(instr, LogicalOp::Or, LogicalFlags::IMMEDIATE),
        Oris => logical_op(
            instr,
            LogicalOp::Or,
            LogicalFlags::IMMEDIATE | LogicalFlags::SHIFTED,
        ),
        Xor => logical_op(instr, LogicalOp::Xor, LogicalFlags::CHECK_RECORD),
        Xori => logical_op(instr, LogicalOp::Xor, LogicalFlags::IMMEDIATE),
        Xoris => logical_op(
            instr,
            LogicalOp::Xor,
            LogicalFlags::IMMEDIATE | LogicalFlags::SHIFTED,
        ),

        Cmp => cmp_op(instr, true, false),
        Cmpi => cmp_op(instr, true, true),
        Cmpl => cmp_op(instr, false, false),
        Cmpli => cmp_op(instr, false, true),

        Rlwimi => Op::Rlw(crate::interpreter::args::rlw_args(instr, true, true)),
        Rlwinm => Op::Rlw(crate::interpreter::args::rlw_args(instr, false, true)),
        Rlwnm => Op::Rlw(crate::interpreter::args::rlw_args(instr, false, false)),

        Slw => Op::Shift(crate::interpreter::args::shift_args(instr, true, false, false)),
        Sraw => Op::Shift(crate::interpreter::args::shift_args(instr, false, true, false)),
        Srawi => Op::Shift(crate::interpreter::args::shift_args(instr, false, true, true)),
        Srw => Op::Shift(crate::interpreter::args::shift_args(instr, false, false, false)),

        Lbz => load_op(instr, 1, MemFlags::ZERO_RA),
        Lbzu => load_op(instr, 1, MemFlags::UPDATE),
        Lbzux => load_op(instr, 1, MemFlags::UPDATE | MemFlags::INDEXED),
        Lbzx => load_op(instr, 1, MemFlags::INDEXED | MemFlags::ZERO_RA),
        Lha => load_op(instr, 2, MemFlags::SIGN_EXTEND | MemFlags::ZERO_RA),
        Lhau => load_op(instr, 2, MemFlags::SIGN_EXTEND | MemFlags::UPDATE),
        Lhaux => load_op(instr, 2, MemFlags::SIGN_EXTEND | MemFlags::UPDATE | MemFlags::INDEXED),
        Lhax => load_op(instr, 2, MemFlags::SIGN_EXTEND | MemFlags::INDEXED | MemFlags::ZERO_RA),
        Lhbrx => load_op(instr, 2, MemFlags::BYTE_REVERSE | MemFlags::INDEXED | MemFlags::ZERO_RA),
        Lhz => load_op(instr, 2, MemFlags::ZERO_RA),
        Lhzu => load_op(instr, 2, MemFlags::UPDATE),
        Lhzux => load_op(instr, 2, MemFlags::UPDATE | MemFlags::INDEXED),
        Lhzx => load_op(instr, 2, MemFlags::INDEXED | MemFlags::ZERO_RA),
        Lwarx => load_op(instr, 4, MemFlags::RESERVE | MemFlags::INDEXED | MemFlags::ZERO_RA),
        Lwbrx => load_op(instr, 4, MemFlags::BYTE_REVERSE | MemFlags::INDEXED | MemFlags::ZERO_RA),
        Lwz => load_op(instr, 4, MemFlags::ZERO_RA),
        Lwzu => load_op(instr, 4, MemFlags::UPDATE),
        Lwzux => load_op(instr, 4, MemFlags::UPDATE | MemFlags::INDEXED),
        Lwzx => load_op(instr, 4, MemFlags::INDEXED | MemFlags::ZERO_RA),

        Stb => store_op(instr, 1, MemFlags::ZERO_RA),
        Stbu => store_op(instr, 1, MemFlags::UPDATE),
        Stbux => store_op(instr, 1, MemFlags::UPDATE | MemFlags::INDEXED),
        Stbx => store_op(instr, 1, MemFlags::ZERO_RA | MemFlags::INDEXED),
        Sth => store_op(instr, 2, MemFlags::ZERO_RA),
        Sthbrx => store_op(instr, 2, MemFlags::ZERO_RA | MemFlags::BYTE_REVERSE | MemFlags::INDEXED),
        Sthu => store_op(instr, 2, MemFlags::UPDATE),
        Sthux => store_op(instr, 2, MemFlags::UPDATE | MemFlags::INDEXED),
        Sthx => store_op(instr, 2, MemFlags::ZERO_RA | MemFlags::INDEXED),
        Stw => store_op(instr, 4, MemFlags::ZERO_RA),
        Stwbrx => store_op(instr, 4, MemFlags::ZERO_RA | MemFlags::BYTE_REVERSE | MemFlags::INDEXED),
        Stwcx => store_op(instr, 4, MemFlags::ZERO_RA | MemFlags::RESERVE | MemFlags::INDEXED),
        Stwu => store_op(instr, 4, MemFlags::UPDATE),
        Stwux => store_op(instr, 4, MemFlags::UPDATE | MemFlags::INDEXED),
        Stwx => store_op(instr, 4, MemFlags::ZERO_RA | MemFlags::INDEXED),

        B => Op::Branch(crate::interpreter::args::branch_args(
            instr,
            BranchKind::Direct {
                offset: instr.li_offset(),
                absolute: instr.aa(),
            },
        )),
        Bc => Op::Branch(crate::interpreter::args::branch_args(
            instr,
            BranchKind::Conditional {
                offset: instr.bd_offset(),
                absolute: instr.aa(),
            },
        )),
        Bcctr => Op::Branch(crate::interpreter::args::branch_args(instr, BranchKind::ToCtr)),
        Bclr => Op::Branch(crate::interpreter::args::branch_args(instr, BranchKind::ToLr)),

        _ => return None,
    })
}

/// Whether an instruction terminates block identification
fn ends_block(id: InstructionId) -> bool {
    matches!(
        id,
        InstructionId::B | InstructionId::Bc | InstructionId::Bcctr | InstructionId::Bclr
    )
}

/// Whether a block-ending instruction can fall through to the next one
fn branch_falls_through(id: InstructionId, instr: Instruction) -> bool {
    match id {
        InstructionId::B => false,
        // Condition ignored and (for bc/bclr) counter ignored means the
        // branch is always taken
        InstructionId::Bc | InstructionId::Bclr => instr.bo() & 0x14 != 0x14,
        InstructionId::Bcctr => instr.bo() & 0x10 == 0,
        _ => true,
    }
}

fn track_registers(
    info: &InstructionInfo,
    instr: Instruction,
    gpr_reads: &mut u32,
    gpr_writes: &mut u32,
    cr_writes: &mut u8,
) {
    let gpr_of = |field: InstructionField| -> Option<u32> {
        match field {
            InstructionField::Rd | InstructionField::Rs => Some(instr.rd() as u32),
            InstructionField::Ra => Some(instr.ra() as u32),
            InstructionField::Rb => Some(instr.rb() as u32),
            _ => None,
        }
    };

    for &field in &info.read {
        if let Some(r) = gpr_of(field) {
            *gpr_reads |= 1 << r;
        }
    }

    for &field in &info.write {
        if let Some(r) = gpr_of(field) {
            *gpr_writes |= 1 << r;
        }
        if field == InstructionField::CrfD {
            *cr_writes |= 1 << instr.crfd();
        }
    }

    // Record forms define cr0; floating record forms define cr1
    let records = info.has_flag(InstructionField::AlwaysRc)
        || (info.has_flag(InstructionField::Rc) && instr.rc());
    if records {
        if info.write.contains(&InstructionField::FrD) {
            *cr_writes |= 1 << 1;
        } else {
            *cr_writes |= 1 << 0;
        }
    }
}

/// Translate the block starting at `start`.
///
/// A block ends at a control transfer, after `max_inst` instructions,
/// or at an undecodable word (which lowers to an illegal-op
/// terminator). A block whose first word cannot be fetched or decoded
/// is a hard error for the requester.
pub fn translate(
    mem: &AddressSpace,
    iset: &InstructionSet,
    start: u32,
    max_inst: u32,
) -> Result<TranslatedBlock, Fault> {
    let mut ops = Vec::new();
    let mut gpr_reads = 0u32;
    let mut gpr_writes = 0u32;
    let mut cr_writes = 0u8;
    let mut fall_through = true;
    let mut addr = start;

    loop {
        let word = match mem.read_be32(addr) {
            Ok(word) => word,
            Err(_) if addr == start => return Err(Fault::FetchAccess { addr }),
            // The block ends before the unfetchable word; executing off
            // the end refaults with a precise address
            Err(_) => break,
        };

        let instr = Instruction(word);

        let Some(info) = iset.decode(instr) else {
            if addr == start {
                return Err(Fault::IllegalInstruction { addr, word });
            }
            ops.push(BlockOp {
                cia: addr,
                instr,
                op: Op::Illegal,
            });
            addr = addr.wrapping_add(4);
            fall_through = false;
            break;
        };

        track_registers(info, instr, &mut gpr_reads, &mut gpr_writes, &mut cr_writes);

        let op = lower(info.id, instr).unwrap_or(Op::Fallback { id: info.id });
        ops.push(BlockOp {
            cia: addr,
            instr,
            op,
        });
        addr = addr.wrapping_add(4);

        if ends_block(info.id) {
            fall_through = branch_falls_through(info.id, instr);
            break;
        }

        if ops.len() as u32 >= max_inst {
            tracing::trace!(
                target: "jit",
                "Block at 0x{:08x} hit the instruction limit at 0x{:08x}",
                start,
                addr
            );
            break;
        }
    }

    Ok(TranslatedBlock {
        start,
        end: addr,
        ops,
        gpr_reads,
        gpr_writes,
        cr_writes,
        fall_through,
    })
}

fn run_op(
    core: &mut Core,
    ctx: &ExecContext,
    interp: &Interpreter,
    bop: &BlockOp,
) -> Result<(), Fault> {
    match &bop.op {
        Op::Add(args) => {
            sema::do_add(core, args);
            Ok(())
        }
        Op::Logical(args) => {
            sema::do_logical(core, args);
            Ok(())
        }
        Op::Cmp(args) => {
            sema::do_cmp(core, args);
            Ok(())
        }
        Op::Rlw(args) => {
            sema::do_rlw(core, args);
            Ok(())
        }
        Op::Shift(args) => {
            sema::do_shift(core, args);
            Ok(())
        }
        Op::Load(args) => sema::do_load(core, ctx.mem, args),
        Op::Store(args) => sema::do_store(core, ctx.mem, args),
        Op::Branch(args) => {
            sema::do_branch(core, args);
            Ok(())
        }
        Op::Fallback { id } => interp.execute(core, ctx, ctx.iset.find(*id), bop.instr),
        Op::Illegal => Err(Fault::IllegalInstruction {
            addr: core.cia,
            word: bop.instr.0,
        }),
    }
}

/// Whether an op touches the lwarx/stwcx. reservation and must not be
/// executed twice in verify mode
fn is_reserve_op(op: &Op) -> bool {
    match op {
        Op::Load(args) => args.flags.contains(MemFlags::RESERVE),
        Op::Store(args) => args.flags.contains(MemFlags::RESERVE),
        _ => false,
    }
}

fn verify_op(
    core_before: &Core,
    core_after: &Core,
    ctx: &ExecContext,
    interp: &Interpreter,
    bop: &BlockOp,
) {
    let Some(info) = ctx.iset.decode(bop.instr) else {
        return;
    };

    let mut scratch = core_before.clone();
    scratch.cia = bop.cia;
    scratch.nia = bop.cia.wrapping_add(4);

    if interp.execute(&mut scratch, ctx, info, bop.instr).is_err() {
        return;
    }

    let diverged = scratch.gpr != core_after.gpr
        || scratch.cr != core_after.cr
        || scratch.xer != core_after.xer
        || scratch.lr != core_after.lr
        || scratch.ctr != core_after.ctr
        || scratch.nia != core_after.nia;

    if diverged {
        tracing::warn!(
            target: "jit",
            "Translated semantics diverge from interpreter for {} (0x{:08x}) at 0x{:08x}",
            info.name,
            bop.instr.0,
            bop.cia
        );
    }
}

/// Execute the block at `core.nia`, translating it first if needed.
///
/// Register state is architecturally consistent at every instruction
/// boundary; breakpoints are checked per instruction without blocking
/// other threads.
pub fn execute_block(
    core: &mut Core,
    ctx: &ExecContext,
    cache: &BlockCache,
    interp: &Interpreter,
    max_inst: u32,
    verify: bool,
) -> Result<BlockExit, Fault> {
    let block = match cache.get(core.nia) {
        Some(block) => block,
        None => {
            let block = translate(ctx.mem, ctx.iset, core.nia, max_inst)?;
            cache.insert(block)
        }
    };

    for bop in &block.ops {
        if ctx.breakpoints.has_breakpoints() {
            if let Some(flags) = ctx.breakpoints.pop_breakpoint(bop.cia) {
                // Leave nia at the breakpoint so resume re-executes it
                core.nia = bop.cia;
                return Ok(BlockExit::Breakpoint(flags));
            }
        }

        core.cia = bop.cia;
        core.nia = bop.cia.wrapping_add(4);

        let before = if verify && !matches!(bop.op, Op::Fallback { .. }) && !is_reserve_op(&bop.op)
        {
            Some(core.clone())
        } else {
            None
        };

        run_op(core, ctx, interp, bop)?;

        if let Some(before) = before {
            verify_op(&before, core, ctx, interp, bop);
        }

        if core.nia != bop.cia.wrapping_add(4) {
            // Control transfer; back to the dispatcher
            return Ok(BlockExit::Continue);
        }
    }

    Ok(BlockExit::Continue)
}

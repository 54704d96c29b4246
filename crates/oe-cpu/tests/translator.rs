//! Dynamic translator behaviour: block shape, caching, and equivalence
//! with the interpreter

use oe_core::config::CpuConfig;
use oe_cpu::jit::{self, BlockExit};
use oe_cpu::{BreakpointFlags, Core, Machine};
use oe_memory::constants::MEM2_BASE;

fn jit_machine() -> std::sync::Arc<Machine> {
    Machine::new(CpuConfig::default()).unwrap()
}

fn write_program(machine: &Machine, addr: u32, words: &[u32]) {
    for (i, word) in words.iter().enumerate() {
        machine.mem().write_be32(addr + i as u32 * 4, *word).unwrap();
    }
}

fn addi(rd: u32, ra: u32, simm: i32) -> u32 {
    (14 << 26) | (rd << 21) | (ra << 16) | (simm as u32 & 0xFFFF)
}

fn add(rd: u32, ra: u32, rb: u32) -> u32 {
    (31 << 26) | (rd << 21) | (ra << 16) | (rb << 11) | (266 << 1)
}

fn mulli(rd: u32, ra: u32, simm: i32) -> u32 {
    (7 << 26) | (rd << 21) | (ra << 16) | (simm as u32 & 0xFFFF)
}

fn cmpi(crf: u32, ra: u32, simm: i32) -> u32 {
    (11 << 26) | (crf << 23) | (ra << 16) | (simm as u32 & 0xFFFF)
}

fn bc(bo: u32, bi: u32, offset: i32) -> u32 {
    (16 << 26) | (bo << 21) | (bi << 16) | (offset as u32 & 0xFFFC)
}

fn b(offset: i32) -> u32 {
    (18 << 26) | (offset as u32 & 0x03FF_FFFC)
}

fn blr() -> u32 {
    (19 << 26) | (20 << 21) | (16 << 1)
}

#[test]
fn test_block_ends_at_branch() {
    let machine = jit_machine();

    write_program(
        &machine,
        MEM2_BASE,
        &[addi(3, 0, 1), addi(4, 0, 2), b(-8), addi(5, 0, 3)],
    );

    let block = jit::translate(
        machine.mem(),
        machine.instruction_set(),
        MEM2_BASE,
        3000,
    )
    .unwrap();

    // The branch terminates the block; the trailing addi is outside it
    assert_eq!(block.len(), 3);
    assert_eq!(block.start, MEM2_BASE);
    assert_eq!(block.end, MEM2_BASE + 12);
    assert!(!block.fall_through);
}

#[test]
fn test_block_respects_instruction_limit() {
    let machine = jit_machine();

    let program: Vec<u32> = (0..16).map(|_| addi(3, 3, 1)).collect();
    write_program(&machine, MEM2_BASE, &program);

    let block = jit::translate(
        machine.mem(),
        machine.instruction_set(),
        MEM2_BASE,
        8,
    )
    .unwrap();

    assert_eq!(block.len(), 8);
    assert!(block.fall_through);
}

#[test]
fn test_block_register_tracking() {
    let machine = jit_machine();

    write_program(
        &machine,
        MEM2_BASE,
        &[add(5, 3, 4), cmpi(2, 5, 0), blr()],
    );

    let block = jit::translate(
        machine.mem(),
        machine.instruction_set(),
        MEM2_BASE,
        3000,
    )
    .unwrap();

    assert_ne!(block.gpr_reads & (1 << 3), 0);
    assert_ne!(block.gpr_reads & (1 << 4), 0);
    assert_ne!(block.gpr_writes & (1 << 5), 0);
    assert_ne!(block.cr_writes & (1 << 2), 0);
    assert_eq!(block.cr_writes & (1 << 0), 0);
}

#[test]
fn test_cache_reuses_blocks_and_invalidates() {
    let machine = jit_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    write_program(&machine, MEM2_BASE, &[addi(3, 0, 5), b(-4)]);

    let ctx = machine.exec_context();
    jit::execute_block(
        &mut core,
        &ctx,
        machine.block_cache(),
        machine.interpreter(),
        3000,
        false,
    )
    .unwrap();

    assert_eq!(machine.block_cache().len(), 1);
    assert!(machine.block_cache().get(MEM2_BASE).is_some());

    // Invalidation outside the block leaves it cached
    machine.block_cache().invalidate(MEM2_BASE + 0x100, 4);
    assert!(machine.block_cache().get(MEM2_BASE).is_some());

    // Invalidation inside the block drops it
    machine.block_cache().invalidate(MEM2_BASE + 4, 4);
    assert!(machine.block_cache().get(MEM2_BASE).is_none());
}

/// A block containing an instruction with no native lowering (mulli)
/// followed by a conditional branch must leave the register file in
/// exactly the state full interpretation produces.
#[test]
fn test_mixed_block_matches_interpreter() {
    let program = [
        addi(3, 0, 7),
        mulli(4, 3, 6), // interpreter fallback inside the block
        add(5, 4, 3),
        cmpi(0, 5, 49),
        bc(12, 2, 8), // beq +8
        addi(6, 0, 111),
        addi(7, 0, 1),
        b(0), // spin here
    ];

    // Reference: pure interpretation
    let interp_machine = Machine::new(CpuConfig {
        jit: false,
        ..CpuConfig::default()
    })
    .unwrap();
    write_program(&interp_machine, MEM2_BASE, &program);

    let mut interp_core = Core::new(0);
    interp_core.nia = MEM2_BASE;
    {
        let ctx = interp_machine.exec_context();
        for _ in 0..7 {
            interp_machine.interpreter().step(&mut interp_core, &ctx).unwrap();
        }
    }

    // Translated execution of the same program
    let machine = jit_machine();
    write_program(&machine, MEM2_BASE, &program);

    let mut core = Core::new(0);
    core.nia = MEM2_BASE;
    {
        let ctx = machine.exec_context();
        // First block: up to and including the taken beq. Second block:
        // the instruction at the branch target.
        jit::execute_block(&mut core, &ctx, machine.block_cache(), machine.interpreter(), 3000, false).unwrap();
        jit::execute_block(&mut core, &ctx, machine.block_cache(), machine.interpreter(), 3000, false).unwrap();
    }

    assert_eq!(core.gpr, interp_core.gpr);
    assert_eq!(core.cr, interp_core.cr);
    assert_eq!(core.xer, interp_core.xer);
    assert_eq!(core.nia, interp_core.nia);
    assert_eq!(core.gpr[5], 49);
    assert_eq!(core.gpr[7], 1);
    assert_eq!(core.gpr[6], 0);
}

#[test]
fn test_verify_mode_accepts_native_lowerings() {
    let machine = Machine::new(CpuConfig {
        verify: true,
        ..CpuConfig::default()
    })
    .unwrap();

    write_program(
        &machine,
        MEM2_BASE,
        &[addi(3, 0, 10), add(4, 3, 3), cmpi(0, 4, 20), b(-4)],
    );

    let mut core = Core::new(0);
    core.nia = MEM2_BASE;
    let ctx = machine.exec_context();

    jit::execute_block(&mut core, &ctx, machine.block_cache(), machine.interpreter(), 3000, true).unwrap();

    assert_eq!(core.gpr[4], 20);
    assert_eq!(core.cr.field(0), 0b0010);
}

#[test]
fn test_breakpoint_interrupts_block() {
    let machine = jit_machine();

    write_program(
        &machine,
        MEM2_BASE,
        &[addi(3, 0, 1), addi(4, 0, 2), addi(5, 0, 3), b(-12)],
    );

    machine
        .breakpoints
        .add_breakpoint(MEM2_BASE + 8, BreakpointFlags::SYSTEM)
        .unwrap();

    let mut core = Core::new(0);
    core.nia = MEM2_BASE;
    let ctx = machine.exec_context();

    let exit = jit::execute_block(
        &mut core,
        &ctx,
        machine.block_cache(),
        machine.interpreter(),
        3000,
        false,
    )
    .unwrap();

    // Stopped before the third instruction executed
    assert_eq!(exit, BlockExit::Breakpoint(BreakpointFlags::SYSTEM));
    assert_eq!(core.nia, MEM2_BASE + 8);
    assert_eq!(core.gpr[3], 1);
    assert_eq!(core.gpr[4], 2);
    assert_eq!(core.gpr[5], 0);

    // The one-shot breakpoint was consumed; the block resumes cleanly
    let exit = jit::execute_block(
        &mut core,
        &ctx,
        machine.block_cache(),
        machine.interpreter(),
        3000,
        false,
    )
    .unwrap();
    assert_eq!(exit, BlockExit::Continue);
    assert_eq!(core.gpr[5], 3);
}

#[test]
fn test_undecodable_first_instruction_is_hard_error() {
    let machine = jit_machine();
    write_program(&machine, MEM2_BASE, &[0x0000_0000]);

    let result = jit::translate(
        machine.mem(),
        machine.instruction_set(),
        MEM2_BASE,
        3000,
    );
    assert!(result.is_err());
}

#[test]
fn test_undecodable_mid_block_terminates_with_illegal_op() {
    let machine = jit_machine();
    write_program(&machine, MEM2_BASE, &[addi(3, 0, 1), 0x0000_0000]);

    let block = jit::translate(
        machine.mem(),
        machine.instruction_set(),
        MEM2_BASE,
        3000,
    )
    .unwrap();
    assert_eq!(block.len(), 2);
    assert!(!block.fall_through);

    // Executing reaches the illegal op and faults precisely there
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;
    let ctx = machine.exec_context();

    let fault = jit::execute_block(
        &mut core,
        &ctx,
        machine.block_cache(),
        machine.interpreter(),
        3000,
        false,
    )
    .unwrap_err();
    assert_eq!(fault.address(), MEM2_BASE + 4);
    assert_eq!(core.gpr[3], 1);
}

//! Interpreter execution scenarios against a real machine

use oe_core::config::CpuConfig;
use oe_cpu::{Core, Machine};
use oe_memory::constants::MEM2_BASE;

fn interpreter_machine() -> std::sync::Arc<Machine> {
    Machine::new(CpuConfig {
        jit: false,
        ..CpuConfig::default()
    })
    .unwrap()
}

fn write_program(machine: &Machine, addr: u32, words: &[u32]) {
    for (i, word) in words.iter().enumerate() {
        machine.mem().write_be32(addr + i as u32 * 4, *word).unwrap();
    }
}

fn run_steps(machine: &Machine, core: &mut Core, steps: usize) {
    let ctx = machine.exec_context();
    for _ in 0..steps {
        machine.interpreter().step(core, &ctx).unwrap();
    }
}

// Encoding helpers

fn addi(rd: u32, ra: u32, simm: i32) -> u32 {
    (14 << 26) | (rd << 21) | (ra << 16) | (simm as u32 & 0xFFFF)
}

fn add(rd: u32, ra: u32, rb: u32) -> u32 {
    (31 << 26) | (rd << 21) | (ra << 16) | (rb << 11) | (266 << 1)
}

fn cmpi(crf: u32, ra: u32, simm: i32) -> u32 {
    (11 << 26) | (crf << 23) | (ra << 16) | (simm as u32 & 0xFFFF)
}

fn mtcrf(crm: u32, rs: u32) -> u32 {
    (31 << 26) | (rs << 21) | (crm << 12) | (144 << 1)
}

fn mfcr(rd: u32) -> u32 {
    (31 << 26) | (rd << 21) | (19 << 1)
}

fn lwz(rd: u32, ra: u32, d: i32) -> u32 {
    (32 << 26) | (rd << 21) | (ra << 16) | (d as u32 & 0xFFFF)
}

fn stw(rs: u32, ra: u32, d: i32) -> u32 {
    (36 << 26) | (rs << 21) | (ra << 16) | (d as u32 & 0xFFFF)
}

fn b(offset: i32) -> u32 {
    (18 << 26) | (offset as u32 & 0x03FF_FFFC)
}

fn lwarx(rd: u32, ra: u32, rb: u32) -> u32 {
    (31 << 26) | (rd << 21) | (ra << 16) | (rb << 11) | (20 << 1)
}

fn stwcx(rs: u32, ra: u32, rb: u32) -> u32 {
    (31 << 26) | (rs << 21) | (ra << 16) | (rb << 11) | (150 << 1) | 1
}

#[test]
fn test_addi_li_sequence() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    write_program(
        &machine,
        MEM2_BASE,
        &[addi(3, 0, 100), addi(4, 3, -30), add(5, 3, 4)],
    );

    run_steps(&machine, &mut core, 3);

    assert_eq!(core.gpr[3], 100);
    assert_eq!(core.gpr[4], 70);
    assert_eq!(core.gpr[5], 170);
    assert_eq!(core.nia, MEM2_BASE + 12);
}

#[test]
fn test_cmpi_negative_value_sets_less_than() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;
    core.gpr[7] = (-5i32) as u32;

    write_program(&machine, MEM2_BASE, &[cmpi(3, 7, 3)]);
    run_steps(&machine, &mut core, 1);

    // Less-than only; neither equal nor greater-than
    assert_eq!(core.cr.field(3), 0b1000);

    // With sticky overflow set, the summary bit is copied verbatim
    core.nia = MEM2_BASE;
    core.xer.set_so(true);
    run_steps(&machine, &mut core, 1);
    assert_eq!(core.cr.field(3), 0b1001);
}

#[test]
fn test_mtcrf_touches_only_selected_fields() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    // Arbitrary starting condition register
    core.cr.0 = 0x1234_5678;
    // Arbitrary source value
    core.gpr[9] = 0xFFFF_FFFF;

    // Select fields 2 and 5: crm bits are numbered from field 7 up
    let crm = (1 << (7 - 2)) | (1 << (7 - 5));
    write_program(&machine, MEM2_BASE, &[mtcrf(crm, 9), mfcr(10)]);
    run_steps(&machine, &mut core, 2);

    let result = core.gpr[10];
    for field in 0..8 {
        let shift = (7 - field) * 4;
        let nibble = (result >> shift) & 0xF;
        if field == 2 || field == 5 {
            assert_eq!(nibble, 0xF, "field {} not updated", field);
        } else {
            let original = (0x1234_5678u32 >> shift) & 0xF;
            assert_eq!(nibble, original, "field {} clobbered", field);
        }
    }
}

#[test]
fn test_load_store_roundtrip() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;
    core.gpr[3] = 0xCAFE_F00D;
    core.gpr[5] = MEM2_BASE + 0x1000;

    write_program(&machine, MEM2_BASE, &[stw(3, 5, 0x10), lwz(4, 5, 0x10)]);
    run_steps(&machine, &mut core, 2);

    assert_eq!(core.gpr[4], 0xCAFE_F00D);
    assert_eq!(
        machine.mem().read_be32(MEM2_BASE + 0x1010).unwrap(),
        0xCAFE_F00D
    );
}

#[test]
fn test_branch_and_loop() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    // r3 = 1; b +8; (skipped: r3 = 99); r4 = 2
    write_program(
        &machine,
        MEM2_BASE,
        &[addi(3, 0, 1), b(8), addi(3, 0, 99), addi(4, 0, 2)],
    );
    run_steps(&machine, &mut core, 3);

    assert_eq!(core.gpr[3], 1);
    assert_eq!(core.gpr[4], 2);
}

#[test]
fn test_lwarx_stwcx_success_and_failure() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    let target = MEM2_BASE + 0x2000;
    machine.mem().write_be32(target, 7).unwrap();
    core.gpr[5] = target;
    core.gpr[3] = 42;

    write_program(&machine, MEM2_BASE, &[lwarx(4, 0, 5), stwcx(3, 0, 5)]);
    run_steps(&machine, &mut core, 2);

    // Reservation intact: store succeeds, cr0[eq] set
    assert_eq!(core.gpr[4], 7);
    assert_eq!(machine.mem().read_be32(target).unwrap(), 42);
    assert_eq!(core.cr.field(0) & 0b0010, 0b0010);

    // A second conditional store without a reservation fails
    core.nia = MEM2_BASE + 4;
    run_steps(&machine, &mut core, 1);
    assert_eq!(core.cr.field(0) & 0b0010, 0);
    assert_eq!(machine.mem().read_be32(target).unwrap(), 42);
}

#[test]
fn test_illegal_instruction_faults() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    write_program(&machine, MEM2_BASE, &[0x0000_0000]);

    let ctx = machine.exec_context();
    let fault = machine.interpreter().step(&mut core, &ctx).unwrap_err();
    assert_eq!(fault.address(), MEM2_BASE);
}

#[test]
fn test_system_call_dispatch() {
    let machine = interpreter_machine();
    let mut core = Core::new(0);
    core.nia = MEM2_BASE;

    fn hello(core: &mut Core, _ctx: &oe_cpu::ExecContext) {
        core.gpr[3] = 0x5EED;
    }

    let id = machine.system_calls.register(hello);
    core.gpr[0] = id;

    // sc
    write_program(&machine, MEM2_BASE, &[(17 << 26) | 2]);
    run_steps(&machine, &mut core, 1);

    assert_eq!(core.gpr[3], 0x5EED);
    assert_eq!(core.nia, MEM2_BASE + 4);
}

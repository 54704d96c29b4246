//! The emulated machine.
//!
//! One `Machine` owns every shared structure: the guest address space,
//! the instruction set tables, the translated-code cache, the breakpoint
//! list and the call tables. Hardware threads borrow them through an
//! [`ExecContext`]; nothing here is a process-wide singleton.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use oe_core::config::CpuConfig;
use oe_espresso::InstructionSet;
use oe_memory::{AddressSpace, MemoryError};

use crate::breakpoints::BreakpointList;
use crate::core::Core;
use crate::exception;
use crate::fault::Fault;
use crate::interpreter::Interpreter;
use crate::jit::{self, BlockCache, BlockExit};
use crate::kernel::{KernelCallTable, SystemCallTable};

/// Number of emulated hardware threads
pub const HARDWARE_THREADS: usize = 3;

/// Espresso time base ticks per second (bus clock / 4)
pub const TIME_BASE_FREQUENCY: u64 = 62_156_250;

/// Monotonic guest time base
pub struct TimeBase {
    start: Instant,
}

impl TimeBase {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Current 64-bit time base value
    pub fn read(&self) -> u64 {
        let elapsed = self.start.elapsed();
        elapsed.as_secs() * TIME_BASE_FREQUENCY
            + elapsed.subsec_nanos() as u64 * TIME_BASE_FREQUENCY / 1_000_000_000
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared machine state borrowed by instruction handlers
pub struct ExecContext<'a> {
    pub mem: &'a AddressSpace,
    pub iset: &'a InstructionSet,
    pub kernel_calls: &'a KernelCallTable,
    pub system_calls: &'a SystemCallTable,
    pub breakpoints: &'a BreakpointList,
    pub time_base: &'a TimeBase,
    /// Present when the translator is active, for icbi invalidation
    pub jit_cache: Option<&'a BlockCache>,
}

/// The emulated machine
pub struct Machine {
    mem: Arc<AddressSpace>,
    iset: Arc<InstructionSet>,
    interp: Interpreter,
    cache: BlockCache,
    pub breakpoints: BreakpointList,
    pub kernel_calls: KernelCallTable,
    pub system_calls: SystemCallTable,
    time_base: TimeBase,
    config: CpuConfig,

    /// Debugger pause request for every hardware thread
    pause_all: AtomicBool,
    resume_lock: Mutex<()>,
    resume_cond: Condvar,
}

impl Machine {
    pub fn new(config: CpuConfig) -> Result<Arc<Self>, MemoryError> {
        let mem = AddressSpace::new()?;
        let iset = Arc::new(InstructionSet::initialise());

        tracing::info!(
            "Machine initialised: {} instructions, jit {}",
            iset.instructions().len(),
            if config.jit { "enabled" } else { "disabled" }
        );

        Ok(Arc::new(Self {
            mem,
            iset,
            interp: Interpreter::new(),
            cache: BlockCache::new(),
            breakpoints: BreakpointList::new(),
            kernel_calls: KernelCallTable::new(),
            system_calls: SystemCallTable::new(),
            time_base: TimeBase::new(),
            config,
            pause_all: AtomicBool::new(false),
            resume_lock: Mutex::new(()),
            resume_cond: Condvar::new(),
        }))
    }

    pub fn mem(&self) -> &Arc<AddressSpace> {
        &self.mem
    }

    pub fn instruction_set(&self) -> &Arc<InstructionSet> {
        &self.iset
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interp
    }

    pub fn block_cache(&self) -> &BlockCache {
        &self.cache
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Build the handler-facing view of the shared state
    pub fn exec_context(&self) -> ExecContext<'_> {
        ExecContext {
            mem: &self.mem,
            iset: &self.iset,
            kernel_calls: &self.kernel_calls,
            system_calls: &self.system_calls,
            breakpoints: &self.breakpoints,
            time_base: &self.time_base,
            jit_cache: self.config.jit.then_some(&self.cache),
        }
    }

    /// Install the process-wide host fault bridge for this machine's
    /// guest window
    pub fn install_host_exception_handler(&self) {
        exception::install_host_exception_handler(&self.mem);
    }

    /// Ask every hardware thread to park at its next boundary
    pub fn pause_all(&self) {
        self.pause_all.store(true, Ordering::Release);
    }

    /// Release paused hardware threads
    pub fn resume_all(&self) {
        self.pause_all.store(false, Ordering::Release);
        let _lock = self.resume_lock.lock();
        self.resume_cond.notify_all();
    }

    fn wait_while_paused(&self, core: &Core) {
        let mut lock = self.resume_lock.lock();
        while self.pause_all.load(Ordering::Acquire)
            || core.control.pause.load(Ordering::Acquire)
        {
            self.resume_cond.wait(&mut lock);
        }
    }

    /// Resume one paused core
    pub fn resume_core(&self, core: &Core) {
        core.control.pause.store(false, Ordering::Release);
        let _lock = self.resume_lock.lock();
        self.resume_cond.notify_all();
    }

    fn should_pause(&self, core: &Core) -> bool {
        self.pause_all.load(Ordering::Acquire) || core.control.pause.load(Ordering::Acquire)
    }

    /// Run one hardware thread until it is stopped or faults.
    ///
    /// Pause requests are honoured at instruction-block boundaries,
    /// which bounds pause latency to one translated block. A breakpoint
    /// hit pauses the core; on resume the breakpoint's instruction is
    /// single-stepped before block execution continues.
    pub fn run_core(&self, core: &mut Core) -> Result<(), Fault> {
        let ctx = self.exec_context();
        let mut step_over_breakpoint = false;

        while core.control.running.load(Ordering::Acquire) {
            if self.should_pause(core) {
                tracing::debug!("Core {} paused at 0x{:08x}", core.id, core.nia);
                self.wait_while_paused(core);
                step_over_breakpoint = true;
            }

            let single_step = core.control.step.swap(false, Ordering::AcqRel);

            if single_step || step_over_breakpoint || !self.config.jit {
                if !step_over_breakpoint {
                    if let Some(flags) = self.breakpoints.pop_breakpoint(core.nia) {
                        tracing::debug!(
                            "Core {} hit breakpoint {:?} at 0x{:08x}",
                            core.id,
                            flags,
                            core.nia
                        );
                        core.control.pause.store(true, Ordering::Release);
                        continue;
                    }
                }
                step_over_breakpoint = false;

                self.interp.step(core, &ctx)?;

                if single_step {
                    core.control.pause.store(true, Ordering::Release);
                }
                continue;
            }

            match jit::execute_block(
                core,
                &ctx,
                &self.cache,
                &self.interp,
                self.config.jit_max_block,
                self.config.verify,
            )? {
                BlockExit::Continue => {}
                BlockExit::Breakpoint(flags) => {
                    tracing::debug!(
                        "Core {} hit breakpoint {:?} at 0x{:08x}",
                        core.id,
                        flags,
                        core.nia
                    );
                    core.control.pause.store(true, Ordering::Release);
                }
            }
        }

        Ok(())
    }

    /// Spawn the three hardware threads, each starting at the given
    /// entry point, and wait for them to finish
    pub fn run(self: &Arc<Self>, entries: [u32; HARDWARE_THREADS]) -> Vec<Result<(), Fault>> {
        let handles: Vec<_> = entries
            .iter()
            .copied()
            .enumerate()
            .map(|(id, entry)| {
                let machine = Arc::clone(self);
                std::thread::Builder::new()
                    .name(format!("espresso-core-{}", id))
                    .spawn(move || {
                        let mut core = Core::new(id as u32);
                        core.nia = entry;

                        exception::set_current_core(&mut core as *mut Core);
                        let result = machine.run_core(&mut core);
                        exception::clear_current_core();

                        if let Err(fault) = &result {
                            tracing::error!("Core {} faulted: {}", id, fault);
                        }
                        result
                    })
                    .expect("failed to spawn hardware thread")
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("hardware thread panicked"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_construction() {
        let machine = Machine::new(CpuConfig::default()).unwrap();
        assert!(machine.block_cache().is_empty());
        assert!(!machine.breakpoints.has_breakpoints());
        assert_eq!(machine.instruction_set().instructions().len(),
            oe_espresso::InstructionId::COUNT);
    }

    #[test]
    fn test_time_base_monotonic() {
        let tb = TimeBase::new();
        let a = tb.read();
        let b = tb.read();
        assert!(b >= a);
    }
}

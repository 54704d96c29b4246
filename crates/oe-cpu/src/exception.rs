//! Host-exception bridging.
//!
//! A process-wide SIGSEGV/SIGILL handler translates host faults inside
//! the guest window into guest faults on the faulting hardware thread:
//! the guest fault registers (srr0, dar, dsisr) are filled in, then a
//! user-supplied guest-level segfault handler runs, or the process
//! aborts with a formatted diagnostic including a host backtrace.
//! Faults on host threads that own no hardware thread, or outside the
//! guest window, are left to the previously installed handler.

use std::backtrace::Backtrace;
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;

use oe_memory::constants::ADDRESS_SPACE_SIZE;
use oe_memory::AddressSpace;

use crate::core::Core;

/// Guest-level segfault handler; expected not to return (it should
/// redirect the thread into a guest exception path)
pub type UserSegfaultHandler = fn(&mut Core, u32);

static HOST_BASE: AtomicUsize = AtomicUsize::new(0);
static USER_HANDLER: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Core owned by this host thread; null on non-hardware threads
    static CURRENT_CORE: Cell<*mut Core> = const { Cell::new(std::ptr::null_mut()) };
}

/// Mark the calling host thread as owning `core` for fault attribution
pub fn set_current_core(core: *mut Core) {
    CURRENT_CORE.with(|c| c.set(core));
}

/// Clear the calling host thread's hardware-thread binding
pub fn clear_current_core() {
    CURRENT_CORE.with(|c| c.set(std::ptr::null_mut()));
}

/// Install the guest-level segfault handler
pub fn set_user_segfault_handler(handler: UserSegfaultHandler) {
    USER_HANDLER.store(handler as usize, Ordering::Release);
}

/// dsisr bit flagging a store access
const DSISR_STORE: u32 = 0x0200_0000;

#[cfg(unix)]
mod platform {
    use super::*;

    struct OldActions {
        segv: libc::sigaction,
        ill: libc::sigaction,
    }

    // SAFETY: written once during installation, read only by the signal
    // handler afterwards.
    unsafe impl Send for OldActions {}
    unsafe impl Sync for OldActions {}

    static OLD_ACTIONS: OnceCell<OldActions> = OnceCell::new();

    /// Install the process-wide fault handlers. Idempotent.
    pub fn install(mem: &AddressSpace) {
        HOST_BASE.store(mem.host_base(), Ordering::Release);

        OLD_ACTIONS.get_or_init(|| {
            // SAFETY: standard sigaction installation; the handler only
            // runs on SIGSEGV/SIGILL.
            unsafe {
                let mut action: libc::sigaction = std::mem::zeroed();
                action.sa_sigaction = fault_handler as usize;
                action.sa_flags = libc::SA_SIGINFO | libc::SA_NODEFER;
                libc::sigemptyset(&mut action.sa_mask);

                let mut old_segv: libc::sigaction = std::mem::zeroed();
                let mut old_ill: libc::sigaction = std::mem::zeroed();
                libc::sigaction(libc::SIGSEGV, &action, &mut old_segv);
                libc::sigaction(libc::SIGILL, &action, &mut old_ill);

                OldActions {
                    segv: old_segv,
                    ill: old_ill,
                }
            }
        });

        tracing::debug!("Host exception bridging installed");
    }

    /// Reinstall the previous handler and return, so the faulting
    /// instruction re-executes under the old disposition
    unsafe fn chain_to_previous(signum: i32) {
        if let Some(old) = OLD_ACTIONS.get() {
            let action = if signum == libc::SIGSEGV {
                &old.segv
            } else {
                &old.ill
            };
            libc::sigaction(signum, action, std::ptr::null_mut());
        } else {
            let mut default: libc::sigaction = std::mem::zeroed();
            default.sa_sigaction = libc::SIG_DFL;
            libc::sigaction(signum, &default, std::ptr::null_mut());
        }
    }

    extern "C" fn fault_handler(
        signum: i32,
        info: *mut libc::siginfo_t,
        _context: *mut libc::c_void,
    ) {
        // SAFETY: info is valid inside a SA_SIGINFO handler.
        let fault_addr = unsafe { (*info).si_addr() } as usize;

        let core_ptr = CURRENT_CORE.with(|c| c.get());
        let base = HOST_BASE.load(Ordering::Acquire);

        // Not a hardware thread: this cannot be a guest fault
        if core_ptr.is_null() {
            // SAFETY: reverting to the previously installed action.
            unsafe { chain_to_previous(signum) };
            return;
        }

        let offset = fault_addr.wrapping_sub(base);
        let guest_fault = signum == libc::SIGSEGV && base != 0 && offset < ADDRESS_SPACE_SIZE;

        if !guest_fault && signum != libc::SIGILL {
            // Outside the guest window: not ours
            // SAFETY: reverting to the previously installed action.
            unsafe { chain_to_previous(signum) };
            return;
        }

        // SAFETY: the owning thread published this pointer for the
        // duration of its run loop and is the thread executing here.
        let core = unsafe { &mut *core_ptr };

        core.srr0 = core.cia;
        if guest_fault {
            core.dar = offset as u32;
            core.dsisr = DSISR_STORE;
        }

        let handler = USER_HANDLER.load(Ordering::Acquire);
        if handler != 0 {
            // SAFETY: only ever stored from a UserSegfaultHandler.
            let handler: UserSegfaultHandler = unsafe { std::mem::transmute(handler) };
            handler(core, core.dar);
        }

        // No user handler, or it returned: nothing can make forward
        // progress. Abort with a diagnostic instead of an opaque crash.
        eprintln!(
            "Unrecoverable guest fault on core {}\n  guest pc:    0x{:08x}\n  fault addr:  0x{:08x}\n  host signal: {}\n{}",
            core.id,
            core.cia,
            core.dar,
            signum,
            Backtrace::force_capture()
        );
        std::process::abort();
    }
}

#[cfg(unix)]
pub use platform::install as install_host_exception_handler;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_is_idempotent() {
        let mem = AddressSpace::new().unwrap();
        install_host_exception_handler(&mem);
        install_host_exception_handler(&mem);
        assert_eq!(HOST_BASE.load(Ordering::Acquire), mem.host_base());
    }

    #[test]
    fn test_current_core_binding() {
        let mut core = Core::new(2);
        set_current_core(&mut core as *mut Core);
        CURRENT_CORE.with(|c| assert!(!c.get().is_null()));
        clear_current_core();
        CURRENT_CORE.with(|c| assert!(c.get().is_null()));
    }
}

//! Kernel-call and system-call dispatch tables.
//!
//! The OS-reimplementation layer registers its handlers here before the
//! hardware threads start; lookups during execution are wait-free.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::core::Core;
use crate::machine::ExecContext;

/// Handler for one registered kernel call
pub type KernelCallFn = fn(&mut Core, &ExecContext);

/// Handler for one system call slot
pub type SystemCallFn = fn(&mut Core, &ExecContext);

/// One registered kernel call
#[derive(Clone)]
pub struct KernelCallEntry {
    pub name: String,
    pub func: KernelCallFn,
}

/// Append-only kernel call registration table.
///
/// Ids are consecutive indices; entries are never removed.
pub struct KernelCallTable {
    entries: RwLock<Vec<KernelCallEntry>>,
}

impl KernelCallTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Register a kernel call, returning its id
    pub fn register(&self, name: impl Into<String>, func: KernelCallFn) -> u32 {
        let mut entries = self.entries.write();
        let id = entries.len() as u32;
        entries.push(KernelCallEntry {
            name: name.into(),
            func,
        });
        id
    }

    /// Look up a kernel call by id; out-of-range ids resolve to None
    pub fn get(&self, id: u32) -> Option<KernelCallEntry> {
        self.entries.read().get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KernelCallTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of installable system call slots
pub const SYSTEM_CALL_SLOTS: usize = 0x1_0000 - 1;

/// Tag bit marking an id as a registered handler
pub const SYSTEM_CALL_REGISTERED: u32 = 0x8000_0000;

/// Tag bit marking an id as a deliberate illegal/trap placeholder
pub const SYSTEM_CALL_ILLEGAL: u32 = 0x4000_0000;

fn default_unknown_system_call(core: &mut Core, _ctx: &ExecContext) {
    tracing::warn!(
        "Unknown system call id 0x{:x} at 0x{:08x}",
        core.gpr[0],
        core.cia
    );
}

/// Fixed-capacity system call table.
///
/// Each slot is installed exactly once via an atomically incremented
/// counter. Returned ids carry a tag bit distinguishing registered
/// handlers from deliberate illegal placeholders; looking up an id
/// without the registered tag yields the unknown-call handler, so the
/// runtime can tell "never registered" from "intentionally invalid"
/// without scanning.
pub struct SystemCallTable {
    slots: Box<[OnceLock<SystemCallFn>]>,
    next: AtomicU32,
    illegal: AtomicU32,
    unknown: RwLock<SystemCallFn>,
}

impl SystemCallTable {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(SYSTEM_CALL_SLOTS);
        slots.resize_with(SYSTEM_CALL_SLOTS, OnceLock::new);

        Self {
            slots: slots.into_boxed_slice(),
            next: AtomicU32::new(0),
            illegal: AtomicU32::new(0),
            unknown: RwLock::new(default_unknown_system_call),
        }
    }

    /// Install a handler in the next free slot, returning its tagged id
    pub fn register(&self, handler: SystemCallFn) -> u32 {
        let index = self.next.fetch_add(1, Ordering::AcqRel);
        assert!(
            (index as usize) < SYSTEM_CALL_SLOTS,
            "system call table exhausted"
        );

        // The counter hands each index to exactly one caller
        self.slots[index as usize]
            .set(handler)
            .unwrap_or_else(|_| unreachable!("slot {} installed twice", index));

        SYSTEM_CALL_REGISTERED | index
    }

    /// Allocate an id that deliberately maps to no handler
    pub fn register_illegal(&self) -> u32 {
        SYSTEM_CALL_ILLEGAL | self.illegal.fetch_add(1, Ordering::AcqRel)
    }

    /// Replace the handler used for unregistered ids
    pub fn set_unknown_handler(&self, handler: SystemCallFn) {
        *self.unknown.write() = handler;
    }

    /// Resolve a tagged id to its handler. Ids without the registered
    /// tag (including illegal placeholders) resolve to the
    /// unknown-call handler.
    pub fn get(&self, id: u32) -> SystemCallFn {
        if id & SYSTEM_CALL_REGISTERED == 0 {
            return *self.unknown.read();
        }

        let index = (id & 0xFFFF) as usize;
        self.slots
            .get(index)
            .and_then(|slot| slot.get())
            .copied()
            .unwrap_or(*self.unknown.read())
    }

    /// Number of registered handlers
    pub fn registered(&self) -> u32 {
        self.next.load(Ordering::Acquire)
    }

    /// Number of illegal placeholder ids handed out
    pub fn illegal(&self) -> u32 {
        self.illegal.load(Ordering::Acquire)
    }
}

impl Default for SystemCallTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kcall_a(_core: &mut Core, _ctx: &ExecContext) {}
    fn kcall_b(_core: &mut Core, _ctx: &ExecContext) {}

    #[test]
    fn test_kernel_call_ids_are_consecutive() {
        let table = KernelCallTable::new();

        assert_eq!(table.register("OSReport", kcall_a), 0);
        assert_eq!(table.register("OSPanic", kcall_b), 1);
        assert_eq!(table.register("OSFatal", kcall_a), 2);

        assert_eq!(table.get(0).unwrap().name, "OSReport");
        assert_eq!(table.get(2).unwrap().name, "OSFatal");
        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_system_call_tags() {
        let table = SystemCallTable::new();

        let a = table.register(kcall_a);
        let b = table.register(kcall_b);

        assert_eq!(a, SYSTEM_CALL_REGISTERED);
        assert_eq!(b, SYSTEM_CALL_REGISTERED | 1);

        assert_eq!(table.get(a) as usize, kcall_a as usize);
        assert_eq!(table.get(b) as usize, kcall_b as usize);

        let illegal = table.register_illegal();
        assert_eq!(illegal & SYSTEM_CALL_ILLEGAL, SYSTEM_CALL_ILLEGAL);
        assert_eq!(illegal & SYSTEM_CALL_REGISTERED, 0);

        // Illegal and untagged ids both resolve to the unknown handler
        assert_eq!(
            table.get(illegal) as usize,
            default_unknown_system_call as usize
        );
        assert_eq!(table.get(0x1234) as usize, default_unknown_system_call as usize);

        assert_eq!(table.registered(), 2);
        assert_eq!(table.illegal(), 1);
    }

    #[test]
    fn test_unknown_handler_replaceable() {
        fn custom(_core: &mut Core, _ctx: &ExecContext) {}

        let table = SystemCallTable::new();
        table.set_unknown_handler(custom);

        assert_eq!(table.get(7) as usize, custom as usize);
    }
}

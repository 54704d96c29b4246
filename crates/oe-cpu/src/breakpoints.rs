//! Lock-free copy-on-write breakpoint list.
//!
//! The list is a flat array of (address, flags) pairs terminated by a
//! sentinel address, published through an atomic pointer. Writers build
//! a fresh array and install it with a single compare-and-swap; a writer
//! that loses the race recomputes against the new head and retries.
//! Readers pin an epoch guard, so a snapshot is never freed while a
//! reader may still observe it.

use bitflags::bitflags;
use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};
use std::sync::atomic::Ordering;
use thiserror::Error;

/// Reserved list-terminator address; never a valid breakpoint address
pub const BREAKPOINT_LIST_TERMINATOR: u32 = 0xFFFF_FFFF;

bitflags! {
    /// Who owns a breakpoint at an address; flags accumulate across
    /// repeated inserts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BreakpointFlags: u32 {
        /// Set by the debugger front-end
        const DEBUGGER = 1 << 0;
        /// Set by a trace/profiling client
        const TRACE    = 1 << 1;
        /// Internal one-shot breakpoint, consumed on first hit
        const SYSTEM   = 1 << 31;
    }
}

/// Breakpoint API misuse, rejected before any state mutation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointError {
    #[error("address 0x{0:08x} is reserved for the list terminator")]
    ReservedAddress(u32),

    #[error("at least one breakpoint flag is required")]
    NoFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    address: u32,
    flags: u32,
}

struct Snapshot {
    entries: Box<[Entry]>,
}

impl Snapshot {
    /// Build a snapshot from live entries, appending the terminator
    fn new(mut live: Vec<Entry>) -> Self {
        live.push(Entry {
            address: BREAKPOINT_LIST_TERMINATOR,
            flags: 0,
        });
        Self {
            entries: live.into_boxed_slice(),
        }
    }

    fn live(&self) -> &[Entry] {
        &self.entries[..self.entries.len() - 1]
    }
}

/// The shared breakpoint list
pub struct BreakpointList {
    head: Atomic<Snapshot>,
}

impl BreakpointList {
    pub fn new() -> Self {
        Self {
            head: Atomic::null(),
        }
    }

    /// True if any breakpoint is set
    pub fn has_breakpoints(&self) -> bool {
        let guard = epoch::pin();
        !self.head.load(Ordering::Acquire, &guard).is_null()
    }

    fn load_live<'g>(&self, guard: &'g Guard) -> (Shared<'g, Snapshot>, &'g [Entry]) {
        let head = self.head.load(Ordering::Acquire, guard);
        // SAFETY: a non-null head always points to a snapshot kept alive
        // for at least as long as the pinned guard.
        let live = if head.is_null() {
            &[][..]
        } else {
            unsafe { head.deref() }.live()
        };
        (head, live)
    }

    /// Install a new snapshot in place of `old`. On contention the
    /// caller recomputes from the new head and retries.
    fn try_replace(
        &self,
        old: Shared<'_, Snapshot>,
        live: Vec<Entry>,
        guard: &Guard,
    ) -> bool {
        let replaced = if live.is_empty() {
            self.head
                .compare_exchange(old, Shared::null(), Ordering::AcqRel, Ordering::Acquire, guard)
                .is_ok()
        } else {
            self.head
                .compare_exchange(
                    old,
                    Owned::new(Snapshot::new(live)),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    guard,
                )
                .is_ok()
        };

        if replaced && !old.is_null() {
            // SAFETY: old was atomically unlinked by this thread; no new
            // reader can reach it, and existing readers hold guards.
            unsafe { guard.defer_destroy(old) };
        }

        replaced
    }

    /// Add flags to the breakpoint at `address`, creating it if absent.
    ///
    /// Returns true if the list changed (new address, or new flag bits
    /// at an existing address).
    pub fn add_breakpoint(
        &self,
        address: u32,
        flags: BreakpointFlags,
    ) -> Result<bool, BreakpointError> {
        if address == BREAKPOINT_LIST_TERMINATOR {
            return Err(BreakpointError::ReservedAddress(address));
        }
        if flags.is_empty() {
            return Err(BreakpointError::NoFlags);
        }

        let guard = epoch::pin();

        loop {
            let (head, live) = self.load_live(&guard);
            let mut entries = live.to_vec();

            match entries.iter_mut().find(|e| e.address == address) {
                Some(entry) => {
                    if entry.flags | flags.bits() == entry.flags {
                        return Ok(false);
                    }
                    entry.flags |= flags.bits();
                }
                None => entries.push(Entry {
                    address,
                    flags: flags.bits(),
                }),
            }

            if self.try_replace(head, entries, &guard) {
                return Ok(true);
            }
        }
    }

    /// Remove flag bits from the breakpoint at `address`; the entry
    /// disappears once no flags remain. Returns true if any of the
    /// given bits were present.
    pub fn remove_breakpoint(&self, address: u32, flags: BreakpointFlags) -> bool {
        let guard = epoch::pin();

        loop {
            let (head, live) = self.load_live(&guard);

            let Some(entry) = live.iter().find(|e| e.address == address) else {
                return false;
            };

            if entry.flags & flags.bits() == 0 {
                return false;
            }

            let entries: Vec<Entry> = live
                .iter()
                .filter_map(|e| {
                    if e.address != address {
                        return Some(*e);
                    }
                    let remaining = e.flags & !flags.bits();
                    (remaining != 0).then_some(Entry {
                        address: e.address,
                        flags: remaining,
                    })
                })
                .collect();

            if self.try_replace(head, entries, &guard) {
                return true;
            }
        }
    }

    /// Remove the given flag bits from every breakpoint. Returns true
    /// if the list changed.
    pub fn clear_breakpoints(&self, mask: BreakpointFlags) -> bool {
        let guard = epoch::pin();

        loop {
            let (head, live) = self.load_live(&guard);

            if !live.iter().any(|e| e.flags & mask.bits() != 0) {
                return false;
            }

            let entries: Vec<Entry> = live
                .iter()
                .filter_map(|e| {
                    let remaining = e.flags & !mask.bits();
                    (remaining != 0).then_some(Entry {
                        address: e.address,
                        flags: remaining,
                    })
                })
                .collect();

            if self.try_replace(head, entries, &guard) {
                return true;
            }
        }
    }

    /// Hit check for `address`. Consumes the one-shot system flag as
    /// part of the check, so a racing second hardware thread cannot
    /// observe a stale single-shot breakpoint.
    pub fn pop_breakpoint(&self, address: u32) -> Option<BreakpointFlags> {
        let guard = epoch::pin();

        loop {
            let (head, live) = self.load_live(&guard);

            let entry = live.iter().find(|e| e.address == address)?;
            let hit = BreakpointFlags::from_bits_truncate(entry.flags);

            if !hit.contains(BreakpointFlags::SYSTEM) {
                return Some(hit);
            }

            // Strip the one-shot flag atomically with the hit
            let entries: Vec<Entry> = live
                .iter()
                .filter_map(|e| {
                    if e.address != address {
                        return Some(*e);
                    }
                    let remaining = e.flags & !BreakpointFlags::SYSTEM.bits();
                    (remaining != 0).then_some(Entry {
                        address: e.address,
                        flags: remaining,
                    })
                })
                .collect();

            if self.try_replace(head, entries, &guard) {
                return Some(hit);
            }
        }
    }
}

impl Default for BreakpointList {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BreakpointList {
    fn drop(&mut self) {
        let guard = epoch::pin();
        let head = self.head.swap(Shared::null(), Ordering::AcqRel, &guard);
        if !head.is_null() {
            // SAFETY: the list is being dropped; no other reference
            // remains.
            unsafe { guard.defer_destroy(head) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_pop() {
        let list = BreakpointList::new();
        assert!(!list.has_breakpoints());

        assert!(list
            .add_breakpoint(0x0200_0000, BreakpointFlags::DEBUGGER)
            .unwrap());
        assert!(list.has_breakpoints());

        let hit = list.pop_breakpoint(0x0200_0000).unwrap();
        assert_eq!(hit, BreakpointFlags::DEBUGGER);

        // Non-system breakpoints persist across hits
        assert!(list.pop_breakpoint(0x0200_0000).is_some());
        assert!(list.pop_breakpoint(0x0200_0004).is_none());
    }

    #[test]
    fn test_flags_accumulate() {
        let list = BreakpointList::new();

        assert!(list
            .add_breakpoint(0x100, BreakpointFlags::DEBUGGER)
            .unwrap());
        assert!(list.add_breakpoint(0x100, BreakpointFlags::TRACE).unwrap());
        // Re-adding present flags does not change the list
        assert!(!list
            .add_breakpoint(0x100, BreakpointFlags::DEBUGGER)
            .unwrap());

        let hit = list.pop_breakpoint(0x100).unwrap();
        assert_eq!(hit, BreakpointFlags::DEBUGGER | BreakpointFlags::TRACE);

        // Removing one owner's flag keeps the other's
        assert!(list.remove_breakpoint(0x100, BreakpointFlags::DEBUGGER));
        assert_eq!(
            list.pop_breakpoint(0x100).unwrap(),
            BreakpointFlags::TRACE
        );

        assert!(list.remove_breakpoint(0x100, BreakpointFlags::TRACE));
        assert!(!list.has_breakpoints());
        assert!(!list.remove_breakpoint(0x100, BreakpointFlags::TRACE));
    }

    #[test]
    fn test_one_shot_system_breakpoint() {
        let list = BreakpointList::new();

        list.add_breakpoint(0x200, BreakpointFlags::SYSTEM).unwrap();

        // First hit reports exactly the system flag
        let hit = list.pop_breakpoint(0x200).unwrap();
        assert_eq!(hit, BreakpointFlags::SYSTEM);

        // Consumed: second check at the same address misses
        assert!(list.pop_breakpoint(0x200).is_none());
        assert!(!list.has_breakpoints());
    }

    #[test]
    fn test_system_flag_consumed_keeps_user_flags() {
        let list = BreakpointList::new();

        list.add_breakpoint(0x300, BreakpointFlags::SYSTEM | BreakpointFlags::DEBUGGER)
            .unwrap();

        let hit = list.pop_breakpoint(0x300).unwrap();
        assert!(hit.contains(BreakpointFlags::SYSTEM));
        assert!(hit.contains(BreakpointFlags::DEBUGGER));

        // The debugger breakpoint survives; the one-shot does not
        assert_eq!(
            list.pop_breakpoint(0x300).unwrap(),
            BreakpointFlags::DEBUGGER
        );
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let list = BreakpointList::new();

        assert_eq!(
            list.add_breakpoint(BREAKPOINT_LIST_TERMINATOR, BreakpointFlags::DEBUGGER),
            Err(BreakpointError::ReservedAddress(BREAKPOINT_LIST_TERMINATOR))
        );
        assert_eq!(
            list.add_breakpoint(0x100, BreakpointFlags::empty()),
            Err(BreakpointError::NoFlags)
        );
        assert!(!list.has_breakpoints());
    }

    #[test]
    fn test_clear_by_mask() {
        let list = BreakpointList::new();

        list.add_breakpoint(0x100, BreakpointFlags::DEBUGGER).unwrap();
        list.add_breakpoint(0x200, BreakpointFlags::DEBUGGER | BreakpointFlags::TRACE)
            .unwrap();

        assert!(list.clear_breakpoints(BreakpointFlags::DEBUGGER));
        assert!(list.pop_breakpoint(0x100).is_none());
        assert_eq!(
            list.pop_breakpoint(0x200).unwrap(),
            BreakpointFlags::TRACE
        );

        assert!(list.clear_breakpoints(BreakpointFlags::all()));
        assert!(!list.has_breakpoints());
        assert!(!list.clear_breakpoints(BreakpointFlags::all()));
    }

    #[test]
    fn test_concurrent_adds_no_lost_updates() {
        use std::sync::Arc;

        let list = Arc::new(BreakpointList::new());
        let threads: Vec<_> = (0..4)
            .map(|t| {
                let list = Arc::clone(&list);
                std::thread::spawn(move || {
                    for i in 0..64u32 {
                        let addr = 0x1000 + t * 0x1000 + i * 4;
                        list.add_breakpoint(addr, BreakpointFlags::DEBUGGER).unwrap();
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert!(list.has_breakpoints());
        for t in 0..4u32 {
            for i in 0..64u32 {
                let addr = 0x1000 + t * 0x1000 + i * 4;
                assert!(
                    list.pop_breakpoint(addr).is_some(),
                    "lost breakpoint at 0x{:x}",
                    addr
                );
            }
        }
    }
}

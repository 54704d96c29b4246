//! The reserved 4 GiB guest window and its typed accessors

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::constants::*;
use crate::pages::PageFlags;

/// Errors raised by guest memory accesses
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("access to unmapped guest memory at 0x{addr:08x} (size {size})")]
    Unmapped { addr: u32, size: u32 },

    #[error("unaligned atomic access at 0x{addr:08x}")]
    Unaligned { addr: u32 },

    #[error("failed to reserve the guest address window")]
    ReserveFailed,

    #[error("failed to commit guest memory region at 0x{addr:08x}")]
    CommitFailed { addr: u32 },
}

/// One committed region inside the guest window
#[derive(Debug, Clone, Copy)]
struct Region {
    base: u32,
    size: u32,
    flags: PageFlags,
}

/// The guest physical address space.
///
/// A single contiguous 4 GiB host reservation; the fixed platform RAM
/// regions are committed read-write inside it. All accessors bounds-check
/// against the committed regions and return [`MemoryError::Unmapped`]
/// outside them, which the CPU surfaces as a guest data-access fault.
pub struct AddressSpace {
    base: *mut u8,
    regions: Vec<Region>,
}

// SAFETY: the window is one fixed mapping for the lifetime of the address
// space; interior mutability of guest bytes is inherent to emulating
// shared memory and is synchronized by the guest's own memory model
// (lwarx/stwcx. go through atomic operations below).
unsafe impl Send for AddressSpace {}
unsafe impl Sync for AddressSpace {}

impl AddressSpace {
    /// Reserve the guest window and commit the platform memory regions
    pub fn new() -> Result<Arc<Self>, MemoryError> {
        let base = reserve_window()?;

        let regions = vec![
            Region { base: MEM1_BASE, size: MEM1_SIZE, flags: PageFlags::RWX },
            Region { base: LC_BASE, size: LC_SIZE, flags: PageFlags::RW },
            Region { base: MEM0_BASE, size: MEM0_SIZE, flags: PageFlags::RWX },
            Region { base: MEM2_BASE, size: MEM2_SIZE, flags: PageFlags::RWX },
            Region { base: SRAM1_BASE, size: SRAM1_SIZE, flags: PageFlags::RW },
            Region { base: SRAM0_BASE, size: SRAM0_SIZE, flags: PageFlags::RW },
        ];

        for region in &regions {
            commit_region(base, region.base, region.size).map_err(|e| {
                release_window(base);
                e
            })?;
        }

        tracing::debug!(
            "Reserved guest window at host address 0x{:x}",
            base as usize
        );

        Ok(Arc::new(Self { base, regions }))
    }

    /// Host base address of the guest window
    pub fn host_base(&self) -> usize {
        self.base as usize
    }

    /// Protection flags of the region containing `addr`
    pub fn protection(&self, addr: u32) -> Option<PageFlags> {
        self.regions
            .iter()
            .find(|r| addr >= r.base && addr.wrapping_sub(r.base) < r.size)
            .map(|r| r.flags)
    }

    /// Check whether `[addr, addr + size)` lies inside committed memory
    pub fn is_mapped(&self, addr: u32, size: u32) -> bool {
        self.regions.iter().any(|r| {
            addr >= r.base
                && size <= r.size
                && addr.wrapping_sub(r.base) <= r.size - size
        })
    }

    fn check(&self, addr: u32, size: u32) -> Result<(), MemoryError> {
        if self.is_mapped(addr, size) {
            Ok(())
        } else {
            Err(MemoryError::Unmapped { addr, size })
        }
    }

    /// Translate a guest address to a host pointer
    pub fn translate(&self, addr: u32, size: u32) -> Result<*mut u8, MemoryError> {
        self.check(addr, size)?;
        // SAFETY: addr lies inside the reserved 4 GiB window.
        Ok(unsafe { self.base.add(addr as usize) })
    }

    /// Translate a host address back to a guest address, if it falls
    /// inside the guest window
    pub fn guest_address(&self, host: usize) -> Option<u32> {
        let offset = host.checked_sub(self.base as usize)?;
        if offset < ADDRESS_SPACE_SIZE {
            Some(offset as u32)
        } else {
            None
        }
    }

    /// Read a big-endian u8
    pub fn read_be8(&self, addr: u32) -> Result<u8, MemoryError> {
        let ptr = self.translate(addr, 1)?;
        // SAFETY: translate() validated the range.
        Ok(unsafe { ptr.read() })
    }

    /// Read a big-endian u16
    pub fn read_be16(&self, addr: u32) -> Result<u16, MemoryError> {
        let ptr = self.translate(addr, 2)?;
        // SAFETY: translate() validated the range.
        Ok(u16::from_be(unsafe { (ptr as *const u16).read_unaligned() }))
    }

    /// Read a big-endian u32
    pub fn read_be32(&self, addr: u32) -> Result<u32, MemoryError> {
        let ptr = self.translate(addr, 4)?;
        // SAFETY: translate() validated the range.
        Ok(u32::from_be(unsafe { (ptr as *const u32).read_unaligned() }))
    }

    /// Read a big-endian u64
    pub fn read_be64(&self, addr: u32) -> Result<u64, MemoryError> {
        let ptr = self.translate(addr, 8)?;
        // SAFETY: translate() validated the range.
        Ok(u64::from_be(unsafe { (ptr as *const u64).read_unaligned() }))
    }

    /// Write a big-endian u8
    pub fn write_be8(&self, addr: u32, value: u8) -> Result<(), MemoryError> {
        let ptr = self.translate(addr, 1)?;
        // SAFETY: translate() validated the range.
        unsafe { ptr.write(value) };
        Ok(())
    }

    /// Write a big-endian u16
    pub fn write_be16(&self, addr: u32, value: u16) -> Result<(), MemoryError> {
        let ptr = self.translate(addr, 2)?;
        // SAFETY: translate() validated the range.
        unsafe { (ptr as *mut u16).write_unaligned(value.to_be()) };
        Ok(())
    }

    /// Write a big-endian u32
    pub fn write_be32(&self, addr: u32, value: u32) -> Result<(), MemoryError> {
        let ptr = self.translate(addr, 4)?;
        // SAFETY: translate() validated the range.
        unsafe { (ptr as *mut u32).write_unaligned(value.to_be()) };
        Ok(())
    }

    /// Write a big-endian u64
    pub fn write_be64(&self, addr: u32, value: u64) -> Result<(), MemoryError> {
        let ptr = self.translate(addr, 8)?;
        // SAFETY: translate() validated the range.
        unsafe { (ptr as *mut u64).write_unaligned(value.to_be()) };
        Ok(())
    }

    /// Copy bytes out of guest memory
    pub fn read_bytes(&self, addr: u32, out: &mut [u8]) -> Result<(), MemoryError> {
        let ptr = self.translate(addr, out.len() as u32)?;
        // SAFETY: translate() validated the range; the regions never
        // overlap a caller-supplied slice.
        unsafe { std::ptr::copy_nonoverlapping(ptr, out.as_mut_ptr(), out.len()) };
        Ok(())
    }

    /// Copy bytes into guest memory
    pub fn write_bytes(&self, addr: u32, data: &[u8]) -> Result<(), MemoryError> {
        let ptr = self.translate(addr, data.len() as u32)?;
        // SAFETY: translate() validated the range.
        unsafe { std::ptr::copy_nonoverlapping(data.as_ptr(), ptr, data.len()) };
        Ok(())
    }

    /// Zero a naturally aligned cache line (dcbz)
    pub fn zero_cache_line(&self, addr: u32) -> Result<(), MemoryError> {
        let line = addr & !(CACHE_LINE_SIZE - 1);
        let ptr = self.translate(line, CACHE_LINE_SIZE)?;
        // SAFETY: translate() validated the range.
        unsafe { std::ptr::write_bytes(ptr, 0, CACHE_LINE_SIZE as usize) };
        Ok(())
    }

    /// Atomically replace the word at `addr` if it still holds `expected`.
    ///
    /// Values are logical (already byte-swapped) guest values; this is the
    /// store half of the lwarx/stwcx. reservation pair. The address must
    /// be word aligned.
    pub fn compare_exchange_be32(
        &self,
        addr: u32,
        expected: u32,
        new: u32,
    ) -> Result<bool, MemoryError> {
        if addr & 3 != 0 {
            return Err(MemoryError::Unaligned { addr });
        }
        let ptr = self.translate(addr, 4)?;
        // SAFETY: the pointer is valid, word aligned, and AtomicU32 has
        // the same layout as u32.
        let atomic = unsafe { &*(ptr as *const AtomicU32) };
        Ok(atomic
            .compare_exchange(
                expected.to_be(),
                new.to_be(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok())
    }
}

impl Drop for AddressSpace {
    fn drop(&mut self) {
        release_window(self.base);
    }
}

#[cfg(unix)]
fn reserve_window() -> Result<*mut u8, MemoryError> {
    // SAFETY: plain anonymous reservation, no existing mapping touched.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            ADDRESS_SPACE_SIZE,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(MemoryError::ReserveFailed);
    }
    Ok(ptr as *mut u8)
}

#[cfg(unix)]
fn commit_region(base: *mut u8, addr: u32, size: u32) -> Result<(), MemoryError> {
    // SAFETY: the range lies inside our own reservation.
    let rc = unsafe {
        libc::mprotect(
            base.add(addr as usize) as *mut libc::c_void,
            size as usize,
            libc::PROT_READ | libc::PROT_WRITE,
        )
    };
    if rc != 0 {
        return Err(MemoryError::CommitFailed { addr });
    }
    Ok(())
}

#[cfg(unix)]
fn release_window(base: *mut u8) {
    // SAFETY: releasing the exact reservation made in reserve_window.
    unsafe {
        libc::munmap(base as *mut libc::c_void, ADDRESS_SPACE_SIZE);
    }
}

#[cfg(not(unix))]
compile_error!("oe-memory requires a POSIX host for the guest address window");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_access() {
        let mem = AddressSpace::new().unwrap();
        assert!(matches!(
            mem.read_be32(0x0400_0000),
            Err(MemoryError::Unmapped { .. })
        ));
        // Straddling the end of MEM1 is also invalid
        assert!(mem.read_be32(MEM1_BASE + MEM1_SIZE - 2).is_err());
    }

    #[test]
    fn test_be_byte_order() {
        let mem = AddressSpace::new().unwrap();
        mem.write_be32(MEM2_BASE, 0x0123_4567).unwrap();
        assert_eq!(mem.read_be8(MEM2_BASE).unwrap(), 0x01);
        assert_eq!(mem.read_be8(MEM2_BASE + 3).unwrap(), 0x67);
        assert_eq!(mem.read_be16(MEM2_BASE).unwrap(), 0x0123);
    }

    #[test]
    fn test_compare_exchange() {
        let mem = AddressSpace::new().unwrap();
        mem.write_be32(MEM2_BASE, 100).unwrap();

        assert!(mem.compare_exchange_be32(MEM2_BASE, 100, 200).unwrap());
        assert_eq!(mem.read_be32(MEM2_BASE).unwrap(), 200);

        // Stale expected value fails and leaves memory untouched
        assert!(!mem.compare_exchange_be32(MEM2_BASE, 100, 300).unwrap());
        assert_eq!(mem.read_be32(MEM2_BASE).unwrap(), 200);

        assert!(matches!(
            mem.compare_exchange_be32(MEM2_BASE + 2, 0, 0),
            Err(MemoryError::Unaligned { .. })
        ));
    }

    #[test]
    fn test_guest_address_translation() {
        let mem = AddressSpace::new().unwrap();
        let host = mem.translate(MEM2_BASE + 0x10, 4).unwrap();
        assert_eq!(mem.guest_address(host as usize), Some(MEM2_BASE + 0x10));
        assert_eq!(mem.guest_address(mem.host_base().wrapping_sub(1)), None);
    }
}

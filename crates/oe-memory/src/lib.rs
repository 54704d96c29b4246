//! Guest address space management.
//!
//! The emulated machine sees a flat 32-bit physical address space. We
//! reserve one contiguous 4 GiB host window at startup and commit the
//! platform's fixed RAM regions inside it, so a guest address is always
//! `window base + address` on the host side. The host-exception bridge in
//! the CPU crate relies on this layout to attribute stray host faults back
//! to guest addresses.

pub mod address_space;
pub mod constants;
pub mod pages;

pub use address_space::{AddressSpace, MemoryError};
pub use pages::PageFlags;

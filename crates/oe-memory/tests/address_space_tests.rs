//! Tests for the 32-bit guest address window

use oe_memory::{constants::*, AddressSpace, MemoryError};

#[test]
fn test_committed_region_boundaries() {
    let mem = AddressSpace::new().unwrap();

    // MEM1 start and end
    mem.write_be32(MEM1_BASE, 0xDEADBEEF).unwrap();
    assert_eq!(mem.read_be32(MEM1_BASE).unwrap(), 0xDEADBEEF);

    let addr = MEM1_BASE + MEM1_SIZE - 4;
    mem.write_be32(addr, 0xCAFEBABE).unwrap();
    assert_eq!(mem.read_be32(addr).unwrap(), 0xCAFEBABE);

    // MEM2 spans 2 GB
    let addr = MEM2_BASE + MEM2_SIZE - 8;
    mem.write_be64(addr, 0x1234_5678_90AB_CDEF).unwrap();
    assert_eq!(mem.read_be64(addr).unwrap(), 0x1234_5678_90AB_CDEF);
}

#[test]
fn test_region_isolation() {
    let mem = AddressSpace::new().unwrap();

    mem.write_be32(MEM1_BASE + 0x1000, 0x1111_1111).unwrap();
    mem.write_be32(MEM2_BASE + 0x1000, 0x2222_2222).unwrap();
    mem.write_be32(SRAM0_BASE + 0x1000, 0x3333_3333).unwrap();

    assert_eq!(mem.read_be32(MEM1_BASE + 0x1000).unwrap(), 0x1111_1111);
    assert_eq!(mem.read_be32(MEM2_BASE + 0x1000).unwrap(), 0x2222_2222);
    assert_eq!(mem.read_be32(SRAM0_BASE + 0x1000).unwrap(), 0x3333_3333);
}

#[test]
fn test_unmapped_gap_between_regions() {
    let mem = AddressSpace::new().unwrap();

    // The hole between LC and MEM0 is not committed
    let gap = LC_BASE + LC_SIZE + 0x1000;
    assert!(matches!(
        mem.read_be32(gap),
        Err(MemoryError::Unmapped { .. })
    ));
    assert!(mem.write_be32(gap, 0).is_err());
}

#[test]
fn test_unaligned_access() {
    let mem = AddressSpace::new().unwrap();

    let addr = MEM2_BASE + 1;
    mem.write_be32(addr, 0x1234_5678).unwrap();
    assert_eq!(mem.read_be32(addr).unwrap(), 0x1234_5678);

    mem.write_be64(addr, 0xDEAD_BEEF_CAFE_BABE).unwrap();
    assert_eq!(mem.read_be64(addr).unwrap(), 0xDEAD_BEEF_CAFE_BABE);
}

#[test]
fn test_byte_copies() {
    let mem = AddressSpace::new().unwrap();

    let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
    mem.write_bytes(MEM2_BASE + 0x100, &data).unwrap();

    let mut out = [0u8; 8];
    mem.read_bytes(MEM2_BASE + 0x100, &mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_cache_line_zeroing() {
    let mem = AddressSpace::new().unwrap();

    let addr = MEM2_BASE + 0x200;
    for i in 0..CACHE_LINE_SIZE {
        mem.write_be8(addr + i, 0xFF).unwrap();
    }

    // dcbz aligns down to the containing line
    mem.zero_cache_line(addr + 5).unwrap();
    for i in 0..CACHE_LINE_SIZE {
        assert_eq!(mem.read_be8(addr + i).unwrap(), 0);
    }
}

//! Integration tests for the virtual memory address space.

use rvhart::common::{AccessType, MemFault, PAGE_SIZE};
use rvhart::memory::VirtualMemory;

fn small_mem() -> VirtualMemory {
    VirtualMemory::new(64 * PAGE_SIZE)
}

/// Tests a stored byte is read back.
#[test]
fn test_byte_round_trip() {
    let mut mem = small_mem();
    mem.store_u8(0x1234, 0xAB).unwrap();
    assert_eq!(mem.load_u8(0x1234).unwrap(), 0xAB);
    assert_eq!(mem.load_u8(0x1235).unwrap(), 0, "fresh pages are zeroed");
}

/// Tests loads of unmapped memory fault without committing pages.
#[test]
fn test_load_unmapped_faults() {
    let mem = small_mem();
    let err = mem.load_u8(0x5000).unwrap_err();
    assert_eq!(
        err,
        MemFault::PageFault {
            addr: 0x5000,
            page_id: 5,
            access: AccessType::Read,
        }
    );
    assert_eq!(mem.physical().page_count(), 0);
}

/// Tests instruction fetches report fetch faults.
#[test]
fn test_fetch_unmapped_faults() {
    let mem = small_mem();
    let err = mem.fetch_u32(0x8000).unwrap_err();
    assert!(matches!(
        err,
        MemFault::PageFault {
            access: AccessType::Fetch,
            ..
        }
    ));
}

/// Tests multi-byte values are stored little-endian.
#[test]
fn test_little_endian_layout() {
    let mut mem = small_mem();
    mem.store_u32(0x100, 0x1122_3344).unwrap();
    assert_eq!(mem.load_bytes(0x100, 4).unwrap(), vec![0x44, 0x33, 0x22, 0x11]);

    mem.store_u64(0x200, 0x0102_0304_0506_0708).unwrap();
    assert_eq!(
        mem.load_bytes(0x200, 8).unwrap(),
        vec![0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
    );

    mem.store_u16(0x300, 0xBEEF).unwrap();
    assert_eq!(mem.load_u8(0x300).unwrap(), 0xEF);
    assert_eq!(mem.load_u8(0x301).unwrap(), 0xBE);
}

/// Tests aligned fast-path accesses for every width.
#[test]
fn test_aligned_round_trips() {
    let mut mem = small_mem();
    mem.store_u16(0x10, 0xCAFE).unwrap();
    mem.store_u32(0x20, 0xDEAD_BEEF).unwrap();
    mem.store_u64(0x28, 0x0123_4567_89AB_CDEF).unwrap();

    assert_eq!(mem.load_u16(0x10).unwrap(), 0xCAFE);
    assert_eq!(mem.load_u32(0x20).unwrap(), 0xDEAD_BEEF);
    assert_eq!(mem.load_u64(0x28).unwrap(), 0x0123_4567_89AB_CDEF);
    assert_eq!(mem.fetch_u32(0x20).unwrap(), 0xDEAD_BEEF);
}

/// Tests accesses that straddle a page boundary.
#[test]
fn test_page_crossing_round_trips() {
    let mut mem = small_mem();
    let boundary = 3 * PAGE_SIZE;

    for start in boundary - 7..boundary {
        mem.store_u64(start, 0xA1B2_C3D4_E5F6_0718).unwrap();
        assert_eq!(mem.load_u64(start).unwrap(), 0xA1B2_C3D4_E5F6_0718);
    }
    for start in boundary - 3..boundary {
        mem.store_u32(start, 0x8765_4321).unwrap();
        assert_eq!(mem.load_u32(start).unwrap(), 0x8765_4321);
    }
    mem.store_u16(boundary - 1, 0x55AA).unwrap();
    assert_eq!(mem.load_u16(boundary - 1).unwrap(), 0x55AA);
    assert_eq!(mem.load_u8(boundary - 1).unwrap(), 0xAA);
    assert_eq!(mem.load_u8(boundary).unwrap(), 0x55);

    assert_eq!(mem.physical().page_count(), 2);
}

/// Tests a page-crossing load faults if the second page is not mapped.
#[test]
fn test_page_crossing_load_into_unmapped_page() {
    let mut mem = small_mem();
    mem.store_u8(PAGE_SIZE - 1, 1).unwrap();
    let err = mem.load_u32(PAGE_SIZE - 2).unwrap_err();
    assert!(matches!(err, MemFault::PageFault { page_id: 1, .. }));
}

/// Tests a byte sequence crossing several pages.
#[test]
fn test_sequence_round_trip_across_pages() {
    let mut mem = small_mem();
    let data: Vec<u8> = (0..3 * PAGE_SIZE as usize).map(|i| (i % 251) as u8).collect();
    let addr = PAGE_SIZE / 2;

    mem.store_bytes(addr, &data).unwrap();
    assert_eq!(mem.load_bytes(addr, data.len()).unwrap(), data);
    assert_eq!(mem.physical().page_count(), 4);
}

/// Tests an empty sequence store is a no-op.
#[test]
fn test_empty_sequence_is_noop() {
    let mut mem = small_mem();
    mem.store_bytes(0x4000, &[]).unwrap();
    assert_eq!(mem.physical().page_count(), 0);
    assert_eq!(mem.load_bytes(0x4000, 0).unwrap(), Vec::<u8>::new());
}

/// Tests occupancy after a store at the start of a page.
#[test]
fn test_occupancy_sequential_fill() {
    let mut mem = small_mem();
    mem.store_bytes(0x2000, &[1; 10]).unwrap();
    assert_eq!(mem.physical().page(2).unwrap().free_pointer(), 10);

    mem.store_bytes(0x200A, &[2; 6]).unwrap();
    assert_eq!(mem.physical().page(2).unwrap().free_pointer(), 16);
}

/// Tests a store beyond the free pointer also counts the gap as occupied.
#[test]
fn test_occupancy_gap_is_filled() {
    let mut mem = small_mem();
    mem.store_bytes(0x2000 + 100, &[7; 10]).unwrap();
    assert_eq!(mem.physical().page(2).unwrap().free_pointer(), 110);
}

/// Tests a store inside the occupied prefix only extends past its end.
#[test]
fn test_occupancy_overlap() {
    let mut mem = small_mem();
    mem.store_bytes(0x2000, &[1; 32]).unwrap();
    mem.store_bytes(0x2000 + 8, &[2; 8]).unwrap();
    assert_eq!(mem.physical().page(2).unwrap().free_pointer(), 32);

    mem.store_bytes(0x2000 + 24, &[3; 16]).unwrap();
    assert_eq!(mem.physical().page(2).unwrap().free_pointer(), 40);
}

/// Tests occupancy carries over into the following pages.
#[test]
fn test_occupancy_across_pages() {
    let mut mem = small_mem();
    let start = 2 * PAGE_SIZE - 16;
    mem.store_bytes(start, &vec![9; PAGE_SIZE as usize + 32]).unwrap();

    assert_eq!(mem.physical().page(1).unwrap().free_pointer(), PAGE_SIZE);
    assert_eq!(mem.physical().page(2).unwrap().free_pointer(), PAGE_SIZE);
    assert_eq!(mem.physical().page(3).unwrap().free_pointer(), 16);
}

/// Tests single-byte stores do not touch occupancy.
#[test]
fn test_scalar_store_leaves_occupancy() {
    let mut mem = small_mem();
    mem.store_u64(0x3000, u64::MAX).unwrap();
    assert_eq!(mem.physical().page(3).unwrap().free_pointer(), 0);
}

/// Tests the bump allocator hands out consecutive blocks.
#[test]
fn test_next_continuous_block() {
    let mut mem = small_mem();
    let first = mem.next_continuous_block();
    assert_eq!(first.val(), 0);

    mem.store_bytes(first.val(), &[1; 100]).unwrap();
    let second = mem.next_continuous_block();
    assert_eq!(second.val(), 100);

    mem.store_bytes(second.val(), &vec![2; PAGE_SIZE as usize]).unwrap();
    let third = mem.next_continuous_block();
    assert_eq!(third.val(), 100 + PAGE_SIZE);

    assert_eq!(mem.load_u8(99).unwrap(), 1);
    assert_eq!(mem.load_u8(100).unwrap(), 2);
}

/// Tests the bump allocator continues after data placed elsewhere.
#[test]
fn test_next_continuous_block_after_segment() {
    let mut mem = small_mem();
    mem.store_bytes(0x10000, &[0xAA; 64]).unwrap();
    assert_eq!(mem.next_continuous_block().val(), 0x10040);
}

/// Tests stores fail once the capacity ceiling is reached.
#[test]
fn test_store_capacity_exceeded() {
    let mut mem = VirtualMemory::new(2 * PAGE_SIZE);
    mem.store_u8(0, 1).unwrap();
    mem.store_u8(PAGE_SIZE, 1).unwrap();
    let err = mem.store_u8(2 * PAGE_SIZE, 1).unwrap_err();
    assert!(matches!(err, MemFault::CapacityExceeded { page_id: 2, .. }));

    let err = mem.store_bytes(10 * PAGE_SIZE, &[1, 2, 3]).unwrap_err();
    assert!(matches!(err, MemFault::CapacityExceeded { page_id: 10, .. }));
}

/// Tests address translation splits id and offset.
#[test]
fn test_translate() {
    assert_eq!(VirtualMemory::translate(0x1_2345), (0x12, 0x345));
    assert_eq!(VirtualMemory::translate(0), (0, 0));
}

/// Tests the default address space uses the 16 GiB ceiling.
#[test]
fn test_default_capacity() {
    let mem = VirtualMemory::default();
    assert_eq!(mem.physical().capacity(), 16 * 1024 * 1024 * 1024);
}

/// Tests a sequence store cut short by the ceiling still records the
/// bytes it did write as occupied.
#[test]
fn test_partial_store_tracks_written_prefix() {
    let mut mem = VirtualMemory::new(PAGE_SIZE);
    let err = mem.store_bytes(PAGE_SIZE - 8, &[0xAB; 16]).unwrap_err();
    assert!(matches!(err, MemFault::CapacityExceeded { page_id: 1, .. }));

    assert_eq!(mem.load_bytes(PAGE_SIZE - 8, 8).unwrap(), vec![0xAB; 8]);
    assert_eq!(mem.physical().page(0).unwrap().free_pointer(), PAGE_SIZE);
    assert_eq!(mem.next_continuous_block().val(), PAGE_SIZE);
}

/// Tests a sequence store that fails on its first page changes nothing.
#[test]
fn test_failed_store_leaves_occupancy() {
    let mut mem = VirtualMemory::new(0);
    assert!(mem.store_bytes(0x2000, &[1, 2, 3]).is_err());
    assert_eq!(mem.physical().page_count(), 0);
    assert_eq!(mem.next_continuous_block().val(), 0);
}

/// Tests an oversized bulk load faults instead of reserving the length
/// up front.
#[test]
fn test_huge_load_faults() {
    let mut mem = VirtualMemory::new(PAGE_SIZE);
    let err = mem.load_bytes(0x5000, usize::MAX).unwrap_err();
    assert!(matches!(
        err,
        MemFault::PageFault {
            page_id: 5,
            access: AccessType::Read,
            ..
        }
    ));

    mem.store_u8(0, 7).unwrap();
    let err = mem.load_bytes(0, usize::MAX).unwrap_err();
    assert!(matches!(err, MemFault::PageFault { page_id: 1, .. }));
}

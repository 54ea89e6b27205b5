//! Unit tests for physical page metadata.

use rvhart::common::PAGE_SIZE;
use rvhart::memory::Page;

/// Tests a new page is empty and zero-filled.
#[test]
fn test_new_page() {
    let page = Page::new(7);
    assert_eq!(page.id(), 7);
    assert_eq!(page.free_pointer(), 0);
    assert_eq!(page.occupied_size(), 0);
    assert_eq!(page.free_size(), PAGE_SIZE);
    assert_eq!(page.bytes().len() as u64, PAGE_SIZE);
    assert!(page.bytes().iter().all(|b| *b == 0));
}

/// Tests derived sizes follow the free pointer.
#[test]
fn test_set_free_pointer() {
    let mut page = Page::new(0);
    page.set_free_pointer(100);
    assert_eq!(page.occupied_size(), 100);
    assert_eq!(page.free_size(), PAGE_SIZE - 100);

    page.set_free_pointer(PAGE_SIZE);
    assert_eq!(page.occupied_size(), PAGE_SIZE);
    assert_eq!(page.free_size(), 0);
}

/// Tests the free pointer cannot move past the end of the page.
#[test]
#[should_panic]
fn test_free_pointer_out_of_range() {
    let mut page = Page::new(0);
    page.set_free_pointer(PAGE_SIZE + 1);
}

/// Tests page storage is writable.
#[test]
fn test_page_bytes_mut() {
    let mut page = Page::new(1);
    page.bytes_mut()[10] = 0xAB;
    assert_eq!(page.bytes()[10], 0xAB);
}

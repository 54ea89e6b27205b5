//! Hex dumps of loaded memory.

/// Formats `bytes` as 16-byte hex rows labelled with their address.
///
/// Row addresses wrap at the top of the address space, like the loads that
/// produced the bytes.
pub fn hex_lines(base: u64, bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, row)| {
            let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
            let addr = base.wrapping_add((i * 16) as u64);
            format!("{:#012x}: {}", addr, hex.join(" "))
        })
        .collect()
}

//! Feeds arbitrary bytes to the binary model reader.
//!
//! The reader must reject malformed input with an error, never a panic.
//!
//! ```sh
//! cargo +nightly fuzz run fuzz_binary_read
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use vw_slim::io::{read_binary, BinaryReadOptions};

/// Largest table the target lets the reader allocate.
const MAX_FUZZ_BITS: u32 = 24;

fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// `num_bits` as the reader will see it: after the version and id strings,
/// the model character and both labels.
fn num_bits(data: &[u8]) -> Option<u32> {
    let mut at = 0usize;
    for _ in 0..2 {
        let len = le_u32(data, at)? as usize;
        at = at.checked_add(4)?.checked_add(len)?;
    }
    le_u32(data, at.checked_add(1 + 4 + 4)?)
}

fuzz_target!(|data: &[u8]| {
    // Keep runs fast: skip headers that ask for a huge weight table.
    if num_bits(data).is_some_and(|bits| bits > MAX_FUZZ_BITS) {
        return;
    }
    let _ = read_binary(Cursor::new(data), &BinaryReadOptions::verified());
});

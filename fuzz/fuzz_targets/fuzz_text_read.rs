//! Feeds arbitrary text to the readable model loader.
//!
//! ```sh
//! cargo +nightly fuzz run fuzz_text_read
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

use vw_slim::io::load_text;

fuzz_target!(|data: &str| {
    // Cap table size the same way as the binary target.
    let wide = data.lines().filter(|l| l.contains("bits:")).any(|l| {
        l.split(':')
            .nth(1)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .is_some_and(|bits| bits > 24)
    });
    if wide {
        return;
    }
    let _ = load_text(data.lines());
});

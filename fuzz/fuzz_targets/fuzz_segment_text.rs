//! Fuzz target: `DisplayBuffer::push_str`
//!
//! Pushes arbitrary text through the display buffer and checks that only
//! the cell bytes and the colon byte of display RAM are ever written.
//!
//! cargo fuzz run fuzz_segment_text

#![no_main]

use libfuzzer_sys::fuzz_target;
use segclock::display::DisplayBuffer;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut buf = DisplayBuffer::new();
    buf.push_str(text);

    let raw = buf.as_bytes();
    for (i, byte) in raw.iter().enumerate() {
        match i {
            0 | 2 | 6 | 8 => {}
            4 => assert!(*byte == 0 || *byte == 0x02, "colon byte {byte:#04x}"),
            _ => assert_eq!(*byte, 0, "stray write at offset {i}"),
        }
    }

    // Clearing always returns to a blank row.
    buf.clear();
    assert_eq!(buf, DisplayBuffer::new());
});

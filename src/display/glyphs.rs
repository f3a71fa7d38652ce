//! Character → 7-segment bitmask table.
//!
//! Bit layout is the usual `.gfedcba` (bit 7 is the decimal point and is
//! never set here). Letters are lowercase approximations; anything not in
//! the table renders blank.

/// Decimal-point bit within a cell.
pub const DP: u8 = 0b1000_0000;

/// Blank cell.
pub const BLANK: u8 = 0x00;

/// Look up the segment pattern for `c` (case-insensitive).
///
/// Returns `None` for characters that have no glyph.
pub fn glyph(c: char) -> Option<u8> {
    let bits = match c.to_ascii_lowercase() {
        ' ' => 0x00,
        '-' => 0x40,
        '0' => 0x3F,
        '1' => 0x06,
        '2' => 0x5B,
        '3' => 0x4F,
        '4' => 0x66,
        '5' => 0x6D,
        '6' => 0x7D,
        '7' => 0x07,
        '8' => 0x7F,
        '9' => 0x6F,
        'a' => 0x77,
        'b' => 0x7C,
        'c' => 0x39,
        'd' => 0x5E,
        'e' => 0x79,
        'f' => 0x71,
        'g' => 0x3D,
        'h' => 0x74,
        'i' => 0x30,
        'j' => 0x1E,
        'k' => 0x75,
        'l' => 0x38,
        'm' => 0x15,
        'n' => 0x54,
        'o' => 0x5C,
        'p' => 0x73,
        'q' => 0x67,
        'r' => 0x50,
        's' => 0x6D,
        't' => 0x78,
        'u' => 0x1C,
        'v' => 0x3E,
        'w' => 0x2A,
        'x' => 0x76,
        'y' => 0x6E,
        'z' => 0x5B,
        _ => return None,
    };
    Some(bits)
}

//! Segment renderer for a 4-digit display with centre colon.
//!
//! The display controller exposes 16 bytes of RAM. Four of them hold the
//! character cells (offsets 0, 2, 6, 8), one holds the colon (offset 4).
//!
//! ```text
//!   RAM offset:   0    2    4    6    8
//!                [d0] [d1]  :  [d2] [d3]
//! ```
//!
//! Text is fed through a "push" model: each character scrolls the row one
//! cell to the left and lands in the rightmost cell, except that a `.`
//! attaches to the rightmost cell when that cell has no point yet. Pushing
//! an arbitrary-length string therefore leaves its last four cells visible,
//! and `12.5` occupies three cells, not four.

use core::fmt::Write;

use heapless::String;

use super::glyphs::{self, BLANK, DP};
use crate::app::ports::DisplayPort;
use crate::calendar::CalendarTime;

/// Size of the controller's display RAM.
pub const DISPLAY_RAM_LEN: usize = 16;

/// Number of character cells.
pub const CELLS: usize = 4;

const CELL_OFFSETS: [usize; CELLS] = [0, 2, 6, 8];
const COLON_OFFSET: usize = 4;
const COLON_ON: u8 = 0x02;

/// Progress animation source: a bar that fills from the left.
const PROGRESS_PATTERN: &str = "----    ";
const PROGRESS_PERIOD: u32 = 5;

// ═══════════════════════════════════════════════════════════════
//  Display buffer
// ═══════════════════════════════════════════════════════════════

/// Shadow copy of display RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBuffer {
    ram: [u8; DISPLAY_RAM_LEN],
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffer {
    pub const fn new() -> Self {
        Self {
            ram: [0; DISPLAY_RAM_LEN],
        }
    }

    pub fn as_bytes(&self) -> &[u8; DISPLAY_RAM_LEN] {
        &self.ram
    }

    /// Segment bits of cell `index`, decimal point excluded. Cells past
    /// the last one read as blank, matching [`put`](Self::put).
    pub fn segments(&self, index: usize) -> u8 {
        self.cell(index) & !DP
    }

    /// Whether cell `index` has its decimal point lit.
    pub fn has_point(&self, index: usize) -> bool {
        self.cell(index) & DP != 0
    }

    fn cell(&self, index: usize) -> u8 {
        CELL_OFFSETS.get(index).map_or(BLANK, |&offset| self.ram[offset])
    }

    pub fn points(&self) -> [bool; CELLS] {
        core::array::from_fn(|i| self.has_point(i))
    }

    pub fn colon(&self) -> bool {
        self.ram[COLON_OFFSET] == COLON_ON
    }

    /// Blank every cell and turn the colon off.
    pub fn clear(&mut self) {
        self.ram = [0; DISPLAY_RAM_LEN];
    }

    /// Write one character into cell `index`.
    ///
    /// A glyph replaces the cell (point included), `.` lights the cell's
    /// point, `:` / `;` switch the colon on / off regardless of `index`.
    /// Characters without a glyph blank the cell. Indices past the last
    /// cell are ignored.
    pub fn put(&mut self, c: char, index: usize) {
        if index >= CELLS {
            return;
        }
        let offset = CELL_OFFSETS[index];
        match c {
            '.' => self.ram[offset] |= DP,
            ':' => self.ram[COLON_OFFSET] = COLON_ON,
            ';' => self.ram[COLON_OFFSET] = 0,
            _ => self.ram[offset] = glyphs::glyph(c).unwrap_or(BLANK),
        }
    }

    /// Feed one character through the push model.
    pub fn push(&mut self, c: char) {
        if matches!(c, ':' | ';') {
            self.put(c, 0);
            return;
        }
        if c != '.' || self.has_point(CELLS - 1) {
            self.scroll();
        }
        self.put(c, CELLS - 1);
    }

    pub fn push_str(&mut self, text: &str) {
        for c in text.chars() {
            self.push(c);
        }
    }

    /// Shift every cell one to the left and blank the rightmost.
    fn scroll(&mut self) {
        for i in 0..CELLS - 1 {
            self.ram[CELL_OFFSETS[i]] = self.ram[CELL_OFFSETS[i + 1]];
        }
        self.ram[CELL_OFFSETS[CELLS - 1]] = BLANK;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Pure helpers
// ═══════════════════════════════════════════════════════════════

/// Colon heartbeat: lit on even seconds.
pub fn colon_for_second(second: u8) -> bool {
    second % 2 == 0
}

/// Moving-dot animation for the clock face.
///
/// `second + 4` is tested against `0b0100 << (3 - i)` for cell `i`, which
/// walks a pair of dots from right to left once every 16 seconds.
pub fn breathing_dots(second: u8) -> [bool; CELLS] {
    let n = u32::from(second) + 4;
    core::array::from_fn(|i| n & (0b0100 << (3 - i)) != 0)
}

/// Four-character window of the progress bar for frame `count`.
pub fn progress_frame(count: u32) -> &'static str {
    let start = (4 - count % PROGRESS_PERIOD) as usize;
    &PROGRESS_PATTERN[start..start + CELLS]
}

// ═══════════════════════════════════════════════════════════════
//  Renderer
// ═══════════════════════════════════════════════════════════════

/// Renders time, date, year, text and progress frames and flushes each one
/// to the display in full.
pub struct SegmentRenderer {
    buffer: DisplayBuffer,
}

impl Default for SegmentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentRenderer {
    pub const fn new() -> Self {
        Self {
            buffer: DisplayBuffer::new(),
        }
    }

    /// The last buffer flushed to the display.
    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    /// `HHMM` with a blinking colon, the breathing dots, and a persistent
    /// point on the last digit while `sync_error` is set.
    pub fn render_time(&mut self, now: &CalendarTime, sync_error: bool, display: &mut impl DisplayPort) {
        let mut text: String<8> = String::new();
        let _ = write!(text, "{:02}{:02}", now.hour, now.minute);

        self.buffer.clear();
        self.buffer.put(if colon_for_second(now.second) { ':' } else { ';' }, 0);
        self.buffer.push_str(&text);
        if sync_error {
            self.buffer.put('.', CELLS - 1);
        }
        for (i, lit) in breathing_dots(now.second).into_iter().enumerate() {
            if lit {
                self.buffer.put('.', i);
            }
        }
        self.flush(display);
    }

    /// `MM.DD`
    pub fn render_date(&mut self, now: &CalendarTime, display: &mut impl DisplayPort) {
        let mut text: String<8> = String::new();
        let _ = write!(text, "{:02}.{:02}", now.month, now.day);
        self.render_text(&text, display);
    }

    /// `YYYY`
    pub fn render_year(&mut self, now: &CalendarTime, display: &mut impl DisplayPort) {
        let mut text: String<8> = String::new();
        let _ = write!(text, "{:04}", now.year);
        self.render_text(&text, display);
    }

    /// Arbitrary text, colon off; only the last four cells stay visible.
    pub fn render_text(&mut self, text: &str, display: &mut impl DisplayPort) {
        self.buffer.clear();
        self.buffer.push_str(text);
        self.flush(display);
    }

    /// One frame of the connecting animation.
    pub fn render_progress(&mut self, count: u32, display: &mut impl DisplayPort) {
        self.render_text(progress_frame(count), display);
    }

    /// Blank display, colon off.
    pub fn clear(&mut self, display: &mut impl DisplayPort) {
        self.buffer.clear();
        self.flush(display);
    }

    fn flush(&self, display: &mut impl DisplayPort) {
        display.write(self.buffer.as_bytes());
    }
}

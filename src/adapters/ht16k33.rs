//! HT16K33 LED backpack driver.
//!
//! Implements [`DisplayPort`] over any `embedded_hal` 1.0 I2C bus. The
//! controller takes single-byte commands; display RAM is written as a
//! register address (0x00) followed by the 16 RAM bytes.
//!
//! | Command        | Byte                          |
//! |----------------|-------------------------------|
//! | Oscillator on  | `0x21`                        |
//! | Display setup  | `0x80 \| 0x01 \| rate << 1`   |
//! | Brightness     | `0xE0 \| level`               |
//!
//! Bus errors never reach the core: they are logged and the frame is
//! dropped. The next render rewrites the whole RAM anyway.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::DisplayPort;
use crate::display::DISPLAY_RAM_LEN;

/// Backpack address with no solder jumpers bridged.
pub const DEFAULT_ADDRESS: u8 = 0x70;

const CMD_OSCILLATOR_ON: u8 = 0x21;
const CMD_DISPLAY_SETUP: u8 = 0x80;
const DISPLAY_ON: u8 = 0x01;
const CMD_BRIGHTNESS: u8 = 0xE0;
const RAM_ADDRESS: u8 = 0x00;

const MAX_BRIGHTNESS: u8 = 0x0F;
const MAX_BLINK_RATE: u8 = 0x03;

pub struct Ht16k33<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ht16k33<I2C> {
    /// Start the oscillator and switch the display on at full brightness,
    /// not blinking.
    pub fn new(i2c: I2C, address: u8) -> Result<Self, I2C::Error> {
        let mut dev = Self { i2c, address };
        dev.command(CMD_OSCILLATOR_ON)?;
        dev.command(CMD_DISPLAY_SETUP | DISPLAY_ON)?;
        dev.command(CMD_BRIGHTNESS | MAX_BRIGHTNESS)?;
        info!("HT16K33: ready at 0x{:02X}", address);
        Ok(dev)
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, byte: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[byte])
    }

    fn command_logged(&mut self, byte: u8, what: &str) {
        if let Err(e) = self.command(byte) {
            warn!("HT16K33: {} failed: {:?}", what, e);
        }
    }
}

impl<I2C: I2c> DisplayPort for Ht16k33<I2C> {
    fn write(&mut self, buffer: &[u8; DISPLAY_RAM_LEN]) {
        let mut frame = [0u8; DISPLAY_RAM_LEN + 1];
        frame[0] = RAM_ADDRESS;
        frame[1..].copy_from_slice(buffer);
        if let Err(e) = self.i2c.write(self.address, &frame) {
            warn!("HT16K33: RAM write failed: {:?}", e);
        }
    }

    fn set_brightness(&mut self, level: u8) {
        self.command_logged(CMD_BRIGHTNESS | (level & MAX_BRIGHTNESS), "brightness");
    }

    fn set_blink_rate(&mut self, rate: u8) {
        self.command_logged(
            CMD_DISPLAY_SETUP | DISPLAY_ON | ((rate & MAX_BLINK_RATE) << 1),
            "blink rate",
        );
    }
}

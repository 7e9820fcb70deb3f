//! Adapter for the LKM1638 board: 8 digits of 7 segments + DP, one bi-color
//! LED per digit, 8 keys.
//!
//! Memory layout matches the LED&KEY family: one 2-byte grid per column,
//! character pattern in the low byte. The bi-color LED occupies segments 9
//! and 10 (high-byte bits 0 and 1); together with the decimal point these
//! are icon bits that character writes preserve.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::font::{self, Charset};
use crate::{
    DisplayData, SegmentDisplay, Switch, Tm1638Error, BYTES_PER_GRID, DISPLAY_MEM, TM1638,
};

pub const NR_GRIDS: usize = 8;
pub const NR_DIGITS: usize = 8;
pub const NR_UDC: usize = 8;

// Icon bits preserved per grid on character writes: [low byte, high byte].
const MASK_ICON_GRID: [[u8; 2]; NR_GRIDS] = [[font::seg::DP, 0x03]; NR_GRIDS];

pub const SW1: Switch = Switch { index: 0, mask: 0x01 };
pub const SW2: Switch = Switch { index: 1, mask: 0x01 };
pub const SW3: Switch = Switch { index: 2, mask: 0x01 };
pub const SW4: Switch = Switch { index: 3, mask: 0x01 };
pub const SW5: Switch = Switch { index: 0, mask: 0x10 };
pub const SW6: Switch = Switch { index: 1, mask: 0x10 };
pub const SW7: Switch = Switch { index: 2, mask: 0x10 };
pub const SW8: Switch = Switch { index: 3, mask: 0x10 };

/// Board icons: grid number (1-based) in bits 24..31, 16-bit segment
/// pattern in bits 0..15. Yellow drives both colors of the bi-color LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Icon {
    Dp1 = (1 << 24) | 0x0080,
    Dp2 = (2 << 24) | 0x0080,
    Dp3 = (3 << 24) | 0x0080,
    Dp4 = (4 << 24) | 0x0080,
    Dp5 = (5 << 24) | 0x0080,
    Dp6 = (6 << 24) | 0x0080,
    Dp7 = (7 << 24) | 0x0080,
    Dp8 = (8 << 24) | 0x0080,
    Gr1 = (1 << 24) | 0x0100,
    Gr2 = (2 << 24) | 0x0100,
    Gr3 = (3 << 24) | 0x0100,
    Gr4 = (4 << 24) | 0x0100,
    Gr5 = (5 << 24) | 0x0100,
    Gr6 = (6 << 24) | 0x0100,
    Gr7 = (7 << 24) | 0x0100,
    Gr8 = (8 << 24) | 0x0100,
    Rd1 = (1 << 24) | 0x0200,
    Rd2 = (2 << 24) | 0x0200,
    Rd3 = (3 << 24) | 0x0200,
    Rd4 = (4 << 24) | 0x0200,
    Rd5 = (5 << 24) | 0x0200,
    Rd6 = (6 << 24) | 0x0200,
    Rd7 = (7 << 24) | 0x0200,
    Rd8 = (8 << 24) | 0x0200,
    Yl1 = (1 << 24) | 0x0300,
    Yl2 = (2 << 24) | 0x0300,
    Yl3 = (3 << 24) | 0x0300,
    Yl4 = (4 << 24) | 0x0300,
    Yl5 = (5 << 24) | 0x0300,
    Yl6 = (6 << 24) | 0x0300,
    Yl7 = (7 << 24) | 0x0300,
    Yl8 = (8 << 24) | 0x0300,
}

impl Icon {
    const fn addr(self) -> usize {
        ((self as u32 >> 24) as usize - 1) * BYTES_PER_GRID
    }

    const fn pattern(self) -> u16 {
        self as u32 as u16
    }
}

pub struct Lkm1638<SPI, CS, D> {
    driver: TM1638<SPI, CS, D>,
    buffer: DisplayData,
    udc: [u8; NR_UDC],
    column: usize,
    charset: Charset,
}

impl<SPI, CS, D, SpiE, PinE> Lkm1638<SPI, CS, D>
where
    SPI: SpiBus<Error = SpiE>,
    CS: OutputPin<Error = PinE>,
    D: DelayNs,
{
    pub fn new(driver: TM1638<SPI, CS, D>, charset: Charset) -> Self {
        Self {
            driver,
            buffer: [0; DISPLAY_MEM],
            udc: [0; NR_UDC],
            column: 0,
            charset,
        }
    }

    pub fn driver(&mut self) -> &mut TM1638<SPI, CS, D> {
        &mut self.driver
    }

    pub fn into_driver(self) -> TM1638<SPI, CS, D> {
        self.driver
    }

    pub fn buffer(&self) -> &DisplayData {
        &self.buffer
    }

    pub fn locate(&mut self, column: usize) {
        self.column = column.min(NR_DIGITS - 1);
    }

    pub fn columns(&self) -> usize {
        NR_DIGITS
    }

    pub fn clear(&mut self, clear_icons: bool) -> Result<(), Tm1638Error<SpiE, PinE>> {
        if clear_icons {
            self.buffer = [0; DISPLAY_MEM];
        } else {
            for (grid, masks) in MASK_ICON_GRID.iter().enumerate() {
                let addr = grid * BYTES_PER_GRID;
                self.buffer[addr] &= masks[0];
                self.buffer[addr + 1] &= masks[1];
            }
        }

        self.driver.write_data(&self.buffer, DISPLAY_MEM, 0)?;
        self.column = 0;
        Ok(())
    }

    pub fn set_icon(&mut self, icon: Icon) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let addr = icon.addr();
        let [lo, hi] = icon.pattern().to_le_bytes();
        self.buffer[addr] |= lo;
        self.buffer[addr + 1] |= hi;
        self.flush_grid(addr)
    }

    pub fn clear_icon(&mut self, icon: Icon) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let addr = icon.addr();
        let [lo, hi] = icon.pattern().to_le_bytes();
        self.buffer[addr] &= !lo;
        self.buffer[addr + 1] &= !hi;
        self.flush_grid(addr)
    }

    /// Defines a user glyph; characters 0..8 written afterwards render it.
    /// Out-of-range indices are ignored.
    pub fn set_udc(&mut self, index: usize, pattern: u8) {
        if let Some(slot) = self.udc.get_mut(index) {
            *slot = pattern;
        }
    }

    /// Writes one character at the cursor; same cursor rules as the other
    /// boards (`\n`/`\r` home, `.`/`,` dot the previous column or get
    /// dropped at column 0, unknown characters are ignored).
    pub fn write_char(&mut self, c: u8) -> Result<(), Tm1638Error<SpiE, PinE>> {
        match c {
            b'\n' | b'\r' => {
                self.column = 0;
                Ok(())
            }
            b'.' | b',' => {
                if self.column == 0 {
                    return Ok(());
                }
                let addr = (self.column - 1) * BYTES_PER_GRID;
                self.buffer[addr] |= font::seg::DP;
                self.flush_grid(addr)
            }
            c if (c as usize) < NR_UDC => self.put_pattern(self.udc[c as usize]),
            c => match font::glyph(self.charset, c) {
                Some(pattern) => self.put_pattern(pattern),
                None => Ok(()),
            },
        }
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), Tm1638Error<SpiE, PinE>> {
        for &c in s.as_bytes() {
            self.write_char(c)?;
        }
        Ok(())
    }

    fn put_pattern(&mut self, pattern: u8) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let addr = self.column * BYTES_PER_GRID;
        self.buffer[addr] = (self.buffer[addr] & MASK_ICON_GRID[self.column][0]) | pattern;
        self.flush_grid(addr)?;

        self.column += 1;
        if self.column > NR_DIGITS - 1 {
            self.column = 0;
        }
        Ok(())
    }

    fn flush_grid(&mut self, addr: usize) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.driver.write_data(&self.buffer, BYTES_PER_GRID, addr)
    }
}

impl<SPI, CS, D, SpiE, PinE> SegmentDisplay for Lkm1638<SPI, CS, D>
where
    SPI: SpiBus<Error = SpiE>,
    CS: OutputPin<Error = PinE>,
    D: DelayNs,
{
    type Icon = Icon;
    type Error = Tm1638Error<SpiE, PinE>;

    fn write_cell(&mut self, c: u8) -> Result<(), Self::Error> {
        self.write_char(c)
    }

    fn set_icon(&mut self, icon: Icon) -> Result<(), Self::Error> {
        Lkm1638::set_icon(self, icon)
    }

    fn clear_icon(&mut self, icon: Icon) -> Result<(), Self::Error> {
        Lkm1638::clear_icon(self, icon)
    }

    fn clear_all(&mut self) -> Result<(), Self::Error> {
        self.clear(true)
    }

    fn columns(&self) -> usize {
        NR_DIGITS
    }
}

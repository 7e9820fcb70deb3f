//! Adapter for the "LED&KEY" board: 8 digits of 7 segments + DP, one LED
//! above each digit, 8 keys.
//!
//! Each column owns a dedicated 2-byte grid. The character pattern lives in
//! the low byte; the LED sits on segment 9 (high-byte bit 0) and the decimal
//! point on low-byte bit 7, both treated as icons that character writes must
//! not clobber.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use num_traits::ToPrimitive;

use crate::font::{self, Charset};
use crate::{
    DisplayData, SegmentDisplay, Switch, Tm1638Error, BYTES_PER_GRID, DISPLAY_MEM, TM1638,
};

pub const NR_GRIDS: usize = 8;
pub const NR_DIGITS: usize = 8;
pub const NR_UDC: usize = 8;

// Icon bits preserved per grid on character writes: [low byte, high byte].
const MASK_ICON_GRID: [[u8; 2]; NR_GRIDS] = [[font::seg::DP, 0x01]; NR_GRIDS];

pub const SW1: Switch = Switch { index: 0, mask: 0x01 };
pub const SW2: Switch = Switch { index: 1, mask: 0x01 };
pub const SW3: Switch = Switch { index: 2, mask: 0x01 };
pub const SW4: Switch = Switch { index: 3, mask: 0x01 };
pub const SW5: Switch = Switch { index: 0, mask: 0x10 };
pub const SW6: Switch = Switch { index: 1, mask: 0x10 };
pub const SW7: Switch = Switch { index: 2, mask: 0x10 };
pub const SW8: Switch = Switch { index: 3, mask: 0x10 };

/// Board icons: grid number (1-based) in bits 24..31, 16-bit segment
/// pattern in bits 0..15.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Icon {
    Ld1 = (1 << 24) | 0x0100,
    Ld2 = (2 << 24) | 0x0100,
    Ld3 = (3 << 24) | 0x0100,
    Ld4 = (4 << 24) | 0x0100,
    Ld5 = (5 << 24) | 0x0100,
    Ld6 = (6 << 24) | 0x0100,
    Ld7 = (7 << 24) | 0x0100,
    Ld8 = (8 << 24) | 0x0100,
    Dp1 = (1 << 24) | 0x0080,
    Dp2 = (2 << 24) | 0x0080,
    Dp3 = (3 << 24) | 0x0080,
    Dp4 = (4 << 24) | 0x0080,
    Dp5 = (5 << 24) | 0x0080,
    Dp6 = (6 << 24) | 0x0080,
    Dp7 = (7 << 24) | 0x0080,
    Dp8 = (8 << 24) | 0x0080,
}

impl Icon {
    const fn addr(self) -> usize {
        ((self as u32 >> 24) as usize - 1) * BYTES_PER_GRID
    }

    const fn pattern(self) -> u16 {
        self as u32 as u16
    }
}

pub struct LedKey8<SPI, CS, D> {
    driver: TM1638<SPI, CS, D>,
    buffer: DisplayData,
    udc: [u8; NR_UDC],
    column: usize,
    charset: Charset,
}

impl<SPI, CS, D, SpiE, PinE> LedKey8<SPI, CS, D>
where
    SPI: SpiBus<Error = SpiE>,
    CS: OutputPin<Error = PinE>,
    D: DelayNs,
{
    /// Wraps an initialized driver. The shadow buffer starts out zeroed; it
    /// is the caller's mirror of display memory since the chip cannot be
    /// read back.
    pub fn new(driver: TM1638<SPI, CS, D>, charset: Charset) -> Self {
        Self {
            driver,
            buffer: [0; DISPLAY_MEM],
            udc: [0; NR_UDC],
            column: 0,
            charset,
        }
    }

    /// Access to the underlying driver, e.g. for `scan_keys` or brightness.
    pub fn driver(&mut self) -> &mut TM1638<SPI, CS, D> {
        &mut self.driver
    }

    pub fn into_driver(self) -> TM1638<SPI, CS, D> {
        self.driver
    }

    /// The adapter's shadow copy of display memory.
    pub fn buffer(&self) -> &DisplayData {
        &self.buffer
    }

    /// Moves the cursor to `column`, clamped to the rightmost digit.
    pub fn locate(&mut self, column: usize) {
        self.column = column.min(NR_DIGITS - 1);
    }

    pub fn columns(&self) -> usize {
        NR_DIGITS
    }

    /// Clears the screen and homes the cursor. Icons survive unless
    /// `clear_icons` is set.
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

    /// Writes one character at the cursor.
    ///
    /// `\n` and `\r` home the cursor without touching display memory.
    /// `.` and `,` set the decimal point of the column left of the cursor
    /// and do not advance; at column 0 there is no such column and they are
    /// dropped. Anything the charset has no glyph for is ignored.
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

    /// Shows `value` right-aligned in decimal. Errors with `InvalidValue`
    /// when it does not fit the 8 digits (sign included).
    pub fn display_value<T: ToPrimitive>(
        &mut self,
        value: T,
    ) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.display_radix(value, 10)
    }

    /// Shows `value` right-aligned in hexadecimal.
    pub fn display_hex_value<T: ToPrimitive>(
        &mut self,
        value: T,
    ) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.display_radix(value, 16)
    }

    fn display_radix<T: ToPrimitive>(
        &mut self,
        value: T,
        radix: u64,
    ) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let value = value.to_i64().ok_or(Tm1638Error::InvalidValue)?;
        let negative = value < 0;
        let mut magnitude = value.unsigned_abs();

        // leftmost cell is reserved for the sign on negative values
        let limit = usize::from(negative);

        let mut cells = [0u8; NR_DIGITS];
        let mut pos = NR_DIGITS;
        loop {
            pos -= 1;
            cells[pos] = digit_pattern((magnitude % radix) as usize);
            magnitude /= radix;
            if magnitude == 0 {
                break;
            }
            if pos == limit {
                return Err(Tm1638Error::InvalidValue);
            }
        }
        if negative {
            cells[pos - 1] = font::MINUS;
        }

        self.locate(0);
        for pattern in cells {
            self.put_pattern(pattern)?;
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

fn digit_pattern(digit: usize) -> u8 {
    let c = if digit < 10 {
        b'0' + digit as u8
    } else {
        b'A' + (digit - 10) as u8
    };
    font::FONT_7S[(c - font::FONT_7S_START) as usize]
}

impl<SPI, CS, D, SpiE, PinE> SegmentDisplay for LedKey8<SPI, CS, D>
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
        LedKey8::set_icon(self, icon)
    }

    fn clear_icon(&mut self, icon: Icon) -> Result<(), Self::Error> {
        LedKey8::clear_icon(self, icon)
    }

    fn clear_all(&mut self) -> Result<(), Self::Error> {
        self.clear(true)
    }

    fn columns(&self) -> usize {
        NR_DIGITS
    }
}

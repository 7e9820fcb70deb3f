//! Adapter for the QYF-TM1638 board: 8 digits of 7 segments + DP, 16 keys.
//!
//! The wiring inverts the usual layout. Each even display-memory byte holds
//! one segment identity for all digits: byte 0 drives every A segment,
//! byte 2 every B segment, and so on up to byte 12 (G); byte 14 holds the
//! decimal points. Within a byte, bit 7 belongs to the leftmost digit and
//! bit 0 to the rightmost, so a character write touches all seven segment
//! bytes, flipping exactly one bit in each.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::font::{self, seg, Charset};
use crate::{
    DisplayData, SegmentDisplay, Switch, Tm1638Error, BYTES_PER_GRID, DISPLAY_MEM, TM1638,
};

pub const NR_GRIDS: usize = 8;
pub const NR_DIGITS: usize = 8;
pub const NR_UDC: usize = 8;

// Which display-memory byte carries each segment identity.
const SEGMENT_ADDR: [(u8, usize); 7] = [
    (seg::A, 0),
    (seg::B, 2),
    (seg::C, 4),
    (seg::D, 6),
    (seg::E, 8),
    (seg::F, 10),
    (seg::G, 12),
];
const DP_ADDR: usize = 14;

// Byte 14 is the only icon storage (decimal points); everything else is
// character data.
const MASK_ICON_GRID: [[u8; 2]; NR_GRIDS] = [
    [0x00, 0x00],
    [0x00, 0x00],
    [0x00, 0x00],
    [0x00, 0x00],
    [0x00, 0x00],
    [0x00, 0x00],
    [0x00, 0x00],
    [0xFF, 0x00],
];

pub const SW1: Switch = Switch { index: 0, mask: 0x04 };
pub const SW2: Switch = Switch { index: 0, mask: 0x40 };
pub const SW3: Switch = Switch { index: 1, mask: 0x04 };
pub const SW4: Switch = Switch { index: 1, mask: 0x40 };
pub const SW5: Switch = Switch { index: 2, mask: 0x04 };
pub const SW6: Switch = Switch { index: 2, mask: 0x40 };
pub const SW7: Switch = Switch { index: 3, mask: 0x04 };
pub const SW8: Switch = Switch { index: 3, mask: 0x40 };
pub const SW9: Switch = Switch { index: 0, mask: 0x02 };
pub const SW10: Switch = Switch { index: 0, mask: 0x20 };
pub const SW11: Switch = Switch { index: 1, mask: 0x02 };
pub const SW12: Switch = Switch { index: 1, mask: 0x20 };
pub const SW13: Switch = Switch { index: 2, mask: 0x02 };
pub const SW14: Switch = Switch { index: 2, mask: 0x20 };
pub const SW15: Switch = Switch { index: 3, mask: 0x02 };
pub const SW16: Switch = Switch { index: 3, mask: 0x20 };

/// Board icons. All decimal points live in grid 8 (byte 14), one bit per
/// digit, leftmost digit in bit 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Icon {
    Dp1 = (8 << 24) | 0x0080,
    Dp2 = (8 << 24) | 0x0040,
    Dp3 = (8 << 24) | 0x0020,
    Dp4 = (8 << 24) | 0x0010,
    Dp5 = (8 << 24) | 0x0008,
    Dp6 = (8 << 24) | 0x0004,
    Dp7 = (8 << 24) | 0x0002,
    Dp8 = (8 << 24) | 0x0001,
}

impl Icon {
    const fn addr(self) -> usize {
        ((self as u32 >> 24) as usize - 1) * BYTES_PER_GRID
    }

    const fn pattern(self) -> u16 {
        self as u32 as u16
    }
}

pub struct Qyf<SPI, CS, D> {
    driver: TM1638<SPI, CS, D>,
    buffer: DisplayData,
    udc: [u8; NR_UDC],
    column: usize,
    charset: Charset,
}

impl<SPI, CS, D, SpiE, PinE> Qyf<SPI, CS, D>
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
        self.driver.write_data(&self.buffer, BYTES_PER_GRID, addr)
    }

    pub fn clear_icon(&mut self, icon: Icon) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let addr = icon.addr();
        let [lo, hi] = icon.pattern().to_le_bytes();
        self.buffer[addr] &= !lo;
        self.buffer[addr + 1] &= !hi;
        self.driver.write_data(&self.buffer, BYTES_PER_GRID, addr)
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
                self.buffer[DP_ADDR] |= 1 << (8 - self.column);
                self.driver.write_data(&self.buffer, DISPLAY_MEM, 0)
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
        let bit = 1u8 << (7 - self.column);

        for (segment, addr) in SEGMENT_ADDR {
            if pattern & segment != 0 {
                self.buffer[addr] |= bit;
            } else {
                self.buffer[addr] &= !bit;
            }
        }
        if pattern & seg::DP != 0 {
            self.buffer[DP_ADDR] |= bit;
        } else {
            self.buffer[DP_ADDR] &= !bit;
        }

        // one bit changed in every segment byte, flush the lot
        self.driver.write_data(&self.buffer, DISPLAY_MEM, 0)?;

        self.column += 1;
        if self.column > NR_DIGITS - 1 {
            self.column = 0;
        }
        Ok(())
    }
}

impl<SPI, CS, D, SpiE, PinE> SegmentDisplay for Qyf<SPI, CS, D>
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
        Qyf::set_icon(self, icon)
    }

    fn clear_icon(&mut self, icon: Icon) -> Result<(), Self::Error> {
        Qyf::clear_icon(self, icon)
    }

    fn clear_all(&mut self) -> Result<(), Self::Error> {
        self.clear(true)
    }

    fn columns(&self) -> usize {
        NR_DIGITS
    }
}

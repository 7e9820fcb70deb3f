#![no_std]

mod constants;
pub mod font;
pub mod ledkey8;
pub mod lkm1638;
pub mod qyf;

pub use constants::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// One full image of the controller's display memory, 8 grids @ 2 bytes.
pub type DisplayData = [u8; DISPLAY_MEM];

/// One key-scan snapshot, bit order corrected and masked to [`KEY_MSK`].
pub type KeyData = [u8; KEY_MEM];

/// How `scan_keys` turns the significant-bit count into a keypress verdict.
///
/// The multiplexed key matrix can report spurious ghost keys when several
/// keys are down at once. `Strict` trades multi-key capability for
/// reliability and only reports a press for exactly one set bit;
/// `Permissive` accepts any nonzero count, phantom keys included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPolicy {
    Strict,
    Permissive,
}

/// Reverses the bit order of a byte. The TM1638 shifts LSB first while the
/// SPI bus shifts MSB first, so every byte crossing the bus passes through
/// this exactly once in each direction.
pub const fn flip(data: u8) -> u8 {
    data.reverse_bits()
}

/// Driver for the TM1638 LED controller.
///
/// Supports 8 grids @ 10 segments of display memory and a scanned keyboard
/// of up to 24 keys. The controller sits on a shared synchronous serial bus
/// with a dedicated strobe line, so the driver takes an [`SpiBus`] plus an
/// [`OutputPin`] rather than an `SpiDevice` and frames every transaction
/// itself. The bus must be configured for mode 3 (clock high when idle,
/// data latched on the rising edge) at 500 kHz or less.
///
/// The protocol carries no acknowledgement: transport errors propagate
/// uninspected, everything else is fire-and-forget.
pub struct TM1638<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
    display: u8,
    brightness: u8,
    key_policy: KeyPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tm1638Error<SpiE, PinE> {
    Spi(SpiE),
    Pin(PinE),
    InvalidValue,
}

impl<SPI, CS, D, SpiE, PinE> TM1638<SPI, CS, D>
where
    SPI: SpiBus<Error = SpiE>,
    CS: OutputPin<Error = PinE>,
    D: DelayNs,
{
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self {
            spi,
            cs,
            delay,
            display: cmd::dsp_ctrl::ON,
            brightness: DEFAULT_BRIGHTNESS,
            key_policy: KeyPolicy::Strict,
        }
    }

    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    pub fn destroy(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }

    /// Puts the controller in a known state: strobe released, display on at
    /// the default brightness, write mode with auto-increment addressing.
    pub fn init(&mut self) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.cs.set_high().map_err(Tm1638Error::Pin)?;

        self.write_cmd(cmd::DSP_CTRL, self.display | self.brightness)?;
        self.write_cmd(
            cmd::DATA_SET,
            cmd::data_set::WRITE | cmd::data_set::ADDR_INC | cmd::data_set::MODE_NORMAL,
        )?;

        Ok(())
    }

    /// Zero-fills the entire display memory in one transaction.
    pub fn clear(&mut self) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.write_data(&[0; DISPLAY_MEM], DISPLAY_MEM, 0)
    }

    /// Writes one byte at `address` (masked to the valid range).
    pub fn write_byte(&mut self, data: u8, address: usize) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let address = address & cmd::addr_set::ADDR_MSK as usize;
        let frame = [flip(cmd::ADDR_SET | address as u8), flip(data)];
        self.framed(|spi| spi.write(&frame))
    }

    /// Streams `length` bytes of `data` to the controller, starting at
    /// `address` in both the source array and display memory (the source is
    /// indexed by absolute target address, mirroring the chip's own
    /// addressing). The address is masked to the valid range and the length
    /// silently truncated so the write never runs past the end of memory.
    pub fn write_data(
        &mut self,
        data: &DisplayData,
        length: usize,
        address: usize,
    ) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let address = address & cmd::addr_set::ADDR_MSK as usize;
        let length = length.min(DISPLAY_MEM - address);

        let mut frame = [0u8; DISPLAY_MEM + 1];
        frame[0] = flip(cmd::ADDR_SET | address as u8);
        for (out, &byte) in frame[1..=length].iter_mut().zip(&data[address..]) {
            *out = flip(byte);
        }

        self.framed(|spi| spi.write(&frame[..=length]))
    }

    /// Takes one key-matrix snapshot.
    ///
    /// Returns the masked, bit-order-corrected key bytes together with the
    /// keypress verdict of the configured [`KeyPolicy`]. The key bytes are
    /// returned unmodified regardless of the verdict, so a caller wanting
    /// edge-triggered behaviour can diff successive snapshots itself.
    pub fn scan_keys(&mut self) -> Result<(bool, KeyData), Tm1638Error<SpiE, PinE>> {
        let raw = self.framed(|spi| {
            spi.write(&[flip(
                cmd::DATA_SET
                    | cmd::data_set::READ_KEYS
                    | cmd::data_set::ADDR_INC
                    | cmd::data_set::MODE_NORMAL,
            )])?;

            let mut raw = [0u8; KEY_MEM];
            spi.transfer(&mut raw, &[KEY_SCAN_STIMULUS; KEY_MEM])?;
            Ok(raw)
        })?;

        let mut keydata: KeyData = [0; KEY_MEM];
        let mut keypress = 0u32;
        for (out, byte) in keydata.iter_mut().zip(raw) {
            let byte = flip(byte) & KEY_MSK;
            keypress += byte.count_ones();
            *out = byte;
        }

        // The controller stays in key-read mode until told otherwise; a
        // display write issued before this restore would be lost.
        self.write_cmd(
            cmd::DATA_SET,
            cmd::data_set::WRITE | cmd::data_set::ADDR_INC | cmd::data_set::MODE_NORMAL,
        )?;

        let pressed = match self.key_policy {
            KeyPolicy::Strict => keypress == 1,
            KeyPolicy::Permissive => keypress > 0,
        };

        Ok((pressed, keydata))
    }

    /// Sets the brightness (3 significant bits, invalid bits masked off)
    /// and re-sends the display-control command.
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.brightness = brightness & cmd::dsp_ctrl::BRT_MSK;
        self.write_cmd(cmd::DSP_CTRL, self.display | self.brightness)
    }

    /// Switches the display on or off and re-sends the display-control
    /// command.
    pub fn set_display(&mut self, on: bool) -> Result<(), Tm1638Error<SpiE, PinE>> {
        self.display = if on {
            cmd::dsp_ctrl::ON
        } else {
            cmd::dsp_ctrl::OFF
        };
        self.write_cmd(cmd::DSP_CTRL, self.display | self.brightness)
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn is_display_on(&self) -> bool {
        self.display == cmd::dsp_ctrl::ON
    }

    pub fn key_policy(&self) -> KeyPolicy {
        self.key_policy
    }

    fn write_cmd(&mut self, cmd: u8, data: u8) -> Result<(), Tm1638Error<SpiE, PinE>> {
        let frame = [flip((cmd & cmd::MSK) | (data & !cmd::MSK))];
        self.framed(|spi| spi.write(&frame))
    }

    /// Runs `op` as one framed transaction: strobe asserted, settle time,
    /// bus traffic, flush, settle time, strobe released. The strobe is
    /// released on every exit path, error or not.
    fn framed<R>(
        &mut self,
        op: impl FnOnce(&mut SPI) -> Result<R, SpiE>,
    ) -> Result<R, Tm1638Error<SpiE, PinE>> {
        self.cs.set_low().map_err(Tm1638Error::Pin)?;
        self.delay.delay_us(SETTLE_TIME_US);

        let res = op(&mut self.spi).and_then(|r| self.spi.flush().map(|()| r));

        self.delay.delay_us(SETTLE_TIME_US);
        let released = self.cs.set_high();

        let out = res.map_err(Tm1638Error::Spi)?;
        released.map_err(Tm1638Error::Pin)?;
        Ok(out)
    }
}

/// One key of a board's switch matrix: a byte index into [`KeyData`] plus
/// the significant bit inside that byte. The boards name these in their
/// adapter modules (`ledkey8::SW1` and friends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switch {
    pub index: usize,
    pub mask: u8,
}

impl Switch {
    pub const fn is_pressed(self, keys: &KeyData) -> bool {
        keys[self.index] & self.mask != 0
    }
}

/// Capability surface shared by the board adapters, so application code can
/// drive any of the three layouts through one interface.
pub trait SegmentDisplay {
    type Icon: Copy;
    type Error;

    /// Writes one character at the cursor, honouring the common cursor
    /// rules: printables advance and wrap, `\n`/`\r` reset the cursor,
    /// `.`/`,` attach a decimal point to the previous column.
    fn write_cell(&mut self, c: u8) -> Result<(), Self::Error>;

    fn set_icon(&mut self, icon: Self::Icon) -> Result<(), Self::Error>;

    fn clear_icon(&mut self, icon: Self::Icon) -> Result<(), Self::Error>;

    /// Clears characters and icons and homes the cursor.
    fn clear_all(&mut self) -> Result<(), Self::Error>;

    fn columns(&self) -> usize;
}

pub const MAX_GRIDS: usize = 8;
pub const BYTES_PER_GRID: usize = 2;
pub const DISPLAY_MEM: usize = MAX_GRIDS * BYTES_PER_GRID;
pub const KEY_MEM: usize = 4;
pub const KEY_MSK: u8 = 0x77; // significant bits per key byte
pub const KEY_SCAN_STIMULUS: u8 = 0xFF; // dummy byte clocking out key data
pub const MAX_BRIGHTNESS: u8 = 7; // 3 bits, pulse width 1/16..14/16
pub const DEFAULT_BRIGHTNESS: u8 = 3;
pub const SETTLE_TIME_US: u32 = 1; // strobe setup/hold around a transaction

#[allow(dead_code)]
pub mod cmd {
    pub const MSK: u8 = 0xC0; // bits 7:6 select the command class

    pub const DATA_SET: u8 = 0x40;
    pub const ADDR_SET: u8 = 0xC0;
    pub const DSP_CTRL: u8 = 0x80;

    pub mod data_set {
        pub const WRITE: u8 = 0x00; // bit 1 clear: write display memory
        pub const READ_KEYS: u8 = 0x02; // bit 1 set: read key-scan memory
        pub const ADDR_INC: u8 = 0x00; // bit 2 clear: auto-increment address
        pub const ADDR_FIXED: u8 = 0x04; // bit 2 set: fixed address
        pub const MODE_NORMAL: u8 = 0x00; // bit 3 clear: normal operation
        pub const MODE_TEST: u8 = 0x08; // bit 3 set: factory test mode
    }

    pub mod addr_set {
        pub const ADDR_MSK: u8 = 0x0F; // display memory is 0x00..0x0F
    }

    pub mod dsp_ctrl {
        pub const BRT_MSK: u8 = 0x07; // bits 2:0: pulse width
        pub const OFF: u8 = 0x00;
        pub const ON: u8 = 0x08; // bit 3: display enable
    }
}

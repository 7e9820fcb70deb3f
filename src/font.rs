//! Seven-segment glyph tables shared by the board adapters.
//!
//! Segment bits follow the usual naming: bit 0 = A (top) through bit 6 = G
//! (middle), bit 7 = decimal point.

pub mod seg {
    pub const A: u8 = 0x01;
    pub const B: u8 = 0x02;
    pub const C: u8 = 0x04;
    pub const D: u8 = 0x08;
    pub const E: u8 = 0x10;
    pub const F: u8 = 0x20;
    pub const G: u8 = 0x40;
    pub const DP: u8 = 0x80;
}

pub const MINUS: u8 = seg::G;

pub const FONT_7S_START: u8 = 0x20;
pub const FONT_7S_END: u8 = 0x7F;

/// Printable ASCII 0x20..=0x7F rendered on seven segments, best effort.
pub const FONT_7S: [u8; 96] = [
    0x00, 0x86, 0x22, 0x7E, 0x6D, 0xD2, 0x46, 0x20, // ' ', !, ", #, $, %, &, '
    0x29, 0x0B, 0x21, 0x70, 0x10, 0x40, 0x80, 0x52, // (, ), *, +, ,, -, ., /
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, // 0..7
    0x7F, 0x6F, 0x09, 0x0D, 0x61, 0x48, 0x43, 0xD3, // 8, 9, :, ;, <, =, >, ?
    0x5F, 0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71, 0x3D, // @, A..G
    0x76, 0x30, 0x1E, 0x75, 0x38, 0x15, 0x37, 0x3F, // H..O
    0x73, 0x6B, 0x33, 0x6D, 0x78, 0x3E, 0x3E, 0x2A, // P..W
    0x76, 0x6E, 0x5B, 0x39, 0x64, 0x0F, 0x23, 0x08, // X, Y, Z, [, \, ], ^, _
    0x02, 0x5F, 0x7C, 0x58, 0x5E, 0x7B, 0x71, 0x6F, // `, a..g
    0x74, 0x10, 0x0C, 0x75, 0x30, 0x14, 0x54, 0x5C, // h..o
    0x73, 0x67, 0x50, 0x6D, 0x78, 0x1C, 0x1C, 0x14, // p..w
    0x76, 0x6E, 0x5B, 0x46, 0x30, 0x70, 0x01, 0x00, // x, y, z, {, |, }, ~, DEL
];

/// Character repertoire accepted by an adapter, chosen at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    /// Full printable ASCII via [`FONT_7S`].
    Ascii,
    /// Digits, hex letters and minus only.
    HexDigits,
}

/// Looks up the segment pattern for `c`, or `None` when the charset has no
/// glyph for it (the adapters then leave the cursor and memory alone).
pub fn glyph(charset: Charset, c: u8) -> Option<u8> {
    match charset {
        Charset::Ascii => {
            if (FONT_7S_START..=FONT_7S_END).contains(&c) {
                Some(FONT_7S[(c - FONT_7S_START) as usize])
            } else {
                None
            }
        }
        Charset::HexDigits => match c {
            b'-' => Some(MINUS),
            b'0'..=b'9' => Some(FONT_7S[(c - FONT_7S_START) as usize]),
            b'A'..=b'F' => Some(FONT_7S[(c - FONT_7S_START) as usize]),
            b'a'..=b'f' => Some(FONT_7S[(c - FONT_7S_START) as usize]),
            _ => None,
        },
    }
}

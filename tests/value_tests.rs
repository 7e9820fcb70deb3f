extern crate tm1638;

mod common;

use common::driver;
use tm1638::font::Charset;
use tm1638::ledkey8::LedKey8;

fn display() -> LedKey8<common::MockSpi, common::MockCs, common::MockDelay> {
    let (drv, _log) = driver(&[]);
    LedKey8::new(drv, Charset::Ascii)
}

#[test]
fn decimal_value_test() {
    let mut display = display();

    assert!(display.display_value(99_999_999).is_ok());
    assert!(display.display_value(100_000_000).is_err());
    assert!(display.display_value(-9_999_999).is_ok());
    assert!(display.display_value(-10_000_000).is_err());
}

#[test]
fn hexadecimal_value_test() {
    let mut display = display();

    assert!(display.display_hex_value(0xFFFF_FFFFu32).is_ok());
    assert!(display.display_hex_value(0x1_0000_0000i64).is_err());
    assert!(display.display_hex_value(-0xFFF_FFFF).is_ok());
    assert!(display.display_hex_value(-0x1000_0000).is_err());
}

#[test]
fn values_are_right_aligned() {
    let mut display = display();

    display.display_value(42).unwrap();

    // columns 0..6 blank, '4' and '2' in the last two grids
    for grid in 0..6 {
        assert_eq!(display.buffer()[grid * 2], 0x00);
    }
    assert_eq!(display.buffer()[12], 0x66);
    assert_eq!(display.buffer()[14], 0x5B);
}

#[test]
fn negative_values_carry_a_sign() {
    let mut display = display();

    display.display_value(-3).unwrap();

    assert_eq!(display.buffer()[12], 0x40); // minus
    assert_eq!(display.buffer()[14], 0x4F); // '3'
}

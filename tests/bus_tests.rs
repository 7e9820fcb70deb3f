extern crate tm1638;

mod common;

use common::{clear_log, driver, written, BusEvent};
use tm1638::{flip, KeyPolicy, DISPLAY_MEM};

#[test]
fn flip_is_its_own_inverse() {
    for byte in 0..=255u8 {
        assert_eq!(flip(flip(byte)), byte);
    }
    assert_eq!(flip(0x01), 0x80);
    assert_eq!(flip(0x80), 0x01);
    assert_eq!(flip(0xAA), 0x55);
}

#[test]
fn init_sends_display_control_then_write_mode() {
    let (mut drv, log) = driver(&[]);
    drv.init().unwrap();

    // strobe released, then: display on @ brightness 3, then data-set write
    // mode with auto-increment
    assert_eq!(
        *log.borrow(),
        vec![
            BusEvent::Deselect,
            BusEvent::Select,
            BusEvent::Write(flip(0x80 | 0x08 | 0x03)),
            BusEvent::Deselect,
            BusEvent::Select,
            BusEvent::Write(flip(0x40)),
            BusEvent::Deselect,
        ]
    );
}

#[test]
fn write_byte_frames_address_then_data() {
    let (mut drv, log) = driver(&[]);
    drv.write_byte(0x01, 0).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            BusEvent::Select,
            BusEvent::Write(flip(0xC0)),
            BusEvent::Write(0x80), // flip(0x01)
            BusEvent::Deselect,
        ]
    );
}

#[test]
fn write_byte_masks_address() {
    let (mut drv, log) = driver(&[]);
    drv.write_byte(0x55, 0x1F).unwrap();

    assert_eq!(written(&log)[0], flip(0xC0 | 0x0F));
}

#[test]
fn clear_zero_fills_display_memory_in_one_transaction() {
    let (mut drv, log) = driver(&[]);
    drv.clear().unwrap();

    let events = log.borrow();
    assert_eq!(events.len(), DISPLAY_MEM + 3);
    assert_eq!(events[0], BusEvent::Select);
    assert_eq!(events[1], BusEvent::Write(flip(0xC0)));
    for event in &events[2..2 + DISPLAY_MEM] {
        assert_eq!(*event, BusEvent::Write(0x00));
    }
    assert_eq!(events[DISPLAY_MEM + 2], BusEvent::Deselect);
}

#[test]
fn block_write_clamps_length_to_memory_end() {
    let mut data = [0u8; DISPLAY_MEM];
    for (i, byte) in data.iter_mut().enumerate() {
        *byte = i as u8;
    }

    let (mut drv, log) = driver(&[]);
    drv.write_data(&data, 8, 12).unwrap();

    // only bytes 12..16 fit; block source is indexed by absolute address
    assert_eq!(
        written(&log),
        vec![flip(0xC0 | 12), flip(12), flip(13), flip(14), flip(15)]
    );
}

#[test]
fn block_write_masks_address_before_clamping() {
    let data = [0u8; DISPLAY_MEM];
    let (mut drv, log) = driver(&[]);
    drv.write_data(&data, DISPLAY_MEM, 0x13).unwrap();

    // address 0x13 masks to 0x03, leaving room for 13 bytes
    let bytes = written(&log);
    assert_eq!(bytes[0], flip(0xC0 | 0x03));
    assert_eq!(bytes.len(), 1 + 13);
}

#[test]
fn brightness_is_masked_to_three_bits() {
    let (mut drv, log) = driver(&[]);

    drv.set_brightness(0x0A).unwrap();
    assert_eq!(drv.brightness(), 0x02);
    assert_eq!(written(&log), vec![flip(0x80 | 0x08 | 0x02)]);

    clear_log(&log);
    drv.set_display(false).unwrap();
    drv.set_brightness(0xFF).unwrap();
    assert_eq!(drv.brightness(), 0x07);
    assert!(!drv.is_display_on());
    assert_eq!(written(&log), vec![flip(0x80 | 0x02), flip(0x80 | 0x07)]);
}

#[test]
fn scan_reads_four_bytes_and_restores_write_mode() {
    let (mut drv, log) = driver(&[0x80, 0x00, 0x00, 0x00]);
    let (pressed, keydata) = drv.scan_keys().unwrap();

    assert!(pressed);
    assert_eq!(keydata, [0x01, 0x00, 0x00, 0x00]);
    assert_eq!(
        *log.borrow(),
        vec![
            BusEvent::Select,
            BusEvent::Write(flip(0x40 | 0x02)),
            BusEvent::Transfer { mosi: 0xFF, miso: 0x80 },
            BusEvent::Transfer { mosi: 0xFF, miso: 0x00 },
            BusEvent::Transfer { mosi: 0xFF, miso: 0x00 },
            BusEvent::Transfer { mosi: 0xFF, miso: 0x00 },
            BusEvent::Deselect,
            // write mode restored immediately after the read transaction
            BusEvent::Select,
            BusEvent::Write(flip(0x40)),
            BusEvent::Deselect,
        ]
    );
}

#[test]
fn strict_policy_rejects_multiple_keys_but_keeps_data() {
    let (mut drv, _log) = driver(&[0x80, 0x80, 0x00, 0x00]);
    let (pressed, keydata) = drv.scan_keys().unwrap();

    assert!(!pressed);
    assert_eq!(keydata, [0x01, 0x01, 0x00, 0x00]);
}

#[test]
fn strict_policy_rejects_no_keys() {
    let (mut drv, _log) = driver(&[0x00, 0x00, 0x00, 0x00]);
    let (pressed, keydata) = drv.scan_keys().unwrap();

    assert!(!pressed);
    assert_eq!(keydata, [0x00; 4]);
}

#[test]
fn permissive_policy_accepts_multiple_keys() {
    let (drv, _log) = driver(&[0x80, 0x80, 0x00, 0x00]);
    let mut drv = drv.with_key_policy(KeyPolicy::Permissive);
    let (pressed, _) = drv.scan_keys().unwrap();
    assert!(pressed);

    let (drv, _log) = driver(&[0x00; 4]);
    let mut drv = drv.with_key_policy(KeyPolicy::Permissive);
    let (pressed, _) = drv.scan_keys().unwrap();
    assert!(!pressed);
}

#[test]
fn key_data_is_masked_to_significant_bits() {
    let (mut drv, _log) = driver(&[0xFF, 0xFF, 0xFF, 0xFF]);
    let (pressed, keydata) = drv.scan_keys().unwrap();

    assert!(!pressed); // many bits, strict verdict is false
    assert_eq!(keydata, [0x77; 4]);
}

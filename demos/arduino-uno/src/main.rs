#![no_std]
#![no_main]

use arduino_hal::prelude::*;
use arduino_hal::spi;
use panic_halt as _;
use tm1638::font::Charset;
use tm1638::ledkey8::{self, LedKey8};
use tm1638::{KeyPolicy, Switch, TM1638};

const LEDS: [ledkey8::Icon; 8] = [
    ledkey8::Icon::Ld1,
    ledkey8::Icon::Ld2,
    ledkey8::Icon::Ld3,
    ledkey8::Icon::Ld4,
    ledkey8::Icon::Ld5,
    ledkey8::Icon::Ld6,
    ledkey8::Icon::Ld7,
    ledkey8::Icon::Ld8,
];
const SWITCHES: [Switch; 8] = [
    ledkey8::SW1,
    ledkey8::SW2,
    ledkey8::SW3,
    ledkey8::SW4,
    ledkey8::SW5,
    ledkey8::SW6,
    ledkey8::SW7,
    ledkey8::SW8,
];

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut serial = arduino_hal::default_serial!(dp, pins, 57600);

    // TM1638 wants mode 3 at 500 kHz or less
    let settings = spi::Settings {
        mode: embedded_hal::spi::MODE_3,
        clock: spi::SerialClockRate::OscfOver64,
        ..Default::default()
    };
    let (bus, strobe) = arduino_hal::Spi::new(
        dp.SPI,
        pins.d13.into_output(),
        pins.d11.into_output(),
        pins.d12.into_pull_up_input(),
        pins.d10.into_output(),
        settings,
    );

    let mut driver =
        TM1638::new(bus, strobe, arduino_hal::Delay::new()).with_key_policy(KeyPolicy::Strict);
    driver.init().unwrap();
    driver.clear().unwrap();

    let mut display = LedKey8::new(driver, Charset::Ascii);

    ufmt::uwriteln!(&mut serial, "Ramping brightness...").unwrap_infallible();
    display.write_str("HELLO").unwrap();
    for level in 0..=tm1638::MAX_BRIGHTNESS {
        display.driver().set_brightness(level).unwrap();
        arduino_hal::delay_ms(250);
    }

    ufmt::uwriteln!(&mut serial, "Counting, keys light their LEDs...").unwrap_infallible();
    display.clear(true).unwrap();

    let mut count: u32 = 0;
    loop {
        display.display_value(count).unwrap();
        count = (count + 1) % 100_000_000;

        let (pressed, keys) = display.driver().scan_keys().unwrap();
        if pressed {
            ufmt::uwriteln!(
                &mut serial,
                "keys: {} {} {} {}",
                keys[0],
                keys[1],
                keys[2],
                keys[3]
            )
            .unwrap_infallible();
        }
        for (sw, led) in SWITCHES.iter().zip(LEDS) {
            if sw.is_pressed(&keys) {
                display.set_icon(led).unwrap();
            } else {
                display.clear_icon(led).unwrap();
            }
        }

        arduino_hal::delay_ms(100);
    }
}

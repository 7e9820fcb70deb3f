//! Hand-rolled embedded-hal mocks recording all bus traffic, shared by the
//! integration tests. The SPI and strobe mocks log into one event list so
//! transaction framing order can be asserted.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

pub type BusLog = Rc<RefCell<Vec<BusEvent>>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Select,
    Deselect,
    Write(u8),
    Transfer { mosi: u8, miso: u8 },
}

pub struct MockSpi {
    log: BusLog,
    responses: VecDeque<u8>,
}

impl embedded_hal::spi::ErrorType for MockSpi {
    type Error = embedded_hal::spi::ErrorKind;
}

impl embedded_hal::spi::SpiBus for MockSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            let miso = self.responses.pop_front().unwrap_or(0);
            self.log.borrow_mut().push(BusEvent::Transfer { mosi: 0, miso });
            *word = miso;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.log.borrow_mut().push(BusEvent::Write(word));
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for i in 0..read.len().max(write.len()) {
            let mosi = write.get(i).copied().unwrap_or(0);
            let miso = self.responses.pop_front().unwrap_or(0);
            self.log.borrow_mut().push(BusEvent::Transfer { mosi, miso });
            if let Some(slot) = read.get_mut(i) {
                *slot = miso;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            let miso = self.responses.pop_front().unwrap_or(0);
            self.log.borrow_mut().push(BusEvent::Transfer { mosi: *word, miso });
            *word = miso;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct MockCs {
    log: BusLog,
}

impl embedded_hal::digital::ErrorType for MockCs {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockCs {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::Select);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::Deselect);
        Ok(())
    }
}

pub struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Fresh driver over recording mocks; `responses` are the bytes the chip
/// will shift out on key reads. Not yet initialized, the log starts empty.
pub fn driver(responses: &[u8]) -> (tm1638::TM1638<MockSpi, MockCs, MockDelay>, BusLog) {
    let log: BusLog = Rc::new(RefCell::new(Vec::new()));
    let spi = MockSpi {
        log: Rc::clone(&log),
        responses: responses.iter().copied().collect(),
    };
    let cs = MockCs {
        log: Rc::clone(&log),
    };
    (tm1638::TM1638::new(spi, cs, MockDelay), log)
}

/// The data bytes written so far, in order.
pub fn written(log: &BusLog) -> Vec<u8> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            BusEvent::Write(byte) => Some(*byte),
            _ => None,
        })
        .collect()
}

pub fn clear_log(log: &BusLog) {
    log.borrow_mut().clear();
}

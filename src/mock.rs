//! Recording bus, pin and delay doubles for unit tests.

extern crate std;

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};
use embedded_hal_async::delay::DelayNs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CsHigh,
    CsLow,
    Write(Vec<u8>),
    Hold(u32),
}

#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn take(&self) -> Vec<Event> {
        core::mem::take(&mut *self.0.borrow_mut())
    }
}

pub struct MockPin {
    log: EventLog,
    pub fail: bool,
}

impl MockPin {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }

    fn set(&mut self, event: Event) -> Result<(), digital::ErrorKind> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        self.log.push(event);
        Ok(())
    }
}

impl digital::ErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(Event::CsLow)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(Event::CsHigh)
    }
}

pub struct MockSpi {
    log: EventLog,
    writes: usize,
    /// Zero-based index of the write that fails.
    pub fail_write: Option<usize>,
}

impl MockSpi {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            writes: 0,
            fail_write: None,
        }
    }
}

impl spi::ErrorType for MockSpi {
    type Error = spi::ErrorKind;
}

impl SpiBus for MockSpi {
    fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        Err(spi::ErrorKind::Other)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_write == Some(index) {
            return Err(spi::ErrorKind::Overrun);
        }
        self.log.push(Event::Write(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
        Err(spi::ErrorKind::Other)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        Err(spi::ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct MockDelay<'a> {
    log: EventLog,
    holds: usize,
    /// Really wait this long on every hold.
    pub wait: Option<Duration>,
    /// Signal `stop` once this many holds have completed.
    pub stop_after: Option<(usize, &'a Signal<NoopRawMutex, ()>)>,
}

impl MockDelay<'_> {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            holds: 0,
            wait: None,
            stop_after: None,
        }
    }
}

impl DelayNs for MockDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::Hold(ns));
        if let Some(wait) = self.wait {
            Timer::after(wait).await;
        }
        self.holds += 1;
        if let Some((count, stop)) = self.stop_after {
            if self.holds == count {
                stop.signal(());
            }
        }
    }
}

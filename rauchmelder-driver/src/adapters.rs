//! Adapters from the `embedded-io` and `embedded-hal` ecosystem traits
//!
//! Board crates usually already have a buffered UART implementing
//! `embedded_io::{Read, ReadReady, Write}` and GPIO outputs implementing
//! `embedded_hal::digital::StatefulOutputPin`. These wrappers let them be
//! handed to the link directly.

use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::digital::StatefulOutputPin;
use embedded_io::{Read, ReadReady, Write};
use rauchmelder_hal::{InputPin, OutputPin, UartRx, UartTx};

/// UART built on `embedded-io` traits
pub struct IoUart<T> {
    inner: T,
}

impl<T> IoUart<T> {
    /// Wrap a buffered UART
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Release the wrapped UART
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> UartTx for IoUart<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T: Read + ReadReady> UartRx for IoUart<T> {
    /// Reports at most one byte: `ReadReady` carries no count
    fn bytes_available(&mut self) -> usize {
        match self.inner.read_ready() {
            Ok(true) => 1,
            Ok(false) => 0,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("UART read-ready error");
                0
            }
        }
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        if self.bytes_available() == 0 {
            return None;
        }

        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            Ok(_) => None,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("UART read error");
                None
            }
        }
    }
}

/// Support rail output built on an infallible `embedded-hal` pin
///
/// The rail level is read back from the output latch.
pub struct RailPin<P> {
    pin: RefCell<P>,
}

impl<P> RailPin<P> {
    /// Wrap an output pin
    pub fn new(pin: P) -> Self {
        Self {
            pin: RefCell::new(pin),
        }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin.into_inner()
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

impl<P: StatefulOutputPin<Error = Infallible>> OutputPin for RailPin<P> {
    fn set_high(&mut self) {
        infallible(self.pin.get_mut().set_high());
    }

    fn set_low(&mut self) {
        infallible(self.pin.get_mut().set_low());
    }

    fn is_set_high(&self) -> bool {
        infallible(self.pin.borrow_mut().is_set_high())
    }
}

impl<P: StatefulOutputPin<Error = Infallible>> InputPin for RailPin<P> {
    fn is_high(&self) -> bool {
        OutputPin::is_set_high(self)
    }
}

//! Chip-select line with configurable polarity.
//!
//! The panel latches a group when chip-select is released after a write and
//! stays lit for as long as it is held released. The line therefore rests in
//! the asserted state and is only deasserted for the hold window.

use embedded_hal::digital::{Error as _, OutputPin};

use crate::error::{Error, Result};

/// Electrical level that asserts chip-select.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Asserted is high.
    #[default]
    ActiveHigh,
    /// Asserted is low.
    ActiveLow,
}

/// Chip-select output.
pub struct ChipSelect<P> {
    pin: P,
    polarity: Polarity,
    asserted: bool,
}

impl<P: OutputPin> ChipSelect<P> {
    /// Take ownership of `pin` and drive it to the asserted level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChipSelect`] if the pin cannot be driven.
    pub fn new(pin: P, polarity: Polarity) -> Result<Self> {
        let mut cs = Self {
            pin,
            polarity,
            asserted: false,
        };
        cs.assert()?;
        Ok(cs)
    }

    /// Drive the line to the asserted level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChipSelect`] if the pin cannot be driven.
    pub fn assert(&mut self) -> Result<()> {
        self.drive(true)
    }

    /// Drive the line to the released level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChipSelect`] if the pin cannot be driven.
    pub fn deassert(&mut self) -> Result<()> {
        self.drive(false)
    }

    /// Whether the line was last driven to the asserted level.
    #[must_use]
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }

    #[cfg(test)]
    pub(crate) fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    fn drive(&mut self, asserted: bool) -> Result<()> {
        let high = asserted == (self.polarity == Polarity::ActiveHigh);
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| Error::ChipSelect(e.kind()))?;
        self.asserted = asserted;
        Ok(())
    }
}

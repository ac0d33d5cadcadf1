//! Errors that can occur when using the BME690 device.
//!
//! This module provides an error type that encapsulates all possible errors that can occur during communication with the BME690.
//! It is generic over the underlying bus error type.

use crate::register::InvalidRegisterField;

/// This represents all possible errors that can occur when using the BME690 device.
#[derive(Debug)]
pub enum Bme690Error<BusError> {
    /// An error has occurred in the I2C driver
    Bus(BusError),

    /// Unable to communicate with the BME690
    ///
    /// Could possibly indicate an error with pin configuration and/or wiring.
    NotConnected,

    /// Reading from a register returned unexpected data. This should not happen in normal circumstances.
    ///
    /// Could possibly indicate a bug in the driver, or less likely, a faulty chip or interference.
    UnexpectedRegisterData(InvalidRegisterField),
}

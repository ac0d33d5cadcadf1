//! Async driver and polling component for the Bosch BME690 gas sensor
//! family.
//!
//! The [`Bme690`] device layer speaks to the sensor over an
//! `embedded-hal-async` I2C bus: initialization, configuration, heater
//! set-up, forced-mode triggering and compensated data read-back. The
//! [`component::Bme690Component`] layer wraps it in a
//! setup/update/dump_config lifecycle that publishes temperature, pressure,
//! humidity and gas resistance to optional [`sink::Sink`] endpoints.
#![no_std]

pub mod bus;
pub mod calibration;
pub mod component;
pub mod config;
pub mod error;
pub mod register;
pub mod sink;
pub mod testing;

mod bme690;

pub use bme690::{measurement_duration_us, Bme690, Bme690Result, Measurement, SdoPinState};
pub use error::Bme690Error;

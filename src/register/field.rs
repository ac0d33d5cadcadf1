//! ### FIELD_0 - Measurement data block (`0x1D` - `0x2D`, 17 bytes, R)
//!
//! One burst read covers the measurement status byte, the raw pressure,
//! temperature and humidity ADC words, and both gas-resistance words
//! (low-variant and high-variant parts place the gas word at different
//! offsets; both are captured and the caller picks per variant).
//!
//! This returns raw uncompensated data. For most use cases calling
//! [`Bme690::read_sensor_data()`](crate::Bme690::read_sensor_data) is
//! recommended as it applies the NVM calibration for you.
#![doc(alias = "FIELD_0")]
use crate::register::variant_id::GasVariant;
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker struct for the FIELD_0 (0x1D) data block.
///
/// - **Length:** 17 bytes
/// - **Access:** Read-only
pub struct Field0;
impl Reg for Field0 { const ADDR: u8 = 0x1D; }

/// Raw contents of one measurement field.
#[derive(Copy, Clone, Debug)]
pub struct RawField {
    /// A completed measurement is waiting in the data registers.
    pub new_data: bool,
    /// A gas measurement is in progress.
    pub gas_measuring: bool,
    /// Any measurement is in progress.
    pub measuring: bool,
    /// Heater set-point index of the stored measurement.
    pub gas_measurement_index: u8,
    pub pressure_adc: u32,
    pub temperature_adc: u32,
    pub humidity_adc: u16,
    low_gas: [u8; 2],
    high_gas: [u8; 2],
}

/// The gas word of a field, decoded for one variant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GasReading {
    pub adc: u16,
    pub range: u8,
    /// The gas-validity status bit.
    pub valid: bool,
    /// The heater reached its set-point before the reading was taken.
    pub heater_stable: bool,
}

impl RawField {
    /// Decodes the gas word at the offset used by the given variant.
    pub fn gas(&self, variant: GasVariant) -> GasReading {
        let [msb, lsb] = match variant {
            GasVariant::Low => self.low_gas,
            GasVariant::High => self.high_gas,
        };

        GasReading {
            adc: (u16::from(msb) << 2) | u16::from(lsb >> 6),
            range: lsb & 0b0000_1111,
            valid: lsb & 0b0010_0000 != 0,
            heater_stable: lsb & 0b0001_0000 != 0,
        }
    }
}

impl Readable for Field0 {
    type Out = RawField;

    const N: usize = 17;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(RawField {
            new_data: b[0] & 0b1000_0000 != 0,
            gas_measuring: b[0] & 0b0100_0000 != 0,
            measuring: b[0] & 0b0010_0000 != 0,
            gas_measurement_index: b[0] & 0b0000_1111,
            pressure_adc: (u32::from(b[2]) << 12) | (u32::from(b[3]) << 4) | u32::from(b[4] >> 4),
            temperature_adc: (u32::from(b[5]) << 12) | (u32::from(b[6]) << 4) | u32::from(b[7] >> 4),
            humidity_adc: (u16::from(b[8]) << 8) | u16::from(b[9]),
            low_gas: [b[13], b[14]],
            high_gas: [b[15], b[16]],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_decode() {
        let reg = Field0::decode(&[
            0b1000_0010, 0x00, 0xAA, 0xBB, 0xC0, 0x12, 0x34, 0x50, 0x56, 0x78, 0x00, 0x00,
            0x00, 0x40, 0x26, 0x81, 0x35,
        ])
        .unwrap();

        assert!(reg.new_data);
        assert!(!reg.gas_measuring);
        assert!(!reg.measuring);
        assert_eq!(2, reg.gas_measurement_index);
        assert_eq!(0xAABBC, reg.pressure_adc);
        assert_eq!(0x12345, reg.temperature_adc);
        assert_eq!(0x5678, reg.humidity_adc);

        let low = reg.gas(GasVariant::Low);
        assert_eq!(GasReading { adc: 0x100, range: 6, valid: true, heater_stable: false }, low);

        let high = reg.gas(GasVariant::High);
        assert_eq!(GasReading { adc: 0x204, range: 5, valid: true, heater_stable: true }, high);
    }
}

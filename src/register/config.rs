//! ### CONFIG - IIR filter and data rate configuration (`0x75`, 1 byte, R/W)
//!
//! Controls the IIR filter coefficient applied to temperature and pressure
//! readings, plus the low three bits of the output data rate selection
//! (the fourth bit lives in CTRL_GAS_1).
//!
//! ### Default values
//! 0x00 (filter bypassed)
#![doc(alias = "CONFIG")]
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for CONFIG (0x75) register
pub struct Config;
impl Reg for Config { const ADDR: u8 = 0x75; }

/// The payload for the CONFIG (0x75) register.
#[derive(Copy, Clone, Debug)]
pub struct ConfigFields {
    /// The IIR filter coefficient for temperature and pressure.
    pub filter: IirFilter,
    /// Low three bits of the output data rate selection. See
    /// [`OutputDataRate::split`] for how a rate maps onto this field and
    /// the odr3 bit in CTRL_GAS_1.
    pub odr20: u8,
}

impl Readable for Config {
    type Out = ConfigFields;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(ConfigFields {
            filter: IirFilter::from((b[0] >> 2) & 0b111),
            odr20: (b[0] >> 5) & 0b111,
        })
    }
}

impl Writable for Config {
    type In = ConfigFields;

    fn encode(v: &Self::In, out: &mut [u8]) {
        let filter: u8 = v.filter.into();
        out[0] = ((filter & 0b111) << 2) | ((v.odr20 & 0b111) << 5);
    }
}

/// This enum holds all configurable IIR filter coefficients.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IirFilter {
    /// Filter coefficient is 0 => bypass-mode
    Coef0,
    /// Filter coefficient is 1
    Coef1,
    /// Filter coefficient is 3
    Coef3,
    /// Filter coefficient is 7
    Coef7,
    /// Filter coefficient is 15
    Coef15,
    /// Filter coefficient is 31
    Coef31,
    /// Filter coefficient is 63
    Coef63,
    /// Filter coefficient is 127
    Coef127,
}

impl Into<u8> for IirFilter {
    fn into(self) -> u8 {
        match self {
            IirFilter::Coef0 => 0b000,
            IirFilter::Coef1 => 0b001,
            IirFilter::Coef3 => 0b010,
            IirFilter::Coef7 => 0b011,
            IirFilter::Coef15 => 0b100,
            IirFilter::Coef31 => 0b101,
            IirFilter::Coef63 => 0b110,
            IirFilter::Coef127 => 0b111,
        }
    }
}

impl From<u8> for IirFilter {
    fn from(field: u8) -> Self {
        match field {
            0b000 => IirFilter::Coef0,
            0b001 => IirFilter::Coef1,
            0b010 => IirFilter::Coef3,
            0b011 => IirFilter::Coef7,
            0b100 => IirFilter::Coef15,
            0b101 => IirFilter::Coef31,
            0b110 => IirFilter::Coef63,
            _ => IirFilter::Coef127,
        }
    }
}

/// Output data rate (standby time) for free-running operation.
///
/// The selection is split across two registers: three bits here and one
/// bit in CTRL_GAS_1. Polled forced-mode operation uses
/// [`OutputDataRate::None`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputDataRate {
    Ms0p59,
    Ms62p5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms10,
    Ms20,
    /// No standby time; sampling only happens when explicitly triggered.
    None,
}

impl OutputDataRate {
    /// Splits the rate into its register encoding: the three odr20 bits
    /// carried by CONFIG and the odr3 flag carried by CTRL_GAS_1.
    pub fn split(self) -> (u8, bool) {
        match self {
            OutputDataRate::None => (0, true),
            rate => (rate.code(), false),
        }
    }

    /// Reassembles a rate from the two register fields.
    pub fn from_parts(odr20: u8, odr3: bool) -> Self {
        if odr3 {
            return OutputDataRate::None;
        }
        match odr20 & 0b111 {
            0b000 => OutputDataRate::Ms0p59,
            0b001 => OutputDataRate::Ms62p5,
            0b010 => OutputDataRate::Ms125,
            0b011 => OutputDataRate::Ms250,
            0b100 => OutputDataRate::Ms500,
            0b101 => OutputDataRate::Ms1000,
            0b110 => OutputDataRate::Ms10,
            _ => OutputDataRate::Ms20,
        }
    }

    fn code(self) -> u8 {
        match self {
            OutputDataRate::Ms0p59 => 0b000,
            OutputDataRate::Ms62p5 => 0b001,
            OutputDataRate::Ms125 => 0b010,
            OutputDataRate::Ms250 => 0b011,
            OutputDataRate::Ms500 => 0b100,
            OutputDataRate::Ms1000 => 0b101,
            OutputDataRate::Ms10 => 0b110,
            OutputDataRate::Ms20 => 0b111,
            OutputDataRate::None => 0b000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_decode() {
        let reg = Config::decode(&[0b0000_0000]).unwrap();
        assert_eq!(IirFilter::Coef0, reg.filter);
        assert_eq!(0, reg.odr20);

        let reg = Config::decode(&[0b0010_1000]).unwrap();
        assert_eq!(IirFilter::Coef3, reg.filter);
        assert_eq!(1, reg.odr20);
    }

    #[test]
    fn config_encode() {
        let mut buffer = [0u8; 1];
        Config::encode(&ConfigFields { filter: IirFilter::Coef3, odr20: 0 }, &mut buffer);
        assert_eq!([0b0000_1000], buffer);

        Config::encode(&ConfigFields { filter: IirFilter::Coef127, odr20: 0b101 }, &mut buffer);
        assert_eq!([0b1011_1100], buffer);
    }

    #[test]
    fn output_data_rate_split() {
        assert_eq!((0, true), OutputDataRate::None.split());
        assert_eq!((0b001, false), OutputDataRate::Ms62p5.split());
        assert_eq!((0b111, false), OutputDataRate::Ms20.split());
    }

    #[test]
    fn output_data_rate_from_parts() {
        assert_eq!(OutputDataRate::None, OutputDataRate::from_parts(0b011, true));
        assert_eq!(OutputDataRate::Ms250, OutputDataRate::from_parts(0b011, false));
    }
}

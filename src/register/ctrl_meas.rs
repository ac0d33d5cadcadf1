//! ### CTRL_MEAS - Measurement control (`0x74`, 1 byte, R/W)
//!
//! Holds the temperature and pressure oversampling selections and the
//! operating mode. Writing a mode of [`OperatingMode::Forced`] triggers a
//! single measurement cycle after which the device returns to sleep.
//!
//! ### Default values
//! 0x00 (both channels skipped, sleep mode)
#![doc(alias = "CTRL_MEAS")]
use crate::register::{InvalidRegisterField, Readable, Reg, UnexpectedValue, Writable};

/// Marker type for CTRL_MEAS (0x74) register
pub struct CtrlMeas;
impl Reg for CtrlMeas { const ADDR: u8 = 0x74; }

/// The payload for the CTRL_MEAS (0x74) register.
#[derive(Copy, Clone, Debug)]
pub struct CtrlMeasFields {
    pub os_temp: Oversampling,
    pub os_pres: Oversampling,
    pub mode: OperatingMode,
}

impl Readable for CtrlMeas {
    type Out = CtrlMeasFields;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlMeasFields {
            os_temp: Oversampling::try_from((b[0] >> 5) & 0b111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 5))?,
            os_pres: Oversampling::try_from((b[0] >> 2) & 0b111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 2))?,
            mode: OperatingMode::try_from(b[0] & 0b11)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 0))?,
        })
    }
}

impl Writable for CtrlMeas {
    type In = CtrlMeasFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let os_t: u8 = v.os_temp.into();
        let os_p: u8 = v.os_pres.into();
        let mode: u8 = v.mode.into();
        out[0] = (os_t << 5) | (os_p << 2) | mode;
    }
}

/// Per-channel oversampling selection.
///
/// A skipped channel produces no data for that field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Oversampling {
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl TryFrom<u8> for Oversampling {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0b000 => Ok(Oversampling::Skipped),
            0b001 => Ok(Oversampling::X1),
            0b010 => Ok(Oversampling::X2),
            0b011 => Ok(Oversampling::X4),
            0b100 => Ok(Oversampling::X8),
            0b101 => Ok(Oversampling::X16),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl Into<u8> for Oversampling {
    fn into(self) -> u8 {
        match self {
            Oversampling::Skipped => 0b000,
            Oversampling::X1 => 0b001,
            Oversampling::X2 => 0b010,
            Oversampling::X4 => 0b011,
            Oversampling::X8 => 0b100,
            Oversampling::X16 => 0b101,
        }
    }
}

/// Operating mode held in the low two bits of CTRL_MEAS.
///
/// Forced mode is a transient state; the device returns to sleep once the
/// triggered measurement completes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperatingMode {
    Sleep,
    Forced,
    /// Free-running scan mode on high-variant parts. Not used by this
    /// crate's polling component.
    Parallel,
}

impl TryFrom<u8> for OperatingMode {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0b00 => Ok(OperatingMode::Sleep),
            0b01 => Ok(OperatingMode::Forced),
            0b10 => Ok(OperatingMode::Parallel),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl Into<u8> for OperatingMode {
    fn into(self) -> u8 {
        match self {
            OperatingMode::Sleep => 0b00,
            OperatingMode::Forced => 0b01,
            OperatingMode::Parallel => 0b10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_meas_decode() {
        let reg = CtrlMeas::decode(&[0b0000_0000]).unwrap();
        assert_eq!(Oversampling::Skipped, reg.os_temp);
        assert_eq!(Oversampling::Skipped, reg.os_pres);
        assert_eq!(OperatingMode::Sleep, reg.mode);

        let reg = CtrlMeas::decode(&[0b1000_1101]).unwrap();
        assert_eq!(Oversampling::X8, reg.os_temp);
        assert_eq!(Oversampling::X4, reg.os_pres);
        assert_eq!(OperatingMode::Forced, reg.mode);
    }

    #[test]
    fn ctrl_meas_decode_invalid_oversampling() {
        assert!(CtrlMeas::decode(&[0b1100_0000]).is_err());
    }

    #[test]
    fn ctrl_meas_encode() {
        let mut buffer = [0u8; 1];
        CtrlMeas::encode(&CtrlMeasFields {
            os_temp: Oversampling::X8,
            os_pres: Oversampling::X4,
            mode: OperatingMode::Sleep,
        }, &mut buffer);
        assert_eq!([0b1000_1100], buffer);

        CtrlMeas::encode(&CtrlMeasFields {
            os_temp: Oversampling::X1,
            os_pres: Oversampling::X1,
            mode: OperatingMode::Forced,
        }, &mut buffer);
        assert_eq!([0b0010_0101], buffer);
    }
}

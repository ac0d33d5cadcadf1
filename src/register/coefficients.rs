//! NVM calibration coefficient blocks.
//!
//! The coefficients live in three separate register ranges and are read as
//! raw byte blocks; assembling them into typed calibration values is the
//! job of [`CalibrationData`](crate::calibration::CalibrationData).

use crate::register::{InvalidRegisterField, Readable, Reg};

/// First coefficient block (`0x8A`, 23 bytes): temperature par_t2/par_t3
/// and the pressure coefficients.
pub struct Coefficients1;
impl Reg for Coefficients1 { const ADDR: u8 = 0x8A; }

impl Readable for Coefficients1 {
    type Out = [u8; 23];
    const N: usize = 23;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; 23];
        out.copy_from_slice(b);
        Ok(out)
    }
}

/// Second coefficient block (`0xE1`, 14 bytes): the humidity coefficients,
/// par_t1 and the gas heater coefficients.
pub struct Coefficients2;
impl Reg for Coefficients2 { const ADDR: u8 = 0xE1; }

impl Readable for Coefficients2 {
    type Out = [u8; 14];
    const N: usize = 14;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; 14];
        out.copy_from_slice(b);
        Ok(out)
    }
}

/// Third coefficient block (`0x00`, 5 bytes): heater resistance range and
/// value plus the range switching error.
pub struct Coefficients3;
impl Reg for Coefficients3 { const ADDR: u8 = 0x00; }

impl Readable for Coefficients3 {
    type Out = [u8; 5];
    const N: usize = 5;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; 5];
        out.copy_from_slice(b);
        Ok(out)
    }
}

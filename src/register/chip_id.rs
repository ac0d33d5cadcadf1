//! ### CHIP_ID - Chip identification number (`0xD0`, 1 byte, R)
//!
//! Contains the chip identification code, which is 0x61 for the BME690
//! family.
//!
//! ### Default values
//! 0x61
#![doc(alias = "CHIP_ID")]
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker struct for the CHIP_ID (0xD0) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct ChipId;
impl Reg for ChipId { const ADDR: u8 = 0xD0; }

impl Readable for ChipId {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(b[0])
    }
}

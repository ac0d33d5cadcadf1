//! ### VARIANT_ID - Gas variant identification (`0xF0`, 1 byte, R)
//!
//! Distinguishes the low gas variant (original BME680-style resistance
//! conversion) from the high gas variant used by BME688/BME690 parts.
#![doc(alias = "VARIANT_ID")]
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker struct for the VARIANT_ID (0xF0) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct VariantId;
impl Reg for VariantId { const ADDR: u8 = 0xF0; }

impl Readable for VariantId {
    type Out = GasVariant;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(GasVariant::from(b[0]))
    }
}

/// The gas-resistance conversion variant reported by the device.
///
/// The variant decides both the position of the gas run bit in CTRL_GAS_1
/// and which resistance conversion applies to the raw gas ADC word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GasVariant {
    /// Original conversion with per-range correction tables.
    Low,
    /// Simplified conversion; BME690 parts report this variant.
    High,
}

impl From<u8> for GasVariant {
    fn from(field: u8) -> Self {
        match field {
            0x01 => GasVariant::High,
            _ => GasVariant::Low,
        }
    }
}

//! ### RESET - Soft reset register (`0xE0`, 1 byte, Write-only)
//!
//! Writing the reset command returns the device to its power-on state.
//! All user configuration is overwritten with the defaults.
//!
//! ### Default values
//! N/A. This register is write-only.
#![doc(alias = "RESET")]
use crate::register::{Reg, Writable};

/// Marker type for the RESET (0xE0) register
pub struct Reset;
impl Reg for Reset { const ADDR: u8 = 0xE0; }

/// The payload for the RESET (0xE0) register.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResetCmd {
    /// Triggers a full device reset.
    SoftReset,
}

impl Into<u8> for ResetCmd {
    fn into(self) -> u8 {
        match self {
            ResetCmd::SoftReset => 0xB6,
        }
    }
}

impl Writable for Reset {
    type In = ResetCmd;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (*v).into();
    }
}

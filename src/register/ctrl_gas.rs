//! ### CTRL_GAS_0 / CTRL_GAS_1 - Gas measurement control (`0x70`/`0x71`, R/W)
//!
//! CTRL_GAS_0 carries the heater-off flag; CTRL_GAS_1 carries the heater
//! set-point selection, the gas run bit (whose position depends on the gas
//! variant) and the odr3 bit of the output data rate.
#![doc(alias = "CTRL_GAS_0")]
#![doc(alias = "CTRL_GAS_1")]
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for CTRL_GAS_0 (0x70) register
pub struct CtrlGas0;
impl Reg for CtrlGas0 { const ADDR: u8 = 0x70; }

/// The payload for the CTRL_GAS_0 (0x70) register.
#[derive(Copy, Clone, Debug)]
pub struct CtrlGas0Fields {
    /// Disables the heater current when set.
    pub heat_off: bool,
}

impl Readable for CtrlGas0 {
    type Out = CtrlGas0Fields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlGas0Fields {
            heat_off: b[0] & 0b0000_1000 != 0,
        })
    }
}

impl Writable for CtrlGas0 {
    type In = CtrlGas0Fields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = if v.heat_off { 0b0000_1000 } else { 0 };
    }
}

/// Marker type for CTRL_GAS_1 (0x71) register
pub struct CtrlGas1;
impl Reg for CtrlGas1 { const ADDR: u8 = 0x71; }

/// The payload for the CTRL_GAS_1 (0x71) register.
#[derive(Copy, Clone, Debug)]
pub struct CtrlGas1Fields {
    /// Heater set-point index. Forced-mode operation always uses
    /// set-point 0.
    pub nb_conv: u8,
    /// Gas run bit at the low-variant position (bit 4).
    pub run_gas_low: bool,
    /// Gas run bit at the high-variant position (bit 5).
    pub run_gas_high: bool,
    /// High bit of the output data rate selection.
    pub odr3: bool,
}

impl Readable for CtrlGas1 {
    type Out = CtrlGas1Fields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlGas1Fields {
            nb_conv: b[0] & 0b0000_1111,
            run_gas_low: b[0] & 0b0001_0000 != 0,
            run_gas_high: b[0] & 0b0010_0000 != 0,
            odr3: b[0] & 0b1000_0000 != 0,
        })
    }
}

impl Writable for CtrlGas1 {
    type In = CtrlGas1Fields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let mut value = v.nb_conv & 0b0000_1111;
        if v.run_gas_low {
            value |= 0b0001_0000;
        }
        if v.run_gas_high {
            value |= 0b0010_0000;
        }
        if v.odr3 {
            value |= 0b1000_0000;
        }
        out[0] = value;
    }
}

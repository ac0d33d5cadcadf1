use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for the GAS_WAIT_0 (0x64) register holding the encoded
/// heater soak duration for set-point 0 (a 6-bit mantissa with a 2-bit
/// multiplier).
pub struct GasWait0;
impl Reg for GasWait0 { const ADDR: u8 = 0x64; }

impl Readable for GasWait0 {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(b[0])
    }
}

impl Writable for GasWait0 {
    type In = u8;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = *v;
    }
}

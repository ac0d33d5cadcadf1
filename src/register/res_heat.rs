use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker type for the RES_HEAT_0 (0x5A) register holding the encoded
/// heater resistance for set-point 0, computed from the target
/// temperature and the heater calibration values.
pub struct ResHeat0;
impl Reg for ResHeat0 { const ADDR: u8 = 0x5A; }

impl Readable for ResHeat0 {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(b[0])
    }
}

impl Writable for ResHeat0 {
    type In = u8;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = *v;
    }
}

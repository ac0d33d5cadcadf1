use crate::register::{InvalidRegisterField, Readable, Reg, Writable};
use crate::register::ctrl_meas::Oversampling;

/// Marker type for the CTRL_HUM (0x72) register holding the humidity
/// oversampling selection.
pub struct CtrlHum;
impl Reg for CtrlHum { const ADDR: u8 = 0x72; }

#[derive(Copy, Clone, Debug)]
pub struct CtrlHumFields {
    pub os_hum: Oversampling,
}

impl Readable for CtrlHum {
    type Out = CtrlHumFields;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlHumFields {
            os_hum: Oversampling::try_from(b[0] & 0b111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 0))?,
        })
    }
}

impl Writable for CtrlHum {
    type In = CtrlHumFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let os_h: u8 = v.os_hum.into();
        out[0] = os_h;
    }
}

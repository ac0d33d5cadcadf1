//! NVM calibration coefficients and measurement compensation.
//!
//! The device stores per-part calibration values in three register blocks.
//! All compensation follows the vendor's floating-point reference: raw ADC
//! words in, physical units out (°C, Pa, %RH, Ω).

use crate::bus::Bus;
use crate::error::Bme690Error;
use crate::register::coefficients::{Coefficients1, Coefficients2, Coefficients3};

/// Calibration values read from NVM during device initialization.
pub struct CalibrationData {
    par_t1: u16,
    par_t2: i16,
    par_t3: i8,
    par_p1: u16,
    par_p2: i16,
    par_p3: i8,
    par_p4: i16,
    par_p5: i16,
    par_p6: i8,
    par_p7: i8,
    par_p8: i16,
    par_p9: i16,
    par_p10: u8,
    par_h1: u16,
    par_h2: u16,
    par_h3: i8,
    par_h4: i8,
    par_h5: i8,
    par_h6: u8,
    par_h7: i8,
    par_gh1: i8,
    par_gh2: i16,
    par_gh3: i8,
    res_heat_range: u8,
    res_heat_val: i8,
    range_sw_err: i8,
    // Fine temperature carried from the latest temperature compensation,
    // consumed by pressure and humidity compensation.
    t_fine: f32,
}

impl CalibrationData {
    pub(crate) async fn new<B: Bus>(bus: &mut B) -> Result<Self, Bme690Error<B::Error>> {
        let c1 = bus.read::<Coefficients1>().await?;
        let c2 = bus.read::<Coefficients2>().await?;
        let c3 = bus.read::<Coefficients3>().await?;

        Ok(Self {
            par_t2: i16::from_le_bytes([c1[0], c1[1]]),
            par_t3: c1[2] as i8,
            par_p1: u16::from_le_bytes([c1[4], c1[5]]),
            par_p2: i16::from_le_bytes([c1[6], c1[7]]),
            par_p3: c1[8] as i8,
            par_p4: i16::from_le_bytes([c1[10], c1[11]]),
            par_p5: i16::from_le_bytes([c1[12], c1[13]]),
            par_p7: c1[14] as i8,
            par_p6: c1[15] as i8,
            par_p8: i16::from_le_bytes([c1[18], c1[19]]),
            par_p9: i16::from_le_bytes([c1[20], c1[21]]),
            par_p10: c1[22],
            par_h2: (u16::from(c2[0]) << 4) | u16::from(c2[1] >> 4),
            par_h1: (u16::from(c2[2]) << 4) | u16::from(c2[1] & 0x0F),
            par_h3: c2[3] as i8,
            par_h4: c2[4] as i8,
            par_h5: c2[5] as i8,
            par_h6: c2[6],
            par_h7: c2[7] as i8,
            par_t1: u16::from_le_bytes([c2[8], c2[9]]),
            par_gh2: i16::from_le_bytes([c2[10], c2[11]]),
            par_gh1: c2[12] as i8,
            par_gh3: c2[13] as i8,
            res_heat_val: c3[0] as i8,
            res_heat_range: (c3[2] & 0x30) >> 4,
            range_sw_err: ((c3[4] & 0xF0) as i8) >> 4,
            t_fine: 0.0,
        })
    }

    /// Converts a raw temperature ADC word to °C and updates the fine
    /// temperature used by the pressure and humidity conversions.
    pub(crate) fn compensate_temperature(&mut self, temp_adc: u32) -> f32 {
        let temp_adc = temp_adc as f32;
        let var1 = ((temp_adc / 16384.0) - (f32::from(self.par_t1) / 1024.0))
            * f32::from(self.par_t2);
        let var2 = ((temp_adc / 131072.0) - (f32::from(self.par_t1) / 8192.0))
            * ((temp_adc / 131072.0) - (f32::from(self.par_t1) / 8192.0))
            * (f32::from(self.par_t3) * 16.0);

        self.t_fine = var1 + var2;
        self.t_fine / 5120.0
    }

    /// Converts a raw pressure ADC word to Pa.
    ///
    /// Requires [`compensate_temperature`](Self::compensate_temperature) to
    /// have run for the same field first.
    pub(crate) fn compensate_pressure(&self, pres_adc: u32) -> f32 {
        let mut var1 = (self.t_fine / 2.0) - 64000.0;
        let mut var2 = var1 * var1 * (f32::from(self.par_p6) / 131072.0);
        var2 += var1 * f32::from(self.par_p5) * 2.0;
        var2 = (var2 / 4.0) + (f32::from(self.par_p4) * 65536.0);
        var1 = (((f32::from(self.par_p3) * var1 * var1) / 16384.0)
            + (f32::from(self.par_p2) * var1))
            / 524288.0;
        var1 = (1.0 + (var1 / 32768.0)) * f32::from(self.par_p1);
        let mut pressure = 1048576.0 - pres_adc as f32;
        if var1 == 0.0 {
            return 0.0;
        }
        pressure = ((pressure - (var2 / 4096.0)) * 6250.0) / var1;
        let var1 = (f32::from(self.par_p9) * pressure * pressure) / 2147483648.0;
        let var2 = pressure * (f32::from(self.par_p8) / 32768.0);
        let var3 = (pressure / 256.0)
            * (pressure / 256.0)
            * (pressure / 256.0)
            * (f32::from(self.par_p10) / 131072.0);

        pressure + (var1 + var2 + var3 + (f32::from(self.par_p7) * 128.0)) / 16.0
    }

    /// Converts a raw humidity ADC word to %RH, clamped to 0..=100.
    ///
    /// Requires [`compensate_temperature`](Self::compensate_temperature) to
    /// have run for the same field first.
    pub(crate) fn compensate_humidity(&self, hum_adc: u16) -> f32 {
        let temp_comp = self.t_fine / 5120.0;
        let var1 = f32::from(hum_adc)
            - ((f32::from(self.par_h1) * 16.0) + ((f32::from(self.par_h3) / 2.0) * temp_comp));
        let var2 = var1
            * ((f32::from(self.par_h2) / 262144.0)
                * (1.0
                    + ((f32::from(self.par_h4) / 16384.0) * temp_comp)
                    + ((f32::from(self.par_h5) / 1048576.0) * temp_comp * temp_comp)));
        let var3 = f32::from(self.par_h6) / 16384.0;
        let var4 = f32::from(self.par_h7) / 2097152.0;
        let humidity = var2 + ((var3 + (var4 * temp_comp)) * var2 * var2);

        if humidity > 100.0 {
            100.0
        } else if humidity < 0.0 {
            0.0
        } else {
            humidity
        }
    }

    /// Converts a raw gas ADC word to Ω for high-variant parts.
    pub(crate) fn gas_resistance_high(&self, gas_adc: u16, gas_range: u8) -> f32 {
        let var1 = 262144u32 >> gas_range;
        let mut var2 = i32::from(gas_adc) - 512;
        var2 *= 3;
        var2 += 4096;

        1000000.0 * var1 as f32 / var2 as f32
    }

    /// Converts a raw gas ADC word to Ω for low-variant parts, applying the
    /// per-range correction tables and the range switching error.
    pub(crate) fn gas_resistance_low(&self, gas_adc: u16, gas_range: u8) -> f32 {
        const LOOKUP_K1_RANGE: [f32; 16] = [
            0.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, -0.8, 0.0, 0.0, -0.2, -0.5, 0.0, -1.0, 0.0, 0.0,
        ];
        const LOOKUP_K2_RANGE: [f32; 16] = [
            0.0, 0.0, 0.0, 0.0, 0.1, 0.7, 0.0, -0.8, -0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];

        let gas_range_f = (1u32 << gas_range) as f32;
        let var1 = 1340.0 + (5.0 * f32::from(self.range_sw_err));
        let var2 = var1 * (1.0 + LOOKUP_K1_RANGE[usize::from(gas_range)] / 100.0);
        let var3 = 1.0 + (LOOKUP_K2_RANGE[usize::from(gas_range)] / 100.0);

        1.0 / (var3 * 0.000000125 * gas_range_f * (((f32::from(gas_adc) - 512.0) / var2) + 1.0))
    }

    /// Encodes a heater target temperature (°C) into the RES_HEAT register
    /// value, given the current ambient temperature hint.
    ///
    /// Targets above 400 °C are clamped to 400 °C.
    pub(crate) fn heater_resistance(&self, target_c: u16, ambient_c: i8) -> u8 {
        let target = if target_c > 400 { 400.0 } else { f32::from(target_c) };

        let var1 = f32::from(self.par_gh1) / 16.0 + 49.0;
        let var2 = (f32::from(self.par_gh2) / 32768.0) * 0.0005 + 0.00235;
        let var3 = f32::from(self.par_gh3) / 1024.0;
        let var4 = var1 * (1.0 + (var2 * target));
        let var5 = var4 + (var3 * f32::from(ambient_c));

        (3.4 * ((var5
            * (4.0 / (4.0 + f32::from(self.res_heat_range)))
            * (1.0 / (1.0 + (f32::from(self.res_heat_val) * 0.002))))
            - 25.0)) as u8
    }
}

/// Encodes a heater soak duration in milliseconds into the GAS_WAIT
/// register format: a 6-bit mantissa scaled by a 2-bit power-of-4 factor.
///
/// Durations of 0xFC0 ms and above saturate to the register maximum.
pub fn heater_wait(duration_ms: u16) -> u8 {
    if duration_ms >= 0xFC0 {
        return 0xFF;
    }

    let mut dur = duration_ms;
    let mut factor: u8 = 0;
    while dur > 0x3F {
        dur /= 4;
        factor += 1;
    }

    dur as u8 + factor * 64
}

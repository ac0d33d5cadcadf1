use crate::bus::{Bus, I2c};
use crate::calibration::{heater_wait, CalibrationData};
use crate::config::{Configuration, HeaterConfiguration};
use crate::error::Bme690Error;
use crate::register::chip_id::ChipId;
use crate::register::config::{Config, ConfigFields, OutputDataRate};
use crate::register::ctrl_gas::{CtrlGas0, CtrlGas1};
use crate::register::ctrl_hum::{CtrlHum, CtrlHumFields};
use crate::register::ctrl_meas::{CtrlMeas, OperatingMode, Oversampling};
use crate::register::field::Field0;
use crate::register::gas_wait::GasWait0;
use crate::register::res_heat::ResHeat0;
use crate::register::reset::{Reset, ResetCmd};
use crate::register::variant_id::{GasVariant, VariantId};
use crate::register::{Readable, Writable};
use embedded_hal::i2c::SevenBitAddress;
use embedded_hal_async::delay::DelayNs;

/// Type alias for a Bme690 device communicating over I2C
type Bme690I2c<T> = Bme690<I2c<T>>;

const BME690_CHIP_ID: u8 = 0x61;

/// Settle time after a soft reset before the device accepts traffic again.
const RESET_SETTLE_MS: u32 = 10;

/// Type alias used to simplify return types throughout the driver
pub type Bme690Result<T, BusError> = Result<T, Bme690Error<BusError>>;

/// Main Bme690 device driver struct.
///
/// This is the vendor-API surface: initialization, configuration
/// read/write, heater configuration, mode switching and data read-back.
/// The polling component in [`crate::component`] drives it on a schedule.
pub struct Bme690<B> {
    bus: B,
    calibration: CalibrationData,
    variant: GasVariant,
    ambient_temperature_c: i8,
}

impl<T> Bme690I2c<T>
where
    T: embedded_hal_async::i2c::I2c,
    I2c<T>: Bus,
{
    /// Constructs a new Bme690 driver instance that communicates over I2C.
    ///
    /// This function will:
    /// - Probe for a connected device.
    /// - Perform a soft reset.
    /// - Read the gas variant id.
    /// - Load calibration coefficients from NVM.
    ///
    /// The ambient temperature hint (°C) feeds the heater resistance
    /// compensation; room temperature is a fine default.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use embedded_hal_async::delay::DelayNs;
    /// # use embedded_hal_async::i2c::I2c;
    /// # use bme690_rs::{Bme690, Bme690Result, SdoPinState};
    /// # async fn demo<I: I2c, D: DelayNs>(i2c: I, mut delay: D) -> Bme690Result<(), I::Error> {
    /// let mut device = Bme690::new_i2c(i2c, SdoPinState::High, 25, &mut delay).await?;
    /// let _measurement = device.read_sensor_data().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new_i2c<D: DelayNs>(
        i2c: T,
        sdo_pin_state: SdoPinState,
        ambient_temperature_c: i8,
        delay: &mut D,
    ) -> Bme690Result<Self, <I2c<T> as Bus>::Error> {
        Self::new(I2c::new(i2c, sdo_pin_state.into()), ambient_temperature_c, delay).await
    }
}

impl<B> Bme690<B>
where
    B: Bus,
{
    /// Probes if the device is ready by attempting to read ChipId [`attempts`] times with a 1 ms delay.
    ///
    /// Returns [`Bme690Error::NotConnected`] if no response is received.
    async fn probe_ready<D: DelayNs>(
        bus: &mut B,
        delay: &mut D,
        attempts: u32,
    ) -> Bme690Result<(), B::Error> {
        for _ in 0..attempts {
            if let Ok(id) = bus.read::<ChipId>().await {
                if id == BME690_CHIP_ID {
                    return Ok(());
                }
            }

            delay.delay_ms(1).await;
        }

        Err(Bme690Error::NotConnected)
    }

    /// Creates a new instance of the Bme690 driver struct.
    pub(crate) async fn new<D: DelayNs>(
        mut bus: B,
        ambient_temperature_c: i8,
        delay: &mut D,
    ) -> Bme690Result<Self, B::Error> {
        Self::probe_ready(&mut bus, delay, 5).await?;

        bus.write::<Reset>(&ResetCmd::SoftReset).await?;
        delay.delay_ms(RESET_SETTLE_MS).await;

        let variant = bus.read::<VariantId>().await?;
        let calibration = CalibrationData::new(&mut bus).await?;

        Ok(Bme690 {
            bus,
            calibration,
            variant,
            ambient_temperature_c,
        })
    }

    /// Read a register (or fixed-size register block) using a typed marker
    /// from [`crate::register`].
    ///
    /// The bus transfer length and address come from `R::N` and `R::ADDR`,
    /// and bytes are decoded by `R::decode(...)`. The convenience methods
    /// (e.g. [`read_sensor_data`](Self::read_sensor_data)) are easier to
    /// discover; this generic is here when you want full control.
    pub async fn read<R: Readable>(&mut self) -> Bme690Result<R::Out, B::Error> {
        self.bus.read::<R>().await
    }

    /// Write a register using a typed marker from [`crate::register`].
    ///
    /// This performs a direct write of the provided fields. If you need to
    /// preserve unrelated bits, prefer a read-modify-write: read the
    /// struct, change the fields you care about, then write it back.
    pub async fn write<W: Writable>(&mut self, v: &W::In) -> Bme690Result<(), B::Error> {
        self.bus.write::<W>(v).await
    }

    /// Determines if the device is connected by attempting to read the chip id register.
    pub async fn is_connected(&mut self) -> Bme690Result<bool, B::Error> {
        let id = self.bus.read::<ChipId>().await?;

        Ok(id == BME690_CHIP_ID)
    }

    /// The gas conversion variant reported by the device at init.
    pub fn gas_variant(&self) -> GasVariant {
        self.variant
    }

    /// Updates the ambient temperature hint (°C) used by subsequent heater
    /// configuration.
    pub fn set_ambient_temperature(&mut self, ambient_temperature_c: i8) {
        self.ambient_temperature_c = ambient_temperature_c;
    }

    /// Returns the current measurement configuration assembled from the
    /// control registers.
    pub async fn configuration(&mut self) -> Bme690Result<Configuration, B::Error> {
        let hum = self.bus.read::<CtrlHum>().await?;
        let meas = self.bus.read::<CtrlMeas>().await?;
        let config = self.bus.read::<Config>().await?;
        let gas1 = self.bus.read::<CtrlGas1>().await?;

        Ok(Configuration {
            humidity_oversampling: hum.os_hum,
            temperature_oversampling: meas.os_temp,
            pressure_oversampling: meas.os_pres,
            iir_filter: config.filter,
            output_data_rate: OutputDataRate::from_parts(config.odr20, gas1.odr3),
        })
    }

    /// Applies the given configuration by writing to the control
    /// registers.
    ///
    /// Bits outside the configuration's reach (the operating mode, the gas
    /// run and set-point selection) are preserved via read-modify-write.
    pub async fn apply_configuration(
        &mut self,
        config: &Configuration,
    ) -> Bme690Result<(), B::Error> {
        let mut meas = self.bus.read::<CtrlMeas>().await?;
        meas.os_temp = config.temperature_oversampling;
        meas.os_pres = config.pressure_oversampling;
        self.bus.write::<CtrlMeas>(&meas).await?;

        self.bus
            .write::<CtrlHum>(&CtrlHumFields {
                os_hum: config.humidity_oversampling,
            })
            .await?;

        let (odr20, odr3) = config.output_data_rate.split();
        self.bus
            .write::<Config>(&ConfigFields {
                filter: config.iir_filter,
                odr20,
            })
            .await?;

        let mut gas1 = self.bus.read::<CtrlGas1>().await?;
        gas1.odr3 = odr3;
        self.bus.write::<CtrlGas1>(&gas1).await?;

        Ok(())
    }

    /// Applies a forced-mode heater configuration: the encoded resistance
    /// set-point, the encoded soak duration, the heater-off flag and the
    /// gas run bit for the device's variant.
    pub async fn apply_heater_configuration(
        &mut self,
        heater: &HeaterConfiguration,
    ) -> Bme690Result<(), B::Error> {
        let res_heat = self
            .calibration
            .heater_resistance(heater.temperature_c, self.ambient_temperature_c);
        self.bus.write::<ResHeat0>(&res_heat).await?;
        self.bus.write::<GasWait0>(&heater_wait(heater.duration_ms)).await?;

        let mut gas0 = self.bus.read::<CtrlGas0>().await?;
        gas0.heat_off = !heater.enable;
        self.bus.write::<CtrlGas0>(&gas0).await?;

        let mut gas1 = self.bus.read::<CtrlGas1>().await?;
        gas1.nb_conv = 0;
        match self.variant {
            GasVariant::Low => gas1.run_gas_low = heater.enable,
            GasVariant::High => gas1.run_gas_high = heater.enable,
        }
        self.bus.write::<CtrlGas1>(&gas1).await?;

        Ok(())
    }

    /// Sets the operating mode, preserving the oversampling bits that share
    /// the register.
    ///
    /// Writing [`OperatingMode::Forced`] from sleep triggers a single
    /// measurement after which the device returns to sleep on its own.
    pub async fn set_mode(&mut self, mode: OperatingMode) -> Bme690Result<(), B::Error> {
        let mut meas = self.bus.read::<CtrlMeas>().await?;
        meas.mode = mode;
        self.bus.write::<CtrlMeas>(&meas).await?;

        Ok(())
    }

    /// Reads the current operating mode.
    pub async fn mode(&mut self) -> Bme690Result<OperatingMode, B::Error> {
        Ok(self.bus.read::<CtrlMeas>().await?.mode)
    }

    /// Reads back at most one measurement record.
    ///
    /// Returns `Ok(None)` when the data registers hold no completed
    /// measurement. On success the raw ADC words are compensated with the
    /// NVM calibration into physical units.
    pub async fn read_sensor_data(&mut self) -> Bme690Result<Option<Measurement>, B::Error> {
        let raw = self.bus.read::<Field0>().await?;
        if !raw.new_data {
            return Ok(None);
        }

        let temperature = self.calibration.compensate_temperature(raw.temperature_adc);
        let pressure = self.calibration.compensate_pressure(raw.pressure_adc);
        let humidity = self.calibration.compensate_humidity(raw.humidity_adc);

        let gas = raw.gas(self.variant);
        let gas_resistance = match self.variant {
            GasVariant::Low => self.calibration.gas_resistance_low(gas.adc, gas.range),
            GasVariant::High => self.calibration.gas_resistance_high(gas.adc, gas.range),
        };

        Ok(Some(Measurement {
            temperature,
            pressure,
            humidity,
            gas_resistance,
            gas_valid: gas.valid,
            heater_stable: gas.heater_stable,
        }))
    }
}

/// Computes the duration of one measurement in microseconds for the given
/// mode and configuration.
///
/// This covers the TPH conversion cycles, channel switching, the gas
/// conversion slot and (outside parallel mode) the wake-up time. It does
/// NOT include the heater soak duration, which the caller adds on top.
pub fn measurement_duration_us(mode: OperatingMode, config: &Configuration) -> u32 {
    fn cycles(os: Oversampling) -> u32 {
        match os {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }

    let meas_cycles = cycles(config.temperature_oversampling)
        + cycles(config.pressure_oversampling)
        + cycles(config.humidity_oversampling);

    let mut duration = meas_cycles * 1963;
    duration += 477 * 4; // TPH switching duration
    duration += 477 * 5; // Gas measurement duration

    if mode != OperatingMode::Parallel {
        duration += 1000; // Wake up duration
    }

    duration
}

/// This enum should reflect the physical state of the SDO pin. This is used to determine the I2C address
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SdoPinState {
    /// SDO is pulled high by connection to VDDIO
    High,
    /// SDO is pulled low by connection to GND
    Low,
}

impl Into<SevenBitAddress> for SdoPinState {
    fn into(self) -> SevenBitAddress {
        match self {
            SdoPinState::High => 0x77,
            SdoPinState::Low => 0x76,
        }
    }
}

/// Holds one compensated measurement.
#[derive(Copy, Clone, Debug)]
pub struct Measurement {
    /// Temperature in °C.
    pub temperature: f32,
    /// Pressure in Pa.
    pub pressure: f32,
    /// Relative humidity in %.
    pub humidity: f32,
    /// Gas resistance in Ω.
    pub gas_resistance: f32,
    /// The gas-validity status bit of the record.
    pub gas_valid: bool,
    /// The heater reached its set-point before the gas reading.
    pub heater_stable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::coefficients::{Coefficients1, Coefficients2, Coefficients3};
    use crate::register::Reg;
    use crate::testing::{FakeBus, FakeDelay};

    // Calibration chosen so compensation collapses to exact values:
    // par_t1 = 1024, par_t2 = 1024, par_p1 = 1, everything else zero.
    fn seed_device_regs(bus: &FakeBus<16>) {
        bus.with_response::<ChipId>(&[0x61]);
        bus.with_response::<VariantId>(&[0x01]);

        let mut c1 = [0u8; 23];
        c1[1] = 0x04; // par_t2 = 1024
        c1[4] = 0x01; // par_p1 = 1
        let mut c2 = [0u8; 14];
        c2[9] = 0x04; // par_t1 = 1024
        bus.with_response::<Coefficients1>(&c1);
        bus.with_response::<Coefficients2>(&c2);
        bus.with_response::<Coefficients3>(&[0u8; 5]);

        bus.with_any_response::<CtrlHum>();
        bus.with_any_response::<CtrlMeas>();
        bus.with_any_response::<Config>();
        bus.with_any_response::<CtrlGas0>();
        bus.with_any_response::<CtrlGas1>();
    }

    #[tokio::test]
    async fn bme690_init() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);

        let mut device = Bme690::new(&bus, 25, &mut FakeDelay {}).await.unwrap();

        assert_eq!(GasVariant::High, device.gas_variant());
        assert!(device.is_connected().await.unwrap());
        assert_eq!(Some(0xB6), bus.last_write(Reset::ADDR));
    }

    #[tokio::test]
    async fn bme690_init_fails_without_device() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);
        bus.with_read_failure::<ChipId>();

        let result = Bme690::new(&bus, 25, &mut FakeDelay {}).await;

        assert!(matches!(result, Err(Bme690Error::NotConnected)));
        // Nothing may be written to a device that never answered the probe.
        assert!(bus.writes().is_empty());
    }

    #[tokio::test]
    async fn bme690_apply_configuration() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);

        let mut device = Bme690::new(&bus, 25, &mut FakeDelay {}).await.unwrap();
        device.apply_configuration(&Configuration::default()).await.unwrap();

        // T x8 / P x4, sleep mode preserved from the register.
        assert_eq!(Some(0b1000_1100), bus.last_write(CtrlMeas::ADDR));
        // H x2.
        assert_eq!(Some(0b0000_0010), bus.last_write(CtrlHum::ADDR));
        // IIR coefficient 3, no free-running rate.
        assert_eq!(Some(0b0000_1000), bus.last_write(Config::ADDR));
        assert_eq!(Some(0b1000_0000), bus.last_write(CtrlGas1::ADDR));
    }

    #[tokio::test]
    async fn bme690_apply_heater_configuration() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);

        let mut device = Bme690::new(&bus, 25, &mut FakeDelay {}).await.unwrap();
        device
            .apply_heater_configuration(&HeaterConfiguration::default())
            .await
            .unwrap();

        assert_eq!(Some(206), bus.last_write(ResHeat0::ADDR));
        assert_eq!(Some(101), bus.last_write(GasWait0::ADDR));
        // Heater stays powered, gas run bit at the high-variant position.
        assert_eq!(Some(0b0000_0000), bus.last_write(CtrlGas0::ADDR));
        assert_eq!(Some(0b0010_0000), bus.last_write(CtrlGas1::ADDR));
    }

    #[tokio::test]
    async fn bme690_set_mode() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);
        bus.with_response::<CtrlMeas>(&[0b1000_1100]);

        let mut device = Bme690::new(&bus, 25, &mut FakeDelay {}).await.unwrap();
        device.set_mode(OperatingMode::Forced).await.unwrap();

        assert_eq!(Some(0b1000_1101), bus.last_write(CtrlMeas::ADDR));
    }

    #[tokio::test]
    async fn bme690_read_sensor_data() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);
        bus.with_response::<Field0>(&[
            0x80, 0x00, 0xFF, 0xFF, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x80, 0x30,
        ]);

        let mut device = Bme690::new(&bus, 25, &mut FakeDelay {}).await.unwrap();
        let measurement = device.read_sensor_data().await.unwrap().unwrap();

        assert_eq!(0.0, measurement.temperature);
        assert_eq!(100000.0, measurement.pressure);
        assert_eq!(0.0, measurement.humidity);
        assert_eq!(64000000.0, measurement.gas_resistance);
        assert!(measurement.gas_valid);
        assert!(measurement.heater_stable);
    }

    #[tokio::test]
    async fn bme690_read_sensor_data_without_new_data() {
        let bus = FakeBus::<16>::new();
        seed_device_regs(&bus);
        bus.with_response::<Field0>(&[0u8; 17]);

        let mut device = Bme690::new(&bus, 25, &mut FakeDelay {}).await.unwrap();

        assert!(device.read_sensor_data().await.unwrap().is_none());
    }

    #[test]
    fn measurement_duration() {
        // T x8 + P x4 + H x2 = 14 cycles.
        let config = Configuration::default();
        assert_eq!(32775, measurement_duration_us(OperatingMode::Forced, &config));

        let config = Configuration::default()
            .temperature_oversampling(Oversampling::X1)
            .pressure_oversampling(Oversampling::X1)
            .humidity_oversampling(Oversampling::X1);
        assert_eq!(11182, measurement_duration_us(OperatingMode::Forced, &config));

        // Parallel mode skips the wake-up allowance.
        assert_eq!(
            measurement_duration_us(OperatingMode::Forced, &config) - 1000,
            measurement_duration_us(OperatingMode::Parallel, &config)
        );
    }
}

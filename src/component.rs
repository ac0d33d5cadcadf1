//! Polling component wrapping the device driver.
//!
//! This is the integration layer between the sensor and a host automation
//! framework: a `setup`/`update`/`dump_config` lifecycle, optional
//! publication sinks per measured channel, and two failure tiers. Setup
//! failures are permanent: the component marks itself failed and performs
//! no further device traffic. Poll failures are transient and raise a
//! warning that the next successful measurement clears.
//!
//! The component owns its bus adapter, delay source and sinks outright, so
//! any number of instances can coexist.

use core::fmt::Debug;
use core::mem;

use embedded_hal_async::delay::DelayNs;
use log::{error, info, warn};

use crate::bme690::{measurement_duration_us, Bme690, SdoPinState};
use crate::bus::{Bus, I2c};
use crate::config::{Configuration, HeaterConfiguration};
use crate::register::config::OutputDataRate;
use crate::register::ctrl_meas::OperatingMode;
use crate::sink::Sink;

/// The component is either waiting for setup, fully initialized, or
/// permanently failed. There is no partially-initialized state: every
/// setup step has to succeed before the device becomes available to the
/// poller.
enum DeviceState<B> {
    Pending(B),
    Running {
        device: Bme690<B>,
        applied: Configuration,
    },
    Failed,
}

/// A BME690 polling component.
///
/// Construct it with a bus and delay source, bind the sinks and settings
/// you need, then let the host call [`setup`](Self::setup) once and
/// [`update`](Self::update) on its polling cadence.
pub struct Bme690Component<B, D, S> {
    device: DeviceState<B>,
    delay: D,
    configuration: Configuration,
    heater: HeaterConfiguration,
    ambient_temperature_c: i8,
    temperature_sink: Option<S>,
    pressure_sink: Option<S>,
    humidity_sink: Option<S>,
    gas_resistance_sink: Option<S>,
    warning: bool,
}

impl<T, D, S> Bme690Component<I2c<T>, D, S>
where
    T: embedded_hal_async::i2c::I2c,
    I2c<T>: Bus,
    <I2c<T> as Bus>::Error: Debug,
    D: DelayNs,
    S: Sink,
{
    /// Creates a component over an I2C peripheral, with the device address
    /// selected by the SDO pin level.
    pub fn new_i2c(i2c: T, sdo_pin_state: SdoPinState, delay: D) -> Self {
        Self::new(I2c::new(i2c, sdo_pin_state.into()), delay)
    }
}

impl<B, D, S> Bme690Component<B, D, S>
where
    B: Bus,
    B::Error: Debug,
    D: DelayNs,
    S: Sink,
{
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            device: DeviceState::Pending(bus),
            delay,
            configuration: Configuration::default(),
            heater: HeaterConfiguration::default(),
            ambient_temperature_c: 25,
            temperature_sink: None,
            pressure_sink: None,
            humidity_sink: None,
            gas_resistance_sink: None,
            warning: false,
        }
    }

    /// Replaces the measurement configuration applied at setup.
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;

        self
    }

    /// Replaces the heater configuration applied at setup.
    pub fn with_heater_configuration(mut self, heater: HeaterConfiguration) -> Self {
        self.heater = heater;

        self
    }

    /// Sets the ambient temperature hint (°C) used by the heater
    /// compensation.
    pub fn with_ambient_temperature(mut self, ambient_temperature_c: i8) -> Self {
        self.ambient_temperature_c = ambient_temperature_c;

        self
    }

    pub fn with_temperature_sink(mut self, sink: S) -> Self {
        self.temperature_sink = Some(sink);

        self
    }

    pub fn with_pressure_sink(mut self, sink: S) -> Self {
        self.pressure_sink = Some(sink);

        self
    }

    pub fn with_humidity_sink(mut self, sink: S) -> Self {
        self.humidity_sink = Some(sink);

        self
    }

    pub fn with_gas_resistance_sink(mut self, sink: S) -> Self {
        self.gas_resistance_sink = Some(sink);

        self
    }

    /// Initializes the device and applies the configured settings.
    ///
    /// Every step is fail-fast: the first error marks the component as
    /// permanently failed and the remaining steps are skipped. The device
    /// is stateless hardware, so there is nothing to roll back.
    pub async fn setup(&mut self) {
        info!("Setting up BME690...");

        let bus = match mem::replace(&mut self.device, DeviceState::Failed) {
            DeviceState::Pending(bus) => bus,
            other => {
                self.device = other;
                return;
            }
        };

        let mut device = match Bme690::new(bus, self.ambient_temperature_c, &mut self.delay).await
        {
            Ok(device) => device,
            Err(e) => {
                error!("Failed to initialize BME690 sensor! Error: {:?}", e);
                return;
            }
        };

        // Start from the device's current configuration so fields this
        // component does not manage keep their values.
        let mut configuration = match device.configuration().await {
            Ok(configuration) => configuration,
            Err(e) => {
                error!("Failed to get sensor configuration! Error: {:?}", e);
                return;
            }
        };

        configuration.temperature_oversampling = self.configuration.temperature_oversampling;
        configuration.pressure_oversampling = self.configuration.pressure_oversampling;
        configuration.humidity_oversampling = self.configuration.humidity_oversampling;
        configuration.iir_filter = self.configuration.iir_filter;
        // Sampling is polled, never free-running.
        configuration.output_data_rate = OutputDataRate::None;

        if let Err(e) = device.apply_configuration(&configuration).await {
            error!("Failed to set sensor configuration! Error: {:?}", e);
            return;
        }

        if let Err(e) = device.apply_heater_configuration(&self.heater).await {
            error!("Failed to set heater configuration! Error: {:?}", e);
            return;
        }

        self.device = DeviceState::Running {
            device,
            applied: configuration,
        };
        info!("BME690 setup complete");
    }

    /// Runs one polling cycle: triggers a forced measurement, waits for it
    /// to complete, reads back the record and publishes it.
    pub async fn update(&mut self) {
        let Self {
            device,
            delay,
            heater,
            temperature_sink,
            pressure_sink,
            humidity_sink,
            gas_resistance_sink,
            warning,
            ..
        } = self;

        let DeviceState::Running { device, applied } = device else {
            return;
        };

        if let Err(e) = device.set_mode(OperatingMode::Forced).await {
            warn!("Failed to set sensor mode! Error: {:?}", e);
            *warning = true;
            return;
        }

        // Measurement duration plus the heater soak time.
        let wait_us = measurement_duration_us(OperatingMode::Forced, applied)
            + u32::from(heater.duration_ms) * 1000;
        delay.delay_us(wait_us).await;

        match device.read_sensor_data().await {
            Err(e) => {
                warn!("Failed to read sensor data! Error: {:?}", e);
                *warning = true;
            }
            Ok(None) => {
                warn!("No new data available");
            }
            Ok(Some(measurement)) => {
                if let Some(sink) = temperature_sink {
                    sink.publish(measurement.temperature);
                }
                if let Some(sink) = pressure_sink {
                    // Pa -> hPa
                    sink.publish(measurement.pressure / 100.0);
                }
                if let Some(sink) = humidity_sink {
                    sink.publish(measurement.humidity);
                }
                if let Some(sink) = gas_resistance_sink {
                    if measurement.gas_valid {
                        sink.publish(measurement.gas_resistance);
                    }
                }
                *warning = false;
            }
        }
    }

    /// Logs the configured settings and the component's health.
    pub fn dump_config(&self) {
        info!("BME690:");
        if self.is_failed() {
            error!("Communication with BME690 failed!");
        }
        info!("  Temperature Oversampling: {:?}", self.configuration.temperature_oversampling);
        info!("  Pressure Oversampling: {:?}", self.configuration.pressure_oversampling);
        info!("  Humidity Oversampling: {:?}", self.configuration.humidity_oversampling);
        info!("  IIR Filter: {:?}", self.configuration.iir_filter);
        info!("  Heater Temperature: {}°C", self.heater.temperature_c);
        info!("  Heater Duration: {}ms", self.heater.duration_ms);
    }

    /// The component failed during setup and performs no further work.
    pub fn is_failed(&self) -> bool {
        matches!(self.device, DeviceState::Failed)
    }

    /// A transient poll failure is currently raised.
    pub fn has_warning(&self) -> bool {
        self.warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::chip_id::ChipId;
    use crate::register::coefficients::{Coefficients1, Coefficients2, Coefficients3};
    use crate::register::config::Config;
    use crate::register::ctrl_gas::{CtrlGas0, CtrlGas1};
    use crate::register::ctrl_hum::CtrlHum;
    use crate::register::ctrl_meas::CtrlMeas;
    use crate::register::field::Field0;
    use crate::register::gas_wait::GasWait0;
    use crate::register::res_heat::ResHeat0;
    use crate::register::variant_id::VariantId;
    use crate::register::Reg;
    use crate::testing::{FakeBus, RecordingDelay, RecordingSink};

    // A field with new_data set and raw words chosen so the reference
    // calibration produces 0 °C, 100000 Pa, 0 %RH and 64 MΩ (gas valid,
    // heater stable).
    const FIELD_WITH_DATA: [u8; 17] = [
        0x80, 0x00, 0xFF, 0xFF, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x80, 0x30,
    ];

    fn seeded_bus() -> FakeBus<16> {
        let bus = FakeBus::<16>::new();
        bus.with_response::<ChipId>(&[0x61]);
        bus.with_response::<VariantId>(&[0x01]);

        // par_t1 = 1024, par_t2 = 1024, par_p1 = 1, everything else zero.
        let mut c1 = [0u8; 23];
        c1[1] = 0x04;
        c1[4] = 0x01;
        let mut c2 = [0u8; 14];
        c2[9] = 0x04;
        bus.with_response::<Coefficients1>(&c1);
        bus.with_response::<Coefficients2>(&c2);
        bus.with_response::<Coefficients3>(&[0u8; 5]);

        bus.with_any_response::<CtrlHum>();
        bus.with_any_response::<CtrlMeas>();
        bus.with_any_response::<Config>();
        bus.with_any_response::<CtrlGas0>();
        bus.with_any_response::<CtrlGas1>();
        bus.with_response::<Field0>(&FIELD_WITH_DATA);

        bus
    }

    #[tokio::test]
    async fn setup_failure_at_init_marks_failed() {
        let bus = seeded_bus();
        bus.with_read_failure::<ChipId>();
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_temperature_sink(&temperature);
        component.setup().await;

        assert!(component.is_failed());
        assert!(bus.writes().is_empty());

        // A failed component performs no further device traffic.
        component.update().await;
        assert!(bus.writes().is_empty());
        assert_eq!(0, temperature.count());
    }

    #[tokio::test]
    async fn setup_failure_at_configuration_marks_failed() {
        let bus = seeded_bus();
        bus.with_write_failure::<CtrlMeas>();
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_temperature_sink(&temperature);
        component.setup().await;

        assert!(component.is_failed());
        // The failed step aborts the remaining configuration and heater
        // writes.
        assert!(bus.last_write(CtrlHum::ADDR).is_none());
        assert!(bus.last_write(ResHeat0::ADDR).is_none());

        component.update().await;
        assert_eq!(0, temperature.count());
    }

    #[tokio::test]
    async fn setup_failure_at_heater_marks_failed() {
        let bus = seeded_bus();
        bus.with_write_failure::<ResHeat0>();
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_temperature_sink(&temperature);
        component.setup().await;

        assert!(component.is_failed());
        assert!(bus.last_write(GasWait0::ADDR).is_none());
    }

    #[tokio::test]
    async fn update_publishes_measurement() {
        let bus = seeded_bus();
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();
        let pressure = RecordingSink::new();
        let humidity = RecordingSink::new();
        let gas = RecordingSink::new();

        let mut component = Bme690Component::new(&bus, &delay)
            .with_temperature_sink(&temperature)
            .with_pressure_sink(&pressure)
            .with_humidity_sink(&humidity)
            .with_gas_resistance_sink(&gas);
        component.setup().await;
        assert!(!component.is_failed());

        component.update().await;

        assert_eq!(Some(0.0), temperature.last());
        // Published in hPa: 100000 Pa / 100.
        assert_eq!(Some(1000.0), pressure.last());
        assert_eq!(Some(0.0), humidity.last());
        assert_eq!(Some(64000000.0), gas.last());
        assert!(!component.has_warning());
    }

    #[tokio::test]
    async fn update_waits_measurement_and_heater_duration() {
        let bus = seeded_bus();
        let delay = RecordingDelay::new();
        let pressure = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_pressure_sink(&pressure);
        component.setup().await;
        component.update().await;

        // 14 cycles x 1963 + 477 x 9 + 1000 wake-up = 32775 µs, plus the
        // 150 ms heater soak.
        assert_eq!(Some(182775), delay.last_us());
    }

    #[tokio::test]
    async fn update_without_new_data_publishes_nothing() {
        let bus = seeded_bus();
        bus.with_response::<Field0>(&[0u8; 17]);
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_temperature_sink(&temperature);
        component.setup().await;
        component.update().await;

        assert_eq!(0, temperature.count());
        assert!(!component.has_warning());
    }

    #[tokio::test]
    async fn gas_resistance_withheld_when_invalid() {
        let bus = seeded_bus();
        let mut field = FIELD_WITH_DATA;
        // Heater stable but gas-validity bit clear.
        field[16] = 0x10;
        bus.with_response::<Field0>(&field);
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();
        let gas = RecordingSink::new();

        let mut component = Bme690Component::new(&bus, &delay)
            .with_temperature_sink(&temperature)
            .with_gas_resistance_sink(&gas);
        component.setup().await;
        component.update().await;

        assert_eq!(1, temperature.count());
        assert_eq!(0, gas.count());
    }

    #[tokio::test]
    async fn unbound_sinks_suppress_publication() {
        let bus = seeded_bus();
        let delay = RecordingDelay::new();
        let pressure = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_pressure_sink(&pressure);
        component.setup().await;
        component.update().await;

        assert_eq!(Some(1000.0), pressure.last());
        assert_eq!(1, pressure.count());
    }

    #[tokio::test]
    async fn transient_failures_raise_and_clear_warning() {
        let bus = seeded_bus();
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_temperature_sink(&temperature);
        component.setup().await;

        // Read failure raises the warning and publishes nothing.
        bus.with_read_failure::<Field0>();
        component.update().await;
        assert!(component.has_warning());
        assert_eq!(0, temperature.count());

        // An empty-but-successful cycle leaves the warning raised.
        bus.clear_read_failures();
        bus.with_response::<Field0>(&[0u8; 17]);
        component.update().await;
        assert!(component.has_warning());

        // The next successful measurement clears it.
        bus.with_response::<Field0>(&FIELD_WITH_DATA);
        component.update().await;
        assert!(!component.has_warning());
        assert_eq!(1, temperature.count());
    }

    #[tokio::test]
    async fn mode_set_failure_raises_warning() {
        let bus = seeded_bus();
        let delay = RecordingDelay::new();
        let temperature = RecordingSink::new();

        let mut component =
            Bme690Component::new(&bus, &delay).with_temperature_sink(&temperature);
        component.setup().await;

        bus.with_write_failure::<CtrlMeas>();
        component.update().await;

        assert!(component.has_warning());
        assert_eq!(0, temperature.count());
    }
}

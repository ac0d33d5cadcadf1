use crate::register::config::{IirFilter, OutputDataRate};
use crate::register::ctrl_meas::Oversampling;

/// Measurement configuration: per-channel oversampling, IIR filtering and
/// the output data rate.
///
/// The defaults match a polled indoor-air-quality setup: strong
/// temperature oversampling, no free-running data rate.
#[derive(Copy, Clone, Debug)]
pub struct Configuration {
    pub(crate) temperature_oversampling: Oversampling,
    pub(crate) pressure_oversampling: Oversampling,
    pub(crate) humidity_oversampling: Oversampling,
    pub(crate) iir_filter: IirFilter,
    pub(crate) output_data_rate: OutputDataRate,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            temperature_oversampling: Oversampling::X8,
            pressure_oversampling: Oversampling::X4,
            humidity_oversampling: Oversampling::X2,
            iir_filter: IirFilter::Coef3,
            output_data_rate: OutputDataRate::None,
        }
    }
}

impl Configuration {
    pub fn temperature_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.temperature_oversampling = oversampling;

        self
    }

    pub fn pressure_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.pressure_oversampling = oversampling;

        self
    }

    pub fn humidity_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.humidity_oversampling = oversampling;

        self
    }

    pub fn iir_filter(mut self, filter: IirFilter) -> Self {
        self.iir_filter = filter;

        self
    }

    /// Sets the free-running output data rate.
    ///
    /// The polling component always forces [`OutputDataRate::None`]; this
    /// only matters when driving the device layer directly.
    pub fn output_data_rate(mut self, output_data_rate: OutputDataRate) -> Self {
        self.output_data_rate = output_data_rate;

        self
    }
}

/// Gas heater configuration for forced-mode operation.
///
/// The soak duration is also the extra time the poller waits before
/// reading back a measurement.
#[derive(Copy, Clone, Debug)]
pub struct HeaterConfiguration {
    pub(crate) enable: bool,
    pub(crate) temperature_c: u16,
    pub(crate) duration_ms: u16,
}

impl Default for HeaterConfiguration {
    fn default() -> Self {
        Self {
            enable: true,
            temperature_c: 320,
            duration_ms: 150,
        }
    }
}

impl HeaterConfiguration {
    pub fn enable(mut self, enable: bool) -> Self {
        self.enable = enable;

        self
    }

    /// Target heater plate temperature in °C.
    pub fn temperature(mut self, temperature_c: u16) -> Self {
        self.temperature_c = temperature_c;

        self
    }

    /// Heater soak duration in milliseconds.
    pub fn duration(mut self, duration_ms: u16) -> Self {
        self.duration_ms = duration_ms;

        self
    }

    /// The configured soak duration in milliseconds.
    pub fn duration_ms(&self) -> u16 {
        self.duration_ms
    }
}

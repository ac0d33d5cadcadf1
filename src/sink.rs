//! Publication endpoints for measured values.
//!
//! The host framework decides what a published value becomes (an MQTT
//! topic, a dashboard entity, a log line). The component only knows the
//! `Sink` seam and publishes through whatever endpoints were bound before
//! setup.

/// A destination for one measured channel.
pub trait Sink {
    /// Publishes a new state for this channel.
    fn publish(&self, state: f32);
}

impl<T: Sink + ?Sized> Sink for &T {
    fn publish(&self, state: f32) {
        (*self).publish(state)
    }
}

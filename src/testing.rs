//! Test doubles for driving the driver and component without hardware.
//!
//! [`FakeBus`] answers typed register reads from canned responses, records
//! every write, and can inject per-register faults for exercising the
//! failure paths.

use core::cell::RefCell;

use embedded_hal_async::delay::DelayNs;
use heapless::{LinearMap, Vec};

use crate::bus::{Bus, MAX_REG_BYTES};
use crate::error::Bme690Error;
use crate::register::{Readable, Writable};
use crate::sink::Sink;

#[derive(Debug)]
enum RegisterValue {
    Data { bytes: [u8; MAX_REG_BYTES], len: usize },
    DontCare,
}

/// A register bus backed by canned responses.
///
/// `N` is the capacity of the register map. The bus is used through a
/// shared reference (`&FakeBus` implements [`Bus`]) so tests keep access
/// to the recorded traffic while the driver owns its bus handle.
pub struct FakeBus<const N: usize> {
    regs: RefCell<LinearMap<(u8, usize), RegisterValue, N>>,
    writes: RefCell<Vec<(u8, u8), 32>>,
    read_failures: RefCell<Vec<u8, 4>>,
    write_failures: RefCell<Vec<u8, 4>>,
}

pub struct FakeDelay {}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, _: u32) {}
}

impl<const N: usize> FakeBus<N> {
    pub fn new() -> Self {
        FakeBus {
            regs: RefCell::new(LinearMap::new()),
            writes: RefCell::new(Vec::new()),
            read_failures: RefCell::new(Vec::new()),
            write_failures: RefCell::new(Vec::new()),
        }
    }

    /// Cans a response for reads of register `R`.
    pub fn with_response<R: Readable>(&self, data: &[u8]) {
        let mut bytes = [0u8; MAX_REG_BYTES];
        bytes[..data.len()].copy_from_slice(data);
        self.regs
            .borrow_mut()
            .insert((R::ADDR, R::N), RegisterValue::Data { bytes, len: data.len() })
            .unwrap();
    }

    /// Cans an all-zeroes response for reads of register `R`.
    pub fn with_any_response<R: Readable>(&self) {
        self.regs
            .borrow_mut()
            .insert((R::ADDR, R::N), RegisterValue::DontCare)
            .unwrap();
    }

    /// Makes subsequent reads of register `R` fail with a bus error.
    pub fn with_read_failure<R: Readable>(&self) {
        self.read_failures.borrow_mut().push(R::ADDR).unwrap();
    }

    /// Removes all injected read failures.
    pub fn clear_read_failures(&self) {
        self.read_failures.borrow_mut().clear();
    }

    /// Makes subsequent writes of register `W` fail with a bus error.
    pub fn with_write_failure<W: Writable>(&self) {
        self.write_failures.borrow_mut().push(W::ADDR).unwrap();
    }

    /// Every successful write in order, as (address, first byte) pairs.
    pub fn writes(&self) -> Vec<(u8, u8), 32> {
        self.writes.borrow().clone()
    }

    /// The most recent byte written to the given register address.
    pub fn last_write(&self, addr: u8) -> Option<u8> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
    }
}

impl<const N: usize> Bus for &FakeBus<N> {
    type Error = ();

    async fn read<R: Readable>(&mut self) -> Result<R::Out, Bme690Error<Self::Error>> {
        if self.read_failures.borrow().contains(&R::ADDR) {
            return Err(Bme690Error::Bus(()));
        }

        if let Some(value) = self.regs.borrow().get(&(R::ADDR, R::N)) {
            match value {
                RegisterValue::Data { bytes, len } => {
                    if *len == R::N {
                        return Ok(R::decode(&bytes[..R::N]).unwrap());
                    }
                }
                RegisterValue::DontCare => {
                    let zeroes = [0u8; MAX_REG_BYTES];
                    return Ok(R::decode(&zeroes[..R::N]).unwrap());
                }
            }
        }

        panic!("No mocked value for register 0x{:x} and length {}", R::ADDR, R::N)
    }

    async fn write<W: Writable>(&mut self, v: &W::In) -> Result<(), Bme690Error<Self::Error>> {
        if self.write_failures.borrow().contains(&W::ADDR) {
            return Err(Bme690Error::Bus(()));
        }

        let mut bytes = [0u8; MAX_REG_BYTES];
        W::encode(v, &mut bytes[..W::N]);
        self.writes.borrow_mut().push((W::ADDR, bytes[0])).unwrap();
        // Writes stay visible to later reads of the same register, so
        // read-modify-write sequences behave like real hardware.
        self.regs
            .borrow_mut()
            .insert((W::ADDR, W::N), RegisterValue::Data { bytes, len: W::N })
            .unwrap();

        Ok(())
    }
}

/// A sink that remembers everything published to it.
pub struct RecordingSink {
    values: RefCell<Vec<f32, 8>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { values: RefCell::new(Vec::new()) }
    }

    /// The most recently published value.
    pub fn last(&self) -> Option<f32> {
        self.values.borrow().last().copied()
    }

    /// How many values have been published.
    pub fn count(&self) -> usize {
        self.values.borrow().len()
    }
}

impl Sink for RecordingSink {
    fn publish(&self, state: f32) {
        self.values.borrow_mut().push(state).unwrap();
    }
}

/// A delay source that records every requested duration instead of
/// sleeping.
pub struct RecordingDelay {
    delays_us: RefCell<Vec<u32, 16>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self { delays_us: RefCell::new(Vec::new()) }
    }

    /// The most recently requested delay, in microseconds.
    pub fn last_us(&self) -> Option<u32> {
        self.delays_us.borrow().last().copied()
    }

    fn record(&self, us: u32) {
        self.delays_us.borrow_mut().push(us).unwrap();
    }
}

impl DelayNs for &RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(ns / 1000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.record(us);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(ms * 1000);
    }
}

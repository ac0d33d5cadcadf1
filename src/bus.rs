//! The register bus seam between the driver and the I2C peripheral.
//!
//! The original firmware integration handed the vendor library a triplet of
//! C function pointers plus an opaque context pointer that was cast back to
//! the owning object inside each callback. Here the same seam is a trait:
//! the [`I2c`] adapter owns its peripheral handle and device address, so no
//! global instance pointer or pointer reinterpretation is involved.

use core::future::Future;

use crate::error::Bme690Error;
use crate::register::{Readable, Writable};

/// Largest register block transferred in one bus operation (the first NVM
/// coefficient block).
pub const MAX_REG_BYTES: usize = 23;

pub trait Bus {
    type Error;

    fn read<R: Readable>(&mut self)
        -> impl Future<Output = Result<R::Out, Bme690Error<Self::Error>>>;

    fn write<W: Writable>(&mut self, v: &W::In)
        -> impl Future<Output = Result<(), Bme690Error<Self::Error>>>;
}

pub struct I2c<I2cType> {
    i2c: I2cType,
    address: u8,
}

impl<I2cType> I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    pub(crate) fn new(i2c: I2cType, address: u8) -> Self {
        Self { i2c, address }
    }
}

impl<I2cType> Bus for I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    type Error = <I2cType as embedded_hal_async::i2c::ErrorType>::Error;

    async fn read<R: Readable>(&mut self) -> Result<R::Out, Bme690Error<Self::Error>> {
        let mut buf = [0u8; MAX_REG_BYTES];
        self.i2c
            .write_read(self.address, &[R::ADDR], &mut buf[..R::N])
            .await
            .map_err(Bme690Error::Bus)?;

        R::decode(&buf[..R::N]).map_err(Bme690Error::UnexpectedRegisterData)
    }

    async fn write<W: Writable>(&mut self, v: &W::In) -> Result<(), Bme690Error<Self::Error>> {
        let mut buf = [0u8; 1 + MAX_REG_BYTES];
        buf[0] = W::ADDR;
        W::encode(v, &mut buf[1..1 + W::N]);
        self.i2c
            .write(self.address, &buf[..1 + W::N])
            .await
            .map_err(Bme690Error::Bus)?;

        Ok(())
    }
}

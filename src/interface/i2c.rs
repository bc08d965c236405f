//! I2C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::I2c;

use super::Si470xInterface;
use crate::config::BusSettings;
use crate::registers::DEFAULT_SLAVE_ADDRESS;

/// I2C-based interface implementation for the Si470x driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
    bus_speed_hz: u32,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface talking to the default device address.
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_SLAVE_ADDRESS)
    }

    /// Creates a new interface talking to a custom device address.
    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            bus_speed_hz: 0,
        }
    }

    /// Returns the 7-bit device address in use.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Bus speed requested by the last [`Si470xInterface::configure`] call.
    ///
    /// `embedded-hal` buses fix their clock when the HAL peripheral is built,
    /// so this value is informational.
    pub fn bus_speed_hz(&self) -> u32 {
        self.bus_speed_hz
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Si470xInterface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn configure(&mut self, settings: &BusSettings) -> core::result::Result<(), Self::Error> {
        self.address = settings.slave_address;
        self.bus_speed_hz = settings.bus_speed_hz();
        Ok(())
    }

    fn read_burst(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.i2c.read(self.address, buf)?;
        Ok(buf.len())
    }

    fn write_burst(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }

        self.i2c.write(self.address, data)
    }
}

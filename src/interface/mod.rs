//! Bus interface abstraction for the Si470x driver.

pub mod i2c;

use crate::config::BusSettings;

/// Abstraction over the low-level bus access required by the driver.
///
/// The tuner has no register pointer: reads always stream the full bank
/// starting at `STATUSRSSI`, and writes always start at `POWERCFG`.
pub trait Si470xInterface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Applies the one-time bus configuration (address, clock).
    fn configure(&mut self, settings: &BusSettings) -> core::result::Result<(), Self::Error> {
        let _ = settings;
        Ok(())
    }

    /// Reads one burst into `buf`, returning the number of bytes received.
    fn read_burst(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error>;

    /// Writes one burst starting at the first host-writable register.
    fn write_burst(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Tears the bus down. Called once when the driver shuts down.
    fn end(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

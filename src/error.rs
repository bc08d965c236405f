//! Error handling primitives for the Si470x driver.

use embedded_hal::digital::ErrorKind as PinErrorKind;

use crate::config::ConfigError;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// Reading the interrupt input pin failed.
    Pin(PinError),
    /// A burst read returned fewer bytes than the full register bank.
    ShortRead(usize),
    /// The provided configuration parameters are invalid.
    InvalidConfig(ConfigError),
    /// The requested frequency is outside the band or off the channel grid.
    InvalidFrequency,
    /// The driver has not been initialized yet.
    NotReady,
    /// A seek or tune is already in flight.
    Busy,
    /// The completion poll budget ran out before the chip signaled completion.
    Timeout,
}

/// Failure reported by the interrupt input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError(pub PinErrorKind);

#[cfg(feature = "defmt")]
impl defmt::Format for PinError {
    fn format(&self, f: defmt::Formatter) {
        match self.0 {
            PinErrorKind::Other => defmt::write!(f, "PinError(Other)"),
            _ => defmt::write!(f, "PinError(unknown)"),
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

//! Configuration primitives for the Si470x driver.

use crate::params::{PinNumbering, SeekThreshold};
use crate::registers::DEFAULT_SLAVE_ADDRESS;

const DEFAULT_BAUD_RATE: u32 = 100_000;
const DEFAULT_CLOCK_DIVIDER: u16 = 2_500;
const MAX_SLAVE_ADDRESS: u8 = 0x7F;

/// User-facing configuration for the Si470x tuner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit bus address of the tuner.
    pub slave_address: u8,
    /// Bus clock in hertz.
    pub baud_rate: u32,
    /// Bus clock divider.
    pub clock_divider: u16,
    /// Host pin wired to the tuner's GPIO2 output, if any.
    ///
    /// Presence selects interrupt-driven completion detection.
    pub interrupt_pin: Option<u8>,
    /// Numbering scheme `interrupt_pin` is expressed in.
    pub pin_numbering: PinNumbering,
    /// Seek threshold applied when a seek does not specify one.
    pub seek_threshold: SeekThreshold,
    /// Maximum completion checks per operation; `None` waits indefinitely.
    pub poll_limit: Option<u32>,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is usable.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.slave_address > MAX_SLAVE_ADDRESS {
            return Err(ConfigError::InvalidSlaveAddress);
        }

        if self.baud_rate == 0 || self.clock_divider == 0 {
            return Err(ConfigError::InvalidBusClock);
        }

        if let Some(pin) = self.interrupt_pin {
            if self.pin_numbering.to_gpio(pin).is_none() {
                return Err(ConfigError::InvalidInterruptPin);
            }
        }

        if self.poll_limit == Some(0) {
            return Err(ConfigError::InvalidPollLimit);
        }

        Ok(())
    }

    /// Extracts the one-time bus settings.
    pub fn bus_settings(&self) -> BusSettings {
        BusSettings {
            slave_address: self.slave_address,
            baud_rate: self.baud_rate,
            clock_divider: self.clock_divider,
        }
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the bus address.
    pub fn slave_address(mut self, address: u8) -> Self {
        self.config.slave_address = address;
        self
    }

    /// Overrides the bus clock.
    pub fn baud_rate(mut self, hz: u32) -> Self {
        self.config.baud_rate = hz;
        self
    }

    /// Overrides the bus clock divider.
    pub fn clock_divider(mut self, divider: u16) -> Self {
        self.config.clock_divider = divider;
        self
    }

    /// Selects interrupt-driven completion on `pin`, named in `numbering`.
    pub fn interrupt_pin(mut self, pin: u8, numbering: PinNumbering) -> Self {
        self.config.interrupt_pin = Some(pin);
        self.config.pin_numbering = numbering;
        self
    }

    /// Sets the default seek threshold.
    pub fn seek_threshold(mut self, threshold: SeekThreshold) -> Self {
        self.config.seek_threshold = threshold;
        self
    }

    /// Bounds the number of completion checks per operation.
    pub fn poll_limit(mut self, ticks: u32) -> Self {
        self.config.poll_limit = Some(ticks);
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,
            baud_rate: DEFAULT_BAUD_RATE,
            clock_divider: DEFAULT_CLOCK_DIVIDER,
            interrupt_pin: None,
            pin_numbering: PinNumbering::Gpio,
            seek_threshold: SeekThreshold::DEFAULT,
            poll_limit: None,
        }
    }
}

/// One-time bus configuration handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusSettings {
    /// 7-bit device address.
    pub slave_address: u8,
    /// Bus clock in hertz.
    pub baud_rate: u32,
    /// Bus clock divider.
    pub clock_divider: u16,
}

impl BusSettings {
    /// Requested bus speed in hertz.
    pub fn bus_speed_hz(&self) -> u32 {
        self.baud_rate
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The bus address does not fit in seven bits.
    InvalidSlaveAddress,
    /// Baud rate or clock divider is zero.
    InvalidBusClock,
    /// The interrupt pin does not name a GPIO in the selected numbering scheme.
    InvalidInterruptPin,
    /// An interrupt line was supplied without configuring `interrupt_pin`.
    MissingInterruptPin,
    /// `interrupt_pin` is configured but no interrupt line was supplied.
    MissingInterruptLine,
    /// A poll limit of zero would fail every operation.
    InvalidPollLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuner_wiring() {
        let config = Config::default();
        assert_eq!(config.slave_address, 0x10);
        assert_eq!(config.baud_rate, 100_000);
        assert_eq!(config.clock_divider, 2_500);
        assert_eq!(config.interrupt_pin, None);
        assert_eq!(config.seek_threshold.raw(), 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_interrupt_pin_outside_numbering() {
        let config = Config::new().interrupt_pin(1, PinNumbering::Physical).build();
        assert_eq!(config.validate(), Err(ConfigError::InvalidInterruptPin));

        let config = Config::new().interrupt_pin(7, PinNumbering::Physical).build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_bus_parameters() {
        let config = Config::new().slave_address(0x80).build();
        assert_eq!(config.validate(), Err(ConfigError::InvalidSlaveAddress));

        let config = Config::new().clock_divider(0).build();
        assert_eq!(config.validate(), Err(ConfigError::InvalidBusClock));

        let config = Config::new().poll_limit(0).build();
        assert_eq!(config.validate(), Err(ConfigError::InvalidPollLimit));
    }
}

//! Strongly typed parameters for the Si470x driver.
//!
//! These types map host-level intents onto the raw encodings stored in the
//! register bank. Prefer them over raw integers to keep values valid and
//! explicit.
//!
//! # Examples
//!
//! ```rust
//! use si470x::params::{Frequency, SeekDirection, SeekThreshold};
//!
//! let station = Frequency::from_channel(0x0190);
//! assert_eq!(station.tenths_mhz(), 1675);
//! assert_eq!(SeekThreshold::from_percent(50.0).raw(), 64);
//! let _ = SeekDirection::Up;
//! ```

use modular_bitfield::prelude::Specifier;

/// Direction of a hardware seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekDirection {
    /// Seek towards higher frequencies.
    Up,
    /// Seek towards lower frequencies.
    Down,
}

/// RSSI threshold a station must exceed for a seek to stop on it (`SYSCONFIG2.SEEKTH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SeekThreshold(u8);

impl SeekThreshold {
    /// Raw threshold used when the caller does not supply one.
    pub const DEFAULT: Self = Self(64);

    // User-facing 0-100 scale onto the raw field.
    const PERCENT_SCALE: f64 = 1.28;

    /// Wraps an already encoded threshold.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Scales a user-facing value (roughly 0-100) onto the raw field, truncating.
    ///
    /// `NaN` is treated as "not a number" and yields [`SeekThreshold::DEFAULT`].
    /// Out-of-range inputs saturate at the field limits.
    pub fn from_percent(percent: f32) -> Self {
        if percent.is_nan() {
            return Self::DEFAULT;
        }

        Self((f64::from(percent) * Self::PERCENT_SCALE) as u8)
    }

    /// Resolves an optional user-facing value.
    ///
    /// A missing or `NaN` value yields `fallback`, normally the configured default.
    pub fn from_user(percent: Option<f32>, fallback: Self) -> Self {
        percent
            .filter(|value| !value.is_nan())
            .map_or(fallback, Self::from_percent)
    }

    /// Returns the encoded threshold.
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl Default for SeekThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// FM frequency expressed in tenths of a megahertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frequency(u16);

impl Frequency {
    /// Bottom of the 87.5-108 MHz band.
    pub const BAND_BOTTOM: Self = Self(875);
    /// Top of the 87.5-108 MHz band.
    pub const BAND_TOP: Self = Self(1080);

    // 200 kHz channel spacing.
    const CHANNEL_STEP_TENTHS: u16 = 2;
    const CHANNEL_MASK: u16 = 0x03FF;

    /// Decodes the 10-bit channel number reported by `READCHAN`.
    pub const fn from_channel(raw: u16) -> Self {
        Self((raw & Self::CHANNEL_MASK) * Self::CHANNEL_STEP_TENTHS + Self::BAND_BOTTOM.0)
    }

    /// Creates a frequency from tenths of a megahertz (e.g. `1011` for 101.1 MHz).
    pub const fn from_tenths_mhz(tenths: u16) -> Self {
        Self(tenths)
    }

    /// Creates a frequency from megahertz, rounded to the nearest tenth.
    pub fn from_mhz(mhz: f32) -> Self {
        if mhz.is_nan() || mhz <= 0.0 {
            return Self(0);
        }

        Self((mhz * 10.0 + 0.5) as u16)
    }

    /// Returns the frequency in tenths of a megahertz.
    pub const fn tenths_mhz(self) -> u16 {
        self.0
    }

    /// Returns the frequency in megahertz.
    pub fn mhz(self) -> f32 {
        self.0 as f32 / 10.0
    }

    /// Encodes the frequency as a `CHANNEL.CHAN` value.
    ///
    /// Returns `None` when the frequency lies outside the band or between channels.
    pub const fn to_channel(self) -> Option<u16> {
        if self.0 < Self::BAND_BOTTOM.0 || self.0 > Self::BAND_TOP.0 {
            return None;
        }

        let offset = self.0 - Self::BAND_BOTTOM.0;
        if offset % Self::CHANNEL_STEP_TENTHS != 0 {
            return None;
        }

        Some(offset / Self::CHANNEL_STEP_TENTHS)
    }
}

/// Output volume level (`SYSCONFIG2.VOLUME`), 0 (muted) to 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Volume(u8);

impl Volume {
    /// Lowest volume level.
    pub const MIN: Self = Self(0);
    /// Highest volume level.
    pub const MAX: Self = Self(15);

    /// Creates a volume level, rejecting values above [`Volume::MAX`].
    pub const fn new(level: u8) -> Option<Self> {
        if level > Self::MAX.0 {
            None
        } else {
            Some(Self(level))
        }
    }

    // Decodes the 4-bit `VOLUME` field.
    pub(crate) const fn from_field(raw: u8) -> Self {
        Self(raw & 0x0F)
    }

    /// Returns the raw level.
    pub const fn level(self) -> u8 {
        self.0
    }

    /// One step louder, saturating at [`Volume::MAX`].
    pub const fn step_up(self) -> Self {
        if self.0 >= Self::MAX.0 { self } else { Self(self.0 + 1) }
    }

    /// One step quieter, saturating at [`Volume::MIN`].
    pub const fn step_down(self) -> Self {
        if self.0 == 0 { self } else { Self(self.0 - 1) }
    }
}

/// GPIO2 pin function (`SYSCONFIG1.GPIO2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum Gpio2Mode {
    /// High impedance (reset default).
    HighImpedance = 0b00,
    /// Seek/tune complete (and RDS ready) interrupt output.
    StcInterrupt = 0b01,
    /// Driven low.
    Low = 0b10,
    /// Driven high.
    High = 0b11,
}

/// Numbering scheme used to name the host's interrupt input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinNumbering {
    /// Broadcom GPIO numbers (`GPIO0`..`GPIO27`).
    Gpio,
    /// Physical pin positions on the 40-pin header.
    Physical,
}

// Physical header pin -> GPIO number for the 40-pin header. Power and ground
// positions are absent.
const HEADER_TO_GPIO: [(u8, u8); 28] = [
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

impl PinNumbering {
    const MAX_GPIO: u8 = 27;

    /// Resolves `pin` to a GPIO number, or `None` when it does not name a GPIO.
    pub fn to_gpio(self, pin: u8) -> Option<u8> {
        match self {
            Self::Gpio => (pin <= Self::MAX_GPIO).then_some(pin),
            Self::Physical => HEADER_TO_GPIO
                .iter()
                .find(|(header, _)| *header == pin)
                .map(|(_, gpio)| *gpio),
        }
    }
}

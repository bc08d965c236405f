//! Translation of tuning intents into register bit patterns.

use crate::params::{SeekDirection, SeekThreshold};
use crate::registers::{Channel, PowerConfig, SysConfig2};
use crate::shadow::RegisterBank;

/// A seek or tune request, before it is written to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningCommand {
    /// Hardware seek to the next station above `threshold`.
    Seek {
        /// Seek direction.
        direction: SeekDirection,
        /// RSSI threshold programmed into `SYSCONFIG2.SEEKTH`.
        threshold: SeekThreshold,
    },
    /// Direct tune to a `CHANNEL.CHAN` value.
    Tune {
        /// Encoded channel number.
        channel: u16,
    },
}

impl TuningCommand {
    /// Sets the command bits for this request in the shadow.
    ///
    /// A seek clears tune-select, sets seek-up only when seeking up, and
    /// always sets seek. A tune clears seek, sets tune-select and starts the
    /// tune on the requested channel.
    pub fn apply(self, bank: &mut RegisterBank) {
        match self {
            Self::Seek {
                direction,
                threshold,
            } => {
                bank.modify::<SysConfig2, _>(|config| config.set_seek_threshold(threshold.raw()));
                bank.modify::<PowerConfig, _>(|power| {
                    power.set_tune_select(false);
                    power.set_seek_up(direction == SeekDirection::Up);
                    power.set_seek(true);
                });
            }
            Self::Tune { channel } => {
                bank.modify::<PowerConfig, _>(|power| {
                    power.set_seek(false);
                    power.set_tune_select(true);
                });
                bank.modify::<Channel, _>(|register| {
                    register.set_channel(channel);
                    register.set_tune(true);
                });
            }
        }
    }

    /// Clears the seek and tune start bits so the chip drops `STC`.
    pub fn clear(bank: &mut RegisterBank) {
        bank.modify::<PowerConfig, _>(|power| power.set_seek(false));
        bank.modify::<Channel, _>(|register| register.set_tune(false));
    }
}

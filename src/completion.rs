//! Seek/tune completion detection.
//!
//! The tuner signals the end of a seek or tune by raising `STATUSRSSI.STC`.
//! Hosts either watch that bit by re-reading the bank, or route it to the
//! GPIO2 pin and watch the pin. Both variants are the same cooperative loop:
//! check once, and if not done, sleep for the mode's interval and check again.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};

use crate::error::{Error, Result};

/// How a driver instance learns that a seek or tune finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompletionMode {
    /// Watch the host pin wired to the tuner's GPIO2 output.
    InterruptPin,
    /// Re-read the bank and inspect `STATUSRSSI.STC`.
    PolledStatus,
}

impl CompletionMode {
    /// Delay between two completion checks, in milliseconds.
    pub const fn poll_interval_ms(self) -> u32 {
        match self {
            Self::InterruptPin => 5,
            Self::PolledStatus => 10,
        }
    }
}

/// Placeholder input for drivers running without an interrupt line.
///
/// Always reads low; drivers built with it use [`CompletionMode::PolledStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoInterruptPin;

impl ErrorType for NoInterruptPin {
    type Error = Infallible;
}

impl InputPin for NoInterruptPin {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Runs `check` until it reports completion, sleeping `mode`'s interval between attempts.
///
/// Returns the number of checks performed. With a `limit`, gives up with
/// [`Error::Timeout`] after that many unsuccessful checks.
pub(crate) fn wait_until<E, F>(
    mode: CompletionMode,
    delay: &mut impl DelayNs,
    limit: Option<u32>,
    mut check: F,
) -> Result<u32, E>
where
    F: FnMut() -> Result<bool, E>,
{
    let mut ticks: u32 = 0;
    loop {
        ticks = ticks.saturating_add(1);
        if check()? {
            return Ok(ticks);
        }

        if limit.is_some_and(|max| ticks >= max) {
            warn!("completion not signaled after {} checks", ticks);
            return Err(Error::Timeout);
        }

        delay.delay_ms(mode.poll_interval_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDelay {
        calls: u32,
        total_ms: u32,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_ms += ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.calls += 1;
            self.total_ms += ms;
        }
    }

    #[test]
    fn stops_on_first_true_check() {
        let mut delay = RecordingDelay::default();
        let mut remaining = 3;

        let ticks = wait_until::<(), _>(CompletionMode::PolledStatus, &mut delay, None, || {
            remaining -= 1;
            Ok(remaining == 0)
        })
        .unwrap();

        assert_eq!(ticks, 3);
        assert_eq!(delay.calls, 2);
        assert_eq!(delay.total_ms, 20);
    }

    #[test]
    fn interrupt_mode_uses_shorter_interval() {
        let mut delay = RecordingDelay::default();
        let mut remaining = 2;

        wait_until::<(), _>(CompletionMode::InterruptPin, &mut delay, None, || {
            remaining -= 1;
            Ok(remaining == 0)
        })
        .unwrap();

        assert_eq!(delay.total_ms, 5);
    }

    #[test]
    fn keeps_polling_until_limit_while_false() {
        let mut delay = RecordingDelay::default();
        let mut checks = 0;

        let result = wait_until::<(), _>(CompletionMode::PolledStatus, &mut delay, Some(50), || {
            checks += 1;
            Ok(false)
        });

        assert_eq!(result, Err(Error::Timeout));
        assert_eq!(checks, 50);
        assert_eq!(delay.calls, 49);
    }

    #[test]
    fn check_errors_abort_the_wait() {
        let mut delay = RecordingDelay::default();

        let result = wait_until::<u8, _>(CompletionMode::PolledStatus, &mut delay, None, || {
            Err(Error::Interface(7))
        });

        assert_eq!(result, Err(Error::Interface(7)));
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn placeholder_pin_reads_low() {
        let mut pin = NoInterruptPin;
        assert_eq!(pin.is_high(), Ok(false));
        assert_eq!(pin.is_low(), Ok(true));
    }
}

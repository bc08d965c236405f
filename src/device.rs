//! High-level Si470x tuner driver implementation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin};
use embedded_hal::i2c::I2c;

use crate::command::TuningCommand;
use crate::completion::{self, CompletionMode, NoInterruptPin};
use crate::config::{Config, ConfigError};
use crate::error::{Error, PinError, Result};
use crate::interface::i2c::I2cInterface;
use crate::interface::Si470xInterface;
use crate::params::{Frequency, Gpio2Mode, SeekDirection, SeekThreshold, Volume};
use crate::registers::{
    ReadChannel,
    StatusRssi,
    SysConfig1,
    SysConfig2,
    BURST_READ_LEN,
    OSCILLATOR_ENABLE_COMMAND,
    POWER_UP_COMMAND,
    REG_DEVICE_ID,
    REG_POWER_CFG,
    REG_TEST1,
};
use crate::shadow::RegisterBank;

// AN230: crystal oscillator start-up time after XOSCEN (milliseconds).
const OSCILLATOR_SETTLE_MS: u32 = 500;
// AN230: powerup time after ENABLE (milliseconds).
const POWER_UP_SETTLE_MS: u32 = 110;

/// High-level synchronous driver for the Si4702/Si4703 FM tuner.
pub struct Si470x<IFACE, PIN = NoInterruptPin> {
    interface: IFACE,
    interrupt: PIN,
    config: Config,
    mode: CompletionMode,
    bank: RegisterBank,
    pending: Option<Operation>,
    initialized: bool,
}

/// Operation currently owned by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Operation {
    Seek(SeekDirection),
    Tune(Frequency),
}

/// Per-seek options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SeekOptions {
    /// User-facing threshold (roughly 0-100); `None` or `NaN` uses the configured default.
    pub threshold: Option<f32>,
}

impl SeekOptions {
    /// Options carrying an explicit user-facing threshold.
    pub const fn with_threshold(percent: f32) -> Self {
        Self {
            threshold: Some(percent),
        }
    }
}

/// Outcome of a finished seek or tune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekResult {
    /// The chip settled on a channel.
    Found(Frequency),
    /// The seek hit the band limit or found no station above the threshold.
    NoStationFound(Frequency),
}

impl SeekResult {
    /// Channel the chip is tuned to after the operation.
    pub const fn frequency(self) -> Frequency {
        match self {
            Self::Found(frequency) | Self::NoStationFound(frequency) => frequency,
        }
    }

    /// Whether the chip settled on a station.
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Decoded view of the `STATUSRSSI` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// STATUSRSSI[14] STC.
    pub seek_tune_complete: bool,
    /// STATUSRSSI[13] SF/BL.
    pub seek_fail_band_limit: bool,
    /// STATUSRSSI[8] ST.
    pub stereo: bool,
    /// STATUSRSSI[7:0] RSSI.
    pub rssi: u8,
}

impl StatusSnapshot {
    /// Builds a snapshot from the raw STATUSRSSI bitfield.
    pub fn from_register(status: StatusRssi) -> Self {
        Self {
            seek_tune_complete: status.seek_tune_complete(),
            seek_fail_band_limit: status.seek_fail_band_limit(),
            stereo: status.stereo(),
            rssi: status.rssi(),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusSnapshot {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "StatusSnapshot {{ STC: {}, SF/BL: {}, ST: {}, RSSI: {} }}",
            self.seek_tune_complete,
            self.seek_fail_band_limit,
            self.stereo,
            self.rssi
        );
    }
}

impl<IFACE> Si470x<IFACE, NoInterruptPin> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a driver that detects completion by polling `STATUSRSSI.STC`.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self::build(interface, NoInterruptPin, CompletionMode::PolledStatus, config)
    }
}

impl<IFACE, PIN> Si470x<IFACE, PIN> {
    /// Creates a driver that detects completion on the pin wired to GPIO2.
    ///
    /// `config.interrupt_pin` must name the same pin; this is checked by [`Si470x::init`].
    pub fn with_interrupt(interface: IFACE, pin: PIN, config: Config) -> Self {
        Self::build(interface, pin, CompletionMode::InterruptPin, config)
    }

    fn build(interface: IFACE, interrupt: PIN, mode: CompletionMode, config: Config) -> Self {
        Self {
            interface,
            interrupt,
            config,
            mode,
            bank: RegisterBank::new(),
            pending: None,
            initialized: false,
        }
    }

    /// Consumes the driver and returns its parts without tearing the bus down.
    pub fn release(self) -> (IFACE, PIN, Config) {
        (self.interface, self.interrupt, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Completion detection strategy fixed at construction.
    pub fn completion_mode(&self) -> CompletionMode {
        self.mode
    }

    /// Returns the register shadow as of the last burst read.
    pub fn registers(&self) -> &RegisterBank {
        &self.bank
    }

    /// Whether a seek or tune is waiting for completion.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Channel computed from the shadow without touching the bus.
    pub fn cached_channel(&self) -> Frequency {
        Frequency::from_channel(self.bank.read::<ReadChannel>().channel())
    }

    /// Volume level held in the shadow.
    pub fn volume(&self) -> Volume {
        Volume::from_field(self.bank.read::<SysConfig2>().volume())
    }

    /// Replaces the seek threshold used when a seek does not specify one.
    pub fn set_seek_threshold(&mut self, threshold: SeekThreshold) {
        self.config.seek_threshold = threshold;
    }
}

impl<I2C> Si470x<I2cInterface<I2C>, NoInterruptPin>
where
    I2C: I2c,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I2C transports with status polling.
    pub fn new_i2c(i2c: I2C, config: Config) -> Self {
        Self::new(I2cInterface::with_address(i2c, config.slave_address), config)
    }
}

impl<I2C, PIN> Si470x<I2cInterface<I2C>, PIN> {
    /// Convenience constructor for I2C transports with an interrupt line.
    pub fn with_interrupt_i2c(i2c: I2C, pin: PIN, config: Config) -> Self {
        Self::with_interrupt(I2cInterface::with_address(i2c, config.slave_address), pin, config)
    }

    /// Releases the driver, returning the I2C bus, interrupt pin and configuration.
    pub fn release_i2c(self) -> (I2C, PIN, Config) {
        let (iface, pin, config) = self.release();
        (iface.release(), pin, config)
    }
}

impl<IFACE, PIN, CommE> Si470x<IFACE, PIN>
where
    IFACE: Si470xInterface<Error = CommE>,
    PIN: InputPin,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Configures the bus and powers the tuner up.
    ///
    /// Runs the mandated sequence: bus setup, seed the shadow from a full
    /// read, route STC to GPIO2 (interrupt mode only), enable the crystal
    /// oscillator, then power up with mute disabled. Waits for the oscillator
    /// and powerup settling times through `delay`.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.validate_config().map_err(Error::InvalidConfig)?;
        self.initialized = false;
        self.pending = None;

        self
            .interface
            .configure(&self.config.bus_settings())
            .map_err(Error::from)?;

        self.read_registers()?;
        debug!("device id {=u16:#x}", self.bank.get(REG_DEVICE_ID));

        if self.mode == CompletionMode::InterruptPin {
            self.commit(|bank| {
                bank.modify::<SysConfig1, _>(|config| config.set_gpio2(Gpio2Mode::StcInterrupt));
            })?;
        }

        self.commit(|bank| bank.set(REG_TEST1, OSCILLATOR_ENABLE_COMMAND))?;
        delay.delay_ms(OSCILLATOR_SETTLE_MS);

        self.commit(|bank| bank.set(REG_POWER_CFG, POWER_UP_COMMAND))?;
        delay.delay_ms(POWER_UP_SETTLE_MS);

        self.initialized = true;
        info!("tuner powered up, completion via {}", self.mode);
        Ok(())
    }

    /// Drops any pending operation and re-runs [`Si470x::init`] from a blank shadow.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.bank = RegisterBank::new();
        self.init(delay)
    }

    /// Tears the bus down and returns the interface, interrupt pin and configuration.
    pub fn shutdown(mut self) -> Result<(IFACE, PIN, Config), CommE> {
        self.interface.end().map_err(Error::from)?;
        Ok(self.release())
    }

    // ==================================================================
    // == Register Synchronization ======================================
    // ==================================================================
    /// Reloads the whole shadow from one burst read.
    pub fn read_registers(&mut self) -> Result<&RegisterBank, CommE> {
        let mut burst = [0u8; BURST_READ_LEN];
        let received = self
            .interface
            .read_burst(&mut burst)
            .map_err(Error::from)?;

        self
            .bank
            .load_burst(&burst[..received.min(BURST_READ_LEN)])
            .map_err(|short| Error::ShortRead(short.received))?;

        Ok(&self.bank)
    }

    /// Flushes the writable window of the shadow, then reloads the shadow.
    ///
    /// Status bits only reflect the write once it has settled, so every write
    /// is followed by a full read.
    pub fn write_registers(&mut self) -> Result<(), CommE> {
        let buffer = self.bank.stage_write();
        trace!("write {}", buffer.as_bytes());
        self
            .interface
            .write_burst(buffer.as_bytes())
            .map_err(Error::from)?;

        self.read_registers()?;
        Ok(())
    }

    // ==================================================================
    // == Tuning =========================================================
    // ==================================================================
    /// Re-reads the bank and returns the current channel.
    pub fn channel(&mut self) -> Result<Frequency, CommE> {
        self.read_registers()?;
        Ok(self.cached_channel())
    }

    /// Re-reads the bank and returns a snapshot of `STATUSRSSI`.
    pub fn status(&mut self) -> Result<StatusSnapshot, CommE> {
        self.read_registers()?;
        Ok(StatusSnapshot::from_register(self.bank.read::<StatusRssi>()))
    }

    /// Seeks towards higher frequencies and waits for the chip to settle.
    pub fn seek_up(
        &mut self,
        options: SeekOptions,
        delay: &mut impl DelayNs,
    ) -> Result<SeekResult, CommE> {
        self.seek(SeekDirection::Up, options, delay)
    }

    /// Seeks towards lower frequencies and waits for the chip to settle.
    pub fn seek_down(
        &mut self,
        options: SeekOptions,
        delay: &mut impl DelayNs,
    ) -> Result<SeekResult, CommE> {
        self.seek(SeekDirection::Down, options, delay)
    }

    /// Starts a seek and blocks, through `delay`, until it completes.
    ///
    /// See [`Si470x::start_seek`] for what reaches the chip.
    pub fn seek(
        &mut self,
        direction: SeekDirection,
        options: SeekOptions,
        delay: &mut impl DelayNs,
    ) -> Result<SeekResult, CommE> {
        self.start_seek(direction, options)?;
        self.wait_for_completion(delay)
    }

    /// Tunes directly to `frequency` and blocks, through `delay`, until the chip settles.
    pub fn tune(
        &mut self,
        frequency: Frequency,
        delay: &mut impl DelayNs,
    ) -> Result<Frequency, CommE> {
        self.start_tune(frequency)?;
        self.wait_for_completion(delay).map(SeekResult::frequency)
    }

    /// Issues a seek command without waiting for it.
    ///
    /// The write window starts at the low byte of `POWERCFG`, so SEEK, SEEKUP
    /// and SKMODE are set in the shadow only and never go out on the bus.
    /// Only the threshold in `SYSCONFIG2` changes on the wire.
    ///
    /// Drive it to completion with [`Si470x::poll_completion`] or
    /// [`Si470x::wait_for_completion`].
    pub fn start_seek(&mut self, direction: SeekDirection, options: SeekOptions) -> Result<(), CommE> {
        self.ensure_idle()?;

        let threshold = SeekThreshold::from_user(options.threshold, self.config.seek_threshold);
        debug!("seek {} threshold {}", direction, threshold.raw());

        self.commit(|bank| {
            TuningCommand::Seek {
                direction,
                threshold,
            }
            .apply(bank)
        })?;

        self.pending = Some(Operation::Seek(direction));
        Ok(())
    }

    /// Issues a direct tune command without waiting for it.
    pub fn start_tune(&mut self, frequency: Frequency) -> Result<(), CommE> {
        self.ensure_idle()?;
        let channel = frequency.to_channel().ok_or(Error::InvalidFrequency)?;
        debug!("tune to channel {}", channel);

        self.commit(|bank| TuningCommand::Tune { channel }.apply(bank))?;

        self.pending = Some(Operation::Tune(frequency));
        Ok(())
    }

    /// Performs one completion check for the pending operation.
    ///
    /// Returns [`nb::Error::WouldBlock`] while the chip is still working. Once
    /// it signals completion the seek/tune bits are cleared, the shadow is
    /// reloaded and the result is returned; it is returned exactly once per
    /// operation.
    pub fn poll_completion(&mut self) -> nb::Result<SeekResult, Error<CommE>> {
        let operation = self.pending.ok_or(Error::NotReady)?;
        if !self.completion_signaled()? {
            return Err(nb::Error::WouldBlock);
        }

        Ok(self.finish(operation)?)
    }

    /// Blocks until the pending operation completes, sleeping through `delay`.
    ///
    /// Gives up with [`Error::Timeout`] after `config.poll_limit` checks, if
    /// set; the operation then stays pending and may be polled again or
    /// [cancelled](Si470x::cancel).
    pub fn wait_for_completion(&mut self, delay: &mut impl DelayNs) -> Result<SeekResult, CommE> {
        let mode = self.mode;
        let limit = self.config.poll_limit;
        let mut outcome = None;

        let ticks = completion::wait_until::<CommE, _>(mode, delay, limit, || {
            match self.poll_completion() {
                Ok(result) => {
                    outcome = Some(result);
                    Ok(true)
                }
                Err(nb::Error::WouldBlock) => Ok(false),
                Err(nb::Error::Other(err)) => Err(err),
            }
        })?;
        trace!("completion after {} checks", ticks);

        outcome.ok_or(Error::NotReady)
    }

    /// Abandons the pending operation and clears its command bits.
    pub fn cancel(&mut self) -> Result<(), CommE> {
        if self.pending.is_none() {
            return Ok(());
        }

        self.clear_operation_bits()?;
        self.pending = None;
        Ok(())
    }

    // ==================================================================
    // == Volume ========================================================
    // ==================================================================
    /// Writes a new volume level.
    pub fn set_volume(&mut self, volume: Volume) -> Result<(), CommE> {
        self.ensure_idle()?;
        self.commit(|bank| {
            bank.modify::<SysConfig2, _>(|config| config.set_volume(volume.level()));
        })
    }

    /// Raises the volume one step, saturating at the maximum.
    pub fn increase_volume(&mut self) -> Result<Volume, CommE> {
        let volume = self.volume().step_up();
        self.set_volume(volume)?;
        Ok(volume)
    }

    /// Lowers the volume one step, saturating at zero.
    pub fn decrease_volume(&mut self) -> Result<Volume, CommE> {
        let volume = self.volume().step_down();
        self.set_volume(volume)?;
        Ok(volume)
    }

    // ==================================================================
    // == Internal Helpers ===============================================
    // ==================================================================
    fn validate_config(&self) -> core::result::Result<(), ConfigError> {
        self.config.validate()?;

        match (self.mode, self.config.interrupt_pin) {
            (CompletionMode::InterruptPin, None) => Err(ConfigError::MissingInterruptPin),
            (CompletionMode::PolledStatus, Some(_)) => Err(ConfigError::MissingInterruptLine),
            _ => Ok(()),
        }
    }

    fn ensure_idle(&self) -> Result<(), CommE> {
        if !self.initialized {
            return Err(Error::NotReady);
        }

        if self.pending.is_some() {
            return Err(Error::Busy);
        }

        Ok(())
    }

    /// Applies `mutate` to the shadow and writes it, restoring the shadow on failure.
    fn commit<F>(&mut self, mutate: F) -> Result<(), CommE>
    where
        F: FnOnce(&mut RegisterBank),
    {
        let last_good = self.bank.clone();
        mutate(&mut self.bank);

        if let Err(err) = self.write_registers() {
            self.bank = last_good;
            return Err(err);
        }

        Ok(())
    }

    fn completion_signaled(&mut self) -> Result<bool, CommE> {
        match self.mode {
            CompletionMode::InterruptPin => self.interrupt.is_high().map_err(|err| {
                let fault = PinError(err.kind());
                warn!("interrupt pin read failed: {}", fault);
                Error::Pin(fault)
            }),
            CompletionMode::PolledStatus => {
                self.read_registers()?;
                Ok(self.bank.read::<StatusRssi>().seek_tune_complete())
            }
        }
    }

    fn finish(&mut self, operation: Operation) -> Result<SeekResult, CommE> {
        if self.mode == CompletionMode::InterruptPin {
            self.read_registers()?;
        }

        // SF/BL is only meaningful until the seek bit is cleared.
        let band_limit = self.bank.read::<StatusRssi>().seek_fail_band_limit();

        self.clear_operation_bits()?;
        self.pending = None;

        let frequency = self.cached_channel();
        let result = match operation {
            Operation::Seek(_) if band_limit => SeekResult::NoStationFound(frequency),
            Operation::Seek(_) | Operation::Tune(_) => SeekResult::Found(frequency),
        };

        info!("{} finished: {}", operation, result);
        Ok(result)
    }

    fn clear_operation_bits(&mut self) -> Result<(), CommE> {
        self.commit(TuningCommand::clear)
    }
}

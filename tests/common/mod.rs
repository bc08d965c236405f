//! Simulated Si470x tuner and test doubles shared by the integration tests.
#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use si470x::config::BusSettings;
use si470x::interface::Si470xInterface;
use std::cell::RefCell;
use std::rc::Rc;

/// DEVICEID reported by the simulated part.
pub const DEVICE_ID: u16 = 0x1242;
/// CHIPID reported by the simulated part.
pub const CHIP_ID: u16 = 0x1253;

const STC: u16 = 0x4000;
const SF_BL: u16 = 0x2000;
const READ_CHAN: usize = 0x0B;
const STATUS_RSSI: usize = 0x0A;

/// Error injected by the simulated bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// The device did not acknowledge.
    Nack,
}

/// Scripted seek/tune completion.
#[derive(Debug, Clone, Copy)]
struct ScriptedCompletion {
    polls_left: u32,
    channel: u16,
    band_limit: bool,
}

#[derive(Debug)]
struct ChipState {
    registers: [u16; 16],
    writes: Vec<Vec<u8>>,
    reads: u32,
    just_written: bool,
    completion: Option<ScriptedCompletion>,
    fail_next_read: bool,
    fail_next_write: bool,
    fail_next_end: bool,
    short_read: Option<usize>,
    configured: Option<BusSettings>,
    ended: u32,
}

/// Register-level model of the tuner behind the driver's bus trait.
///
/// Reads stream the bank from `STATUSRSSI`, writes land on `POWERCFG` low
/// byte through `TEST1`. Seek/tune completion is scripted per test: after a
/// chosen number of status polls the chip raises `STC`, and the next write
/// clears it again.
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    state: Rc<RefCell<ChipState>>,
}

impl SimulatedChip {
    pub fn new() -> Self {
        let mut registers = [0u16; 16];
        registers[0x00] = DEVICE_ID;
        registers[0x01] = CHIP_ID;

        Self {
            state: Rc::new(RefCell::new(ChipState {
                registers,
                writes: Vec::new(),
                reads: 0,
                just_written: false,
                completion: None,
                fail_next_read: false,
                fail_next_write: false,
                fail_next_end: false,
                short_read: None,
                configured: None,
                ended: 0,
            })),
        }
    }

    /// Raises STC after `polls` status reads (reads that do not follow a write).
    pub fn complete_after_polls(&self, polls: u32, channel: u16, band_limit: bool) {
        self.state.borrow_mut().completion = Some(ScriptedCompletion {
            polls_left: polls,
            channel,
            band_limit,
        });
    }

    pub fn set_register(&self, address: u8, value: u16) {
        self.state.borrow_mut().registers[address as usize] = value;
    }

    pub fn register(&self, address: u8) -> u16 {
        self.state.borrow().registers[address as usize]
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.borrow().writes.clone()
    }

    pub fn last_write(&self) -> Option<Vec<u8>> {
        self.state.borrow().writes.last().cloned()
    }

    pub fn reads(&self) -> u32 {
        self.state.borrow().reads
    }

    pub fn configured(&self) -> Option<BusSettings> {
        self.state.borrow().configured
    }

    pub fn ended(&self) -> u32 {
        self.state.borrow().ended
    }

    pub fn fail_next_read(&self) {
        self.state.borrow_mut().fail_next_read = true;
    }

    pub fn fail_next_write(&self) {
        self.state.borrow_mut().fail_next_write = true;
    }

    pub fn fail_next_end(&self) {
        self.state.borrow_mut().fail_next_end = true;
    }

    /// Truncates the next burst read to `len` bytes.
    pub fn short_next_read(&self, len: usize) {
        self.state.borrow_mut().short_read = Some(len);
    }
}

impl Si470xInterface for SimulatedChip {
    type Error = SimError;

    fn configure(&mut self, settings: &BusSettings) -> Result<(), Self::Error> {
        self.state.borrow_mut().configured = Some(*settings);
        Ok(())
    }

    fn read_burst(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(SimError::Nack);
        }

        state.reads += 1;
        if state.just_written {
            state.just_written = false;
        } else if let Some(script) = state.completion.as_mut() {
            script.polls_left = script.polls_left.saturating_sub(1);
            if script.polls_left == 0 {
                let script = *script;
                state.completion = None;
                state.registers[STATUS_RSSI] |= STC;
                if script.band_limit {
                    state.registers[STATUS_RSSI] |= SF_BL;
                }
                state.registers[READ_CHAN] = (state.registers[READ_CHAN] & !0x03FF) | script.channel;
            }
        }

        let len = state.short_read.take().unwrap_or(buf.len()).min(buf.len());
        for (k, word) in buf[..len].chunks_mut(2).enumerate() {
            let bytes = state.registers[(0x0A + k) % 16].to_be_bytes();
            word.copy_from_slice(&bytes[..word.len()]);
        }

        Ok(len)
    }

    fn write_burst(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(SimError::Nack);
        }

        state.writes.push(data.to_vec());
        state.just_written = true;

        if let Some((&power_low, words)) = data.split_first() {
            state.registers[0x02] = (state.registers[0x02] & 0xFF00) | u16::from(power_low);
            for (slot, word) in words.chunks_exact(2).enumerate() {
                state.registers[0x03 + slot] = u16::from_be_bytes([word[0], word[1]]);
            }
        }

        // Host acknowledges a finished operation by writing again.
        state.registers[STATUS_RSSI] &= !(STC | SF_BL);
        Ok(())
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_end {
            state.fail_next_end = false;
            return Err(SimError::Nack);
        }

        state.ended += 1;
        Ok(())
    }
}

/// Delay that records requested sleeps instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub sleeps_ms: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u32 {
        self.sleeps_ms.iter().sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.sleeps_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
    }
}

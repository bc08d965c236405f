//! Host-side mirror of the tuner's register bank.
//!
//! The chip cannot be addressed register by register: reads always stream the
//! whole bank starting at `STATUSRSSI` and writes always start at `POWERCFG`.
//! Every bit-field change is therefore made here first and then flushed with a
//! single write, after which the bank is reloaded from a single burst read.

use crate::registers::{
    Register,
    BURST_READ_LEN,
    FIRST_STREAMED_REGISTER,
    FIRST_WRITABLE_REGISTER,
    LAST_WRITABLE_REGISTER,
    REGISTER_COUNT,
    WRITE_BUFFER_LEN,
};

/// A burst read delivered fewer bytes than the full bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShortBurst {
    /// Number of bytes actually received.
    pub received: usize,
}

/// In-memory copy of all sixteen registers, indexed by register address.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterBank {
    registers: [u16; REGISTER_COUNT],
}

impl RegisterBank {
    /// Creates an all-zero bank.
    pub const fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
        }
    }

    /// Returns the raw value of the register at `address` (wrapped to the bank size).
    pub fn get(&self, address: u8) -> u16 {
        self.registers[Self::index(address)]
    }

    /// Overwrites the raw value of the register at `address` (wrapped to the bank size).
    pub fn set(&mut self, address: u8, value: u16) {
        self.registers[Self::index(address)] = value;
    }

    /// Returns every register in address order.
    pub fn as_words(&self) -> &[u16; REGISTER_COUNT] {
        &self.registers
    }

    /// Decodes a typed register from the bank.
    pub fn read<R>(&self) -> R
    where
        R: Register<Raw = u16> + From<u16>,
    {
        R::from(self.get(R::ADDRESS))
    }

    /// Applies `mutate` to a typed view of a register and stores the result.
    pub fn modify<R, F>(&mut self, mutate: F)
    where
        R: Register<Raw = u16> + From<u16>,
        u16: From<R>,
        F: FnOnce(&mut R),
    {
        let mut register = self.read::<R>();
        mutate(&mut register);
        self.set(R::ADDRESS, u16::from(register));
    }

    /// Replaces the whole bank with the contents of a burst read.
    ///
    /// The chip streams big-endian words starting at `STATUSRSSI` (0x0A) and
    /// wraps to 0x00 after 0x0F, so burst word `k` belongs to address
    /// `(0x0A + k) % 16`. Nothing is modified when `burst` is short.
    pub fn load_burst(&mut self, burst: &[u8]) -> Result<(), ShortBurst> {
        if burst.len() < BURST_READ_LEN {
            return Err(ShortBurst {
                received: burst.len(),
            });
        }

        let mut decoded = [0u16; REGISTER_COUNT];
        for (position, word) in burst[..BURST_READ_LEN].chunks_exact(2).enumerate() {
            let address = Self::index(FIRST_STREAMED_REGISTER + position as u8);
            decoded[address] = u16::from_be_bytes([word[0], word[1]]);
        }

        self.registers = decoded;
        Ok(())
    }

    /// Packs the host-writable window into the byte order the chip expects.
    ///
    /// The high byte of `POWERCFG` is the reserved command byte and is not
    /// transmitted; `CHANNEL` through `TEST1` follow as big-endian words.
    pub fn stage_write(&self) -> WriteBuffer {
        let mut bytes = [0u8; WRITE_BUFFER_LEN];
        let [_, power_low] = self.get(FIRST_WRITABLE_REGISTER).to_be_bytes();
        bytes[0] = power_low;

        for (slot, address) in ((FIRST_WRITABLE_REGISTER + 1)..=LAST_WRITABLE_REGISTER).enumerate() {
            let [high, low] = self.get(address).to_be_bytes();
            bytes[1 + slot * 2] = high;
            bytes[2 + slot * 2] = low;
        }

        WriteBuffer { bytes }
    }

    #[inline]
    fn index(address: u8) -> usize {
        address as usize % REGISTER_COUNT
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes of one register write transaction, derived from a [`RegisterBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteBuffer {
    bytes: [u8; WRITE_BUFFER_LEN],
}

impl WriteBuffer {
    /// Returns the bytes in transmission order.
    pub fn as_bytes(&self) -> &[u8; WRITE_BUFFER_LEN] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{PowerConfig, REG_POWER_CFG, REG_READ_CHAN, REG_STATUS_RSSI, REG_TEST1};

    // Burst where word k carries 0xA0 | k in both bytes, making positions easy to trace.
    fn traced_burst() -> [u8; BURST_READ_LEN] {
        let mut burst = [0u8; BURST_READ_LEN];
        for (k, word) in burst.chunks_exact_mut(2).enumerate() {
            word[0] = 0xA0 | k as u8;
            word[1] = k as u8;
        }
        burst
    }

    #[test]
    fn burst_words_land_at_rotated_addresses() {
        let mut bank = RegisterBank::new();
        bank.load_burst(&traced_burst()).unwrap();

        // First streamed word is STATUSRSSI, the seventh wraps to DEVICEID.
        assert_eq!(bank.get(REG_STATUS_RSSI), 0xA000);
        assert_eq!(bank.get(REG_READ_CHAN), 0xA101);
        assert_eq!(bank.get(0x0F), 0xA505);
        assert_eq!(bank.get(0x00), 0xA606);
        assert_eq!(bank.get(0x09), 0xAF0F);
    }

    #[test]
    fn short_burst_leaves_bank_untouched() {
        let mut bank = RegisterBank::new();
        bank.set(REG_POWER_CFG, 0x4001);

        let burst = traced_burst();
        assert_eq!(
            bank.load_burst(&burst[..31]),
            Err(ShortBurst { received: 31 })
        );
        assert_eq!(bank.get(REG_POWER_CFG), 0x4001);
        assert_eq!(bank.get(REG_STATUS_RSSI), 0);
    }

    #[test]
    fn stage_write_skips_command_byte() {
        let mut bank = RegisterBank::new();
        for address in 0x02..=0x07u8 {
            bank.set(address, u16::from_be_bytes([0x10 | address, 0x20 | address]));
        }

        let buffer = bank.stage_write();
        assert_eq!(
            buffer.as_bytes(),
            &[0x22, 0x13, 0x23, 0x14, 0x24, 0x15, 0x25, 0x16, 0x26, 0x17, 0x27]
        );
    }

    #[test]
    fn staging_does_not_mutate_the_bank() {
        let mut bank = RegisterBank::new();
        bank.load_burst(&traced_burst()).unwrap();
        let before = bank.clone();

        let _ = bank.stage_write();
        assert_eq!(bank, before);
    }

    #[test]
    fn modify_only_touches_target_register() {
        let mut bank = RegisterBank::new();
        bank.set(REG_TEST1, 0x8100);
        bank.modify::<PowerConfig, _>(|power| power.set_seek(true));

        assert_eq!(bank.get(REG_POWER_CFG), 0x0100);
        assert_eq!(bank.get(REG_TEST1), 0x8100);
    }
}

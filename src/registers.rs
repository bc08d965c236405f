//! Register map definitions for the Si4702/Si4703 FM tuner.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::Gpio2Mode;

/// Register address of `DEVICEID`.
pub const REG_DEVICE_ID: u8 = 0x00;
/// Register address of `CHIPID`.
pub const REG_CHIP_ID: u8 = 0x01;
/// Register address of `POWERCFG`.
pub const REG_POWER_CFG: u8 = 0x02;
/// Register address of `CHANNEL`.
pub const REG_CHANNEL: u8 = 0x03;
/// Register address of `SYSCONFIG1`.
pub const REG_SYS_CONFIG1: u8 = 0x04;
/// Register address of `SYSCONFIG2`.
pub const REG_SYS_CONFIG2: u8 = 0x05;
/// Register address of `SYSCONFIG3`.
pub const REG_SYS_CONFIG3: u8 = 0x06;
/// Register address of `TEST1`.
pub const REG_TEST1: u8 = 0x07;
/// Register address of `TEST2`.
pub const REG_TEST2: u8 = 0x08;
/// Register address of `BOOTCONFIG`.
pub const REG_BOOT_CONFIG: u8 = 0x09;
/// Register address of `STATUSRSSI`.
pub const REG_STATUS_RSSI: u8 = 0x0A;
/// Register address of `READCHAN`.
pub const REG_READ_CHAN: u8 = 0x0B;
/// Register address of `RDSA`.
pub const REG_RDSA: u8 = 0x0C;
/// Register address of `RDSD`.
pub const REG_RDSD: u8 = 0x0F;

/// Number of 16-bit registers in the bank.
pub const REGISTER_COUNT: usize = 16;
/// Size in bytes of a full-bank burst read.
pub const BURST_READ_LEN: usize = REGISTER_COUNT * 2;
/// Register the chip streams first during a burst read.
pub const FIRST_STREAMED_REGISTER: u8 = REG_STATUS_RSSI;
/// First register of the host-writable window.
pub const FIRST_WRITABLE_REGISTER: u8 = REG_POWER_CFG;
/// Last register of the host-writable window.
pub const LAST_WRITABLE_REGISTER: u8 = REG_TEST1;
/// Size in bytes of a register write transaction.
///
/// Only the low byte of `POWERCFG` is sent; `CHANNEL` through `TEST1` are sent whole.
pub const WRITE_BUFFER_LEN: usize =
    1 + 2 * (LAST_WRITABLE_REGISTER - FIRST_WRITABLE_REGISTER) as usize;

/// Default 7-bit bus address of the tuner.
pub const DEFAULT_SLAVE_ADDRESS: u8 = 0x10;

/// `TEST1` word enabling the internal crystal oscillator.
pub const OSCILLATOR_ENABLE_COMMAND: u16 = 0x8100;
/// `POWERCFG` word powering the IC up with mute disabled.
pub const POWER_UP_COMMAND: u16 = 0x4001;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register value type.
pub trait Register {
    /// Raw storage backing the register payload.
    type Raw: Copy;
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Optional reset/default value defined by the datasheet.
    const RESET_VALUE: Option<Self::Raw>;
}

/// Bitfield representation of the `POWERCFG` register (address `0x02`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerConfig {
    // Powerup enable (bit 0).
    pub enable: bool,
    #[skip]
    __: B5,
    // Powerup disable (bit 6).
    pub disable: bool,
    #[skip]
    __: B1,
    // Seek start (bit 8).
    pub seek: bool,
    // Seek towards higher channels (bit 9).
    pub seek_up: bool,
    // Tune select (bit 10), cleared for seeks.
    pub tune_select: bool,
    // RDS mode (bit 11).
    pub rds_mode: bool,
    #[skip]
    __: B1,
    // Force mono (bit 13).
    pub mono: bool,
    // Mute disable (bit 14).
    pub mute_disable: bool,
    // Softmute disable (bit 15).
    pub softmute_disable: bool,
}

/// Bitfield representation of the `CHANNEL` register (address `0x03`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    // Channel select (bits 9:0).
    pub channel: B10,
    #[skip]
    __: B5,
    // Tune start (bit 15).
    pub tune: bool,
}

/// Bitfield representation of the `SYSCONFIG1` register (address `0x04`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysConfig1 {
    #[skip]
    __: B2,
    // GPIO2 function (bits 3:2).
    pub gpio2: Gpio2Mode,
    #[skip]
    __: B10,
    // Seek/tune complete interrupt enable (bit 14).
    pub stc_interrupt_enable: bool,
    // RDS interrupt enable (bit 15).
    pub rds_interrupt_enable: bool,
}

/// Bitfield representation of the `SYSCONFIG2` register (address `0x05`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysConfig2 {
    // Volume (bits 3:0).
    pub volume: B4,
    // Channel spacing (bits 5:4).
    pub spacing: B2,
    // Band select (bits 7:6).
    pub band: B2,
    // RSSI seek threshold (bits 15:8).
    pub seek_threshold: u8,
}

/// Bitfield representation of the `STATUSRSSI` register (address `0x0A`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRssi {
    // Received signal strength (bits 7:0).
    pub rssi: u8,
    // Stereo indicator (bit 8).
    pub stereo: bool,
    #[skip]
    __: B4,
    // Seek fail / band limit (bit 13).
    pub seek_fail_band_limit: bool,
    // Seek/tune complete (bit 14).
    pub seek_tune_complete: bool,
    // RDS ready (bit 15).
    pub rds_ready: bool,
}

/// Bitfield representation of the `READCHAN` register (address `0x0B`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadChannel {
    // Current channel (bits 9:0).
    pub channel: B10,
    #[skip]
    __: B6,
}

macro_rules! word_register {
    ($ty:ident, $address:expr, $access:expr, $reset:expr) => {
        impl From<u16> for $ty {
            fn from(value: u16) -> Self {
                Self::from_bytes(value.to_le_bytes())
            }
        }

        impl From<$ty> for u16 {
            fn from(value: $ty) -> Self {
                u16::from_le_bytes(value.into_bytes())
            }
        }

        impl Register for $ty {
            type Raw = u16;
            const ADDRESS: u8 = $address;
            const ACCESS: RegisterAccess = $access;
            const RESET_VALUE: Option<Self::Raw> = $reset;
        }
    };
}

word_register!(PowerConfig, REG_POWER_CFG, RegisterAccess::ReadWrite, Some(0x0000));
word_register!(Channel, REG_CHANNEL, RegisterAccess::ReadWrite, Some(0x0000));
word_register!(SysConfig1, REG_SYS_CONFIG1, RegisterAccess::ReadWrite, Some(0x0000));
word_register!(SysConfig2, REG_SYS_CONFIG2, RegisterAccess::ReadWrite, Some(0x0000));
word_register!(StatusRssi, REG_STATUS_RSSI, RegisterAccess::ReadOnly, None);
word_register!(ReadChannel, REG_READ_CHAN, RegisterAccess::ReadOnly, None);

#![no_std]

#[macro_use]
mod log;

mod error;

pub mod command;
pub mod completion;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod registers;
pub mod shadow;

pub use crate::command::TuningCommand;
pub use crate::completion::{CompletionMode, NoInterruptPin};
pub use crate::config::{Config, ConfigError};
pub use crate::device::{SeekOptions, SeekResult, Si470x, StatusSnapshot};
pub use crate::error::{Error, PinError, Result};
pub use crate::params::{Frequency, SeekDirection, SeekThreshold, Volume};

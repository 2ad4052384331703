use std::path::PathBuf;

use crate::device::speed_for_baud_rate;
use crate::error::Error;

pub const DEFAULT_DEVICE_PATH: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_LOG_PATH: &str = "log.txt";
/// A line starting with this byte ends the session.
pub const DEFAULT_TERMINATOR: u8 = b'z';

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub device_path: PathBuf,
    pub baud_rate: u32,
    pub log_path: PathBuf,
    pub terminator: u8,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            baud_rate: DEFAULT_BAUD_RATE,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            terminator: DEFAULT_TERMINATOR,
        }
    }
}

impl Config {
    /// Rejects settings that can't be applied to a device. Framing is fixed,
    /// so the baud rate is the only thing that can be wrong here.
    pub fn validate(&self) -> Result<(), Error> {
        if speed_for_baud_rate(self.baud_rate).is_none() {
            return Err(Error::UnsupportedBaudRate(self.baud_rate));
        }
        Ok(())
    }
}

/// Parses a terminator given on the command line. Only a single ASCII
/// character is accepted: the comparison happens against the first byte
/// of each line, so anything wider could never match.
pub fn parse_terminator(value: &str) -> Result<u8, Error> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(Error::InvalidTerminator(value.to_string())),
    }
}

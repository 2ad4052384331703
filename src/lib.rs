//! Logs lines received on a serial device.
//!
//! The device is put into canonical mode, so every read returns (at most)
//! one line. Each line is appended to a log file with a timestamp, and
//! echoed to the console. A line starting with the terminator character
//! ends the session, after which the device gets its original settings
//! back.
extern crate libc;

pub mod config;
pub mod device;
mod error;
pub mod log_file;
pub mod record;
pub mod session;

pub use config::Config;
pub use device::Device;
pub use error::Error;
pub use log_file::{LogFile, RecordLog};
pub use record::{Clock, LocalClock};
pub use session::{Session, SessionState, StopReason};

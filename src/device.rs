use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Error;

/// EOF character (Ctrl-D) in canonical mode.
const EOF_CHAR: libc::cc_t = 4;
/// Canonical mode ignores VMIN, but it's part of the preset we apply, so we
/// keep it identical to what the devices we talk to have always been
/// configured with.
const MIN_READ_COUNT: libc::cc_t = 2;

/// Maps a numeric baud rate onto the termios speed constant.
pub fn speed_for_baud_rate(baud_rate: u32) -> Option<libc::speed_t> {
    let speed = match baud_rate {
        50 => libc::B50,
        75 => libc::B75,
        110 => libc::B110,
        134 => libc::B134,
        150 => libc::B150,
        200 => libc::B200,
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        1800 => libc::B1800,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        #[cfg(target_os = "linux")]
        460800 => libc::B460800,
        #[cfg(target_os = "linux")]
        500000 => libc::B500000,
        #[cfg(target_os = "linux")]
        576000 => libc::B576000,
        #[cfg(target_os = "linux")]
        921600 => libc::B921600,
        #[cfg(target_os = "linux")]
        1000000 => libc::B1000000,
        #[cfg(target_os = "linux")]
        1152000 => libc::B1152000,
        #[cfg(target_os = "linux")]
        1500000 => libc::B1500000,
        #[cfg(target_os = "linux")]
        2000000 => libc::B2000000,
        #[cfg(target_os = "linux")]
        2500000 => libc::B2500000,
        #[cfg(target_os = "linux")]
        3000000 => libc::B3000000,
        #[cfg(target_os = "linux")]
        3500000 => libc::B3500000,
        #[cfg(target_os = "linux")]
        4000000 => libc::B4000000,
        _ => return None,
    };
    Some(speed)
}

/// Builds the line settings used for the lifetime of a session: 8N1 with
/// RTS/CTS, canonical input without echo or signals, and every control
/// character disabled except EOF.
pub fn line_settings(speed: libc::speed_t) -> Result<libc::termios, Error> {
    // All-zero is a valid termios, and it's the baseline we want: nothing
    // is inherited from whatever the device was configured with before.
    let mut settings: libc::termios = unsafe { std::mem::zeroed() };

    settings.c_cflag = libc::CS8 | libc::CRTSCTS | libc::CLOCAL | libc::CREAD;
    // ICRNL: senders terminating lines with CR would otherwise never
    // complete a canonical read.
    settings.c_iflag = libc::IGNPAR | libc::ICRNL;
    settings.c_oflag = 0;
    settings.c_lflag = libc::ICANON;

    settings.c_cc[libc::VEOF] = EOF_CHAR;
    settings.c_cc[libc::VMIN] = MIN_READ_COUNT;

    if unsafe { libc::cfsetispeed(&mut settings, speed) } != 0 {
        return Err(Error::termios("cfsetispeed"));
    }
    if unsafe { libc::cfsetospeed(&mut settings, speed) } != 0 {
        return Err(Error::termios("cfsetospeed"));
    }
    Ok(settings)
}

pub fn get_attributes(file: &File) -> Result<libc::termios, Error> {
    let mut settings: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(file.as_raw_fd(), &mut settings) } != 0 {
        return Err(Error::termios("tcgetattr"));
    }
    Ok(settings)
}

/// The descriptor SavedSettings restores through.
fn duplicate(file: &File) -> Result<File, Error> {
    file.try_clone()
        .map_err(|source| Error::Termios { op: "dup", source })
}

fn set_attributes(file: &File, settings: &libc::termios) -> Result<(), Error> {
    if unsafe { libc::tcsetattr(file.as_raw_fd(), libc::TCSANOW, settings) } != 0 {
        return Err(Error::termios("tcsetattr"));
    }
    Ok(())
}

/// The line settings a device had before we touched it, plus a descriptor
/// to put them back with. The descriptor is a duplicate of the device's, so
/// a SavedSettings can outlive the Device (e.g. inside an interrupt handler).
pub struct SavedSettings {
    file: File,
    settings: libc::termios,
}

impl SavedSettings {
    pub fn restore(&self) -> Result<(), Error> {
        set_attributes(&self.file, &self.settings)
    }

    pub fn settings(&self) -> &libc::termios {
        &self.settings
    }
}

/// An open serial device, configured for line-oriented reads. The original
/// line settings are restored when the Device is closed or dropped.
pub struct Device {
    file: File,
    saved: Arc<SavedSettings>,
    restored: bool,
}

impl Device {
    pub fn open(config: &Config) -> Result<Device, Error> {
        let speed = speed_for_baud_rate(config.baud_rate)
            .ok_or(Error::UnsupportedBaudRate(config.baud_rate))?;
        let settings = line_settings(speed)?;

        // O_NOCTTY: if the device became our controlling terminal, whatever
        // is on the other end could kill us by sending an interrupt
        // character.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&config.device_path)
            .map_err(|source| Error::Open {
                path: config.device_path.clone(),
                source,
            })?;

        let saved = Arc::new(SavedSettings {
            settings: get_attributes(&file)?,
            file: duplicate(&file)?,
        });
        // From here on Drop puts the original settings back, even if
        // configuring fails halfway.
        let device = Device {
            file,
            saved,
            restored: false,
        };

        if unsafe { libc::tcflush(device.file.as_raw_fd(), libc::TCIFLUSH) } != 0 {
            return Err(Error::termios("tcflush"));
        }
        set_attributes(&device.file, &settings)?;

        tracing::debug!(
            path = %config.device_path.display(),
            baud_rate = config.baud_rate,
            "device configured"
        );
        Ok(device)
    }

    /// Returns a handle that can restore the original settings from
    /// elsewhere, e.g. a Ctrl-C handler.
    pub fn saved_settings(&self) -> Arc<SavedSettings> {
        self.saved.clone()
    }

    /// Restores the original settings and closes the device. Unlike Drop,
    /// this reports whether restoring worked.
    pub fn close(mut self) -> Result<(), Error> {
        self.restored = true;
        self.saved.restore()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.saved.restore() {
            tracing::error!(error = %e, "failed to restore device settings");
        }
    }
}

impl Read for &Device {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        (&self.file).read(buf)
    }
}

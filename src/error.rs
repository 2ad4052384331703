use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// One of the termios calls failed. `op` names the libc function.
    #[error("{op} failed: {source}")]
    Termios {
        op: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("unsupported baud rate {0}")]
    UnsupportedBaudRate(u32),
    #[error("failed to read from device: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write to console: {0}")]
    Console(#[source] io::Error),
    #[error("terminator must be a single ASCII character (got {0:?})")]
    InvalidTerminator(String),
}

impl Error {
    /// Wraps errno after a failed termios call.
    pub(crate) fn termios(op: &'static str) -> Error {
        Error::Termios {
            op,
            source: io::Error::last_os_error(),
        }
    }
}

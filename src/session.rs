use std::io::{ErrorKind, Read, Write};

use crate::error::Error;
use crate::log_file::RecordLog;
use crate::record::{console_echo, log_record, Clock, BELL};

/// Upper bound for a single read. Canonical reads return at most one line;
/// longer lines arrive over several reads, each handled as its own line.
pub const READ_BUFFER_SIZE: usize = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// A line starting with the terminator was received.
    Terminated,
    /// The device returned two zero-length reads in a row. A single one is
    /// the remote end sending an EOF character at the start of a line, and
    /// is logged as an empty line. A hung up device returns nothing but
    /// zero-length reads.
    EndOfStream,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Stopped(StopReason),
}

/// The read-log-echo loop.
///
/// Each line read from `source` is logged to `log` (when logging is
/// enabled) and echoed to `console`. A single blank line is swallowed; a
/// second consecutive one is logged and echoed, so a double enter from the
/// remote end shows up as one blank line.
pub struct Session<R, L, W, C> {
    source: R,
    log: Option<L>,
    console: W,
    clock: C,
    terminator: u8,
    // Set after a blank line that was swallowed.
    blank_pending: bool,
    // Set after a zero-length read.
    empty_read: bool,
    state: SessionState,
}

impl<R: Read, L: RecordLog, W: Write, C: Clock> Session<R, L, W, C> {
    /// `log` is None when logging is disabled: nothing is written for any
    /// line, console output is unaffected.
    pub fn new(source: R, log: Option<L>, console: W, clock: C, terminator: u8) -> Self {
        Session {
            source,
            log,
            console,
            clock,
            terminator,
            blank_pending: false,
            empty_read: false,
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn log(&self) -> Option<&L> {
        self.log.as_ref()
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    /// Processes lines until the session stops.
    pub fn run(&mut self) -> Result<StopReason, Error> {
        loop {
            if let SessionState::Stopped(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// Blocks for one read and processes what it returned. Does nothing
    /// once stopped.
    pub fn step(&mut self) -> Result<SessionState, Error> {
        if self.state != SessionState::Running {
            return Ok(self.state);
        }

        let mut buf = [0u8; READ_BUFFER_SIZE];
        let len = loop {
            match self.source.read(&mut buf) {
                Ok(len) => break len,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Read(e)),
            }
        };

        if len == 0 && self.empty_read {
            tracing::info!("device returned end of stream");
            self.state = SessionState::Stopped(StopReason::EndOfStream);
            return Ok(self.state);
        }
        self.empty_read = len == 0;
        self.handle_line(&buf[..len])
    }

    /// Logs and echoes one line as returned by a single read, including its
    /// terminator. An empty line (EOF character) is logged with length 0.
    pub fn handle_line(&mut self, line: &[u8]) -> Result<SessionState, Error> {
        if self.state != SessionState::Running {
            return Ok(self.state);
        }
        tracing::debug!(len = line.len(), "line received");

        self.console.write_all(&[BELL]).map_err(Error::Console)?;
        let timestamp = self.clock.timestamp();

        if line.first() == Some(&b'\n') {
            if self.blank_pending {
                self.console.write_all(line).map_err(Error::Console)?;
                self.append_record(&timestamp, line);
                self.blank_pending = false;
            } else {
                self.blank_pending = true;
            }
        } else {
            self.blank_pending = false;
            self.append_record(&timestamp, line);
            self.console
                .write_all(&console_echo(line))
                .map_err(Error::Console)?;
            if line.first() == Some(&self.terminator) {
                tracing::debug!("terminator received");
                self.state = SessionState::Stopped(StopReason::Terminated);
            }
        }

        self.console.flush().map_err(Error::Console)?;
        Ok(self.state)
    }

    fn append_record(&mut self, timestamp: &str, line: &[u8]) {
        let Some(log) = self.log.as_mut() else {
            return;
        };
        // A lost record doesn't end the session: the line is still echoed,
        // and the next append may succeed again.
        if let Err(e) = log.append(&log_record(timestamp, line)) {
            tracing::warn!(error = %e, "failed to append log record");
        }
    }
}

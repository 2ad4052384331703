use time::{OffsetDateTime, UtcOffset};

pub const BELL: u8 = 0x07;

/// Source of the timestamps written in front of each log record.
pub trait Clock {
    fn timestamp(&self) -> String;
}

impl<F: Fn() -> String> Clock for F {
    fn timestamp(&self) -> String {
        self()
    }
}

/// Wall clock in the local timezone.
///
/// The offset is looked up once, in `new()`. On unix `time` refuses to
/// determine the local offset once a process has more than one thread, so
/// this must be created before anything spawns a thread (ctrlc does). If the
/// offset can't be determined we fall back to UTC.
pub struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub fn new() -> LocalClock {
        let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
            tracing::warn!("unable to determine local timezone, using UTC for timestamps");
            UtcOffset::UTC
        });
        LocalClock { offset }
    }
}

impl Default for LocalClock {
    fn default() -> LocalClock {
        LocalClock::new()
    }
}

impl Clock for LocalClock {
    fn timestamp(&self) -> String {
        format_timestamp(OffsetDateTime::now_utc().to_offset(self.offset))
    }
}

/// Formats in ctime(3) layout minus its trailing newline, e.g.
/// "Tue Oct  6 09:05:03 2026".
pub fn format_timestamp(date_time: OffsetDateTime) -> String {
    let format = time::macros::format_description!(
        "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
    );
    // Formatting only fails for components an OffsetDateTime always has.
    date_time
        .format(&format)
        .unwrap_or_else(|_| date_time.to_string())
}

/// Formats a log record: `<timestamp> - (msg length:<n> ): <line>`. The line
/// is copied verbatim, including its terminator, and need not be UTF-8.
pub fn log_record(timestamp: &str, line: &[u8]) -> Vec<u8> {
    let mut record = format!("{timestamp} - (msg length:{} ): ", line.len()).into_bytes();
    record.extend_from_slice(line);
    record
}

/// Formats the console echo of a non-blank line: a bell, then `(<n>): <line>`.
pub fn console_echo(line: &[u8]) -> Vec<u8> {
    let mut echo = vec![BELL];
    echo.extend_from_slice(format!("({}): ", line.len()).as_bytes());
    echo.extend_from_slice(line);
    echo
}

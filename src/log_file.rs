use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination for formatted log records.
pub trait RecordLog {
    fn append(&mut self, record: &[u8]) -> io::Result<()>;
}

/// In-memory log, one entry per record.
impl RecordLog for Vec<Vec<u8>> {
    fn append(&mut self, record: &[u8]) -> io::Result<()> {
        self.push(record.to_vec());
        Ok(())
    }
}

/// Append-only log file. The file is not held open: every record opens it,
/// writes, and closes it again, so a record that was appended survives the
/// process dying at any later point.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    /// Checks that `path` can be opened for appending (creating it if
    /// necessary). An Err here means logging should be disabled.
    pub fn open(path: impl AsRef<Path>) -> io::Result<LogFile> {
        let path = path.as_ref().to_path_buf();
        open_append(&path)?;
        Ok(LogFile { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordLog for LogFile {
    fn append(&mut self, record: &[u8]) -> io::Result<()> {
        open_append(&self.path)?.write_all(record)
    }
}

fn open_append(path: &Path) -> io::Result<std::fs::File> {
    OpenOptions::new().append(true).create(true).open(path)
}

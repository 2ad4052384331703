//! Pseudo-terminal helpers: the test holds the master side and plays the
//! remote end, the code under test opens the slave side.
#![allow(dead_code)]

use std::ffi::CStr;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::FromRawFd;
use std::path::PathBuf;

pub struct Pty {
    pub master: File,
    pub slave_path: PathBuf,
}

pub fn open_pty() -> Pty {
    unsafe {
        let fd = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
        assert!(fd >= 0, "posix_openpt: {}", std::io::Error::last_os_error());
        let master = File::from_raw_fd(fd);
        assert_eq!(libc::grantpt(fd), 0);
        assert_eq!(libc::unlockpt(fd), 0);

        let mut name = [0 as libc::c_char; 128];
        assert_eq!(libc::ptsname_r(fd, name.as_mut_ptr(), name.len()), 0);
        let slave_path = PathBuf::from(CStr::from_ptr(name.as_ptr()).to_str().unwrap());
        Pty { master, slave_path }
    }
}

/// A second handle on the slave, used to observe its settings independently
/// of whoever else has it open.
pub fn open_observer(pty: &Pty) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(&pty.slave_path)
        .unwrap()
}

pub fn assert_same_settings(actual: &libc::termios, expected: &libc::termios) {
    assert_eq!(actual.c_iflag, expected.c_iflag);
    assert_eq!(actual.c_oflag, expected.c_oflag);
    assert_eq!(actual.c_cflag, expected.c_cflag);
    assert_eq!(actual.c_lflag, expected.c_lflag);
    assert_eq!(actual.c_cc, expected.c_cc);
}

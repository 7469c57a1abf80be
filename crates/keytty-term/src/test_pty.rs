// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Pseudo-terminal pairs for tests.
//
// The slave side is a real terminal device with a path, so a `Session` can
// open it exactly as it would open /dev/tty. The master side plays the
// user: bytes written to it arrive as keystrokes, and whatever the session
// writes can be read back from it.

use std::ffi::CStr;
use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll;

pub struct Pty {
    master: File,
    slave: PathBuf,
}

impl Pty {
    pub fn open() -> Self {
        unsafe {
            let fd = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(fd >= 0, "posix_openpt: {}", std::io::Error::last_os_error());
            let master = File::from_raw_fd(fd);
            assert_eq!(libc::grantpt(fd), 0, "grantpt");
            assert_eq!(libc::unlockpt(fd), 0, "unlockpt");

            let mut name = [0 as libc::c_char; 128];
            assert_eq!(libc::ptsname_r(fd, name.as_mut_ptr(), name.len()), 0, "ptsname_r");
            let slave = PathBuf::from(CStr::from_ptr(name.as_ptr()).to_str().unwrap());

            Self { master, slave }
        }
    }

    pub fn path(&self) -> &Path {
        &self.slave
    }

    /// Send bytes as if typed.
    pub fn type_bytes(&mut self, bytes: &[u8]) {
        self.master.write_all(bytes).unwrap();
    }

    /// Set the window size seen by the slave.
    pub fn resize(&self, cols: u16, rows: u16) {
        let ws = libc::winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let rc = unsafe { libc::ioctl(self.master.as_raw_fd(), libc::TIOCSWINSZ, &raw const ws) };
        assert_eq!(rc, 0, "TIOCSWINSZ");
    }

    /// Everything the slave side has written so far.
    pub fn drain(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 1024];
        while poll::ready(self.master.as_raw_fd(), Duration::from_millis(100)).unwrap() {
            match self.master.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => out.extend_from_slice(&buf[..n]),
            }
        }
        out
    }

    /// Close the master side, as when the terminal window goes away.
    pub fn hang_up(self) {
        drop(self.master);
    }

    /// Open the slave a second time to inspect its line discipline.
    pub fn observer(&self) -> File {
        use std::os::unix::fs::OpenOptionsExt;
        std::fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&self.slave)
            .unwrap()
    }
}

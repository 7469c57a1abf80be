// SPDX-License-Identifier: MIT
//
// Line discipline — capture, raw derivation, restore.
//
// Safety: termios access is only available through `tcgetattr` and
// `tcsetattr`, so this module uses `unsafe`. Each block is a single FFI
// call on a descriptor the caller owns.
#![allow(unsafe_code)]
//
// Our "raw" is deliberately lighter than `cfmakeraw`. Four bits go:
//
//   ICANON  line editing, so read() returns single bytes
//   ECHO    local echo
//   ISIG    Ctrl-C / Ctrl-Z / Ctrl-\ generating signals
//   ICRNL   CR → NL translation on input, so Enter arrives as 13
//
// Output post-processing (OPOST/ONLCR), flow control and character size
// are left as the user had them. A `\n` we print still lands at column 0.

use std::io;
use std::os::unix::io::RawFd;

bitflags::bitflags! {
    /// The line-discipline features raw mode turns off.
    ///
    /// A set bit means the feature is enabled on the device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ModeFlags: u8 {
        /// Canonical input: line editing, reads complete on newline.
        const CANONICAL = 1 << 0;
        /// Input characters are echoed back.
        const ECHO      = 1 << 1;
        /// INTR, QUIT and SUSP characters raise signals.
        const SIGNALS   = 1 << 2;
        /// Carriage return is translated to newline on input.
        const CR_TO_NL  = 1 << 3;
    }
}

impl ModeFlags {
    /// Read the flags out of a termios structure.
    #[must_use]
    pub const fn of(termios: &libc::termios) -> Self {
        let mut bits = 0;
        if termios.c_lflag & libc::ICANON != 0 {
            bits |= Self::CANONICAL.bits();
        }
        if termios.c_lflag & libc::ECHO != 0 {
            bits |= Self::ECHO.bits();
        }
        if termios.c_lflag & libc::ISIG != 0 {
            bits |= Self::SIGNALS.bits();
        }
        if termios.c_iflag & libc::ICRNL != 0 {
            bits |= Self::CR_TO_NL.bits();
        }
        Self::from_bits_truncate(bits)
    }
}

// ─── termios I/O ─────────────────────────────────────────────────────────────

/// Read the terminal attributes of `fd`.
///
/// # Errors
///
/// Returns the OS error, typically `ENOTTY` when `fd` is not a terminal.
pub fn get(fd: RawFd) -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

/// Apply `termios` to `fd` immediately (`TCSANOW`).
///
/// # Errors
///
/// Returns the OS error if the attributes cannot be set.
pub fn set(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Clear the four raw-mode bits in place. Every other field is untouched.
pub const fn make_raw(termios: &mut libc::termios) {
    termios.c_iflag &= !libc::ICRNL;
    termios.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
}

/// The current [`ModeFlags`] of `fd`.
///
/// # Errors
///
/// Returns the OS error if the attributes cannot be read.
pub fn current_flags(fd: RawFd) -> io::Result<ModeFlags> {
    get(fd).map(|t| ModeFlags::of(&t))
}

// ─── SavedMode ───────────────────────────────────────────────────────────────

/// The terminal attributes as they were before we touched them.
///
/// Captured once per session and only ever written back verbatim.
#[derive(Clone, Copy)]
pub struct SavedMode {
    original: libc::termios,
}

impl SavedMode {
    /// Snapshot the attributes of `fd`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the attributes cannot be read.
    pub fn capture(fd: RawFd) -> io::Result<Self> {
        get(fd).map(|original| Self { original })
    }

    /// The raw-mode attributes derived from the snapshot.
    #[must_use]
    pub const fn raw(&self) -> libc::termios {
        let mut termios = self.original;
        make_raw(&mut termios);
        termios
    }

    /// Flags of the snapshot.
    #[must_use]
    pub const fn flags(&self) -> ModeFlags {
        ModeFlags::of(&self.original)
    }

    /// Write the snapshot back to `fd`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the attributes cannot be set.
    pub fn restore(&self, fd: RawFd) -> io::Result<()> {
        set(fd, &self.original)
    }
}

impl std::fmt::Debug for SavedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedMode")
            .field("flags", &self.flags())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::os::unix::io::AsRawFd;

    /// A termios with every flag word fully set.
    fn all_set() -> libc::termios {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        t.c_iflag = !0;
        t.c_oflag = !0;
        t.c_cflag = !0;
        t.c_lflag = !0;
        t
    }

    #[test]
    fn flags_of_zeroed_is_empty() {
        let t: libc::termios = unsafe { std::mem::zeroed() };
        assert_eq!(ModeFlags::of(&t), ModeFlags::empty());
    }

    #[test]
    fn flags_of_all_set_is_all() {
        assert_eq!(ModeFlags::of(&all_set()), ModeFlags::all());
    }

    #[test]
    fn flags_read_individual_bits() {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        t.c_lflag = libc::ECHO;
        t.c_iflag = libc::ICRNL;
        assert_eq!(ModeFlags::of(&t), ModeFlags::ECHO | ModeFlags::CR_TO_NL);
    }

    #[test]
    fn make_raw_clears_exactly_four_bits() {
        let mut t = all_set();
        make_raw(&mut t);

        assert_eq!(ModeFlags::of(&t), ModeFlags::empty());
        assert_eq!(t.c_iflag, !libc::ICRNL);
        assert_eq!(t.c_lflag, !(libc::ICANON | libc::ECHO | libc::ISIG));
    }

    #[test]
    fn make_raw_keeps_output_processing() {
        let mut t = all_set();
        make_raw(&mut t);
        assert_eq!(t.c_oflag, !0);
        assert_eq!(t.c_cflag, !0);
        assert_ne!(t.c_lflag & libc::IEXTEN, 0);
        assert_ne!(t.c_iflag & libc::IXON, 0);
    }

    #[test]
    fn make_raw_is_idempotent() {
        let mut once = all_set();
        make_raw(&mut once);
        let mut twice = once;
        make_raw(&mut twice);
        assert_eq!(ModeFlags::of(&once), ModeFlags::of(&twice));
        assert_eq!(once.c_lflag, twice.c_lflag);
        assert_eq!(once.c_iflag, twice.c_iflag);
    }

    #[test]
    fn saved_raw_leaves_snapshot_alone() {
        let saved = SavedMode { original: all_set() };
        let raw = saved.raw();
        assert_eq!(ModeFlags::of(&raw), ModeFlags::empty());
        assert_eq!(saved.flags(), ModeFlags::all());
    }

    #[test]
    fn get_on_regular_file_fails() {
        let file = File::open("Cargo.toml").unwrap();
        let err = get(file.as_raw_fd()).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTTY));
    }

    #[test]
    fn capture_on_dev_null_fails() {
        let file = File::open("/dev/null").unwrap();
        assert!(SavedMode::capture(file.as_raw_fd()).is_err());
    }

    #[test]
    fn debug_shows_flags() {
        let saved = SavedMode { original: all_set() };
        let s = format!("{saved:?}");
        assert!(s.contains("CANONICAL"), "{s}");
    }
}

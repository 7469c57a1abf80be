// SPDX-License-Identifier: MIT
//
// Terminal dimensions via `ioctl(TIOCGWINSZ)`.
#![allow(unsafe_code)]

use std::os::unix::io::RawFd;

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// What we assume when the device cannot tell us: 80×25.
    pub const FALLBACK: Self = Self { cols: 80, rows: 25 };
}

impl Default for Size {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Ask the device behind `fd` for its window size.
///
/// Returns `None` if `fd` is not a terminal, the ioctl fails, or the
/// device reports a zero dimension (a pty nobody has sized yet).
#[must_use]
pub fn query(fd: RawFd) -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

/// [`query`], falling back to [`Size::FALLBACK`].
#[must_use]
pub fn query_or_fallback(fd: RawFd) -> Size {
    query(fd).unwrap_or(Size::FALLBACK)
}

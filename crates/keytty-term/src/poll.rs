// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Input readiness with a bounded wait.
//
// `poll()` on a single descriptor answers "would read() return right now?"
// without consuming anything. A zero timeout makes it a pure check; a short
// one lets the caller wait for the rest of an escape sequence that may
// still be in flight. Hang-up and error conditions count as ready, because
// read() will return immediately (with EOF or the error) in those states.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Wait up to `timeout` for `fd` to become readable.
///
/// A signal interrupting the wait is reported as "not ready".
///
/// # Errors
///
/// Returns the OS error for any other `poll` failure.
pub fn ready(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let n = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
    if n < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }

    Ok(n > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// The terminal session — one device, two handles, raw mode for a lifetime.
//
// A session opens the device twice: once read-only for unbuffered byte
// input, once write-only behind a block buffer for output. Keeping them
// apart means input never waits on output buffering and vice versa.
//
// The line discipline is snapshotted before anything changes and that
// snapshot is the only thing ever written back. `close` restores it and
// reports the outcome; if a session is dropped without `close` (an early
// `?` return, a panic unwinding through the caller), `Drop` restores it
// anyway so the user's shell is not left without echo.
//
// Output is only guaranteed to reach the terminal on `flush`. Callers batch
// a whole screen update, then flush once.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::TtyConfig;
use crate::error::{Result, TtyError};
use crate::mode::{self, ModeFlags, SavedMode};
use crate::output::{Color, Painter};
use crate::poll;
use crate::size::{self, Size};

/// Exclusive raw-mode access to a terminal device.
///
/// # Example
///
/// ```no_run
/// use keytty_term::{Color, Session, TtyConfig};
///
/// let mut tty = Session::open("/dev/tty", &TtyConfig::default())?;
/// tty.set_fg(Color::Green)?;
/// write!(tty, "press a key ({} columns)", tty.width())?;
/// tty.flush()?;
/// let key = tty.read_byte()?;
/// tty.close()?;
/// # let _ = key;
/// # Ok::<(), keytty_term::TtyError>(())
/// ```
pub struct Session {
    path: PathBuf,
    input: File,
    output: Painter<BufWriter<File>>,
    saved: SavedMode,
    size: Size,
    key_timeout: Duration,
    /// Set once `close` has written `saved` back, so `Drop` does not repeat it.
    restored: bool,
}

impl Session {
    /// Open `path` and switch it to raw mode.
    ///
    /// Emits a reset-attributes sequence into the output buffer (not yet
    /// flushed).
    ///
    /// # Errors
    ///
    /// [`TtyError::Open`] if either handle cannot be opened,
    /// [`TtyError::GetMode`] if `path` is not a terminal, and
    /// [`TtyError::SetMode`] if raw mode cannot be applied.
    pub fn open(path: impl AsRef<Path>, config: &TtyConfig) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| TtyError::Open {
            path: path.to_path_buf(),
            source,
        };

        let input = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(open_err)?;
        let output = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(open_err)?;

        let saved = SavedMode::capture(input.as_raw_fd()).map_err(TtyError::GetMode)?;
        mode::set(input.as_raw_fd(), &saved.raw()).map_err(TtyError::SetMode)?;

        let size = size::query_or_fallback(output.as_raw_fd());

        let mut session = Self {
            path: path.to_path_buf(),
            input,
            output: Painter::new(BufWriter::with_capacity(config.output_buffer, output)),
            saved,
            size,
            key_timeout: config.key_timeout(),
            restored: false,
        };
        session.set_normal()?;

        debug!(
            path = %session.path.display(),
            cols = size.cols,
            rows = size.rows,
            key_timeout_ms = config.key_timeout_ms,
            "tty session opened"
        );
        Ok(session)
    }

    /// Open the device named by `config.tty_path`.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn from_config(config: &TtyConfig) -> Result<Self> {
        Self::open(&config.tty_path, config)
    }

    /// Restore the original mode, flush, and release the device.
    ///
    /// A failed restore is logged and does not stop teardown.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if buffered output could not be flushed. Both
    /// handles are closed regardless.
    pub fn close(mut self) -> Result<()> {
        if let Err(e) = self.restore_mode() {
            warn!(path = %self.path.display(), error = %e, "failed to restore tty mode");
        }
        self.restored = true;

        let flushed = self.flush();
        debug!(path = %self.path.display(), "tty session closed");
        flushed
    }

    // ── Mode ──────────────────────────────────────────────────────────

    /// Write the saved mode back without closing the session.
    ///
    /// Use before handing the terminal to another program; call
    /// [`enter_raw_mode`](Self::enter_raw_mode) to take it back.
    ///
    /// # Errors
    ///
    /// [`TtyError::SetMode`] if the attributes cannot be set.
    pub fn restore_mode(&self) -> Result<()> {
        self.saved
            .restore(self.input.as_raw_fd())
            .map_err(TtyError::SetMode)
    }

    /// Re-apply raw mode, derived from the same saved snapshot.
    ///
    /// # Errors
    ///
    /// [`TtyError::SetMode`] if the attributes cannot be set.
    pub fn enter_raw_mode(&self) -> Result<()> {
        mode::set(self.input.as_raw_fd(), &self.saved.raw()).map_err(TtyError::SetMode)
    }

    /// The line-discipline flags currently in effect on the device.
    ///
    /// # Errors
    ///
    /// [`TtyError::GetMode`] if the attributes cannot be read.
    pub fn mode_flags(&self) -> Result<ModeFlags> {
        mode::current_flags(self.input.as_raw_fd()).map_err(TtyError::GetMode)
    }

    // ── Input ─────────────────────────────────────────────────────────

    /// Block until one byte arrives and return it.
    ///
    /// # Errors
    ///
    /// [`TtyError::Read`] on a read error and [`TtyError::Eof`] when the
    /// device reports end of file. Either way the device is gone for
    /// practical purposes.
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Err(TtyError::Eof),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(TtyError::Read(e)),
            }
        }
    }

    /// Whether [`read_byte`](Self::read_byte) would return without
    /// blocking.
    ///
    /// With `pending == false` this only looks. With `pending == true` it
    /// waits up to the key timeout for input to show up. Nothing is
    /// consumed either way.
    ///
    /// # Errors
    ///
    /// [`TtyError::Poll`] if the readiness check itself fails.
    pub fn input_ready(&self, pending: bool) -> Result<bool> {
        let timeout = if pending {
            self.key_timeout
        } else {
            Duration::ZERO
        };
        poll::ready(self.input.as_raw_fd(), timeout).map_err(TtyError::Poll)
    }

    /// The bounded wait used by `input_ready(true)`.
    #[must_use]
    pub const fn key_timeout(&self) -> Duration {
        self.key_timeout
    }

    // ── Dimensions ────────────────────────────────────────────────────

    /// Terminal size as of open (or the last [`refresh_size`](Self::refresh_size)).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.size.cols
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.size.rows
    }

    /// Ask the device for its size again, e.g. after SIGWINCH.
    ///
    /// Keeps the previous value if the device cannot answer.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = size::query(self.output.get_ref().get_ref().as_raw_fd()) {
            self.size = size;
        }
        self.size
    }

    /// The device path this session was opened on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Output ────────────────────────────────────────────────────────

    /// Set the foreground color; a no-op if it is already current.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_fg(&mut self, color: Color) -> Result<()> {
        self.output.set_fg(color).map_err(TtyError::Write)
    }

    /// The foreground color most recently sent. [`Color::Default`] (code
    /// 9) after open and after [`set_normal`](Self::set_normal).
    #[must_use]
    pub const fn current_fg(&self) -> Color {
        self.output.current_fg()
    }

    /// Turn on reverse video.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_inverse(&mut self) -> Result<()> {
        self.output.set_inverse().map_err(TtyError::Write)
    }

    /// Turn on underline.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_underline(&mut self) -> Result<()> {
        self.output.set_underline().map_err(TtyError::Write)
    }

    /// Reset all attributes and forget the current color.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_normal(&mut self) -> Result<()> {
        self.output.set_normal().map_err(TtyError::Write)
    }

    /// Turn off auto-wrap.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_no_wrap(&mut self) -> Result<()> {
        self.output.set_no_wrap().map_err(TtyError::Write)
    }

    /// Turn on auto-wrap.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_wrap(&mut self) -> Result<()> {
        self.output.set_wrap().map_err(TtyError::Write)
    }

    /// Clear to end of line and move to the next.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn newline(&mut self) -> Result<()> {
        self.output.newline().map_err(TtyError::Write)
    }

    /// Clear from the cursor to end of line.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn clear_line(&mut self) -> Result<()> {
        self.output.clear_line().map_err(TtyError::Write)
    }

    /// Move to 0-indexed column `col`.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn set_column(&mut self, col: u16) -> Result<()> {
        self.output.set_column(col).map_err(TtyError::Write)
    }

    /// Move the cursor up `n` lines.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the sequence.
    pub fn move_up(&mut self, n: u16) -> Result<()> {
        self.output.move_up(n).map_err(TtyError::Write)
    }

    /// Buffer plain text.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the text.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.output.write_str(s).map_err(TtyError::Write)
    }

    /// Buffer formatted text. This is what `write!(session, ...)` calls.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the output buffer cannot take the text.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        self.output.write_fmt(args).map_err(TtyError::Write)
    }

    /// Push everything buffered out to the device.
    ///
    /// # Errors
    ///
    /// [`TtyError::Write`] if the device rejects the write.
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush().map_err(TtyError::Write)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.saved.restore(self.input.as_raw_fd()) {
            warn!(path = %self.path.display(), error = %e, "failed to restore tty mode on drop");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("key_timeout", &self.key_timeout)
            .field("fg", &self.output.current_fg())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

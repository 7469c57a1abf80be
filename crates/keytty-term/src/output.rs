// SPDX-License-Identifier: MIT
//
// Stateful output — a writer that remembers the last foreground color.
//
// Every escape sequence a session sends goes through a `Painter`. It adds
// exactly one piece of state on top of the raw writer: the foreground color
// most recently transmitted. Setting the same color twice in a row sends
// nothing the second time, which keeps per-character colorizing loops
// (highlighting match positions, say) from flooding the terminal with
// identical SGR codes.
//
// The painter is generic over the writer so tests can point it at a
// `Vec<u8>` and compare bytes; a live session wraps a `BufWriter<File>`.

use std::fmt;
use std::io::{self, Write};

use crate::ansi;

// ─── Color ───────────────────────────────────────────────────────────────────

/// One of the eight basic ANSI colors, or the terminal's default.
///
/// The discriminant is the digit that follows `3` in the SGR code, so
/// `Red` is sent as `ESC[31m` and `Default` as `ESC[39m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    /// The terminal's own foreground. Also the "nothing sent yet" state.
    #[default]
    Default = 9,
}

impl Color {
    /// Map a color index to a color. `0..=7` are the basic colors; every
    /// larger index means the terminal default.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            _ => Self::Default,
        }
    }

    /// The SGR digit for this color (`0..=7`, or `9` for the default).
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<u8> for Color {
    fn from(index: u8) -> Self {
        Self::from_index(index)
    }
}

// ─── Painter ─────────────────────────────────────────────────────────────────

/// A writer that emits terminal commands and suppresses redundant color
/// changes.
///
/// Writes are never flushed implicitly. Wrap a buffered writer and call
/// [`flush`](Write::flush) when a frame is complete.
#[derive(Debug)]
pub struct Painter<W: Write> {
    out: W,
    /// Last foreground color written to `out`.
    fg: Color,
}

impl<W: Write> Painter<W> {
    /// Wrap `out`. Nothing is written; the color state starts as
    /// [`Color::Default`].
    pub const fn new(out: W) -> Self {
        Self {
            out,
            fg: Color::Default,
        }
    }

    /// The foreground color most recently sent.
    #[inline]
    #[must_use]
    pub const fn current_fg(&self) -> Color {
        self.fg
    }

    /// Set the foreground color, unless it is already the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails. The tracked color
    /// only changes once the sequence has been written.
    pub fn set_fg(&mut self, color: Color) -> io::Result<()> {
        if self.fg != color {
            ansi::fg(&mut self.out, color)?;
            self.fg = color;
        }
        Ok(())
    }

    /// Turn on reverse video.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn set_inverse(&mut self) -> io::Result<()> {
        ansi::inverse(&mut self.out)
    }

    /// Turn on underline.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn set_underline(&mut self) -> io::Result<()> {
        ansi::underline(&mut self.out)
    }

    /// Reset every attribute and forget the tracked color.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn set_normal(&mut self) -> io::Result<()> {
        ansi::reset(&mut self.out)?;
        self.fg = Color::Default;
        Ok(())
    }

    /// Disable auto-wrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn set_no_wrap(&mut self) -> io::Result<()> {
        ansi::no_wrap(&mut self.out)
    }

    /// Enable auto-wrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn set_wrap(&mut self) -> io::Result<()> {
        ansi::wrap(&mut self.out)
    }

    /// Clear to end of line, then start a new line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn newline(&mut self) -> io::Result<()> {
        ansi::newline(&mut self.out)
    }

    /// Clear from the cursor to end of line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn clear_line(&mut self) -> io::Result<()> {
        ansi::clear_line(&mut self.out)
    }

    /// Move the cursor to the 0-indexed column `col`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn set_column(&mut self, col: u16) -> io::Result<()> {
        ansi::column(&mut self.out, col)
    }

    /// Move the cursor up `n` lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn move_up(&mut self, n: u16) -> io::Result<()> {
        ansi::up(&mut self.out, n)
    }

    /// Write plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    /// The wrapped writer.
    #[inline]
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap, returning the writer. Buffered bytes are not flushed.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for Painter<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(args)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state
// and no decisions about when to emit; the `Painter` owns the one piece of
// state we track (the foreground color). This module just knows the
// byte-level encoding of every command a session can send.
//
// Columns are 0-indexed in our API and converted to 1-indexed for the
// terminal (ANSI cursor addressing is 1-based).
use std::io::{self, Write};

use crate::output::Color;

// ─── SGR ─────────────────────────────────────────────────────────────────────

/// Emit a single-parameter SGR (Select Graphic Rendition) sequence.
#[inline]
pub fn sgr(w: &mut impl Write, code: u8) -> io::Result<()> {
    write!(w, "\x1b[{code}m")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// This clears color, inverse and underline in one go. Whoever tracks
/// attribute state must invalidate it after calling this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Set the foreground color using the compact 30–37 / 39 codes.
#[inline]
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    sgr(w, 30 + color.code())
}

/// Enable reverse video (SGR 7).
#[inline]
pub fn inverse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

/// Enable underline (SGR 4).
#[inline]
pub fn underline(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[4m")
}

// ─── Line Wrap ───────────────────────────────────────────────────────────────

/// Disable auto-wrap (DECAWM reset). Text past the last column overwrites it.
#[inline]
pub fn no_wrap(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?7l")
}

/// Enable auto-wrap (DECAWM set).
#[inline]
pub fn wrap(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?7h")
}

// ─── Lines ───────────────────────────────────────────────────────────────────

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Erase the rest of the line, then move to the next one.
///
/// The newline is a bare `\n`. Output post-processing is left untouched by
/// raw mode, so the terminal driver still turns it into CR LF.
#[inline]
pub fn newline(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K\n")
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to column `col` of the current line (CHA).
///
/// Our column is 0-indexed; CHA is 1-indexed.
#[inline]
pub fn column(w: &mut impl Write, col: u16) -> io::Result<()> {
    write!(w, "\x1b[{}G", u32::from(col) + 1)
}

/// Move the cursor up `n` lines (CUU).
///
/// `n` is sent as-is. Terminals treat `0` like `1`.
#[inline]
pub fn up(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}A")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

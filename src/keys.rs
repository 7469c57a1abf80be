// SPDX-License-Identifier: MIT
//
// Grouping raw bytes into keys, and naming them.
//
// The terminal hands us bytes. A key can be one byte (`a`), two (`Alt-a`
// is ESC a), or a whole sequence (`Up` is ESC [ A). The only way to tell a
// lone Escape from the start of a sequence is timing: the bytes of a
// sequence arrive together, a human pressing Escape then `[` does not. So
// after ESC we keep reading only while `input_ready(true)` says more bytes
// show up within the key timeout.
//
// UTF-8 multi-byte characters are grouped the same way, so `é` is one key.

use keytty_term::{Result, Session};

const ESC: u8 = 0x1b;

/// Where key bytes come from. [`Session`] in the binary, a script in tests.
pub trait ByteSource {
    /// Block for the next byte.
    fn read_byte(&mut self) -> Result<u8>;

    /// Whether another byte is available, waiting up to the key timeout
    /// if `pending`.
    fn input_ready(&self, pending: bool) -> Result<bool>;
}

impl ByteSource for Session {
    fn read_byte(&mut self) -> Result<u8> {
        Self::read_byte(self)
    }

    fn input_ready(&self, pending: bool) -> Result<bool> {
        Self::input_ready(self, pending)
    }
}

/// Read one key's worth of bytes.
///
/// # Errors
///
/// Propagates read and poll failures from the source.
pub fn read_key(src: &mut impl ByteSource) -> Result<Vec<u8>> {
    let first = src.read_byte()?;
    let mut key = vec![first];

    match first {
        ESC => read_escape(src, &mut key)?,
        0xc0..=0xf7 => {
            let continuation = match first {
                0xc0..=0xdf => 1,
                0xe0..=0xef => 2,
                _ => 3,
            };
            for _ in 0..continuation {
                if !src.input_ready(true)? {
                    break;
                }
                key.push(src.read_byte()?);
            }
        }
        _ => {}
    }

    Ok(key)
}

fn read_escape(src: &mut impl ByteSource, key: &mut Vec<u8>) -> Result<()> {
    if !src.input_ready(true)? {
        return Ok(());
    }
    let intro = src.read_byte()?;
    key.push(intro);

    match intro {
        // CSI: parameters and intermediates, then one final byte.
        b'[' => {
            while src.input_ready(true)? {
                let b = src.read_byte()?;
                key.push(b);
                if (0x40..=0x7e).contains(&b) {
                    break;
                }
            }
        }
        // SS3: exactly one more byte.
        b'O' => {
            if src.input_ready(true)? {
                key.push(src.read_byte()?);
            }
        }
        // Anything else is Alt + that byte.
        _ => {}
    }
    Ok(())
}

/// A human-readable name for a key.
#[must_use]
pub fn describe(key: &[u8]) -> String {
    match key {
        [] => String::new(),
        [ESC] => "Esc".into(),
        [b'\r'] => "Enter".into(),
        [b'\t'] => "Tab".into(),
        [0x7f | 0x08] => "Backspace".into(),
        [0] => "Ctrl-Space".into(),
        [b' '] => "Space".into(),
        [b @ 0x01..=0x1f] => format!("Ctrl-{}", char::from(b + 0x40)),
        [b @ 0x21..=0x7e] => char::from(*b).to_string(),
        [ESC, b'[', rest @ ..] => csi_name(rest).unwrap_or("Unknown").to_owned(),
        [ESC, b'O', rest @ ..] => ss3_name(rest).unwrap_or("Unknown").to_owned(),
        [ESC, rest @ ..] => format!("Alt-{}", describe(rest)),
        _ => single_char(key).unwrap_or_else(|| "Unknown".into()),
    }
}

fn csi_name(rest: &[u8]) -> Option<&'static str> {
    Some(match rest {
        b"A" => "Up",
        b"B" => "Down",
        b"C" => "Right",
        b"D" => "Left",
        b"H" | b"1~" | b"7~" => "Home",
        b"F" | b"4~" | b"8~" => "End",
        b"2~" => "Insert",
        b"3~" => "Delete",
        b"5~" => "PageUp",
        b"6~" => "PageDown",
        b"Z" => "Shift-Tab",
        _ => return None,
    })
}

fn ss3_name(rest: &[u8]) -> Option<&'static str> {
    Some(match rest {
        b"A" => "Up",
        b"B" => "Down",
        b"C" => "Right",
        b"D" => "Left",
        b"H" => "Home",
        b"F" => "End",
        b"P" => "F1",
        b"Q" => "F2",
        b"R" => "F3",
        b"S" => "F4",
        _ => return None,
    })
}

/// The key as text, if it is exactly one UTF-8 character.
fn single_char(key: &[u8]) -> Option<String> {
    let s = std::str::from_utf8(key).ok()?;
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| c.to_string())
}

/// Bytes as space-separated lowercase hex: `1b 5b 41`.
#[must_use]
pub fn hex(key: &[u8]) -> String {
    key.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keys that end the session: `q`, Ctrl-C, Ctrl-D.
#[must_use]
pub fn is_quit(key: &[u8]) -> bool {
    matches!(key, [b'q' | 0x03 | 0x04])
}

// ─── Tests ───────────────────────────────────────────────────────────────────

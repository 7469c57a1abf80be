// SPDX-License-Identifier: MIT
//
// Error type for terminal sessions.
//
// Nothing in this crate exits the process. Every failure comes back as a
// `TtyError`, so the caller can put the terminal back into cooked mode
// before it reports the problem and quits.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtyError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read terminal mode: {0}")]
    GetMode(#[source] io::Error),

    #[error("failed to set terminal mode: {0}")]
    SetMode(#[source] io::Error),

    #[error("error reading from tty: {0}")]
    Read(#[source] io::Error),

    /// The device returned end-of-file: the other side hung up.
    #[error("tty closed")]
    Eof,

    #[error("failed to poll tty: {0}")]
    Poll(#[source] io::Error),

    #[error("failed to write to tty: {0}")]
    Write(#[source] io::Error),

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl TtyError {
    /// Whether the device went away (end-of-file or hang-up), as opposed
    /// to some other failure.
    #[must_use]
    pub fn is_hangup(&self) -> bool {
        match self {
            Self::Eof => true,
            Self::Read(e) => e.raw_os_error() == Some(libc::EIO),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TtyError>;

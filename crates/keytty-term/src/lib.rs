// SPDX-License-Identifier: MIT
//
// keytty-term — a raw-mode session over a terminal device.
//
// One `Session` owns a terminal for its whole life: it saves the line
// discipline, switches to raw mode, hands out single bytes (with an
// optional bounded wait so callers can tell a lone ESC from the start of
// an escape sequence), and writes ANSI sequences through a 4 KB block
// buffer that only reaches the device on an explicit flush.
//
// Nothing here parses keys or lays out text. That belongs to the
// application sitting on top.

#[cfg(not(unix))]
compile_error!("keytty-term drives termios and only builds on Unix");

pub mod ansi;
pub mod config;
pub mod error;
pub mod mode;
pub mod output;
pub mod poll;
pub mod session;
pub mod size;

#[cfg(all(test, target_os = "linux"))]
mod test_pty;

pub use config::TtyConfig;
pub use error::{Result, TtyError};
pub use mode::ModeFlags;
pub use output::{Color, Painter};
pub use session::Session;
pub use size::Size;

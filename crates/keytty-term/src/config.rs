// SPDX-License-Identifier: MIT
//
// Session configuration, loadable from TOML.
//
//   tty_path       = "/dev/tty"   # device to open
//   key_timeout_ms = 25           # bounded wait for pending input
//   output_buffer  = 4096         # block buffer size for writes
//   log_file       = "..."        # optional; used by the keytty binary
//
// Every field is optional in the file; missing ones take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TtyError};

/// The controlling terminal of the calling process.
pub const DEFAULT_TTY: &str = "/dev/tty";

/// How long [`Session::input_ready`](crate::Session::input_ready) waits
/// when input is pending. Long enough for the tail of an escape sequence
/// to arrive over a slow link, short enough that a lone Escape feels
/// instant.
pub const KEY_TIMEOUT_MS: u64 = 25;

/// Capacity of the output block buffer.
pub const OUTPUT_BUFFER: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtyConfig {
    /// Terminal device to open.
    pub tty_path: PathBuf,
    /// Bounded wait for `input_ready(true)`, in milliseconds.
    pub key_timeout_ms: u64,
    /// Output buffer capacity in bytes.
    pub output_buffer: usize,
    /// Where the binary writes its log, if anywhere.
    pub log_file: Option<PathBuf>,
}

impl Default for TtyConfig {
    fn default() -> Self {
        Self {
            tty_path: PathBuf::from(DEFAULT_TTY),
            key_timeout_ms: KEY_TIMEOUT_MS,
            output_buffer: OUTPUT_BUFFER,
            log_file: None,
        }
    }
}

impl TtyConfig {
    /// The key timeout as a [`Duration`].
    #[must_use]
    pub const fn key_timeout(&self) -> Duration {
        Duration::from_millis(self.key_timeout_ms)
    }

    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns [`TtyError::ConfigRead`] if the file cannot be read and
    /// [`TtyError::ConfigParse`] if it is not valid TOML for this struct.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| TtyError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| TtyError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given; otherwise the file at [`default_path`] if it
    /// exists; otherwise the defaults.
    ///
    /// An explicitly named file must exist. The default location is
    /// optional.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// `$HOME/.config/keytty/config.toml`, or `None` without a home directory.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("keytty")
            .join("config.toml")
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Write `text` to a uniquely named file under the temp dir.
    fn temp_config(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "keytty-config-{}-{name}.toml",
            std::process::id()
        ));
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = TtyConfig::default();
        assert_eq!(config.tty_path, PathBuf::from("/dev/tty"));
        assert_eq!(config.key_timeout(), Duration::from_millis(25));
        assert_eq!(config.output_buffer, 4096);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: TtyConfig = toml::from_str("").unwrap();
        assert_eq!(config, TtyConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: TtyConfig = toml::from_str("key_timeout_ms = 100").unwrap();
        assert_eq!(config.key_timeout_ms, 100);
        assert_eq!(config.tty_path, PathBuf::from(DEFAULT_TTY));
        assert_eq!(config.output_buffer, OUTPUT_BUFFER);
    }

    #[test]
    fn full_toml() {
        let config: TtyConfig = toml::from_str(
            r#"
            tty_path = "/dev/pts/7"
            key_timeout_ms = 10
            output_buffer = 8192
            log_file = "/tmp/keytty.log"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            TtyConfig {
                tty_path: PathBuf::from("/dev/pts/7"),
                key_timeout_ms: 10,
                output_buffer: 8192,
                log_file: Some(PathBuf::from("/tmp/keytty.log")),
            }
        );
    }

    #[test]
    fn load_from_file() {
        let path = temp_config("load", "output_buffer = 512\n");
        let config = TtyConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.output_buffer, 512);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let err = TtyConfig::load(Path::new("/nonexistent/keytty.toml")).unwrap_err();
        assert!(matches!(err, TtyError::ConfigRead { .. }), "{err}");
    }

    #[test]
    fn load_bad_type_is_parse_error() {
        let path = temp_config("bad", "key_timeout_ms = \"soon\"\n");
        let err = TtyConfig::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, TtyError::ConfigParse { .. }), "{err}");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        assert!(TtyConfig::load_or_default(Some(Path::new("/nonexistent/k.toml"))).is_err());
    }

    #[test]
    fn default_path_ends_in_config_toml() {
        if let Some(path) = default_path() {
            assert!(path.ends_with(".config/keytty/config.toml"));
        }
    }
}

// SPDX-License-Identifier: MIT
//
// keytty — a raw-mode key inspector.
//
// Opens the terminal through keytty-term, then shows the name and raw
// bytes of every key pressed, redrawing one line in place:
//
//   ┌──────────────────────────────────────────────┐
//   │ keytty · q, Ctrl-C or Ctrl-D quits (INVERSE) │  ← header
//   │ #12  Up  1b 5b 41                            │  ← last key
//   └──────────────────────────────────────────────┘
//
// On exit both lines are erased and the terminal is handed back exactly
// as it was. If anything fails, the session is closed first (restoring
// the line discipline) and only then is the error printed.

mod keys;

use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use keytty_term::{Color, Session, TtyConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthChar;

/// Version string from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter (`info`, `keytty=debug`, ...).
const LOG_ENV: &str = "KEYTTY_LOG";

const HEADER: &str = "keytty · press keys to inspect them · q, Ctrl-C or Ctrl-D quits";

// ─── Command line ───────────────────────────────────────────────────────────

/// Options from the command line. Each overrides the config file.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    tty: Option<PathBuf>,
    timeout_ms: Option<u64>,
    log: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Args),
    Help,
    Version,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-c" | "--config" => parsed.config = Some(value(&arg)?.into()),
            "-t" | "--tty" => parsed.tty = Some(value(&arg)?.into()),
            "-l" | "--log" => parsed.log = Some(value(&arg)?.into()),
            "-k" | "--timeout" => {
                let ms = value(&arg)?;
                parsed.timeout_ms = Some(
                    ms.parse()
                        .map_err(|_| format!("invalid timeout: {ms}"))?,
                );
            }
            other => return Err(format!("unknown option: {other}")),
        }
    }

    Ok(Command::Run(parsed))
}

fn print_help() {
    eprintln!("keytty {VERSION} - show what the terminal sends for each key");
    eprintln!();
    eprintln!("Usage: keytty [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --tty <PATH>      Terminal device (default: /dev/tty)");
    eprintln!("  -k, --timeout <MS>    Escape sequence timeout in ms (default: 25)");
    eprintln!("  -c, --config <PATH>   Config file (default: ~/.config/keytty/config.toml)");
    eprintln!("  -l, --log <PATH>      Append a log to PATH (filter via {LOG_ENV})");
    eprintln!("  -V, --version         Show version");
    eprintln!("  -h, --help            Show this help");
}

/// The config file, with command-line overrides applied.
fn load_config(args: &Args) -> Result<TtyConfig> {
    let mut config = TtyConfig::load_or_default(args.config.as_deref())?;
    if let Some(tty) = &args.tty {
        config.tty_path.clone_from(tty);
    }
    if let Some(ms) = args.timeout_ms {
        config.key_timeout_ms = ms;
    }
    if let Some(log) = &args.log {
        config.log_file = Some(log.clone());
    }
    Ok(config)
}

/// Send tracing output to `path`. Never to the terminal we are drawing on.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

// ─── Drawing ────────────────────────────────────────────────────────────────

/// The longest prefix of `text` that fits in `width` columns.
fn fit(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, c) in text.char_indices() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &text[..i];
        }
    }
    text
}

fn draw_header(tty: &mut Session) -> keytty_term::Result<()> {
    let header = fit(HEADER, usize::from(tty.width()));
    tty.set_no_wrap()?;
    tty.set_inverse()?;
    tty.write_str(header)?;
    tty.set_normal()?;
    tty.newline()?;
    tty.set_fg(Color::Cyan)?;
    tty.write_str("waiting for a key...")?;
    tty.set_normal()?;
    tty.flush()
}

fn draw_key(tty: &mut Session, count: u64, key: &[u8]) -> keytty_term::Result<()> {
    tty.set_column(0)?;
    tty.clear_line()?;
    write!(tty, "#{count}  ")?;
    tty.set_fg(Color::Green)?;
    tty.write_str(&keys::describe(key))?;
    tty.set_fg(Color::Default)?;
    tty.write_str("  ")?;
    tty.set_fg(Color::Yellow)?;
    tty.write_str(&keys::hex(key))?;
    tty.set_normal()?;
    tty.flush()
}

/// Erase both lines and put wrapping back.
fn erase(tty: &mut Session) -> keytty_term::Result<()> {
    tty.set_column(0)?;
    tty.clear_line()?;
    tty.move_up(1)?;
    tty.clear_line()?;
    tty.set_wrap()?;
    tty.set_normal()?;
    tty.flush()
}

// ─── Main loop ──────────────────────────────────────────────────────────────

fn run(tty: &mut Session) -> keytty_term::Result<u64> {
    draw_header(tty)?;

    let mut count = 0;
    loop {
        let key = keys::read_key(tty)?;
        if keys::is_quit(&key) {
            break;
        }
        count += 1;
        debug!(key = %keys::describe(&key), bytes = %keys::hex(&key), "key");
        draw_key(tty, count, &key)?;
    }

    erase(tty)?;
    Ok(count)
}

fn try_main(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    if let Some(log) = &config.log_file {
        init_logging(log)?;
    }
    info!(tty = %config.tty_path.display(), "keytty starting");

    let mut tty = Session::from_config(&config)?;
    let outcome = run(&mut tty);
    let closed = tty.close();

    let count = outcome?;
    closed?;
    info!(keys = count, "keytty exiting");
    Ok(())
}

fn main() {
    let args = match parse_args(env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return;
        }
        Ok(Command::Version) => {
            eprintln!("keytty {VERSION}");
            return;
        }
        Err(e) => {
            eprintln!("keytty: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    if let Err(e) = try_main(&args) {
        eprintln!("keytty: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(ToString::to_string))
    }

    // ── Arguments ─────────────────────────────────────────────────────────

    #[test]
    fn no_args_runs_with_defaults() {
        assert_eq!(parse(&[]), Ok(Command::Run(Args::default())));
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["-h"]), Ok(Command::Help));
        assert_eq!(parse(&["--version"]), Ok(Command::Version));
    }

    #[test]
    fn all_options() {
        let cmd = parse(&[
            "--tty", "/dev/pts/3", "-k", "40", "-c", "k.toml", "--log", "k.log",
        ]);
        assert_eq!(
            cmd,
            Ok(Command::Run(Args {
                config: Some("k.toml".into()),
                tty: Some("/dev/pts/3".into()),
                timeout_ms: Some(40),
                log: Some("k.log".into()),
            }))
        );
    }

    #[test]
    fn missing_value_is_an_error() {
        assert_eq!(parse(&["--tty"]), Err("--tty requires a value".into()));
    }

    #[test]
    fn bad_timeout_is_an_error() {
        assert_eq!(parse(&["-k", "soon"]), Err("invalid timeout: soon".into()));
    }

    #[test]
    fn unknown_option_is_an_error() {
        assert_eq!(parse(&["--frobnicate"]), Err("unknown option: --frobnicate".into()));
    }

    // ── Config overrides ──────────────────────────────────────────────────

    #[test]
    fn flags_override_config() {
        let args = Args {
            config: None,
            tty: Some("/dev/pts/9".into()),
            timeout_ms: Some(5),
            log: None,
        };
        // Only meaningful when no user config sits in $HOME.
        if keytty_term::config::default_path().is_some_and(|p| p.is_file()) {
            return;
        }
        let config = load_config(&args).unwrap();
        assert_eq!(config.tty_path, PathBuf::from("/dev/pts/9"));
        assert_eq!(config.key_timeout_ms, 5);
        assert_eq!(config.output_buffer, 4096);
    }

    #[test]
    fn missing_explicit_config_fails() {
        let args = Args {
            config: Some("/nonexistent/keytty.toml".into()),
            ..Args::default()
        };
        assert!(load_config(&args).is_err());
    }

    // ── Fitting ───────────────────────────────────────────────────────────

    #[test]
    fn fit_short_text_unchanged() {
        assert_eq!(fit("hello", 80), "hello");
    }

    #[test]
    fn fit_truncates_ascii() {
        assert_eq!(fit("hello", 3), "hel");
    }

    #[test]
    fn fit_counts_wide_chars_as_two() {
        assert_eq!(fit("日本語", 5), "日本");
    }

    #[test]
    fn fit_zero_width() {
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn header_fits_standard_terminal() {
        assert_eq!(fit(HEADER, 80), HEADER);
    }

    #[test]
    fn open_failure_reports_device() {
        let args = Args {
            tty: Some("/nonexistent/tty".into()),
            ..Args::default()
        };
        if keytty_term::config::default_path().is_some_and(|p| p.is_file()) {
            return;
        }
        let err = try_main(&args).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/tty"), "{err:#}");
    }
}

//! Logging setup for the binary using `tracing` and `tracing-subscriber`.
//!
//! Logs always go to stderr; stdout carries converted records only.
//! `RUST_LOG` overrides the level chosen on the command line.

use std::io;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
  /// Human-readable multi-field format.
  #[default]
  Pretty,
  /// Single-line format.
  Compact,
  /// JSON lines for machine parsing.
  Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
  pub level: Level,
  pub format: LogFormat,
  pub with_ansi: bool,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: Level::WARN,
      format: LogFormat::default(),
      with_ansi: false,
    }
  }
}

impl LogConfig {
  /// - 0: warn
  /// - 1 (`-v`): info
  /// - 2 (`-vv`): debug
  /// - 3+: trace
  pub fn from_verbosity(verbosity: u8) -> Self {
    let level = match verbosity {
      0 => Level::WARN,
      1 => Level::INFO,
      2 => Level::DEBUG,
      _ => Level::TRACE,
    };
    Self {
      level,
      ..Default::default()
    }
  }

  pub fn with_format(mut self, format: LogFormat) -> Self {
    self.format = format;
    self
  }
}

fn build_env_filter(level: Level) -> EnvFilter {
  EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}

/// Install the global subscriber. Call once at startup.
pub fn init(config: &LogConfig) {
  let filter = build_env_filter(config.level);
  let registry = tracing_subscriber::registry().with(filter);

  match config.format {
    LogFormat::Json => registry
      .with(fmt::layer().json().with_writer(io::stderr))
      .init(),
    LogFormat::Compact => registry
      .with(
        fmt::layer()
          .compact()
          .with_ansi(config.with_ansi)
          .with_writer(io::stderr),
      )
      .init(),
    LogFormat::Pretty => registry
      .with(
        fmt::layer()
          .with_ansi(config.with_ansi)
          .with_writer(io::stderr),
      )
      .init(),
  }
}

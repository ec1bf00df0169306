//! Command-line arguments for the converter binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use access_log_converter::logging::LogFormat;

#[derive(Parser)]
#[command(
  name = "access-log-converter",
  version,
  about = "Normalize JSON access-log lines read from stdin",
  long_about = "Reads one JSON access-log record per line from stdin and writes the converted\n\
                record to stdout. Failed records produce an error line and processing continues."
)]
pub struct Cli {
  /// JSON config file (falls back to $ACCESS_LOG_CONVERTER_CONFIG).
  #[arg(long, value_name = "PATH")]
  pub config: Option<PathBuf>,

  /// Apply a transformer to a field; repeatable, overrides the config file.
  #[arg(long = "transform", short = 't', value_name = "FIELD=KIND")]
  pub transforms: Vec<String>,

  /// Source identifier passed along with every record.
  #[arg(long, value_name = "NAME")]
  pub topic: Option<String>,

  /// Print the transformer catalog and exit.
  #[arg(long = "list-transformers")]
  pub list_transformers: bool,

  /// Increase log verbosity (-v info, -vv debug, -vvv trace).
  #[arg(short, long, action = ArgAction::Count)]
  pub verbose: u8,

  /// Log output format.
  #[arg(long = "log-format", value_enum, default_value = "compact")]
  pub log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
  Pretty,
  Compact,
  Json,
}

impl From<LogFormatArg> for LogFormat {
  fn from(arg: LogFormatArg) -> Self {
    match arg {
      LogFormatArg::Pretty => LogFormat::Pretty,
      LogFormatArg::Compact => LogFormat::Compact,
      LogFormatArg::Json => LogFormat::Json,
    }
  }
}

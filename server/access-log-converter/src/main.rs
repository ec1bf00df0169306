//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is one access-log record. Output lines are either:
//! - The converted record
//! - An ErrorOutput (when the record fails to convert)

mod cli;

use std::io::{self, Write};

use access_log_converter::logging::{self, LogConfig};
use access_log_converter::stream;
use access_log_converter::transformer::{TransformerKind, CATALOG_VERSION};
use access_log_converter::{AccessLogConverter, Config, Converter};
use clap::Parser;
use tracing::info;

use crate::cli::Cli;

fn main() {
  let cli = Cli::parse();
  logging::init(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format.into()));

  if cli.list_transformers {
    println!("transformer catalog v{}", CATALOG_VERSION);
    for kind in TransformerKind::all() {
      println!("  {:<12} {}", kind.name(), kind.description());
    }
    return;
  }

  let (converter, topic) = match build(&cli) {
    Ok(v) => v,
    Err(e) => {
      let _ = writeln!(io::stderr(), "access-log-converter: {}", e);
      std::process::exit(2);
    }
  };

  if let Err(e) = run(&converter, &topic) {
    let _ = writeln!(io::stderr(), "access-log-converter: {}", e);
    std::process::exit(1);
  }
}

fn build(cli: &Cli) -> Result<(AccessLogConverter, String), Box<dyn std::error::Error>> {
  let mut config = Config::load(cli.config.as_deref())?.with_pairs(&cli.transforms)?;
  if let Some(topic) = &cli.topic {
    config.topic = topic.clone();
  }
  let converter = AccessLogConverter::new(&config.transformers)?;
  info!(
    topic = %config.topic,
    transformers = converter.transformers().len(),
    "converter ready"
  );
  Ok((converter, config.topic))
}

fn run(converter: &impl Converter, topic: &str) -> io::Result<()> {
  let stdin = io::stdin();
  let stdout = io::stdout();
  stream::process(converter, topic, stdin.lock(), stdout.lock())?;
  Ok(())
}

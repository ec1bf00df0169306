//! JSON-lines driver: one record per input line, one output line per record.

use std::io::{self, BufRead, Write};

use tracing::{info, warn};

use crate::converter::Converter;
use crate::types::ErrorOutput;

/// Counts reported once the input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
  pub converted: u64,
  pub failed: u64,
}

/// Convert every non-blank line of `input`, writing either the converted record or an
/// `ErrorOutput` line to `output`. Lines are handled as raw bytes, so a line that is not
/// UTF-8 is rejected as invalid input instead of ending the stream.
pub fn process<R, W>(
  converter: &impl Converter,
  topic: &str,
  mut input: R,
  output: W,
) -> io::Result<Summary>
where
  R: BufRead,
  W: Write,
{
  let mut out = io::BufWriter::new(output);
  let mut summary = Summary::default();
  let mut buf = Vec::new();
  let mut line_no = 0usize;

  loop {
    buf.clear();
    if input.read_until(b'\n', &mut buf)? == 0 {
      break;
    }
    line_no += 1;

    // Skip blank lines.
    let line = buf.trim_ascii();
    if line.is_empty() {
      continue;
    }

    match converter.convert(line, topic) {
      Ok(record) => {
        out.write_all(&record)?;
        summary.converted += 1;
      }
      Err(e) => {
        warn!(line = line_no, kind = e.kind(), error = %e, "record rejected");
        serde_json::to_writer(&mut out, &ErrorOutput::from(&e))?;
        summary.failed += 1;
      }
    }
    writeln!(out)?;
  }

  out.flush()?;
  info!(
    converted = summary.converted,
    failed = summary.failed,
    "input exhausted"
  );
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::converter::AccessLogConverter;
  use serde_json::Value;

  fn run(input: &[u8]) -> (Summary, Vec<Value>) {
    let conv = AccessLogConverter::with_defaults();
    let mut output = Vec::new();
    let summary = process(&conv, "access_log", input, &mut output).unwrap();
    let lines = output
      .split(|&b| b == b'\n')
      .filter(|l| !l.is_empty())
      .map(|l| serde_json::from_slice(l).unwrap())
      .collect();
    (summary, lines)
  }

  #[test]
  fn non_utf8_line_does_not_stop_the_stream() {
    let input = b"{\"datetime\":\"2023-01-15T10:30:00Z\",\"u\":\"\xff\"}\n\
                  {\"datetime\":\"2023-01-15T10:30:00Z\"}\n";
    let (summary, lines) = run(input);
    assert_eq!(summary, Summary { converted: 1, failed: 1 });
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["error"], true);
    assert_eq!(lines[0]["kind"], "invalid_input");
    assert!(lines[1].get("date").is_some());
  }

  #[test]
  fn blank_lines_and_crlf_are_skipped() {
    let input = b"\n   \r\n{\"datetime\":\"2023-01-15T10:30:00Z\"}\r\n\n";
    let (summary, lines) = run(input);
    assert_eq!(summary, Summary { converted: 1, failed: 0 });
    assert_eq!(lines.len(), 1);
  }

  #[test]
  fn last_line_without_newline_is_converted() {
    let (summary, lines) = run(b"{\"level\":\"info\"}\n{\"datetime\":\"2023-01-15T10:30:00Z\"}");
    assert_eq!(summary, Summary { converted: 1, failed: 1 });
    assert_eq!(lines[0]["kind"], "missing_field");
  }
}

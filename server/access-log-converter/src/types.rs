//! JSON contract for the binary's output stream.

use serde::Serialize;

use crate::error::ConvertError;

/// Structured error output for records that failed to convert.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      kind: None,
    }
  }

  pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
    self.kind = Some(kind.into());
    self
  }
}

impl From<&ConvertError> for ErrorOutput {
  fn from(err: &ConvertError) -> Self {
    Self::new(err.to_string()).with_kind(err.kind())
  }
}

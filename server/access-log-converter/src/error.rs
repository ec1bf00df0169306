//! Structured error types for the converter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
  /// The record is not syntactically valid JSON.
  #[error("invalid json: {0}")]
  InvalidInput(#[source] serde_json::Error),

  /// The well-known datetime field is absent.
  #[error("unable to get datetime field: key `{field}` not found")]
  MissingField { field: String },

  /// No accepted datetime format matched. `reasons` holds one line per attempted format.
  #[error("unable to parse datetime field `{value}`:\n{reasons}")]
  DateTimeParse { value: String, reasons: String },

  #[error("unable to set {field} field: {reason}")]
  FieldWrite { field: String, reason: String },

  #[error("unable to create access_log converter: {0}")]
  Configuration(#[from] TransformerError),
}

impl ConvertError {
  pub fn missing_field(field: &str) -> Self {
    Self::MissingField {
      field: field.to_string(),
    }
  }

  pub fn datetime_parse(value: &str, reasons: impl Into<String>) -> Self {
    Self::DateTimeParse {
      value: value.to_string(),
      reasons: reasons.into(),
    }
  }

  pub fn field_write(field: &str, reason: impl ToString) -> Self {
    Self::FieldWrite {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  /// Short machine-readable name of the failing step.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InvalidInput(_) => "invalid_input",
      Self::MissingField { .. } => "missing_field",
      Self::DateTimeParse { .. } => "datetime_parse",
      Self::FieldWrite { .. } => "field_write",
      Self::Configuration(_) => "configuration",
    }
  }
}

/// Failure to resolve a transformer spec into an executable transformer.
#[derive(Debug, Error)]
pub enum TransformerError {
  #[error("field `{field}`: unknown transformer kind `{kind}`")]
  UnknownKind { field: String, kind: String },
}

//! Converter pipeline: validate, normalize datetime, run transformers.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::datetime::{self, DATETIME_FIELD, DATE_FIELD};
use crate::error::ConvertError;
use crate::record::Record;
use crate::transformer::{build_transformers, Transformer};

/// Converts one raw record into another. `topic` identifies the source stream
/// and is available to implementations that route on it.
pub trait Converter: Send + Sync {
  fn convert(&self, msg: &[u8], topic: &str) -> Result<Vec<u8>, ConvertError>;
}

/// Access-log converter. Immutable after construction; share it freely.
#[derive(Debug, Clone)]
pub struct AccessLogConverter {
  transformers: Box<[Transformer]>,
}

impl AccessLogConverter {
  /// Build from `field -> transformer kind` specs. Transformers run in ascending field order.
  pub fn new(specs: &BTreeMap<String, String>) -> Result<Self, ConvertError> {
    let transformers = build_transformers(specs)?;
    Ok(Self::from_transformers(transformers))
  }

  /// Build from already-resolved transformers; they run in the given order.
  pub fn from_transformers(transformers: Vec<Transformer>) -> Self {
    Self {
      transformers: transformers.into_boxed_slice(),
    }
  }

  pub fn with_defaults() -> Self {
    Self::from_transformers(Vec::new())
  }

  pub fn transformers(&self) -> &[Transformer] {
    &self.transformers
  }

  /// Rewrite `datetime` in local time and derive `date` from the same instant.
  fn normalize_datetime(&self, record: &mut Record) -> Result<(), ConvertError> {
    let raw = record
      .get_text(DATETIME_FIELD)
      .ok_or_else(|| ConvertError::missing_field(DATETIME_FIELD))?;
    let instant = datetime::parse(&raw)?;
    let (local_datetime, local_date) = datetime::render_local(&instant);
    debug!(from = %raw, to = %local_datetime, "normalized datetime");

    record.set(DATETIME_FIELD, Value::String(local_datetime))?;
    record.set_after(DATETIME_FIELD, DATE_FIELD, Value::String(local_date))?;
    Ok(())
  }

  fn transform(&self, record: &mut Record) -> Result<(), ConvertError> {
    for tr in self.transformers.iter() {
      let value = match record.get_text(tr.field()) {
        Some(v) => v,
        None => {
          trace!(field = tr.field(), transformer = tr.name(), "field absent, skipped");
          continue;
        }
      };
      record.set_encoded(tr.field(), &tr.apply(&value))?;
      debug!(field = tr.field(), transformer = tr.name(), "field transformed");
    }
    Ok(())
  }
}

impl Default for AccessLogConverter {
  fn default() -> Self {
    Self::with_defaults()
  }
}

impl Converter for AccessLogConverter {
  fn convert(&self, msg: &[u8], _topic: &str) -> Result<Vec<u8>, ConvertError> {
    let mut record = Record::from_slice(msg)?;
    self.normalize_datetime(&mut record)?;
    self.transform(&mut record)?;
    record.to_vec()
  }
}

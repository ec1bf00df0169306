//! A single JSON record held in memory while it is being converted.
//!
//! Key order and number text of untouched fields survive the round trip
//! (`serde_json` is built with `preserve_order` and `arbitrary_precision`).
//! Nesting depth is unbounded: `serde_stacker` grows the stack on demand.
//! A key repeated at the same level keeps its last value.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConvertError;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  root: Value,
}

impl Record {
  /// Validate and parse raw bytes. Any valid JSON document is accepted here;
  /// a non-object root simply has no fields.
  pub fn from_slice(msg: &[u8]) -> Result<Self, ConvertError> {
    let mut de = serde_json::Deserializer::from_slice(msg);
    de.disable_recursion_limit();
    let root = Value::deserialize(serde_stacker::Deserializer::new(&mut de))
      .map_err(ConvertError::InvalidInput)?;
    de.end().map_err(ConvertError::InvalidInput)?;
    Ok(Self { root })
  }

  /// Text of a top-level field: strings unescaped, anything else as compact JSON.
  /// `None` when the field is absent.
  pub fn get_text(&self, field: &str) -> Option<String> {
    self.fields()?.get(field).map(|v| match v {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    })
  }

  /// Overwrite (or create) `field` with an already-encoded JSON value.
  pub fn set_encoded(&mut self, field: &str, encoded: &[u8]) -> Result<(), ConvertError> {
    let value: Value =
      serde_json::from_slice(encoded).map_err(|e| ConvertError::field_write(field, e))?;
    self.set(field, value)
  }

  /// Overwrite (or create) `field`. New keys go to the end of the object.
  pub fn set(&mut self, field: &str, value: Value) -> Result<(), ConvertError> {
    let fields = self.fields_mut(field)?;
    fields.insert(field.to_string(), value);
    Ok(())
  }

  /// Overwrite `field` in place, or create it directly after `anchor`
  /// (at the end when `anchor` is absent too).
  pub fn set_after(&mut self, anchor: &str, field: &str, value: Value) -> Result<(), ConvertError> {
    let fields = self.fields_mut(field)?;
    if fields.contains_key(field) || !fields.contains_key(anchor) {
      fields.insert(field.to_string(), value);
      return Ok(());
    }

    let old = std::mem::take(fields);
    let mut pending = Some(value);
    for (key, v) in old {
      let is_anchor = key == anchor;
      fields.insert(key, v);
      if is_anchor {
        if let Some(value) = pending.take() {
          fields.insert(field.to_string(), value);
        }
      }
    }
    Ok(())
  }

  /// Compact encoding of the record.
  pub fn to_vec(&self) -> Result<Vec<u8>, ConvertError> {
    serde_json::to_vec(&self.root).map_err(|e| ConvertError::field_write("record", e))
  }

  fn fields(&self) -> Option<&Map<String, Value>> {
    self.root.as_object()
  }

  fn fields_mut(&mut self, field: &str) -> Result<&mut Map<String, Value>, ConvertError> {
    self
      .root
      .as_object_mut()
      .ok_or_else(|| ConvertError::field_write(field, "record is not a JSON object"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn record(raw: &str) -> Record {
    Record::from_slice(raw.as_bytes()).unwrap()
  }

  #[test]
  fn invalid_json_is_rejected() {
    let err = Record::from_slice(br#"{"datetime": "#).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidInput(_)));
    let err = Record::from_slice(br#"{"a":1} trailing"#).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidInput(_)));
  }

  #[test]
  fn deep_nesting_is_valid_json() {
    let depth = 300;
    let raw = format!(
      r#"{{"datetime":"2023-01-15T10:30:00Z","x":{}{}}}"#,
      "[".repeat(depth),
      "]".repeat(depth)
    );
    let r = record(&raw);
    let text = r.get_text("x").unwrap();
    assert_eq!(text.len(), depth * 2);
    assert_eq!(String::from_utf8(r.to_vec().unwrap()).unwrap(), raw);
  }

  #[test]
  fn duplicate_keys_keep_the_last_value() {
    let r = record(r#"{"datetime":"bad","level":"info","datetime":"2023-01-15T10:30:00Z"}"#);
    assert_eq!(r.get_text("datetime").as_deref(), Some("2023-01-15T10:30:00Z"));
    assert_eq!(
      String::from_utf8(r.to_vec().unwrap()).unwrap(),
      r#"{"datetime":"2023-01-15T10:30:00Z","level":"info"}"#
    );
  }

  #[test]
  fn get_text_reads_strings_and_scalars() {
    let r = record(r#"{"s":"a\"b","n":200,"f":1.50,"b":true,"z":null,"o":{"k":[1, 2]}}"#);
    assert_eq!(r.get_text("s").as_deref(), Some("a\"b"));
    assert_eq!(r.get_text("n").as_deref(), Some("200"));
    assert_eq!(r.get_text("f").as_deref(), Some("1.50"));
    assert_eq!(r.get_text("b").as_deref(), Some("true"));
    assert_eq!(r.get_text("z").as_deref(), Some("null"));
    assert_eq!(r.get_text("o").as_deref(), Some(r#"{"k":[1,2]}"#));
    assert_eq!(r.get_text("missing"), None);
  }

  #[test]
  fn non_object_root_has_no_fields() {
    let mut r = record("[1,2,3]");
    assert_eq!(r.get_text("datetime"), None);
    let err = r.set("date", json!("x")).unwrap_err();
    assert!(matches!(err, ConvertError::FieldWrite { .. }));
  }

  #[test]
  fn set_keeps_key_order_and_number_text() {
    let mut r = record(r#"{"a":1.0,"b":"x","c":12345678901234567890123}"#);
    r.set("b", json!("y")).unwrap();
    assert_eq!(
      String::from_utf8(r.to_vec().unwrap()).unwrap(),
      r#"{"a":1.0,"b":"y","c":12345678901234567890123}"#
    );
  }

  #[test]
  fn set_encoded_rejects_invalid_json() {
    let mut r = record(r#"{"a":"x"}"#);
    let err = r.set_encoded("a", b"not json").unwrap_err();
    assert!(err.to_string().starts_with("unable to set a field"));
    r.set_encoded("a", b"\"ok\"").unwrap();
    assert_eq!(r.get_text("a").as_deref(), Some("ok"));
  }

  #[test]
  fn set_after_inserts_next_to_anchor() {
    let mut r = record(r#"{"datetime":"t","level":"info"}"#);
    r.set_after("datetime", "date", json!("d")).unwrap();
    assert_eq!(
      String::from_utf8(r.to_vec().unwrap()).unwrap(),
      r#"{"datetime":"t","date":"d","level":"info"}"#
    );
  }

  #[test]
  fn set_after_overwrites_existing_in_place() {
    let mut r = record(r#"{"date":"old","datetime":"t","level":"info"}"#);
    r.set_after("datetime", "date", json!("new")).unwrap();
    assert_eq!(
      String::from_utf8(r.to_vec().unwrap()).unwrap(),
      r#"{"date":"new","datetime":"t","level":"info"}"#
    );
  }
}

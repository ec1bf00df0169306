//! Per-field transformers: the built-in catalog and the resolved `Transformer` value.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use serde_json::Value;

use crate::error::TransformerError;

/// Bumped whenever a kind is added, removed or changes behaviour.
pub const CATALOG_VERSION: u32 = 1;

/// Replacement written by the `redact` kind.
pub const REDACTED: &str = "REDACTED";

/// Maps a field's current text to a new encoded JSON value.
pub type TransformFn = Arc<dyn Fn(&str) -> Vec<u8> + Send + Sync>;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformerKind {
  Redact,
  Hash,
  MaskIp,
  StripQuery,
  Lowercase,
  Trim,
  ToInt,
}

impl TransformerKind {
  pub fn all() -> &'static [Self] {
    &[
      Self::Redact,
      Self::Hash,
      Self::MaskIp,
      Self::StripQuery,
      Self::Lowercase,
      Self::Trim,
      Self::ToInt,
    ]
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::all().iter().copied().find(|k| k.name() == name)
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Redact => "redact",
      Self::Hash => "hash",
      Self::MaskIp => "mask_ip",
      Self::StripQuery => "strip_query",
      Self::Lowercase => "lowercase",
      Self::Trim => "trim",
      Self::ToInt => "to_int",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Self::Redact => "replace the value with \"REDACTED\"",
      Self::Hash => "blake3 digest of the value (32 hex chars)",
      Self::MaskIp => "zero the host part of an IP address (IPv4 /24, IPv6 /48)",
      Self::StripQuery => "drop the query string and fragment of a URL",
      Self::Lowercase => "ASCII-lowercase the value",
      Self::Trim => "trim surrounding whitespace",
      Self::ToInt => "parse a decimal integer, null when unparseable",
    }
  }

  /// Apply this kind to a field value, returning the encoded replacement.
  pub fn apply(self, value: &str) -> Vec<u8> {
    match self {
      Self::Redact => encode_str(REDACTED),
      Self::Hash => {
        let hex = blake3::hash(value.as_bytes()).to_hex();
        encode_str(&hex[..32])
      }
      Self::MaskIp => encode_str(&mask_ip(value)),
      Self::StripQuery => encode_str(strip_query(value)),
      Self::Lowercase => encode_str(&value.to_ascii_lowercase()),
      Self::Trim => encode_str(value.trim()),
      Self::ToInt => match value.trim().parse::<i64>() {
        Ok(n) => Value::from(n).to_string().into_bytes(),
        Err(_) => b"null".to_vec(),
      },
    }
  }
}

fn encode_str(s: &str) -> Vec<u8> {
  Value::String(s.to_string()).to_string().into_bytes()
}

/// Mask an address (optionally with a port). Text that is not an address is returned as is.
fn mask_ip(value: &str) -> String {
  if let Ok(ip) = value.parse::<IpAddr>() {
    return mask_addr(ip).to_string();
  }
  if let Ok(sock) = value.parse::<SocketAddr>() {
    return SocketAddr::new(mask_addr(sock.ip()), sock.port()).to_string();
  }
  value.to_string()
}

fn mask_addr(ip: IpAddr) -> IpAddr {
  match ip {
    IpAddr::V4(v4) => {
      let [a, b, c, _] = v4.octets();
      IpAddr::V4(Ipv4Addr::new(a, b, c, 0))
    }
    IpAddr::V6(v6) => {
      let s = v6.segments();
      IpAddr::V6(Ipv6Addr::new(s[0], s[1], s[2], 0, 0, 0, 0, 0))
    }
  }
}

fn strip_query(value: &str) -> &str {
  match value.find(['?', '#']) {
    Some(idx) => &value[..idx],
    None => value,
  }
}

// ---------------------------------------------------------------------------
// Resolved transformer
// ---------------------------------------------------------------------------

/// One field paired with the function that rewrites it.
#[derive(Clone)]
pub struct Transformer {
  field: String,
  name: String,
  apply: TransformFn,
}

impl Transformer {
  /// A transformer backed by a caller-supplied function.
  pub fn new<F>(field: impl Into<String>, name: impl Into<String>, f: F) -> Self
  where
    F: Fn(&str) -> Vec<u8> + Send + Sync + 'static,
  {
    Self {
      field: field.into(),
      name: name.into(),
      apply: Arc::new(f),
    }
  }

  pub fn builtin(field: impl Into<String>, kind: TransformerKind) -> Self {
    Self::new(field, kind.name(), move |v: &str| kind.apply(v))
  }

  pub fn field(&self) -> &str {
    &self.field
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn apply(&self, value: &str) -> Vec<u8> {
    (self.apply)(value)
  }
}

impl fmt::Debug for Transformer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Transformer")
      .field("field", &self.field)
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

/// Resolve `field -> kind name` specs against the catalog, in ascending field order.
pub fn build_transformers(
  specs: &BTreeMap<String, String>,
) -> Result<Vec<Transformer>, TransformerError> {
  specs
    .iter()
    .map(|(field, kind)| {
      TransformerKind::from_name(kind)
        .map(|k| Transformer::builtin(field.clone(), k))
        .ok_or_else(|| TransformerError::UnknownKind {
          field: field.clone(),
          kind: kind.clone(),
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn apply(kind: TransformerKind, value: &str) -> String {
    String::from_utf8(kind.apply(value)).unwrap()
  }

  #[test]
  fn names_round_trip_through_catalog() {
    for &kind in TransformerKind::all() {
      assert_eq!(TransformerKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(TransformerKind::from_name("Redact"), None);
    assert_eq!(TransformerKind::from_name("unknown"), None);
  }

  #[test]
  fn redact_ignores_input() {
    assert_eq!(apply(TransformerKind::Redact, "alice"), r#""REDACTED""#);
  }

  #[test]
  fn hash_is_stable_32_hex() {
    let a = apply(TransformerKind::Hash, "alice");
    assert_eq!(a, apply(TransformerKind::Hash, "alice"));
    assert_ne!(a, apply(TransformerKind::Hash, "bob"));
    let inner = a.trim_matches('"');
    assert_eq!(inner.len(), 32);
    assert!(inner.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn mask_ip_variants() {
    assert_eq!(mask_ip("192.168.10.77"), "192.168.10.0");
    assert_eq!(mask_ip("2001:db8:85a3:8d3:1319:8a2e:370:7348"), "2001:db8:85a3::");
    assert_eq!(mask_ip("10.1.2.3:8080"), "10.1.2.0:8080");
    assert_eq!(mask_ip("unknown"), "unknown");
  }

  #[test]
  fn strip_query_drops_query_and_fragment() {
    assert_eq!(strip_query("/api/users?token=abc"), "/api/users");
    assert_eq!(strip_query("https://x.io/p#frag"), "https://x.io/p");
    assert_eq!(strip_query("/plain"), "/plain");
  }

  #[test]
  fn string_output_is_escaped() {
    assert_eq!(apply(TransformerKind::Trim, "  say \"hi\"  "), r#""say \"hi\"""#);
    assert_eq!(apply(TransformerKind::Lowercase, "GET"), r#""get""#);
  }

  #[test]
  fn to_int_emits_number_or_null() {
    assert_eq!(apply(TransformerKind::ToInt, " 404 "), "404");
    assert_eq!(apply(TransformerKind::ToInt, "-"), "null");
  }

  #[test]
  fn build_resolves_in_field_order() {
    let specs: BTreeMap<String, String> = [
      ("user_agent".to_string(), "lowercase".to_string()),
      ("client_ip".to_string(), "mask_ip".to_string()),
    ]
    .into_iter()
    .collect();
    let built = build_transformers(&specs).unwrap();
    let fields: Vec<_> = built.iter().map(|t| (t.field(), t.name())).collect();
    assert_eq!(fields, vec![("client_ip", "mask_ip"), ("user_agent", "lowercase")]);
  }

  #[test]
  fn build_rejects_unknown_kind() {
    let specs: BTreeMap<String, String> =
      [("ip".to_string(), "scramble".to_string())].into_iter().collect();
    let err = build_transformers(&specs).unwrap_err();
    assert!(err.to_string().contains("scramble"));
  }

  #[test]
  fn custom_transformer_is_invoked() {
    let t = Transformer::new("path", "shout", |v: &str| {
      format!("\"{}\"", v.to_ascii_uppercase()).into_bytes()
    });
    assert_eq!(t.apply("abc"), b"\"ABC\"".to_vec());
    assert!(format!("{:?}", t).contains("shout"));
  }
}

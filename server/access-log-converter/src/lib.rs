//! Access Log Converter — per-record normalization of JSON access logs.
//!
//! Validates one JSON object, rewrites its `datetime` field in local time,
//! derives the `date` field from the same instant, then runs the configured
//! per-field transformers over whichever of their fields are present.
//!
//! No batching, no I/O in the core; one synchronous call per record.

pub mod config;
pub mod converter;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod record;
pub mod stream;
pub mod transformer;
pub mod types;

pub use config::Config;
pub use converter::{AccessLogConverter, Converter};
pub use error::{ConvertError, TransformerError};
pub use transformer::{Transformer, TransformerKind};

//! Transformation hook
//!
//! A hook turns a [`Record`] into the document that gets stored, or skips
//! the line. Hooks run inline on the read path, once per line and in line
//! order, so they should be cheap: a slow hook slows reading directly.
//!
//! Any `Fn(&Record) -> Result<Outcome, TransformError>` closure is a hook:
//!
//! ```
//! use lineload::record::Record;
//! use lineload::transform::{Outcome, Transform, TransformError};
//! use serde_json::json;
//!
//! let hook = |record: &Record| -> Result<Outcome, TransformError> {
//!     if record.text.starts_with('#') {
//!         return Ok(Outcome::Skipped);
//!     }
//!     Ok(Outcome::Accepted(json!({ "_id": record.record_id, "line": record.text })))
//! };
//!
//! let comment = Record::build("f", 1, "# header".to_string());
//! assert_eq!(hook.transform(&comment).unwrap(), Outcome::Skipped);
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::Record;

/// Field the built-in hooks use for the document id
pub const ID_FIELD: &str = "_id";

/// Hook result for one record
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Store this document
    Accepted(Value),
    /// Consume the line without writing anything
    Skipped,
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("line is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("{0}")]
    Other(String),
}

impl TransformError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Record-to-document conversion applied to every line
pub trait Transform: Send + Sync {
    fn transform(&self, record: &Record) -> Result<Outcome, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(&Record) -> Result<Outcome, TransformError> + Send + Sync,
{
    fn transform(&self, record: &Record) -> Result<Outcome, TransformError> {
        self(record)
    }
}

/// Stores every line as `{_id, text, filename, lineNumber}`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTransform;

impl Transform for TextTransform {
    fn transform(&self, record: &Record) -> Result<Outcome, TransformError> {
        let mut doc = Map::new();
        doc.insert(ID_FIELD.to_string(), Value::String(record.record_id.clone()));
        doc.insert("text".to_string(), Value::String(record.text.clone()));
        doc.insert("filename".to_string(), Value::String(record.filename.clone()));
        doc.insert("lineNumber".to_string(), Value::from(record.line_number));
        Ok(Outcome::Accepted(Value::Object(doc)))
    }
}

/// Treats each line as a JSON object (JSON Lines input)
///
/// Blank lines are skipped. An object without `_id` gets the record id.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransform;

impl Transform for JsonTransform {
    fn transform(&self, record: &Record) -> Result<Outcome, TransformError> {
        if record.text.trim().is_empty() {
            return Ok(Outcome::Skipped);
        }

        match serde_json::from_str::<Value>(&record.text)? {
            Value::Object(mut doc) => {
                doc.entry(ID_FIELD)
                    .or_insert_with(|| Value::String(record.record_id.clone()));
                Ok(Outcome::Accepted(Value::Object(doc)))
            },
            other => Err(TransformError::NotAnObject(json_kind(&other))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

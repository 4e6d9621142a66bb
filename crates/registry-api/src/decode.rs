//! Strict JSON body decoding.
//!
//! [`decode_strict`] is a pure function from raw bytes to a typed value. It
//! enforces a size cap, exactly one JSON value per body, and (through
//! `#[serde(deny_unknown_fields)]` on the target) no unknown keys. Each fault
//! maps to its own [`DecodeError`] variant so handlers can report precisely
//! what was wrong with the body.

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

/// Default cap on request bodies, 1 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 1_048_576;

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("body must not be larger than {limit} bytes")]
  PayloadTooLarge { limit: usize },

  #[error("body contains badly-formed JSON (at character {offset})")]
  BadSyntax { offset: usize },

  #[error("body contains badly-formed JSON")]
  UnexpectedEnd,

  #[error("body contains incorrect JSON type {}", mismatch_location(.field, .offset))]
  TypeMismatch { field: Option<String>, offset: usize },

  #[error("body contains unknown key {field:?}")]
  UnknownField { field: String },

  #[error("body must only contain a single JSON value")]
  MultipleValues,

  /// The body stream failed before it was fully read.
  #[error("body could not be read")]
  Unreadable(#[source] axum::extract::rejection::BytesRejection),

  #[error(transparent)]
  Other(serde_json::Error),
}

fn mismatch_location(field: &Option<String>, offset: &usize) -> String {
  match field {
    Some(name) => format!("for field {name:?}"),
    None => format!("(at character {offset})"),
  }
}

/// Decode exactly one JSON value of type `T` from `body`.
///
/// Bodies longer than `limit` bytes are rejected before parsing. Trailing
/// whitespace is allowed; any other trailing data is
/// [`DecodeError::MultipleValues`].
pub fn decode_strict<T>(body: &[u8], limit: usize) -> Result<T, DecodeError>
where
  T: DeserializeOwned,
{
  if body.len() > limit {
    return Err(DecodeError::PayloadTooLarge { limit });
  }

  let mut de = serde_json::Deserializer::from_slice(body);
  let value: T = serde_path_to_error::deserialize(&mut de)
    .map_err(|e| classify(body, e))?;

  de.end().map_err(|_| DecodeError::MultipleValues)?;
  Ok(value)
}

fn classify(
  body: &[u8],
  err: serde_path_to_error::Error<serde_json::Error>,
) -> DecodeError {
  // The root path renders as ".", which names no field.
  let path = err.path().to_string();
  let field = (path != ".").then_some(path);
  let inner = err.into_inner();

  match inner.classify() {
    Category::Eof => DecodeError::UnexpectedEnd,
    Category::Syntax => DecodeError::BadSyntax {
      offset: byte_offset(body, inner.line(), inner.column()),
    },
    Category::Data => {
      let message = inner.to_string();
      if let Some(name) = unknown_field_name(&message) {
        DecodeError::UnknownField { field: name.to_owned() }
      } else if message.starts_with("invalid type")
        || message.starts_with("invalid value")
        || message.starts_with("invalid length")
        || message.starts_with("unknown variant")
      {
        DecodeError::TypeMismatch {
          field,
          offset: byte_offset(body, inner.line(), inner.column()),
        }
      } else {
        DecodeError::Other(inner)
      }
    }
    Category::Io => DecodeError::Other(inner),
  }
}

/// Pull `foo` out of serde's "unknown field `foo`, expected ..." message. The
/// key itself may contain backticks.
fn unknown_field_name(message: &str) -> Option<&str> {
  let rest = message.strip_prefix("unknown field `")?;
  let end = rest
    .rfind("`, expected")
    .or_else(|| rest.rfind("`, there are no fields"))?;
  Some(&rest[..end])
}

/// Convert serde_json's 1-based line / column position into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
  let line_start: usize = body
    .split_inclusive(|&b| b == b'\n')
    .take(line.saturating_sub(1))
    .map(<[u8]>::len)
    .sum();
  (line_start + column).min(body.len())
}

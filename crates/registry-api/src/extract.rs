//! [`StrictJson`] — an axum extractor running [`decode_strict`] over the
//! request body.

use axum::{
  body::Bytes,
  extract::{
    FromRef, FromRequest, Request,
    rejection::{BytesRejection, FailedToBufferBody},
  },
};
use serde::de::DeserializeOwned;

use crate::{
  decode::{DecodeError, decode_strict},
  error::ApiError,
};

/// Maximum accepted body size in bytes, pulled from router state.
///
/// The router also installs `DefaultBodyLimit::max` with the same value so
/// the body stream is cut off at the cap.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub usize);

/// Like `axum::Json`, but rejects unknown keys, trailing values and bodies
/// over the configured [`BodyLimit`] with a specific [`DecodeError`].
#[derive(Debug)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
  BodyLimit: FromRef<S>,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let BodyLimit(limit) = BodyLimit::from_ref(state);

    let body = Bytes::from_request(req, state)
      .await
      .map_err(|rejection| read_failure(rejection, limit))?;

    Ok(StrictJson(decode_strict(&body, limit)?))
  }
}

/// Only a tripped length limit means the body was too large; any other
/// buffering failure (client abort, stream error) is reported as such.
fn read_failure(rejection: BytesRejection, limit: usize) -> DecodeError {
  match rejection {
    BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
      DecodeError::PayloadTooLarge { limit }
    }
    other => DecodeError::Unreadable(other),
  }
}

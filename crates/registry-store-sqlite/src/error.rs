//! Error type for `registry-store-sqlite`.
//!
//! Messages name the failed operation only. The driver error is kept as the
//! [`source`](std::error::Error::source) so it reaches logs but not callers.

use registry_core::{StoreError, StoreErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to open record store")]
  Open(#[source] tokio_rusqlite::Error),

  #[error("failed to insert record")]
  Insert(#[source] tokio_rusqlite::Error),

  #[error("failed to update record")]
  Update(#[source] tokio_rusqlite::Error),

  #[error("failed to delete record")]
  Delete(#[source] tokio_rusqlite::Error),

  #[error("failed to query records")]
  Query(#[source] tokio_rusqlite::Error),

  #[error("record {0} not found")]
  NotFound(i64),

  #[error("unknown record status: {0:?}")]
  UnknownStatus(String),
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::Insert(_) => StoreErrorKind::Insert,
      Error::Update(_) => StoreErrorKind::Update,
      Error::Delete(_) => StoreErrorKind::Delete,
      Error::NotFound(_) => StoreErrorKind::NotFound,
      Error::Open(_) | Error::Query(_) | Error::UnknownStatus(_) => {
        StoreErrorKind::Query
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Store failure taxonomy shared by every backend.

/// The failure classes a [`RecordStore`](crate::store::RecordStore) backend
/// reports. Callers branch on these, never on backend error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// The id has no row.
  NotFound,
  Insert,
  Update,
  Delete,
  Query,
}

/// Implemented by backend error types so higher layers can tell an absent
/// record apart from an opaque storage fault.
pub trait StoreError: std::error::Error {
  fn kind(&self) -> StoreErrorKind;

  fn is_not_found(&self) -> bool { self.kind() == StoreErrorKind::NotFound }
}

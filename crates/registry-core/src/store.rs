//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `registry-store-sqlite`). The API
//! layer depends on this abstraction and receives a concrete store at
//! construction time.

use std::future::Future;

use crate::{
  error::StoreError,
  record::{NewRecord, Record},
};

/// Abstraction over a record store backend.
///
/// Every operation is a single atomic statement against the backing store.
/// There is no cross-operation transaction and no optimistic concurrency
/// check: concurrent updates to one id are last-writer-wins.
pub trait RecordStore: Send + Sync {
  type Error: StoreError + Send + Sync + 'static;

  /// Insert a record. The store assigns `id` and the initial
  /// [`Active`](crate::record::RecordStatus::Active) status.
  fn create(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Replace every field except `id` and `status` of the row with
  /// `record.id`, returning the updated row.
  ///
  /// Fails with a `NotFound` kind if no row has that id.
  fn update(
    &self,
    record: Record,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Mark a record deleted and return it. Deleting an already-deleted record
  /// succeeds and returns it unchanged.
  fn soft_delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// All active records in store order. Empty when there are none.
  fn list_active(
    &self,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Fetch a record by id whatever its status.
  fn get_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;
}

//! Record types — a person/property registration and its lifecycle status.
//!
//! Records are never physically removed. Deletion flips the status to
//! [`RecordStatus::Deleted`], which hides the record from listings but keeps
//! it reachable by id.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a record. The serialised names are shared by the wire
/// format and the `status` column.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum RecordStatus {
  #[default]
  #[serde(rename = "ACTIVE_STATUS")]
  Active,
  #[serde(rename = "DELETED_STATUS")]
  Deleted,
}

impl RecordStatus {
  pub const ALL: [RecordStatus; 2] = [Self::Active, Self::Deleted];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "ACTIVE_STATUS",
      Self::Deleted => "DELETED_STATUS",
    }
  }

  pub fn is_active(self) -> bool { matches!(self, Self::Active) }

  /// The transition table. `Deleted` is terminal; re-deleting is allowed so
  /// soft delete stays idempotent. Storage backends enforce this table.
  pub fn can_transition_to(self, next: RecordStatus) -> bool {
    match (self, next) {
      (Self::Active, Self::Deleted) => true,
      (Self::Deleted, Self::Deleted) => true,
      (Self::Active, Self::Active) => true,
      (Self::Deleted, Self::Active) => false,
    }
  }

  /// Every `(from, to)` pair the table forbids.
  pub fn forbidden_transitions() -> impl Iterator<Item = (RecordStatus, RecordStatus)> {
    Self::ALL.into_iter().flat_map(|from| {
      Self::ALL
        .into_iter()
        .filter(move |&to| !from.can_transition_to(to))
        .map(move |to| (from, to))
    })
  }
}

impl fmt::Display for RecordStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::create`]. Carries no `id` and no
/// `status`; both are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRecord {
  pub name:        String,
  pub surname:     String,
  #[serde(rename = "middlename")]
  pub middle_name: String,
  /// 12-digit individual identification number.
  pub iin:         String,
  /// House number.
  pub dom:         i64,
  /// Apartment number.
  pub kv:          i64,
  pub city:        String,
  pub street:      String,
  pub cadastr_num: String,
  /// Square units.
  pub area:        f64,
  #[serde(rename = "lat")]
  pub latitude:    f64,
  #[serde(rename = "long")]
  pub longitude:   f64,
  pub comment:     String,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted registration.
///
/// Also the body of an update request: `status` may be sent back unchanged
/// but is ignored, since only soft delete moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
  /// Store-assigned; immutable once set.
  pub id:          i64,
  pub name:        String,
  pub surname:     String,
  #[serde(rename = "middlename")]
  pub middle_name: String,
  pub iin:         String,
  pub dom:         i64,
  pub kv:          i64,
  pub city:        String,
  pub street:      String,
  pub cadastr_num: String,
  pub area:        f64,
  #[serde(rename = "lat")]
  pub latitude:    f64,
  #[serde(rename = "long")]
  pub longitude:   f64,
  pub comment:     String,
  #[serde(default)]
  pub status:      RecordStatus,
}

impl Record {
  /// Assemble a record from its replaceable fields.
  pub fn from_parts(id: i64, fields: NewRecord, status: RecordStatus) -> Self {
    Self {
      id,
      name: fields.name,
      surname: fields.surname,
      middle_name: fields.middle_name,
      iin: fields.iin,
      dom: fields.dom,
      kv: fields.kv,
      city: fields.city,
      street: fields.street,
      cadastr_num: fields.cadastr_num,
      area: fields.area,
      latitude: fields.latitude,
      longitude: fields.longitude,
      comment: fields.comment,
      status,
    }
  }

  /// Every field an update may replace, i.e. all but `id` and `status`.
  pub fn fields(&self) -> NewRecord {
    NewRecord {
      name:        self.name.clone(),
      surname:     self.surname.clone(),
      middle_name: self.middle_name.clone(),
      iin:         self.iin.clone(),
      dom:         self.dom,
      kv:          self.kv,
      city:        self.city.clone(),
      street:      self.street.clone(),
      cadastr_num: self.cadastr_num.clone(),
      area:        self.area,
      latitude:    self.latitude,
      longitude:   self.longitude,
      comment:     self.comment.clone(),
    }
  }

  pub fn is_active(&self) -> bool { self.status.is_active() }
}

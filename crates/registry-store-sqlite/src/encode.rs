//! Encoding and decoding helpers between the registry domain types and the
//! plain values stored in SQLite columns.

use registry_core::record::{NewRecord, Record, RecordStatus};

use crate::{Error, Result};

// ─── RecordStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: RecordStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<RecordStatus> {
  RecordStatus::ALL
    .into_iter()
    .find(|status| status.as_str() == s)
    .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
}

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Bindable values for the thirteen replaceable columns, in the order
/// `name .. comment`. Placeholders `?1..?13` in every write statement follow
/// this order.
pub struct FieldParams {
  pub name:        String,
  pub surname:     String,
  pub middle_name: String,
  pub iin:         String,
  pub dom:         i64,
  pub kv:          i64,
  pub city:        String,
  pub street:      String,
  pub cadastr_num: String,
  pub area:        f64,
  pub lat:         f64,
  pub long:        f64,
  pub comment:     String,
}

impl From<NewRecord> for FieldParams {
  fn from(r: NewRecord) -> Self {
    Self {
      name:        r.name,
      surname:     r.surname,
      middle_name: r.middle_name,
      iin:         r.iin,
      dom:         r.dom,
      kv:          r.kv,
      city:        r.city,
      street:      r.street,
      cadastr_num: r.cadastr_num,
      area:        r.area,
      lat:         r.latitude,
      long:        r.longitude,
      comment:     r.comment,
    }
  }
}

impl FieldParams {
  pub fn as_params(&self) -> [&dyn rusqlite::ToSql; 13] {
    [
      &self.name,
      &self.surname,
      &self.middle_name,
      &self.iin,
      &self.dom,
      &self.kv,
      &self.city,
      &self.street,
      &self.cadastr_num,
      &self.area,
      &self.lat,
      &self.long,
      &self.comment,
    ]
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Values read directly from a `records` row.
pub struct RawRecord {
  pub id:          i64,
  pub name:        String,
  pub surname:     String,
  pub middle_name: String,
  pub iin:         String,
  pub dom:         i64,
  pub kv:          i64,
  pub city:        String,
  pub street:      String,
  pub cadastr_num: String,
  pub area:        f64,
  pub lat:         f64,
  pub long:        f64,
  pub comment:     String,
  pub status:      String,
}

/// Row mapper for statements selecting [`crate::schema::RECORD_COLUMNS`].
pub fn raw_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    id:          row.get(0)?,
    name:        row.get(1)?,
    surname:     row.get(2)?,
    middle_name: row.get(3)?,
    iin:         row.get(4)?,
    dom:         row.get(5)?,
    kv:          row.get(6)?,
    city:        row.get(7)?,
    street:      row.get(8)?,
    cadastr_num: row.get(9)?,
    area:        row.get(10)?,
    lat:         row.get(11)?,
    long:        row.get(12)?,
    comment:     row.get(13)?,
    status:      row.get(14)?,
  })
}

impl RawRecord {
  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      id:          self.id,
      name:        self.name,
      surname:     self.surname,
      middle_name: self.middle_name,
      iin:         self.iin,
      dom:         self.dom,
      kv:          self.kv,
      city:        self.city,
      street:      self.street,
      cadastr_num: self.cadastr_num,
      area:        self.area,
      latitude:    self.lat,
      longitude:   self.long,
      comment:     self.comment,
      status:      decode_status(&self.status)?,
    })
  }
}

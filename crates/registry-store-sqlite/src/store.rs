//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use registry_core::{
  record::{NewRecord, Record, RecordStatus},
  store::RecordStore,
};

use crate::{
  encode::{encode_status, raw_record, FieldParams, RawRecord},
  schema::{RECORD_COLUMNS, schema},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::Open)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::Open)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let ddl = schema();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await
      .map_err(Error::Open)
  }

  /// Write a raw status string, bypassing the store API. Lets tests probe the
  /// schema's own guards.
  #[cfg(test)]
  pub(crate) async fn write_status(
    &self,
    id: i64,
    status: &'static str,
  ) -> tokio_rusqlite::Result<usize> {
    self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE records SET status = ?1 WHERE id = ?2",
          rusqlite::params![status, id],
        )?)
      })
      .await
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewRecord) -> Result<Record> {
    let fields = FieldParams::from(input);

    let raw: RawRecord = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO records (
             name, surname, middle_name, iin, dom, kv, city, street,
             cadastr_num, area, lat, long, comment
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
           RETURNING {RECORD_COLUMNS}"
        );
        Ok(conn.query_row(&sql, &fields.as_params()[..], raw_record)?)
      })
      .await
      .map_err(Error::Insert)?;

    raw.into_record()
  }

  async fn update(&self, record: Record) -> Result<Record> {
    let id     = record.id;
    let fields = FieldParams::from(record.fields());

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE records
           SET name = ?1, surname = ?2, middle_name = ?3, iin = ?4, dom = ?5,
               kv = ?6, city = ?7, street = ?8, cadastr_num = ?9, area = ?10,
               lat = ?11, long = ?12, comment = ?13
           WHERE id = ?14
           RETURNING {RECORD_COLUMNS}"
        );
        let mut params: Vec<&dyn rusqlite::ToSql> = fields.as_params().to_vec();
        params.push(&id);
        Ok(conn.query_row(&sql, &params[..], raw_record).optional()?)
      })
      .await
      .map_err(Error::Update)?;

    raw.ok_or(Error::NotFound(id))?.into_record()
  }

  async fn soft_delete(&self, id: i64) -> Result<Record> {
    let deleted = encode_status(RecordStatus::Deleted);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE records SET status = ?1 WHERE id = ?2 RETURNING {RECORD_COLUMNS}"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![deleted, id], raw_record)
            .optional()?,
        )
      })
      .await
      .map_err(Error::Delete)?;

    raw.ok_or(Error::NotFound(id))?.into_record()
  }

  async fn list_active(&self) -> Result<Vec<Record>> {
    let active = encode_status(RecordStatus::Active);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {RECORD_COLUMNS} FROM records WHERE status = ?1 ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![active], raw_record)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Query)?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get_by_id(&self, id: i64) -> Result<Record> {
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], raw_record)
            .optional()?,
        )
      })
      .await
      .map_err(Error::Query)?;

    raw.ok_or(Error::NotFound(id))?.into_record()
  }
}

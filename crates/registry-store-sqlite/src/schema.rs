//! SQL schema for the registry SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

use registry_core::record::RecordStatus;

/// Table and index DDL; idempotent thanks to `IF NOT EXISTS`.
const TABLES: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    surname     TEXT    NOT NULL,
    middle_name TEXT    NOT NULL,
    iin         TEXT    NOT NULL,
    dom         INTEGER NOT NULL,   -- house number
    kv          INTEGER NOT NULL,   -- apartment number
    city        TEXT    NOT NULL,
    street      TEXT    NOT NULL,
    cadastr_num TEXT    NOT NULL,
    area        REAL    NOT NULL,
    lat         REAL    NOT NULL,
    long        REAL    NOT NULL,
    comment     TEXT    NOT NULL,
    status      TEXT    NOT NULL DEFAULT 'ACTIVE_STATUS'
                CHECK (status IN ('ACTIVE_STATUS', 'DELETED_STATUS'))
);

CREATE INDEX IF NOT EXISTS records_status_idx ON records(status);
";

const SCHEMA_VERSION: u32 = 1;

/// Full schema: tables, then a trigger rejecting every status change that
/// [`RecordStatus::can_transition_to`] forbids.
pub fn schema() -> String {
  let mut sql = TABLES.to_owned();
  if let Some(guard) = transition_guard() {
    sql.push_str(&guard);
  }
  sql.push_str(&format!("\nPRAGMA user_version = {SCHEMA_VERSION};\n"));
  sql
}

/// `None` when the table allows every transition.
fn transition_guard() -> Option<String> {
  let pairs: Vec<String> = RecordStatus::forbidden_transitions()
    .map(|(from, to)| {
      format!(
        "(OLD.status = '{}' AND NEW.status = '{}')",
        from.as_str(),
        to.as_str()
      )
    })
    .collect();
  if pairs.is_empty() {
    return None;
  }

  Some(format!(
    "
CREATE TRIGGER IF NOT EXISTS records_status_transition
BEFORE UPDATE OF status ON records
WHEN {}
BEGIN
    SELECT RAISE(ABORT, 'illegal record status transition');
END;
",
    pairs.join("\n  OR ")
  ))
}

/// Column list shared by every statement that returns a full row. The order
/// matches [`crate::encode::raw_record`].
pub const RECORD_COLUMNS: &str = "id, name, surname, middle_name, iin, dom, kv, city, street, \
   cadastr_num, area, lat, long, comment, status";

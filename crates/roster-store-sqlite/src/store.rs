//! [`SqliteStore`], the SQLite implementation of [`StudentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  store::{NewRecord, RecordChanges, StudentFilter, StudentStore},
  student::StudentRecord,
};

use crate::{
  Error, Result,
  encode::{EncodedStudent, RawStudent, encode_uuid},
  schema::{PRAGMAS, SCHEMA, SCHEMA_VERSION, STUDENT_COLUMNS},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A student store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// statements run on the connection's own thread, one closure at a time, so a
/// `replace` transaction never interleaves with another write.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Wrap a crate error so it can travel out of a `Connection::call` closure.
fn other(err: Error) -> tokio_rusqlite::Error { tokio_rusqlite::Error::Other(Box::new(err)) }

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite student store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// The database's `PRAGMA user_version`.
  pub async fn schema_version(&self) -> Result<i64> {
    let version: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
      .await?;
    Ok(version)
  }

  /// Apply [`SCHEMA`] unless the file is already at [`SCHEMA_VERSION`].
  pub(crate) async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
          conn.execute_batch(SCHEMA)?;
        }
        Ok(version)
      })
      .await?;

    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }
    if found < SCHEMA_VERSION {
      tracing::debug!(from = found, to = SCHEMA_VERSION, "applied student schema");
    }
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn stamp_version(&self, version: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.pragma_update(None, "user_version", version)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

const INSERT_SQL: &str = "INSERT INTO students (
    student_id, matricula, name, paternal_surname, maternal_surname, sex,
    phone, email, social_profiles, blood_type, address, emergency_contact,
    avatar_url, credential_hash, active, created_at, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

const UPDATE_SQL: &str = "UPDATE students SET
    matricula = ?2, name = ?3, paternal_surname = ?4, maternal_surname = ?5,
    sex = ?6, phone = ?7, email = ?8, social_profiles = ?9, blood_type = ?10,
    address = ?11, emergency_contact = ?12, avatar_url = ?13,
    credential_hash = ?14, active = ?15, created_at = ?16, updated_at = ?17
  WHERE student_id = ?1";

fn execute_row(
  conn: &rusqlite::Connection,
  sql: &str,
  row: &EncodedStudent,
) -> rusqlite::Result<usize> {
  conn.execute(
    sql,
    rusqlite::params![
      row.student_id,
      row.matricula,
      row.name,
      row.paternal_surname,
      row.maternal_surname,
      row.sex,
      row.phone,
      row.email,
      row.social_profiles,
      row.blood_type,
      row.address,
      row.emergency_contact,
      row.avatar_url,
      row.credential_hash,
      row.active,
      row.created_at,
      row.updated_at,
    ],
  )
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, new: NewRecord) -> Result<StudentRecord> {
    let record = StudentRecord::from_new(Uuid::new_v4(), new, Utc::now());
    let row = EncodedStudent::from_record(&record)?;
    let matricula = record.profile.matricula.clone();

    self
      .conn
      .call(move |conn| {
        execute_row(conn, INSERT_SQL, &row)?;
        Ok(())
      })
      .await
      .map_err(|e| Error::from_write(e, Some(&matricula)))?;

    Ok(record)
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Option<StudentRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1"),
            rusqlite::params![id_str],
            RawStudent::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStudent::into_record).transpose()
  }

  async fn find_where(&self, filter: &StudentFilter) -> Result<Vec<StudentRecord>> {
    // The `active` predicate runs in SQL; text matching happens below with
    // `StudentFilter::matches`, whose Unicode case folding SQLite's LIKE
    // does not provide.
    let active = filter.active;

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students
           WHERE (?1 IS NULL OR active = ?1)
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![active], RawStudent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut records = Vec::with_capacity(raws.len());
    for raw in raws {
      let record = raw.into_record()?;
      if filter.matches(&record) {
        records.push(record);
      }
    }
    Ok(records)
  }

  async fn replace(&self, id: Uuid, changes: RecordChanges) -> Result<Option<StudentRecord>> {
    let id_str = encode_uuid(id);
    let new_matricula = changes.profile.matricula.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1"),
            rusqlite::params![id_str],
            RawStudent::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };

        let mut record = raw.into_record().map_err(other)?;
        record.apply(changes, Utc::now());
        let row = EncodedStudent::from_record(&record).map_err(other)?;

        execute_row(&tx, UPDATE_SQL, &row)?;
        tx.commit()?;
        Ok(Some(record))
      })
      .await
      .map_err(|e| Error::from_write(e, new_matricula.as_deref()))
  }
}

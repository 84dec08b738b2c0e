//! [`MemoryStore`]: a process-local [`StudentStore`].
//!
//! Records live in insertion order behind a single `RwLock`. Every write holds
//! the lock for its whole read-modify-write, so `replace` is atomic per call.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{NewRecord, RecordChanges, StudentFilter, StudentStore},
  student::StudentRecord,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
  records: RwLock<Vec<StudentRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
  Error::StoreUnavailable("memory store lock poisoned".into())
}

fn matricula_taken(records: &[StudentRecord], matricula: &str, except: Option<Uuid>) -> bool {
  records
    .iter()
    .any(|r| r.profile.matricula == matricula && Some(r.id) != except)
}

impl StudentStore for MemoryStore {
  type Error = Error;

  async fn insert(&self, new: NewRecord) -> Result<StudentRecord> {
    let mut records = self.records.write().map_err(poisoned)?;
    if matricula_taken(&records, &new.profile.matricula, None) {
      return Err(Error::MatriculaTaken(new.profile.matricula));
    }
    let record = StudentRecord::from_new(Uuid::new_v4(), new, Utc::now());
    records.push(record.clone());
    Ok(record)
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Option<StudentRecord>> {
    let records = self.records.read().map_err(poisoned)?;
    Ok(records.iter().find(|r| r.id == id).cloned())
  }

  async fn find_where(&self, filter: &StudentFilter) -> Result<Vec<StudentRecord>> {
    let records = self.records.read().map_err(poisoned)?;
    Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
  }

  async fn replace(&self, id: Uuid, changes: RecordChanges) -> Result<Option<StudentRecord>> {
    let mut records = self.records.write().map_err(poisoned)?;

    let Some(idx) = records.iter().position(|r| r.id == id) else {
      return Ok(None);
    };
    if let Some(matricula) = changes.profile.matricula.as_deref()
      && matricula_taken(&records, matricula, Some(id))
    {
      return Err(Error::MatriculaTaken(matricula.to_owned()));
    }

    let record = &mut records[idx];
    record.apply(changes, Utc::now());
    Ok(Some(record.clone()))
  }
}

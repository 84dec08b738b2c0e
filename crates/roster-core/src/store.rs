//! The `StudentStore` trait and supporting types.
//!
//! The trait is implemented by storage backends ([`crate::memory::MemoryStore`],
//! `roster-store-sqlite`). The lifecycle manager depends on this abstraction,
//! never on a concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::student::{ProfileChanges, StudentProfile, StudentRecord};

// ─── Write payloads ──────────────────────────────────────────────────────────

/// A validated, already-hashed record ready for insertion. The store assigns
/// `id`, timestamps and `active = true`.
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub profile:         StudentProfile,
  pub credential_hash: String,
}

/// Fields to merge into a stored record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordChanges {
  pub profile:         ProfileChanges,
  pub credential_hash: Option<String>,
  pub active:          Option<bool>,
}

impl RecordChanges {
  pub fn active(active: bool) -> Self {
    Self { active: Some(active), ..Default::default() }
  }
}

impl StudentRecord {
  /// Build the record a store persists for `new`.
  pub fn from_new(id: Uuid, new: NewRecord, at: DateTime<Utc>) -> Self {
    StudentRecord {
      id,
      profile: new.profile,
      credential_hash: new.credential_hash,
      active: true,
      created_at: at,
      updated_at: at,
    }
  }

  /// Shallow merge of `changes`; bumps `updated_at`. `id` and `created_at`
  /// never change.
  pub fn apply(&mut self, changes: RecordChanges, at: DateTime<Utc>) {
    self.profile.apply(changes.profile);
    if let Some(hash) = changes.credential_hash {
      self.credential_hash = hash;
    }
    if let Some(active) = changes.active {
      self.active = active;
    }
    self.updated_at = at;
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Predicate for [`StudentStore::find_where`].
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
  /// Restrict to records with this `active` flag.
  pub active: Option<bool>,
  /// Case-insensitive literal substring of `name` or `matricula`. Characters
  /// carry no pattern meaning.
  pub text:   Option<String>,
}

impl StudentFilter {
  /// Every record, active or not.
  pub fn all() -> Self { Self::default() }

  /// Active records only.
  pub fn active_only() -> Self {
    Self { active: Some(true), text: None }
  }

  /// Active records whose name or matricula contains `text`. An empty needle
  /// matches every active record.
  pub fn search(text: Option<&str>) -> Self {
    Self {
      active: Some(true),
      text:   text.filter(|t| !t.is_empty()).map(str::to_owned),
    }
  }

  /// Whether `record` satisfies both predicates.
  pub fn matches(&self, record: &StudentRecord) -> bool {
    if let Some(active) = self.active
      && record.active != active
    {
      return false;
    }
    match self.text.as_deref() {
      None | Some("") => true,
      Some(text) => {
        let needle = text.to_lowercase();
        record.profile.name.to_lowercase().contains(&needle)
          || record.profile.matricula.to_lowercase().contains(&needle)
      }
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a student store backend.
///
/// Each method is atomic with respect to a single record. Backends report
/// failures through their own error type, which must convert into
/// [`crate::Error`]: a duplicate matricula becomes
/// [`crate::Error::MatriculaTaken`], anything else
/// [`crate::Error::StoreUnavailable`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait StudentStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Persist a new record. Fails if the matricula exists on any record.
  fn insert(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<StudentRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by id, in any `active` state. Returns `None` if not
  /// found.
  fn get_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentRecord>, Self::Error>> + Send + '_;

  /// All records satisfying `filter`, in store iteration order.
  fn find_where<'a>(
    &'a self,
    filter: &'a StudentFilter,
  ) -> impl Future<Output = Result<Vec<StudentRecord>, Self::Error>> + Send + 'a;

  /// Merge `changes` into the record with `id` and return the result.
  /// Returns `None` if the record does not exist.
  fn replace(
    &self,
    id: Uuid,
    changes: RecordChanges,
  ) -> impl Future<Output = Result<Option<StudentRecord>, Self::Error>> + Send + '_;
}

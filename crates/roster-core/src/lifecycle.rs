//! The record lifecycle manager.
//!
//! [`Roster`] is the only component that writes to a [`StudentStore`]. It
//! validates input, hashes credentials before they reach the store, and
//! drives the per-record `Active`/`Inactive` state:
//!
//! - `soft_delete`: `Active -> Inactive` (self-loop when already inactive)
//! - `restore`: `Inactive -> Active` (self-loop when already active)
//!
//! Field updates preserve the state and are allowed in both.

use uuid::Uuid;

use crate::{
  Error, Result,
  credential::{Argon2Hasher, Credential, CredentialHasher},
  store::{NewRecord, RecordChanges, StudentStore},
  student::{Student, StudentInput, StudentRecord},
};

/// Lifecycle manager and query engine over a single store.
pub struct Roster<S, H = Argon2Hasher> {
  store:  S,
  hasher: H,
}

impl<S, H> Roster<S, H>
where
  S: StudentStore,
  H: CredentialHasher,
{
  pub fn new(store: S, hasher: H) -> Self { Self { store, hasher } }

  pub fn store(&self) -> &S { &self.store }

  pub fn hasher(&self) -> &H { &self.hasher }

  /// Validate `input`, hash its credential and persist a new active record.
  pub async fn create(&self, input: StudentInput) -> Result<Student> {
    let (profile, credential) = input.into_new()?;
    let credential_hash = self.hash(credential)?;

    let record = self
      .store
      .insert(NewRecord { profile, credential_hash })
      .await
      .map_err(Into::<Error>::into)?;

    tracing::info!(
      student_id = %record.id,
      matricula = %record.profile.matricula,
      "student created"
    );
    Ok(record.into())
  }

  /// Merge the supplied fields into an existing record, in any `active`
  /// state. A supplied credential is re-hashed; otherwise the stored hash is
  /// kept.
  pub async fn update(&self, id: Uuid, input: StudentInput) -> Result<Student> {
    let record = self.merge(id, input).await?;
    tracing::info!(student_id = %id, "student updated");
    Ok(record.into())
  }

  /// Same merge and credential rules as [`Roster::update`], for a caller
  /// editing their own record. Establishing that the caller owns `id` is up
  /// to the transport layer.
  pub async fn update_own_profile(&self, id: Uuid, input: StudentInput) -> Result<Student> {
    let record = self.merge(id, input).await?;
    tracing::info!(student_id = %id, "student updated own profile");
    Ok(record.into())
  }

  /// Mark a record inactive. Idempotent.
  pub async fn soft_delete(&self, id: Uuid) -> Result<Student> {
    let record = self.set_active(id, false).await?;
    tracing::info!(student_id = %id, "student deactivated");
    Ok(record.into())
  }

  /// Mark a record active again. Idempotent.
  pub async fn restore(&self, id: Uuid) -> Result<Student> {
    let record = self.set_active(id, true).await?;
    tracing::info!(student_id = %id, "student restored");
    Ok(record.into())
  }

  async fn merge(&self, id: Uuid, input: StudentInput) -> Result<StudentRecord> {
    let (profile, credential) = input.into_changes()?;
    let credential_hash = credential.map(|raw| self.hash(raw)).transpose()?;

    self.replace(id, RecordChanges { profile, credential_hash, active: None }).await
  }

  async fn set_active(&self, id: Uuid, active: bool) -> Result<StudentRecord> {
    self.replace(id, RecordChanges::active(active)).await
  }

  async fn replace(&self, id: Uuid, changes: RecordChanges) -> Result<StudentRecord> {
    self
      .store
      .replace(id, changes)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::NotFound(id))
  }

  /// Consumes the raw credential so it cannot outlive hashing.
  fn hash(&self, raw: Credential) -> Result<String> { self.hasher.hash(&raw) }
}

//! Read-only projections over the roster.
//!
//! Every result is a [`Student`] view; credential hashes never leave the
//! store through these paths.

use uuid::Uuid;

use crate::{
  Error, Result,
  credential::CredentialHasher,
  lifecycle::Roster,
  store::{StudentFilter, StudentStore},
  student::Student,
};

impl<S, H> Roster<S, H>
where
  S: StudentStore,
  H: CredentialHasher,
{
  /// Active records, in store order.
  pub async fn list_active(&self) -> Result<Vec<Student>> {
    self.find(&StudentFilter::active_only()).await
  }

  /// Every record regardless of `active`. Restricting this to
  /// administrators is the transport layer's job.
  pub async fn list_all(&self) -> Result<Vec<Student>> {
    self.find(&StudentFilter::all()).await
  }

  /// Active records whose name or matricula contains `pattern`,
  /// case-insensitively. The pattern is matched literally; `None` or `""`
  /// returns every active record.
  pub async fn search(&self, pattern: Option<&str>) -> Result<Vec<Student>> {
    self.find(&StudentFilter::search(pattern)).await
  }

  /// A single record in any `active` state.
  pub async fn get_by_id(&self, id: Uuid) -> Result<Student> {
    self
      .store()
      .get_by_id(id)
      .await
      .map_err(Into::<Error>::into)?
      .map(Student::from)
      .ok_or(Error::NotFound(id))
  }

  async fn find(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
    let records = self
      .store()
      .find_where(filter)
      .await
      .map_err(Into::<Error>::into)?;
    Ok(records.into_iter().map(Student::from).collect())
  }
}

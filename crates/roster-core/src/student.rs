//! Student types: the stored record, its public read view, and the input
//! accepted by create and update.
//!
//! The stored record carries the credential hash. Every read path hands out a
//! [`Student`] instead, which has no field for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::credential::Credential;

// ─── Nested values ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProfiles {
  pub facebook:  Option<String>,
  pub instagram: Option<String>,
}

/// A postal address. `number` and `postal_code` arrive as either JSON strings
/// or numbers and are kept as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub street:       Option<String>,
  #[serde(default, deserialize_with = "loose_string")]
  pub number:       Option<String>,
  pub neighborhood: Option<String>,
  #[serde(default, deserialize_with = "loose_string")]
  pub postal_code:  Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
  pub name:  Option<String>,
  pub phone: Option<String>,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Every caller-editable field of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
  /// Business key; unique across all records, active or not.
  pub matricula:         String,
  pub name:              String,
  pub paternal_surname:  String,
  pub maternal_surname:  String,
  pub sex:               String,
  pub phone:             Option<String>,
  pub email:             Option<String>,
  pub social_profiles:   Option<SocialProfiles>,
  pub blood_type:        Option<String>,
  pub address:           Option<Address>,
  pub emergency_contact: Option<EmergencyContact>,
  pub avatar_url:        Option<String>,
}

impl StudentProfile {
  /// Shallow merge: only fields present in `changes` are overwritten.
  pub fn apply(&mut self, changes: ProfileChanges) {
    let ProfileChanges {
      matricula,
      name,
      paternal_surname,
      maternal_surname,
      sex,
      phone,
      email,
      social_profiles,
      blood_type,
      address,
      emergency_contact,
      avatar_url,
    } = changes;

    if let Some(v) = matricula { self.matricula = v; }
    if let Some(v) = name { self.name = v; }
    if let Some(v) = paternal_surname { self.paternal_surname = v; }
    if let Some(v) = maternal_surname { self.maternal_surname = v; }
    if let Some(v) = sex { self.sex = v; }
    if let Some(v) = phone { self.phone = v; }
    if let Some(v) = email { self.email = v; }
    if let Some(v) = social_profiles { self.social_profiles = v; }
    if let Some(v) = blood_type { self.blood_type = v; }
    if let Some(v) = address { self.address = v; }
    if let Some(v) = emergency_contact { self.emergency_contact = v; }
    if let Some(v) = avatar_url { self.avatar_url = v; }
  }
}

/// A partial set of profile fields.
///
/// Required fields are `Some(value)` when supplied. Optional fields are
/// three-state: absent (`None`) keeps the stored value, `null`
/// (`Some(None)`) clears it, and a value (`Some(Some(v))`) replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
  pub matricula:         Option<String>,
  pub name:              Option<String>,
  pub paternal_surname:  Option<String>,
  pub maternal_surname:  Option<String>,
  pub sex:               Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub phone:             Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub email:             Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub social_profiles:   Option<Option<SocialProfiles>>,
  #[serde(default, deserialize_with = "double_option")]
  pub blood_type:        Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub address:           Option<Option<Address>>,
  #[serde(default, deserialize_with = "double_option")]
  pub emergency_contact: Option<Option<EmergencyContact>>,
  #[serde(default, deserialize_with = "double_option")]
  pub avatar_url:        Option<Option<String>>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Body accepted by create, update and own-profile update.
///
/// Keys the caller may not set (`id`, `active`, `credentialHash`, timestamps)
/// are ignored. See [`crate::validate`] for the rules applied before any
/// store call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentInput {
  #[serde(flatten)]
  pub profile:  ProfileChanges,
  /// Raw credential. Hashed by the lifecycle manager and then dropped.
  pub password: Option<Credential>,
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// The persisted shape of a student, as seen by store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
  /// Assigned by the store at insert; never reassigned.
  pub id:              Uuid,
  #[serde(flatten)]
  pub profile:         StudentProfile,
  /// PHC string from the credential hasher.
  pub credential_hash: String,
  /// Soft-delete flag.
  pub active:          bool,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

// ─── Read view ───────────────────────────────────────────────────────────────

/// A student as returned by every read and write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub id:         Uuid,
  #[serde(flatten)]
  pub profile:    StudentProfile,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<StudentRecord> for Student {
  fn from(record: StudentRecord) -> Self {
    Student {
      id:         record.id,
      profile:    record.profile,
      active:     record.active,
      created_at: record.created_at,
      updated_at: record.updated_at,
    }
  }
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// Distinguish an explicit `null` (`Some(None)`) from an absent key (`None`,
/// via `#[serde(default)]`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
  Text(String),
  Integer(i64),
  Float(f64),
}

fn loose_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Loose>::deserialize(de)?.map(|v| match v {
    Loose::Text(s) => s,
    Loose::Integer(n) => n.to_string(),
    Loose::Float(f) => f.to_string(),
  }))
}

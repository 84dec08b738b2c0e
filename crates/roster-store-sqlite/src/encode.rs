//! Encoding and decoding helpers between roster domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, nested values (social profiles, address, emergency contact) as
//! compact JSON, and `active` as `0`/`1`.

use chrono::{DateTime, Utc};
use roster_core::student::{StudentProfile, StudentRecord};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Nested JSON
// ──────────────────────────────────────────────────────────────

pub fn encode_json<T: Serialize>(value: Option<&T>) -> Result<Option<String>> {
  value.map(serde_json::to_string::<T>).transpose().map_err(Error::from)
}

pub fn decode_json<T: DeserializeOwned>(s: Option<&str>) -> Result<Option<T>> {
  s.map(serde_json::from_str::<T>).transpose().map_err(Error::from)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `students` row, in
/// [`STUDENT_COLUMNS`](crate::schema::STUDENT_COLUMNS) order.
pub struct RawStudent {
  pub student_id:        String,
  pub matricula:         String,
  pub name:              String,
  pub paternal_surname:  String,
  pub maternal_surname:  String,
  pub sex:               String,
  pub phone:             Option<String>,
  pub email:             Option<String>,
  pub social_profiles:   Option<String>,
  pub blood_type:        Option<String>,
  pub address:           Option<String>,
  pub emergency_contact: Option<String>,
  pub avatar_url:        Option<String>,
  pub credential_hash:   String,
  pub active:            bool,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawStudent {
      student_id:        row.get(0)?,
      matricula:         row.get(1)?,
      name:              row.get(2)?,
      paternal_surname:  row.get(3)?,
      maternal_surname:  row.get(4)?,
      sex:               row.get(5)?,
      phone:             row.get(6)?,
      email:             row.get(7)?,
      social_profiles:   row.get(8)?,
      blood_type:        row.get(9)?,
      address:           row.get(10)?,
      emergency_contact: row.get(11)?,
      avatar_url:        row.get(12)?,
      credential_hash:   row.get(13)?,
      active:            row.get(14)?,
      created_at:        row.get(15)?,
      updated_at:        row.get(16)?,
    })
  }

  pub fn into_record(self) -> Result<StudentRecord> {
    Ok(StudentRecord {
      id:              decode_uuid(&self.student_id)?,
      profile:         StudentProfile {
        matricula:         self.matricula,
        name:              self.name,
        paternal_surname:  self.paternal_surname,
        maternal_surname:  self.maternal_surname,
        sex:               self.sex,
        phone:             self.phone,
        email:             self.email,
        social_profiles:   decode_json(self.social_profiles.as_deref())?,
        blood_type:        self.blood_type,
        address:           decode_json(self.address.as_deref())?,
        emergency_contact: decode_json(self.emergency_contact.as_deref())?,
        avatar_url:        self.avatar_url,
      },
      credential_hash: self.credential_hash,
      active:          self.active,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Column values ready to bind for an `INSERT` or `UPDATE`.
pub struct EncodedStudent {
  pub student_id:        String,
  pub matricula:         String,
  pub name:              String,
  pub paternal_surname:  String,
  pub maternal_surname:  String,
  pub sex:               String,
  pub phone:             Option<String>,
  pub email:             Option<String>,
  pub social_profiles:   Option<String>,
  pub blood_type:        Option<String>,
  pub address:           Option<String>,
  pub emergency_contact: Option<String>,
  pub avatar_url:        Option<String>,
  pub credential_hash:   String,
  pub active:            bool,
  pub created_at:        String,
  pub updated_at:        String,
}

impl EncodedStudent {
  pub fn from_record(record: &StudentRecord) -> Result<Self> {
    let p = &record.profile;
    Ok(EncodedStudent {
      student_id:        encode_uuid(record.id),
      matricula:         p.matricula.clone(),
      name:              p.name.clone(),
      paternal_surname:  p.paternal_surname.clone(),
      maternal_surname:  p.maternal_surname.clone(),
      sex:               p.sex.clone(),
      phone:             p.phone.clone(),
      email:             p.email.clone(),
      social_profiles:   encode_json(p.social_profiles.as_ref())?,
      blood_type:        p.blood_type.clone(),
      address:           encode_json(p.address.as_ref())?,
      emergency_contact: encode_json(p.emergency_contact.as_ref())?,
      avatar_url:        p.avatar_url.clone(),
      credential_hash:   record.credential_hash.clone(),
      active:            record.active,
      created_at:        encode_dt(record.created_at),
      updated_at:        encode_dt(record.updated_at),
    })
  }
}

//! SQL schema for the roster SQLite store.
//!
//! Applied at connection startup when `PRAGMA user_version` is behind
//! [`SCHEMA_VERSION`]. A database written by a newer build is refused.

/// Version stamped into `user_version` by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 1;

/// Connection settings applied on every open.
pub const PRAGMAS: &str = "PRAGMA journal_mode = WAL;";

/// Full schema DDL for a fresh database.
pub const SCHEMA: &str = "
-- Rows are never deleted; `active = 0` is a soft delete.
CREATE TABLE IF NOT EXISTS students (
    student_id        TEXT PRIMARY KEY,
    matricula         TEXT NOT NULL UNIQUE,
    name              TEXT NOT NULL,
    paternal_surname  TEXT NOT NULL,
    maternal_surname  TEXT NOT NULL,
    sex               TEXT NOT NULL,
    phone             TEXT,
    email             TEXT,
    social_profiles   TEXT,            -- JSON-encoded SocialProfiles or NULL
    blood_type        TEXT,
    address           TEXT,            -- JSON-encoded Address or NULL
    emergency_contact TEXT,            -- JSON-encoded EmergencyContact or NULL
    avatar_url        TEXT,
    credential_hash   TEXT NOT NULL,   -- argon2 PHC string
    active            INTEGER NOT NULL DEFAULT 1,
    created_at        TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS students_active_idx ON students(active);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT`, in [`crate::encode::RawStudent`]
/// field order.
pub const STUDENT_COLUMNS: &str = "student_id, matricula, name, paternal_surname, \
  maternal_surname, sex, phone, email, social_profiles, blood_type, address, \
  emergency_contact, avatar_url, credential_hash, active, created_at, updated_at";

//! Credential hashing.
//!
//! Raw credentials only ever live in a [`Credential`], which has no
//! `Serialize` impl and a redacted `Debug`. The lifecycle manager turns them
//! into PHC strings through a [`CredentialHasher`] before anything reaches a
//! store.

use std::fmt;

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
  password_hash::SaltString,
};
use rand_core::OsRng;
use serde::Deserialize;

use crate::{Error, Result};

/// Upper bound on raw credential length, so the hashing cost cannot be driven
/// by attacker-controlled input size.
pub const MAX_CREDENTIAL_BYTES: usize = 128;

/// Lower bound on raw credential length.
pub const MIN_CREDENTIAL_BYTES: usize = 6;

// ─── Credential ──────────────────────────────────────────────────────────────

/// A raw, caller-submitted credential.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  pub fn expose(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Credential(<redacted>)")
  }
}

// ─── Hasher trait ────────────────────────────────────────────────────────────

/// One-way, salted credential hashing.
pub trait CredentialHasher: Send + Sync {
  /// Hash `raw` into a self-describing string (salt and parameters included).
  fn hash(&self, raw: &Credential) -> Result<String>;

  /// Check `raw` against a hash produced by [`CredentialHasher::hash`].
  fn verify(&self, raw: &str, hash: &str) -> Result<bool>;
}

// ─── Argon2 ──────────────────────────────────────────────────────────────────

/// argon2id with a fixed work factor chosen at construction.
#[derive(Clone)]
pub struct Argon2Hasher {
  argon2: Argon2<'static>,
}

impl Argon2Hasher {
  /// Build a hasher with explicit cost parameters.
  ///
  /// - `memory_kib`: memory cost in KiB (at least `8 * parallelism`).
  /// - `iterations`: time cost.
  /// - `parallelism`: lanes.
  pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
    let params = Params::new(memory_kib, iterations, parallelism, None)
      .map_err(|e| Error::Hashing(format!("invalid argon2 parameters: {e}")))?;
    Ok(Self {
      argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
    })
  }
}

impl Default for Argon2Hasher {
  /// The argon2 crate's recommended argon2id parameters
  /// (19 MiB, 2 iterations, 1 lane).
  fn default() -> Self {
    Self {
      argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
    }
  }
}

impl CredentialHasher for Argon2Hasher {
  fn hash(&self, raw: &Credential) -> Result<String> {
    if raw.expose().len() > MAX_CREDENTIAL_BYTES {
      return Err(Error::validation(
        "password",
        format!("must be at most {MAX_CREDENTIAL_BYTES} bytes"),
      ));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = self
      .argon2
      .hash_password(raw.expose().as_bytes(), &salt)
      .map_err(|e| Error::Hashing(e.to_string()))?;
    Ok(hash.to_string())
  }

  fn verify(&self, raw: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| Error::Hashing(e.to_string()))?;
    Ok(self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok())
  }
}

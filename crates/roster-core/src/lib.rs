//! Core types and the record lifecycle for the student roster.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::StudentStore`]; the transport layer
//! talks only to [`lifecycle::Roster`].

pub mod credential;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod query;
pub mod store;
pub mod student;
pub mod validate;

pub use credential::{Argon2Hasher, Credential, CredentialHasher};
pub use error::{Error, Result};
pub use lifecycle::Roster;
pub use memory::MemoryStore;
pub use store::{StudentFilter, StudentStore};
pub use student::{Student, StudentInput, StudentProfile, StudentRecord};

#[cfg(test)]
mod tests;

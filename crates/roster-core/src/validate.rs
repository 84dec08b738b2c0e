//! Validation of [`StudentInput`] into typed values.
//!
//! Runs before any hashing or store call. Errors name the offending field
//! using its wire (camelCase) name.

use crate::{
  Error, Result,
  credential::{Credential, MAX_CREDENTIAL_BYTES, MIN_CREDENTIAL_BYTES},
  student::{ProfileChanges, StudentInput, StudentProfile},
};

pub const MAX_MATRICULA_CHARS: usize = 64;

impl StudentInput {
  /// Validate a creation body: every required identity field and a
  /// credential must be present.
  pub fn into_new(self) -> Result<(StudentProfile, Credential)> {
    let changes = normalize(self.profile)?;

    let profile = StudentProfile {
      matricula:         require(changes.matricula, "matricula")?,
      name:              require(changes.name, "name")?,
      paternal_surname:  require(changes.paternal_surname, "paternalSurname")?,
      maternal_surname:  require(changes.maternal_surname, "maternalSurname")?,
      sex:               require(changes.sex, "sex")?,
      phone:             changes.phone.flatten(),
      email:             changes.email.flatten(),
      social_profiles:   changes.social_profiles.flatten(),
      blood_type:        changes.blood_type.flatten(),
      address:           changes.address.flatten(),
      emergency_contact: changes.emergency_contact.flatten(),
      avatar_url:        changes.avatar_url.flatten(),
    };

    let credential = match self.password {
      Some(raw) if !raw.is_empty() => raw,
      _ => return Err(Error::validation("password", "is required")),
    };
    check_credential(&credential)?;

    Ok((profile, credential))
  }

  /// Validate an update body. Only supplied fields are checked; an empty
  /// `password` counts as not supplied.
  pub fn into_changes(self) -> Result<(ProfileChanges, Option<Credential>)> {
    let changes = normalize(self.profile)?;
    let credential = self.password.filter(|raw| !raw.is_empty());
    if let Some(raw) = &credential {
      check_credential(raw)?;
    }
    Ok((changes, credential))
  }
}

fn require(value: Option<String>, field: &'static str) -> Result<String> {
  value.ok_or_else(|| Error::validation(field, "is required"))
}

/// Trim and check every supplied field.
fn normalize(mut c: ProfileChanges) -> Result<ProfileChanges> {
  c.matricula = required_text(c.matricula, "matricula")?;
  c.name = required_text(c.name, "name")?;
  c.paternal_surname = required_text(c.paternal_surname, "paternalSurname")?;
  c.maternal_surname = required_text(c.maternal_surname, "maternalSurname")?;
  c.sex = required_text(c.sex, "sex")?;

  if let Some(matricula) = &c.matricula
    && matricula.chars().count() > MAX_MATRICULA_CHARS
  {
    return Err(Error::validation(
      "matricula",
      format!("must be at most {MAX_MATRICULA_CHARS} characters"),
    ));
  }

  c.phone = optional_text(c.phone);
  c.email = optional_text(c.email);
  c.blood_type = optional_text(c.blood_type);
  c.avatar_url = optional_text(c.avatar_url);

  if let Some(Some(email)) = &c.email {
    check_email(email)?;
  }
  if let Some(Some(phone)) = &c.phone {
    check_phone(phone, "phone")?;
  }
  if let Some(Some(contact)) = &c.emergency_contact
    && let Some(phone) = contact.phone.as_deref()
  {
    check_phone(phone, "emergencyContact.phone")?;
  }

  Ok(c)
}

/// A supplied required field may not be blank.
fn required_text(value: Option<String>, field: &'static str) -> Result<Option<String>> {
  match value {
    None => Ok(None),
    Some(v) => {
      let trimmed = v.trim();
      if trimmed.is_empty() {
        Err(Error::validation(field, "must not be blank"))
      } else {
        Ok(Some(trimmed.to_owned()))
      }
    }
  }
}

/// Blank optional text clears the field.
fn optional_text(value: Option<Option<String>>) -> Option<Option<String>> {
  value.map(|inner| {
    inner
      .map(|v| v.trim().to_owned())
      .filter(|v| !v.is_empty())
  })
}

fn check_email(email: &str) -> Result<()> {
  let valid = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  };
  if valid {
    Ok(())
  } else {
    Err(Error::validation("email", "is not a valid email address"))
  }
}

fn check_phone(phone: &str, field: &'static str) -> Result<()> {
  let body = phone.strip_prefix('+').unwrap_or(phone);
  let allowed = body
    .chars()
    .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
  if allowed && body.chars().any(|c| c.is_ascii_digit()) {
    Ok(())
  } else {
    Err(Error::validation(field, "is not a valid phone number"))
  }
}

fn check_credential(raw: &Credential) -> Result<()> {
  let len = raw.expose().len();
  if len < MIN_CREDENTIAL_BYTES {
    return Err(Error::validation(
      "password",
      format!("must be at least {MIN_CREDENTIAL_BYTES} bytes"),
    ));
  }
  if len > MAX_CREDENTIAL_BYTES {
    return Err(Error::validation(
      "password",
      format!("must be at most {MAX_CREDENTIAL_BYTES} bytes"),
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::student::EmergencyContact;

  fn input(value: serde_json::Value) -> StudentInput {
    serde_json::from_value(value).unwrap()
  }

  fn complete() -> serde_json::Value {
    json!({
      "matricula":       " A001 ",
      "name":            "Ana Lopez",
      "paternalSurname": "Lopez",
      "maternalSurname": "Ruiz",
      "sex":             "F",
      "email":           "ana@example.com",
      "phone":           "+52 (55) 1234-5678",
      "bloodType":       "",
      "password":        "secreto1",
    })
  }

  fn field_of(err: Error) -> &'static str {
    match err {
      Error::Validation { field, .. } => field,
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn complete_input_validates_and_trims() {
    let (profile, credential) = input(complete()).into_new().unwrap();
    assert_eq!(profile.matricula, "A001");
    assert_eq!(profile.phone.as_deref(), Some("+52 (55) 1234-5678"));
    assert_eq!(profile.blood_type, None);
    assert_eq!(credential.expose(), "secreto1");
  }

  #[test]
  fn create_requires_identity_fields() {
    for field in ["matricula", "name", "paternalSurname", "maternalSurname", "sex"] {
      let mut body = complete();
      body.as_object_mut().unwrap().remove(field);
      assert_eq!(field_of(input(body).into_new().unwrap_err()), field);
    }
  }

  #[test]
  fn create_requires_a_credential() {
    let mut body = complete();
    body["password"] = json!("");
    assert_eq!(field_of(input(body).into_new().unwrap_err()), "password");

    let mut body = complete();
    body["password"] = json!("abc");
    assert_eq!(field_of(input(body).into_new().unwrap_err()), "password");
  }

  #[test]
  fn malformed_contact_fields_are_rejected() {
    let mut body = complete();
    body["email"] = json!("not-an-email");
    assert_eq!(field_of(input(body).into_new().unwrap_err()), "email");

    let mut body = complete();
    body["phone"] = json!("call me");
    assert_eq!(field_of(input(body).into_new().unwrap_err()), "phone");
  }

  #[test]
  fn update_rejects_blank_required_fields() {
    let err = input(json!({ "name": "   " })).into_changes().unwrap_err();
    assert_eq!(field_of(err), "name");
  }

  #[test]
  fn update_treats_empty_password_as_absent() {
    let (changes, credential) = input(json!({ "phone": "555-0000", "password": "" }))
      .into_changes()
      .unwrap();
    assert!(credential.is_none());
    assert_eq!(changes.phone, Some(Some("555-0000".to_owned())));
    assert_eq!(changes.name, None);
  }

  #[test]
  fn emergency_contact_phone_is_checked() {
    let body = json!({ "emergencyContact": { "name": "Luis", "phone": "n/a" } });
    assert_eq!(
      field_of(input(body).into_changes().unwrap_err()),
      "emergencyContact.phone"
    );

    let body = json!({ "emergencyContact": { "name": "Luis", "phone": "555 1234" } });
    let (changes, _) = input(body).into_changes().unwrap();
    assert_eq!(
      changes.emergency_contact,
      Some(Some(EmergencyContact {
        name:  Some("Luis".into()),
        phone: Some("555 1234".into()),
      }))
    );
  }

  #[test]
  fn overlong_matricula_is_rejected() {
    let mut body = complete();
    body["matricula"] = json!("M".repeat(MAX_MATRICULA_CHARS + 1));
    assert_eq!(field_of(input(body).into_new().unwrap_err()), "matricula");
  }
}

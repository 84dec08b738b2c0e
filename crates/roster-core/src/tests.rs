//! Lifecycle and query tests for `Roster` against the in-memory store.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::{
  Argon2Hasher, CredentialHasher, Error, MemoryStore, Roster, StudentInput, StudentStore,
};

fn roster() -> Roster<MemoryStore> {
  Roster::new(MemoryStore::new(), Argon2Hasher::new(64, 1, 1).unwrap())
}

fn input(value: serde_json::Value) -> StudentInput {
  serde_json::from_value(value).unwrap()
}

fn student(matricula: &str, name: &str) -> StudentInput {
  input(json!({
    "matricula":       matricula,
    "name":            name,
    "paternalSurname": "Lopez",
    "maternalSurname": "Ruiz",
    "sex":             "F",
    "phone":           "555-1111",
    "email":           "ana@example.com",
    "password":        "secreto1",
  }))
}

async fn stored_hash(roster: &Roster<MemoryStore>, id: Uuid) -> String {
  roster
    .store()
    .get_by_id(id)
    .await
    .unwrap()
    .unwrap()
    .credential_hash
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_defaults_to_active() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  assert!(ana.active);
  assert_eq!(ana.profile.matricula, "A001");
  assert_eq!(ana.created_at, ana.updated_at);
}

#[tokio::test]
async fn create_stores_a_hash_never_the_raw_credential() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();

  let hash = stored_hash(&r, ana.id).await;
  assert_ne!(hash, "secreto1");
  assert!(r.hasher().verify("secreto1", &hash).unwrap());

  let shown = serde_json::to_string(&r.get_by_id(ana.id).await.unwrap()).unwrap();
  assert!(!shown.contains("secreto1"));
  assert!(!shown.contains(&hash));
}

#[tokio::test]
async fn create_rejects_missing_fields_before_touching_the_store() {
  let r = roster();
  let err = r
    .create(input(json!({ "matricula": "A001", "password": "secreto1" })))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation { field: "name", .. }));
  assert!(r.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_matricula_conflicts_even_when_inactive() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();

  let err = r.create(student("A001", "Otra")).await.unwrap_err();
  assert!(matches!(err, Error::MatriculaTaken(ref m) if m == "A001"));

  r.soft_delete(ana.id).await.unwrap();
  let err = r.create(student("A001", "Otra")).await.unwrap_err();
  assert!(matches!(err, Error::MatriculaTaken(_)));
  assert_eq!(err.field(), Some("matricula"));
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_changes_only_supplied_fields() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  let hash_before = stored_hash(&r, ana.id).await;

  let updated = r
    .update(ana.id, input(json!({ "phone": "555-0000" })))
    .await
    .unwrap();

  assert_eq!(updated.profile.phone.as_deref(), Some("555-0000"));
  let mut expected = ana.profile.clone();
  expected.phone = Some("555-0000".into());
  assert_eq!(updated.profile, expected);
  assert_eq!(updated.created_at, ana.created_at);
  assert_eq!(stored_hash(&r, ana.id).await, hash_before);
}

#[tokio::test]
async fn update_with_credential_rehashes() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  let hash_before = stored_hash(&r, ana.id).await;

  r.update(ana.id, input(json!({ "password": "nuevo-secreto" })))
    .await
    .unwrap();

  let hash_after = stored_hash(&r, ana.id).await;
  assert_ne!(hash_after, hash_before);
  assert_ne!(hash_after, "nuevo-secreto");
  assert!(r.hasher().verify("nuevo-secreto", &hash_after).unwrap());
}

#[tokio::test]
async fn null_clears_an_optional_field() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  let updated = r
    .update(ana.id, input(json!({ "email": null })))
    .await
    .unwrap();
  assert_eq!(updated.profile.email, None);
  assert_eq!(updated.profile.phone.as_deref(), Some("555-1111"));
}

#[tokio::test]
async fn update_reaches_inactive_records() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  r.soft_delete(ana.id).await.unwrap();

  let updated = r
    .update(ana.id, input(json!({ "name": "Ana Maria" })))
    .await
    .unwrap();
  assert_eq!(updated.profile.name, "Ana Maria");
  assert!(!updated.active);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
  let r = roster();
  let id = Uuid::new_v4();
  let err = r
    .update(id, input(json!({ "phone": "555-0000" })))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn update_to_taken_matricula_conflicts() {
  let r = roster();
  r.create(student("A001", "Ana Lopez")).await.unwrap();
  let beto = r.create(student("B002", "Beto Diaz")).await.unwrap();

  let err = r
    .update(beto.id, input(json!({ "matricula": "A001" })))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MatriculaTaken(_)));

  // Re-submitting one's own matricula is not a conflict.
  r.update(beto.id, input(json!({ "matricula": "B002" })))
    .await
    .unwrap();
}

#[tokio::test]
async fn own_profile_update_has_update_semantics() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  let hash_before = stored_hash(&r, ana.id).await;

  let updated = r
    .update_own_profile(ana.id, input(json!({ "avatarUrl": "https://img/ana.png" })))
    .await
    .unwrap();
  assert_eq!(updated.profile.avatar_url.as_deref(), Some("https://img/ana.png"));
  assert_eq!(updated.profile.name, "Ana Lopez");
  assert_eq!(stored_hash(&r, ana.id).await, hash_before);

  let err = r
    .update_own_profile(Uuid::new_v4(), input(json!({})))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_of_different_fields_all_land() {
  let r = Arc::new(roster());
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();

  let patches = [
    json!({ "phone": "555-0001" }),
    json!({ "email": "new@example.com" }),
    json!({ "bloodType": "AB-" }),
    json!({ "avatarUrl": "https://img/ana.png" }),
    json!({ "name": "Ana Maria Lopez" }),
    json!({ "address": { "street": "Av. Juarez", "number": 42 } }),
    json!({ "password": "nuevo-secreto" }),
  ];

  let mut tasks = JoinSet::new();
  for patch in patches {
    let r = Arc::clone(&r);
    let id = ana.id;
    tasks.spawn(async move { r.update(id, input(patch)).await });
  }
  while let Some(joined) = tasks.join_next().await {
    joined.unwrap().unwrap();
  }

  let fetched = r.get_by_id(ana.id).await.unwrap();
  assert_eq!(fetched.profile.phone.as_deref(), Some("555-0001"));
  assert_eq!(fetched.profile.email.as_deref(), Some("new@example.com"));
  assert_eq!(fetched.profile.blood_type.as_deref(), Some("AB-"));
  assert_eq!(fetched.profile.avatar_url.as_deref(), Some("https://img/ana.png"));
  assert_eq!(fetched.profile.name, "Ana Maria Lopez");
  let address = fetched.profile.address.unwrap();
  assert_eq!(address.number.as_deref(), Some("42"));
  assert_eq!(fetched.profile.matricula, "A001");
  assert!(fetched.active);

  let hash = stored_hash(&r, ana.id).await;
  assert!(r.hasher().verify("nuevo-secreto", &hash).unwrap());
}

// ─── Soft delete / restore ───────────────────────────────────────────────────

#[tokio::test]
async fn soft_delete_and_restore_are_idempotent() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();

  let once = r.soft_delete(ana.id).await.unwrap();
  let twice = r.soft_delete(ana.id).await.unwrap();
  assert!(!once.active);
  assert_eq!(once.profile, twice.profile);
  assert_eq!(once.active, twice.active);

  let once = r.restore(ana.id).await.unwrap();
  let twice = r.restore(ana.id).await.unwrap();
  assert!(once.active && twice.active);
}

#[tokio::test]
async fn soft_delete_and_restore_unknown_id_is_not_found() {
  let r = roster();
  assert!(matches!(r.soft_delete(Uuid::new_v4()).await, Err(Error::NotFound(_))));
  assert!(matches!(r.restore(Uuid::new_v4()).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn soft_delete_hides_from_active_listing() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  r.create(student("B002", "Beto Diaz")).await.unwrap();

  r.soft_delete(ana.id).await.unwrap();
  let active = r.list_active().await.unwrap();
  assert_eq!(active.len(), 1);
  assert!(active.iter().all(|s| s.id != ana.id));

  r.restore(ana.id).await.unwrap();
  assert!(r.list_active().await.unwrap().iter().any(|s| s.id == ana.id));
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_search_returns_every_active_record() {
  let r = roster();
  for (m, n) in [("A001", "Ana"), ("B002", "Beto"), ("C003", "Carla")] {
    r.create(student(m, n)).await.unwrap();
  }
  let carla = r.search(Some("carla")).await.unwrap().remove(0);
  r.soft_delete(carla.id).await.unwrap();

  assert_eq!(r.search(Some("")).await.unwrap().len(), 2);
  assert_eq!(r.search(None).await.unwrap().len(), 2);
  assert_eq!(r.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn search_matches_name_or_matricula_case_insensitively() {
  let r = roster();
  r.create(student("A001", "Ana Lopez")).await.unwrap();
  r.create(student("B002", "Beto Diaz")).await.unwrap();

  let by_name = r.search(Some("LOPEZ")).await.unwrap();
  assert_eq!(by_name.len(), 1);
  assert_eq!(by_name[0].profile.matricula, "A001");

  let by_matricula = r.search(Some("b00")).await.unwrap();
  assert_eq!(by_matricula.len(), 1);
  assert_eq!(by_matricula[0].profile.name, "Beto Diaz");
}

#[tokio::test]
async fn search_treats_pattern_characters_literally() {
  let r = roster();
  r.create(student("A001", "Ana Lopez")).await.unwrap();
  r.create(student("X.1*(", "Dot Star")).await.unwrap();

  for pattern in [".", "*", "(", ".*", "[", "\\"] {
    let found = r.search(Some(pattern)).await.unwrap();
    assert!(
      found.iter().all(|s| s.profile.matricula == "X.1*("),
      "pattern {pattern:?} matched {found:?}"
    );
  }
  assert_eq!(r.search(Some(".*")).await.unwrap().len(), 0);
  assert_eq!(r.search(Some("1*(")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_by_id_returns_inactive_records() {
  let r = roster();
  let ana = r.create(student("A001", "Ana Lopez")).await.unwrap();
  r.soft_delete(ana.id).await.unwrap();

  let fetched = r.get_by_id(ana.id).await.unwrap();
  assert!(!fetched.active);
  assert!(matches!(r.get_by_id(Uuid::new_v4()).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn ana_lifecycle_scenario() {
  let r = roster();
  let a = r.create(student("A001", "Ana Lopez")).await.unwrap();
  assert!(a.active);

  let found = r.search(Some("ana")).await.unwrap();
  assert_eq!(found.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a.id]);

  r.soft_delete(a.id).await.unwrap();
  assert!(r.search(Some("ana")).await.unwrap().is_empty());
  let all = r.list_all().await.unwrap();
  assert!(all.iter().any(|s| s.id == a.id && !s.active));

  r.restore(a.id).await.unwrap();
  assert_eq!(r.search(Some("ana")).await.unwrap().len(), 1);

  r.update(a.id, input(json!({ "phone": "555-0000" }))).await.unwrap();
  let fetched = r.get_by_id(a.id).await.unwrap();
  assert_eq!(fetched.profile.name, "Ana Lopez");
  assert_eq!(fetched.profile.phone.as_deref(), Some("555-0000"));
}

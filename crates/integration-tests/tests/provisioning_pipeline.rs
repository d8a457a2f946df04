//! Pipeline tests run directly against the store abstraction.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use shukku_core::DemoCatalog;
use shukku_integration_tests::{FailingStore, Failures};
use shukku_setup::error::SetupError;
use shukku_setup::provisioning::{self, ResetOutcome};
use shukku_setup::store::{DocRef, Document, DocumentStore, FieldValue, InMemoryStore};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

/// Everything in a document except its server-assigned timestamps.
fn without_server_times(mut doc: Document) -> Document {
    doc.remove("createdAt");
    doc.remove("updatedAt");
    doc
}

async fn snapshot(store: &InMemoryStore) -> Vec<(DocRef, Document)> {
    let mut docs = Vec::new();
    for collection in ["users", "pairs"] {
        for id in store.ids(collection).await {
            let doc_ref = DocRef::new(collection, &id);
            let doc = store.get(&doc_ref).await.unwrap().unwrap();
            docs.push((doc_ref, without_server_times(doc)));
        }
    }
    docs
}

#[tokio::test]
async fn test_seeds_empty_database() {
    let store = InMemoryStore::new();
    let report = provisioning::run(&store, "shukku-list", now()).await.unwrap();

    assert_eq!(report.users, 2);
    assert_eq!(report.pairs, 1);
    assert_eq!(report.demo.items, 6);
    assert_eq!(report.demo.invite_code, "729463");

    let pair = store
        .get(&DocRef::new("pairs", "giash_rina_home"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        pair.get("listName").and_then(FieldValue::as_str),
        Some("Giash & Rina Home")
    );
    assert!(matches!(pair.get("createdAt"), Some(FieldValue::Timestamp(_))));
}

#[tokio::test]
async fn test_running_twice_yields_same_state() {
    let store = InMemoryStore::new();

    provisioning::run(&store, "shukku-list", now()).await.unwrap();
    let first = snapshot(&store).await;

    let report = provisioning::run(&store, "shukku-list", now()).await.unwrap();
    let second = snapshot(&store).await;

    assert_eq!(first, second);
    assert_eq!(report.users, 2);
    assert_eq!(report.pairs, 1);
}

#[tokio::test]
async fn test_seed_replaces_stale_fields() {
    let store = InMemoryStore::new();
    store
        .insert(
            DocRef::new("users", "giash_uid"),
            Document::new().with("legacyField", "left over"),
        )
        .await;

    provisioning::run(&store, "shukku-list", now()).await.unwrap();

    let giash = store
        .get(&DocRef::new("users", "giash_uid"))
        .await
        .unwrap()
        .unwrap();
    assert!(giash.get("legacyField").is_none());
    assert_eq!(giash.get("name").and_then(FieldValue::as_str), Some("Giash"));
}

#[tokio::test]
async fn test_counts_include_non_demo_documents() {
    let store = InMemoryStore::new();
    store
        .insert(DocRef::new("users", "real_user"), Document::new())
        .await;

    let report = provisioning::run(&store, "shukku-list", now()).await.unwrap();
    assert_eq!(report.users, 3);
    assert_eq!(store.ids("users").await, ["giash_uid", "real_user", "rina_uid"]);
}

#[tokio::test]
async fn test_reset_on_empty_database_is_cleared() {
    let store = InMemoryStore::new();
    let catalog = DemoCatalog::build(now()).unwrap();

    let outcome = provisioning::reset(&store, &catalog).await;
    assert_eq!(outcome, ResetOutcome::Cleared { documents: 3 });
    assert_eq!(store.operations(), 1);
}

#[tokio::test]
async fn test_referential_integrity() {
    let store = InMemoryStore::new();
    provisioning::run(&store, "shukku-list", now()).await.unwrap();

    let pair = store
        .get(&DocRef::new("pairs", "giash_rina_home"))
        .await
        .unwrap()
        .unwrap();

    let members: Vec<&str> = pair
        .get("users")
        .and_then(FieldValue::as_array)
        .unwrap()
        .iter()
        .filter_map(FieldValue::as_str)
        .collect();
    assert_eq!(members, ["giash_uid", "rina_uid"]);

    for uid in &members {
        assert!(
            store.get(&DocRef::new("users", uid)).await.unwrap().is_some(),
            "pair member {uid} has no user document"
        );
    }

    let items = pair.get("items").and_then(FieldValue::as_array).unwrap();
    assert_eq!(items.len(), 6);
    for item in items {
        let item = item.as_map().unwrap();
        let added_by = item.get("addedBy").and_then(FieldValue::as_str).unwrap();
        assert!(members.contains(&added_by));

        let (Some(FieldValue::Integer(created)), Some(FieldValue::Integer(updated))) =
            (item.get("createdAt"), item.get("updatedAt"))
        else {
            panic!("item timestamps must be epoch milliseconds");
        };
        assert!(updated >= created);
    }
}

#[tokio::test]
async fn test_seed_succeeds_after_failed_reset() {
    let inner = Arc::new(InMemoryStore::new());
    let store = FailingStore::new(
        inner.clone(),
        Failures {
            deletes: true,
            ..Failures::default()
        },
    );

    let report = provisioning::run(&store, "shukku-list", now()).await.unwrap();

    assert_eq!(store.rejected(), 1);
    assert_eq!(report.users, 2);
    assert_eq!(report.pairs, 1);
    assert_eq!(inner.ids("pairs").await, ["giash_rina_home"]);
}

#[tokio::test]
async fn test_failed_reset_reports_skipped() {
    let store = FailingStore::new(
        Arc::new(InMemoryStore::new()),
        Failures {
            deletes: true,
            ..Failures::default()
        },
    );
    let catalog = DemoCatalog::build(now()).unwrap();

    let outcome = provisioning::reset(&store, &catalog).await;
    assert!(!outcome.is_cleared());
    assert_eq!(
        outcome,
        ResetOutcome::Skipped {
            reason: "injected delete failure".to_string()
        }
    );
}

#[tokio::test]
async fn test_seed_failure_keeps_earlier_writes() {
    let inner = Arc::new(InMemoryStore::new());
    let store = FailingStore::new(
        inner.clone(),
        Failures {
            write_to: Some("pairs/giash_rina_home".to_string()),
            ..Failures::default()
        },
    );

    let err = provisioning::run(&store, "shukku-list", now())
        .await
        .unwrap_err();

    match &err {
        SetupError::Seed { entity, .. } => assert_eq!(entity, "pairs/giash_rina_home"),
        other => panic!("expected seed error, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "injected write failure for pairs/giash_rina_home"
    );

    // Users were written before the pair and are not rolled back
    assert_eq!(inner.ids("users").await, ["giash_uid", "rina_uid"]);
    assert!(inner.ids("pairs").await.is_empty());
}

#[tokio::test]
async fn test_count_failure_is_fatal() {
    let store = FailingStore::new(
        Arc::new(InMemoryStore::new()),
        Failures {
            counts: true,
            ..Failures::default()
        },
    );

    let err = provisioning::run(&store, "shukku-list", now())
        .await
        .unwrap_err();
    assert!(matches!(err, SetupError::Verify(_)));
    assert_eq!(err.to_string(), "injected count failure");
}

#[tokio::test]
async fn test_dyn_store_is_accepted() {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let report = provisioning::run(store.as_ref(), "dry-run", now())
        .await
        .unwrap();
    assert_eq!(report.project, "dry-run");
}
